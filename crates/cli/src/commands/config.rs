use clap::Subcommand;
use std::path::Path;
use tally_core::config::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

use super::utils::{print_error, print_info, print_json, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to --config, then $TALLY_CONFIG, then config/config.toml)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Show the effective configuration after defaults and environment overrides
    Show {
        /// Path to config file (defaults to --config, then $TALLY_CONFIG, then config/config.toml)
        #[arg(short, long)]
        file: Option<String>,

        /// Print as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

/// Runs a config subcommand. `global_config` is the top-level `--config` value.
pub fn handle_config_command(command: ConfigCommands, global_config: Option<&str>) -> CliResult<()> {
    let env_config = std::env::var(CONFIG_PATH_ENV).ok();
    match command {
        ConfigCommands::Validate { file } => {
            validate_config(&config_path(file.as_deref(), global_config, env_config.as_deref()))
        }
        ConfigCommands::Show { file, json } => {
            show_config(&config_path(file.as_deref(), global_config, env_config.as_deref()), json)
        }
    }
}

/// Picks the config file: `--file`, then `--config`, then the environment, then the default.
fn config_path(file: Option<&str>, global_config: Option<&str>, env_config: Option<&str>) -> String {
    file.or(global_config).or(env_config).unwrap_or(DEFAULT_CONFIG_PATH).to_string()
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!("  Primary: {}", config.upstreams.primary_url);
    println!("  Pool: {} endpoints", config.upstreams.endpoints.len());
    println!("  Parallel requests: {}", config.consensus.parallel_requests);
    println!("  Deadline: {}ms", config.consensus.timeout_ms);

    Ok(())
}

fn show_config(file: &str, json: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    if json {
        return print_json(&config);
    }

    println!("Configuration from {file}:");

    println!("\n[Upstreams]");
    println!("  Primary: {}", config.upstreams.primary_url);
    println!("  Commitment: {}", config.upstreams.commitment);
    match config.upstreams.request_timeout_ms {
        Some(ms) => println!("  Request Timeout: {ms}ms"),
        None => println!(
            "  Request Timeout: {}ms (derived from consensus timeout)",
            config.consensus.default_request_timeout().as_millis()
        ),
    }
    for endpoint in &config.upstreams.endpoints {
        println!("    - {endpoint}");
    }

    println!("\n[Consensus]");
    println!("  Parallel Requests: {}", config.consensus.parallel_requests);
    println!("  Timeout: {}ms", config.consensus.timeout_ms);
    println!("  Balance Tolerance: {} lamports", config.consensus.balance_tolerance);

    println!("\n[Http]");
    println!("  Concurrent Limit: {}", config.http.concurrent_limit);
    println!("  Permit Timeout: {}ms", config.http.permit_timeout_ms);
    println!("  Connect Timeout: {}ms", config.http.connect_timeout_ms);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}
