use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tally_core::{config::AppConfig, VerifiedReader};

mod commands;
mod logging;

use commands::{
    handle_config_command, handle_read_command, utils::print_error, ConfigCommands, ReadCommand,
};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - verified Solana reads cross-checked across several RPC endpoints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $TALLY_CONFIG, then config/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verified lamport balance of an account
    Balance {
        account: String,

        /// Print the full consensus report
        #[arg(long)]
        report: bool,
    },

    /// Verified account snapshot
    Account {
        account: String,

        /// Print the full consensus report
        #[arg(long)]
        report: bool,
    },

    /// Verified transaction record
    Transaction {
        signature: String,

        /// Print the full consensus report
        #[arg(long)]
        report: bool,
    },

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (read, report) = match cli.command {
        Commands::Config(config_command) => {
            return match handle_config_command(config_command, cli.config.as_deref()) {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    print_error(&e.to_string());
                    Ok(ExitCode::FAILURE)
                }
            };
        }
        Commands::Balance { account, report } => (ReadCommand::Balance { account }, report),
        Commands::Account { account, report } => (ReadCommand::Account { account }, report),
        Commands::Transaction { signature, report } => {
            (ReadCommand::Transaction { signature }, report)
        }
    };

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.logging);

    let reader = VerifiedReader::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Verified reader initialization failed: {e}"))?;

    tracing::debug!(
        primary = reader.primary(),
        pool = reader.pool().len(),
        parallel_requests = config.consensus.parallel_requests,
        "verified reader ready"
    );

    match handle_read_command(&reader, read, report).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::from(2)),
        Err(e) => {
            print_error(&e.to_string());
            Ok(ExitCode::from(2))
        }
    }
}
