//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by the `TALLY_CONFIG` env var
//! 3. **Environment variables**: `TALLY__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`UpstreamsConfig`]: primary endpoint, candidate pool, commitment
//! - [`ConsensusConfig`]: fan-out width, deadline, balance tolerance
//! - [`HttpClientConfig`]: transport concurrency and timeouts
//! - [`LoggingConfig`]: Log level and format
//!
//! # Example
//!
//! ```toml
//! [upstreams]
//! primary_url = "https://api.mainnet-beta.solana.com"
//! endpoints = [
//!     "https://solana-rpc.publicnode.com",
//!     "https://rpc.ankr.com/solana",
//! ]
//! commitment = "finalized"
//!
//! [consensus]
//! parallel_requests = 3
//! timeout_ms = 5000
//! balance_tolerance = 1000000
//! ```

use crate::{
    consensus::ConsensusConfig,
    upstream::{http_client::HttpClientConfig, solana::Commitment},
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TALLY_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Endpoints a verified read may be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamsConfig {
    /// Preferred endpoint; always part of the dispatch set.
    #[serde(default = "default_primary_url")]
    pub primary_url: String,

    /// Candidate pool backups are drawn from, in preference order. The
    /// primary may appear here; it is never used as its own backup.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Commitment level requested from every endpoint. Defaults to `confirmed`.
    #[serde(default)]
    pub commitment: Commitment,

    /// Per-request HTTP timeout in milliseconds. Must be below
    /// `consensus.timeout_ms`; unset means four fifths of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

fn default_primary_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_endpoints() -> Vec<String> {
    vec![
        "https://api.mainnet-beta.solana.com".to_string(),
        "https://solana-rpc.publicnode.com".to_string(),
        "https://rpc.ankr.com/solana".to_string(),
    ]
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            endpoints: default_endpoints(),
            commitment: Commitment::default(),
            request_timeout_ms: None,
        }
    }
}

impl UpstreamsConfig {
    /// The configured per-request timeout, if any.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstreams: UpstreamsConfig,

    #[serde(default)]
    pub consensus: ConsensusConfig,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `TALLY__` prefix can override any configuration value.
    /// Use `__` as a separator for nested fields (e.g., `TALLY__CONSENSUS__TIMEOUT_MS=2000`).
    /// `TALLY__UPSTREAMS__ENDPOINTS` takes a comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("upstreams.endpoints"),
            )
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from the default location.
    ///
    /// The config file path can be overridden using the `TALLY_CONFIG` environment variable.
    /// Environment variable overrides are supported via the `TALLY__` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&config_path)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let primary = self.upstreams.primary_url.trim();
        if primary.is_empty() {
            return Err("upstreams.primary_url must be set".to_string());
        }
        if !primary.starts_with("http") {
            return Err(format!("Invalid URL for primary endpoint: {primary}"));
        }

        for url in &self.upstreams.endpoints {
            if !url.trim().starts_with("http") {
                return Err(format!("Invalid URL for endpoint: {url}"));
            }
        }

        self.consensus.validate()?;

        if let Some(request_timeout_ms) = self.upstreams.request_timeout_ms {
            if request_timeout_ms == 0 {
                return Err("upstreams.request_timeout_ms must be greater than 0".to_string());
            }
            if request_timeout_ms >= self.consensus.timeout_ms {
                return Err(format!(
                    "upstreams.request_timeout_ms ({request_timeout_ms}) must be less than consensus.timeout_ms ({})",
                    self.consensus.timeout_ms
                ));
            }
        }
        self.http.validate()?;

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
