//! Builder for [`VerifiedReader`].

use super::VerifiedReader;
use crate::{
    consensus::{ConsensusConfig, ConsensusEngine},
    dispatch::QueryDispatcher,
    upstream::{
        endpoint::normalize_url,
        http_client::{HttpClient, HttpClientConfig},
        pool::EndpointPool,
        solana::{Commitment, SolanaRpcClient},
        RpcClient,
    },
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Errors that can occur while constructing a [`VerifiedReader`].
#[derive(Debug, Error)]
pub enum BuilderError {
    /// HTTP client initialization failed
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(String),

    /// No primary endpoint URL was provided
    #[error("a primary endpoint URL is required")]
    MissingPrimary,

    /// Settings failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Builder for constructing a [`VerifiedReader`].
///
/// When no [`RpcClient`] is supplied, `build` creates a [`SolanaRpcClient`]
/// over a fresh [`HttpClient`].
///
/// # Examples
///
/// ```no_run
/// # use tally_core::verify::VerifiedReaderBuilder;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = VerifiedReaderBuilder::new()
///     .primary("https://api.mainnet-beta.solana.com")
///     .endpoints(["https://solana-rpc.publicnode.com", "https://rpc.ankr.com/solana"])
///     .build()?;
///
/// let lamports = reader.verified_balance("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").await?;
/// # Ok(())
/// # }
/// ```
pub struct VerifiedReaderBuilder {
    primary: Option<String>,
    endpoints: Vec<String>,
    client: Option<Arc<dyn RpcClient>>,
    consensus: ConsensusConfig,
    http: HttpClientConfig,
    commitment: Commitment,
    request_timeout: Option<Duration>,
}

impl VerifiedReaderBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            primary: None,
            endpoints: Vec::new(),
            client: None,
            consensus: ConsensusConfig::default(),
            http: HttpClientConfig::default(),
            commitment: Commitment::default(),
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn primary(mut self, url: impl Into<String>) -> Self {
        self.primary = Some(url.into());
        self
    }

    /// Sets the candidate pool backups are drawn from.
    #[must_use]
    pub fn endpoints<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Uses `client` for every endpoint call instead of the default Solana client.
    #[must_use]
    pub fn client(mut self, client: Arc<dyn RpcClient>) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn consensus_config(mut self, config: ConsensusConfig) -> Self {
        self.consensus = config;
        self
    }

    #[must_use]
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http = config;
        self
    }

    #[must_use]
    pub fn commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Per-request timeout for the default Solana client. Must be below the
    /// consensus deadline (default: four fifths of it).
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the `VerifiedReader`.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingPrimary` if no non-blank primary URL was set.
    /// Returns `BuilderError::InvalidConfig` if the consensus settings are invalid
    /// or the request timeout is zero or not below the consensus deadline.
    /// Returns `BuilderError::HttpClientInit` if HTTP client initialization fails.
    pub fn build(self) -> Result<VerifiedReader, BuilderError> {
        let primary = self
            .primary
            .as_deref()
            .map(normalize_url)
            .filter(|url| !url.is_empty())
            .ok_or(BuilderError::MissingPrimary)?;

        self.consensus.validate().map_err(BuilderError::InvalidConfig)?;

        let deadline = self.consensus.timeout();
        let request_timeout = match self.request_timeout {
            Some(timeout) if timeout.is_zero() || timeout >= deadline => {
                return Err(BuilderError::InvalidConfig(format!(
                    "request timeout of {}ms must be above zero and below the {}ms deadline",
                    timeout.as_millis(),
                    deadline.as_millis()
                )));
            }
            Some(timeout) => timeout,
            None => self.consensus.default_request_timeout(),
        };

        let client: Arc<dyn RpcClient> = match self.client {
            Some(client) => client,
            None => {
                self.http.validate().map_err(BuilderError::InvalidConfig)?;
                let http = HttpClient::with_config(self.http)
                    .map_err(|e| BuilderError::HttpClientInit(e.to_string()))?;
                Arc::new(SolanaRpcClient::new(Arc::new(http), self.commitment, request_timeout))
            }
        };

        Ok(VerifiedReader::new(
            Arc::new(EndpointPool::new(&self.endpoints)),
            Arc::from(primary),
            QueryDispatcher::new(client),
            ConsensusEngine::new(self.consensus),
        ))
    }
}

impl Default for VerifiedReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
