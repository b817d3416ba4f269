use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::upstream::UpstreamError;

/// Response bodies of failed requests are cut to this many bytes.
const MAX_ERROR_BODY_LEN: usize = 256;

/// Transport limits shared by every endpoint call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed (default: 256)
    #[serde(default = "default_concurrent_limit")]
    pub concurrent_limit: usize,

    /// Permit acquisition timeout in milliseconds (default: 500)
    #[serde(default = "default_permit_timeout_ms")]
    pub permit_timeout_ms: u64,

    /// TCP connect timeout in milliseconds (default: 3000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_concurrent_limit() -> usize {
    256
}

fn default_permit_timeout_ms() -> u64 {
    500
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_user_agent() -> String {
    format!("tally/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: default_concurrent_limit(),
            permit_timeout_ms: default_permit_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpClientConfig {
    /// Validates the HTTP client settings.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrent_limit == 0 {
            return Err("http.concurrent_limit must be at least 1".to_string());
        }
        if self.permit_timeout_ms == 0 {
            return Err("http.permit_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Pooled reqwest client that caps in-flight requests across all endpoints.
///
/// Each request is sent exactly once; nothing here retries.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

/// Holds one in-flight slot; the slot is returned when the guard drops.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl PermitGuard {
    fn new(permit: OwnedSemaphorePermit, semaphore: Arc<Semaphore>) -> Self {
        Self { _permit: permit, semaphore }
    }

    fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Client with [`HttpClientConfig::default`] limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Client with the given limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)),
            config,
        })
    }

    /// Sanitizes network errors so endpoint credentials embedded in URLs never
    /// reach error messages.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Cuts an error body to [`MAX_ERROR_BODY_LEN`] bytes on a char boundary.
    fn truncate_body(raw: String) -> String {
        if raw.len() <= MAX_ERROR_BODY_LEN {
            return raw;
        }
        let mut end = MAX_ERROR_BODY_LEN;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &raw[..end])
    }

    /// Sends a JSON POST request with semaphore-based concurrency control.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Timeout`] if permit acquisition or the request times out
    /// - [`UpstreamError::ConcurrencyLimit`] if the semaphore is closed
    /// - [`UpstreamError::HttpError`] for non-success HTTP status codes
    /// - [`UpstreamError::ConnectionFailed`] for network-related failures
    pub async fn send_request(
        &self,
        url: &str,
        body: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, UpstreamError> {
        let permit = tokio::time::timeout(
            Duration::from_millis(self.config.permit_timeout_ms),
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            UpstreamError::Timeout
        })?
        .map_err(|_| UpstreamError::ConcurrencyLimit("http client semaphore closed".to_string()))?;

        let permit_guard = PermitGuard::new(permit, Arc::clone(&self.concurrent_limit));

        tracing::trace!(available_permits = permit_guard.available_permits(), "http request started");

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::ConnectionFailed(Self::sanitize_network_error(&e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw_text = response.text().await.unwrap_or_default();
            tracing::trace!(
                status = status.as_u16(),
                available_permits = permit_guard.available_permits(),
                "http request failed"
            );
            return Err(UpstreamError::HttpError(status.as_u16(), Self::truncate_body(raw_text)));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout
            } else {
                UpstreamError::ConnectionFailed(Self::sanitize_network_error(&e))
            }
        })?;

        tracing::trace!(
            available_permits = permit_guard.available_permits(),
            bytes = bytes.len(),
            "http request completed"
        );
        Ok(bytes)
    }

    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
