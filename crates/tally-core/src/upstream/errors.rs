use thiserror::Error;

/// Classification of JSON-RPC error codes returned by Solana endpoints.
///
/// Callers layering retries above the verified reader use this to decide
/// whether trying again could help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCategory {
    /// Invalid request, unknown method or invalid params. The caller's fault.
    ClientError,
    /// Internal errors and the node-side server error range.
    ProviderError,
    /// Node is behind, unhealthy or the requested slot is not available yet.
    NodeLagging,
    /// The endpoint could not parse the request body.
    ParseError,
}

impl RpcErrorCategory {
    /// Classifies a JSON-RPC error code.
    ///
    /// Codes of interest:
    /// - -32700: Parse error
    /// - -32600 to -32602: Invalid request, method not found, invalid params
    /// - -32603: Internal error
    /// - -32004, -32005, -32007, -32009, -32014, -32016: block not available,
    ///   node unhealthy, slot skipped, slot missing, status not available,
    ///   minimum context slot not reached
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32602..=-32600 => Self::ClientError,
            -32004 | -32005 | -32007 | -32009 | -32014 | -32016 => Self::NodeLagging,
            _ => Self::ProviderError,
        }
    }

    /// Returns `true` if a later or different endpoint may answer successfully.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::NodeLagging | Self::ProviderError)
    }

    /// Returns a static string representation for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::ProviderError => "provider_error",
            Self::NodeLagging => "node_lagging",
            Self::ParseError => "parse_error",
        }
    }
}

/// Errors that can occur when querying one RPC endpoint.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpstreamError {
    /// Request exceeded the configured timeout duration.
    #[error("Request timeout")]
    Timeout,

    /// Failed to establish a connection to the endpoint.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the (truncated) body.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// JSON-RPC error object returned by the endpoint.
    #[error("RPC error {0}: {1}")]
    RpcError(i64, String),

    /// Response could not be decoded or did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Maximum concurrent requests limit has been reached.
    #[error("Concurrency limit reached: {0}")]
    ConcurrencyLimit(String),
}

impl UpstreamError {
    /// Returns the RPC error category if this is an RPC error.
    #[must_use]
    pub fn rpc_category(&self) -> Option<RpcErrorCategory> {
        match self {
            Self::RpcError(code, _) => Some(RpcErrorCategory::from_code(*code)),
            _ => None,
        }
    }

    /// Returns `true` if this error is transient and the read could be retried.
    ///
    /// Transient errors include timeouts, connection failures, HTTP 5xx and 429,
    /// and RPC errors from lagging or failing nodes.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed(_) | Self::ConcurrencyLimit(_) => true,
            Self::HttpError(status, _) => (500..=599).contains(status) || *status == 429,
            Self::RpcError(..) => self.rpc_category().is_some_and(RpcErrorCategory::is_transient),
            Self::InvalidResponse(_) | Self::InvalidRequest(_) => false,
        }
    }
}
