//! RPC endpoint identity.

use serde::Serialize;
use std::{fmt, sync::Arc};

/// Whether an endpoint is the caller's preferred provider or a cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    Primary,
    Backup,
}

/// One RPC provider URL. Immutable once the pool is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    url: Arc<str>,
    role: EndpointRole,
}

impl Endpoint {
    /// Creates an endpoint from a URL, normalizing it with [`normalize_url`].
    #[must_use]
    pub fn new(url: &str, role: EndpointRole) -> Self {
        Self { url: Arc::from(normalize_url(url)), role }
    }

    #[must_use]
    pub fn primary(url: &str) -> Self {
        Self::new(url, EndpointRole::Primary)
    }

    #[must_use]
    pub fn backup(url: &str) -> Self {
        Self::new(url, EndpointRole::Backup)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Shared handle to the URL, used to attribute outcomes without copying.
    #[must_use]
    pub fn url_arc(&self) -> Arc<str> {
        Arc::clone(&self.url)
    }

    #[must_use]
    pub fn role(&self) -> EndpointRole {
        self.role
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.role == EndpointRole::Primary
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Canonical spelling of an endpoint URL: surrounding whitespace and trailing
/// slashes removed.
#[must_use]
pub fn normalize_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}
