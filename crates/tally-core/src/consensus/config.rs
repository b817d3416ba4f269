//! Consensus configuration types and defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for verified reads.
///
/// Controls how wide each query fans out, how long the aggregate wait may
/// take, and how far apart two balances may be while still agreeing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Endpoints queried per read, primary included (default: 3)
    #[serde(default = "default_parallel_requests")]
    pub parallel_requests: usize,

    /// Deadline for the aggregate wait in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum distance in lamports from the median for a balance to agree
    /// (default: 1,000,000)
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: u64,
}

fn default_parallel_requests() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_balance_tolerance() -> u64 {
    1_000_000
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            parallel_requests: default_parallel_requests(),
            timeout_ms: default_timeout_ms(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

impl ConsensusConfig {
    /// Deadline for one verified read.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Per-request timeout used when none is configured: four fifths of the
    /// deadline. A request timeout must stay below the deadline for a hung
    /// endpoint to settle as a failure.
    #[must_use]
    pub fn default_request_timeout(&self) -> Duration {
        Duration::from_millis((self.timeout_ms.saturating_mul(4) / 5).max(1))
    }

    /// Validates the consensus settings.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.parallel_requests == 0 {
            return Err("consensus.parallel_requests must be at least 1".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("consensus.timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}
