//! Verified reads: the entry point callers use.
//!
//! Every read follows the same path:
//!
//! ```text
//! pool.select(primary, parallel_requests)
//!        │
//!        ▼
//! dispatch under deadline ── elapsed ──► Rejected(Timeout)
//!        │
//!        ▼
//! ConsensusEngine::reduce ──► ConsensusReport
//! ```
//!
//! The `*_report` methods return the full [`ConsensusReport`] and never fail.
//! The `verified_*` methods return the accepted value or a
//! [`VerificationError`] carrying the rejection reason.

pub mod builder;

use crate::{
    config::AppConfig,
    consensus::{ConsensusEngine, ConsensusOutcome, ConsensusReport, RejectionReason},
    dispatch::QueryDispatcher,
    types::{AccountSnapshot, Query, QueryKind, QueryValue, TransactionRecord},
    upstream::{endpoint::Endpoint, pool::EndpointPool},
};
use std::{sync::Arc, time::Instant};
use thiserror::Error;
use tracing::debug;

pub use builder::{BuilderError, VerifiedReaderBuilder};

/// A verified read that did not produce a value.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Consensus rejected the read. The report holds per-endpoint diagnostics.
    #[error("{kind} read rejected: {reason}")]
    Rejected { kind: QueryKind, reason: RejectionReason, report: Box<ConsensusReport> },

    /// Consensus accepted a value of the wrong kind.
    #[error("expected {expected} value, got {actual}")]
    UnexpectedValue { expected: QueryKind, actual: QueryKind },
}

impl VerificationError {
    /// The rejection reason, if consensus rejected the read.
    #[must_use]
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            Self::UnexpectedValue { .. } => None,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&ConsensusReport> {
        match self {
            Self::Rejected { report, .. } => Some(&**report),
            Self::UnexpectedValue { .. } => None,
        }
    }
}

/// Reads chain state by cross-checking several endpoints.
///
/// Cheap to share: the pool is behind an `Arc` and nothing is mutated after
/// construction, so one reader serves any number of concurrent reads.
#[derive(Clone)]
pub struct VerifiedReader {
    pool: Arc<EndpointPool>,
    primary: Arc<str>,
    dispatcher: QueryDispatcher,
    engine: ConsensusEngine,
}

impl VerifiedReader {
    #[must_use]
    pub fn new(
        pool: Arc<EndpointPool>,
        primary: Arc<str>,
        dispatcher: QueryDispatcher,
        engine: ConsensusEngine,
    ) -> Self {
        Self { pool, primary, dispatcher, engine }
    }

    /// Builds a reader talking to Solana endpoints from application config.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] if the primary URL is missing, the settings
    /// are invalid, or the HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, BuilderError> {
        let mut builder = VerifiedReaderBuilder::new()
            .primary(config.upstreams.primary_url.as_str())
            .endpoints(config.upstreams.endpoints.iter().map(String::as_str))
            .commitment(config.upstreams.commitment)
            .consensus_config(config.consensus.clone())
            .http_config(config.http.clone());

        if let Some(timeout) = config.upstreams.request_timeout() {
            builder = builder.request_timeout(timeout);
        }

        builder.build()
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    #[must_use]
    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    #[must_use]
    pub fn engine(&self) -> &ConsensusEngine {
        &self.engine
    }

    /// The endpoints every read is sent to: the primary and up to
    /// `parallel_requests - 1` backups.
    #[must_use]
    pub fn dispatch_set(&self) -> Vec<Endpoint> {
        self.pool.select(&self.primary, self.engine.config().parallel_requests)
    }

    /// Runs `query` and returns the full report.
    pub async fn verify(&self, query: Query) -> ConsensusReport {
        let started = Instant::now();
        let endpoints = self.dispatch_set();
        let deadline = self.engine.config().timeout();

        debug!(
            kind = %query.kind,
            target = %query.target,
            endpoints = endpoints.len(),
            timeout_ms = deadline.as_millis(),
            "dispatching verified read"
        );

        let report = match self.dispatcher.dispatch_with_deadline(&query, &endpoints, deadline).await {
            Ok(outcomes) => self.engine.reduce(&query, outcomes),
            Err(_) => self.engine.timed_out(&query, endpoints.len()),
        };

        report.with_duration(started.elapsed())
    }

    pub async fn balance_report(&self, account: &str) -> ConsensusReport {
        self.verify(Query::balance(account)).await
    }

    pub async fn account_snapshot_report(&self, account: &str) -> ConsensusReport {
        self.verify(Query::account_snapshot(account)).await
    }

    pub async fn transaction_record_report(&self, signature: &str) -> ConsensusReport {
        self.verify(Query::transaction_record(signature)).await
    }

    /// Lamport balance of `account`, agreed on by a majority of endpoints
    /// within the configured tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Rejected`] on timeout, when every endpoint
    /// failed, or when no majority agrees.
    pub async fn verified_balance(&self, account: &str) -> Result<u64, VerificationError> {
        let report = self.balance_report(account).await;
        accepted(report, |value| match value {
            QueryValue::Balance(lamports) => Ok(lamports),
            other => Err(other),
        })
    }

    /// Account snapshot agreed on by a majority of endpoints. `None` means a
    /// majority reported that the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Rejected`] on timeout, when every endpoint
    /// failed, or when no majority agrees.
    pub async fn verified_account_snapshot(
        &self,
        account: &str,
    ) -> Result<Option<AccountSnapshot>, VerificationError> {
        let report = self.account_snapshot_report(account).await;
        accepted(report, |value| match value {
            QueryValue::Account(snapshot) => Ok(snapshot),
            other => Err(other),
        })
    }

    /// Transaction record for `signature`.
    ///
    /// A single endpoint returning a record that carries `signature` is
    /// enough; with several records a majority must agree on the signature
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Rejected`] on timeout, when no endpoint
    /// returned a matching record, or when no majority agrees.
    pub async fn verified_transaction_record(
        &self,
        signature: &str,
    ) -> Result<TransactionRecord, VerificationError> {
        let report = self.transaction_record_report(signature).await;
        accepted(report, |value| match value {
            QueryValue::Transaction(Some(record)) => Ok(record),
            other => Err(other),
        })
    }
}

/// Extracts the accepted value from `report`.
fn accepted<T>(
    report: ConsensusReport,
    extract: impl FnOnce(QueryValue) -> Result<T, QueryValue>,
) -> Result<T, VerificationError> {
    let kind = report.kind;
    match report.outcome {
        ConsensusOutcome::Accepted(value) => extract(value)
            .map_err(|other| VerificationError::UnexpectedValue { expected: kind, actual: other.kind() }),
        ConsensusOutcome::Rejected(reason) => {
            Err(VerificationError::Rejected { kind, reason, report: Box::new(report) })
        }
    }
}
