//! Consensus outcome, report and vote types.

use crate::types::{QueryKind, QueryValue};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Why a verified read was not accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No endpoint produced a usable value.
    #[error("all endpoints failed")]
    AllEndpointsFailed,
    /// Values were returned but too few of them agree.
    #[error("no quorum")]
    NoQuorum,
    /// The deadline elapsed before every endpoint settled.
    #[error("deadline elapsed")]
    Timeout,
}

impl RejectionReason {
    /// Returns a static string representation for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllEndpointsFailed => "all_endpoints_failed",
            Self::NoQuorum => "no_quorum",
            Self::Timeout => "timeout",
        }
    }
}

/// Verdict of one reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ConsensusOutcome<T> {
    Accepted(T),
    Rejected(RejectionReason),
}

impl<T> ConsensusOutcome<T> {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Transforms the accepted value, keeping rejections as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConsensusOutcome<U> {
        match self {
            Self::Accepted(value) => ConsensusOutcome::Accepted(f(value)),
            Self::Rejected(reason) => ConsensusOutcome::Rejected(reason),
        }
    }

    #[must_use]
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// One endpoint's successful value as it enters a reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote<T> {
    pub endpoint: Arc<str>,
    pub value: T,
}

impl<T> Vote<T> {
    pub fn new(endpoint: impl Into<Arc<str>>, value: T) -> Self {
        Self { endpoint: endpoint.into(), value }
    }
}

/// The accepted value and the endpoints whose votes support it.
#[derive(Debug, Clone, PartialEq)]
pub struct Agreement<T> {
    pub value: T,
    pub agreeing: Vec<Arc<str>>,
}

/// Everything a reducer decided about one set of votes.
///
/// `voters` lists the endpoints whose values took part in the vote, in
/// dispatch order. `excluded` lists values that could not take part (for
/// example a payload that failed to canonicalize); those are reported the
/// same way as endpoint failures.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally<T> {
    pub outcome: ConsensusOutcome<Agreement<T>>,
    pub voters: Vec<Arc<str>>,
    pub excluded: Vec<EndpointFailure>,
}

impl<T> Tally<T> {
    #[must_use]
    pub fn rejected(reason: RejectionReason, voters: Vec<Arc<str>>) -> Self {
        Self { outcome: ConsensusOutcome::Rejected(reason), voters, excluded: Vec::new() }
    }

    /// Attaches values that were dropped before voting.
    #[must_use]
    pub fn with_excluded(mut self, excluded: Vec<EndpointFailure>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Converts the accepted value, keeping the vote bookkeeping.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tally<U> {
        Tally {
            outcome: self.outcome.map(|agreement| Agreement {
                value: f(agreement.value),
                agreeing: agreement.agreeing,
            }),
            voters: self.voters,
            excluded: self.excluded,
        }
    }
}

/// An endpoint that did not contribute a vote, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointFailure {
    pub endpoint: Arc<str>,
    pub reason: String,
}

impl EndpointFailure {
    pub fn new(endpoint: Arc<str>, reason: impl Into<String>) -> Self {
        Self { endpoint, reason: reason.into() }
    }
}

/// Result of one verified read together with its diagnostics.
///
/// Failures are kept for diagnostics only; they never vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusReport {
    pub kind: QueryKind,
    pub target: Arc<str>,
    pub outcome: ConsensusOutcome<QueryValue>,
    /// Endpoints whose values support the accepted value.
    pub agreement_count: usize,
    /// Endpoints the query was dispatched to.
    pub total_queried: usize,
    /// Endpoints that returned a value, whether or not it could vote.
    pub successful: usize,
    pub failures: Vec<EndpointFailure>,
    /// Voting endpoints outside the agreeing set. Empty on rejection.
    pub disagreeing_endpoints: Vec<Arc<str>>,
    pub duration_ms: u64,
}

impl ConsensusReport {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_accepted()
    }

    #[must_use]
    pub fn rejection(&self) -> Option<RejectionReason> {
        self.outcome.rejection()
    }

    /// The accepted value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&QueryValue> {
        match &self.outcome {
            ConsensusOutcome::Accepted(value) => Some(value),
            ConsensusOutcome::Rejected(_) => None,
        }
    }

    /// Consumes the report, returning the accepted value.
    #[must_use]
    pub fn into_value(self) -> Option<QueryValue> {
        match self.outcome {
            ConsensusOutcome::Accepted(value) => Some(value),
            ConsensusOutcome::Rejected(_) => None,
        }
    }

    /// Records the wall-clock time of the whole read.
    #[must_use]
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
