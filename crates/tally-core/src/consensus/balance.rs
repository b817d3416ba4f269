//! Tolerance-median vote for lamport balances.
//!
//! Providers sampled a few slots apart can report slightly different
//! balances, so values agree when they lie within a fixed absolute band of the
//! median rather than only on exact equality.

use super::{
    quorum::majority,
    types::{Agreement, ConsensusOutcome, RejectionReason, Tally, Vote},
};
use std::sync::Arc;
use tracing::debug;

/// Reduces balance votes to one accepted value.
///
/// Sorts the values, takes the element at `floor(n / 2)` as the median and
/// accepts it when at least `ceil(n / 2)` values lie within `tolerance` of
/// it. Fewer than two votes are never enough.
#[must_use]
pub fn reduce(votes: Vec<Vote<u64>>, tolerance: u64) -> Tally<u64> {
    let voters: Vec<Arc<str>> = votes.iter().map(|v| Arc::clone(&v.endpoint)).collect();

    if votes.is_empty() {
        return Tally::rejected(RejectionReason::AllEndpointsFailed, voters);
    }
    if votes.len() < 2 {
        return Tally::rejected(RejectionReason::NoQuorum, voters);
    }

    let mut sorted: Vec<u64> = votes.iter().map(|v| v.value).collect();
    sorted.sort_unstable();
    let median = sorted[sorted.len() / 2];

    let agreeing: Vec<Arc<str>> = votes
        .iter()
        .filter(|v| v.value.abs_diff(median) <= tolerance)
        .map(|v| Arc::clone(&v.endpoint))
        .collect();

    let threshold = majority(votes.len());
    if agreeing.len() < threshold {
        debug!(median, within = agreeing.len(), threshold, tolerance, "balance band below majority");
        return Tally::rejected(RejectionReason::NoQuorum, voters);
    }

    Tally {
        outcome: ConsensusOutcome::Accepted(Agreement { value: median, agreeing }),
        voters,
        excluded: Vec::new(),
    }
}
