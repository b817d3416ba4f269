//! Exact-match vote for account snapshots.

use super::{
    quorum::{frequency_vote, Ballot},
    types::{EndpointFailure, Tally, Vote},
};
use crate::{types::AccountSnapshot, utils::canonical::to_canonical_bytes};
use tracing::warn;

/// Reduces account snapshot votes to one accepted snapshot.
///
/// Each snapshot is compared by its canonical form, so payloads differing only
/// in field order count as the same vote. `None` (the account does not exist)
/// is an ordinary vote. A snapshot that cannot be canonicalized is excluded
/// and reported as if its endpoint had failed.
#[must_use]
pub fn reduce(votes: Vec<Vote<Option<AccountSnapshot>>>) -> Tally<Option<AccountSnapshot>> {
    let mut ballots = Vec::with_capacity(votes.len());
    let mut excluded = Vec::new();

    for vote in votes {
        match to_canonical_bytes(&vote.value) {
            Ok(form) => ballots.push(Ballot { vote, form }),
            Err(e) => {
                warn!(endpoint = %vote.endpoint, error = %e, "account snapshot excluded from vote");
                excluded.push(EndpointFailure::new(vote.endpoint, format!("canonicalization failed: {e}")));
            }
        }
    }

    frequency_vote(ballots).with_excluded(excluded)
}
