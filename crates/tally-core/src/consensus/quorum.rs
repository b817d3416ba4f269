//! Majority threshold and exact-match frequency voting.
//!
//! All functions are stateless. Votes arrive in dispatch order and every
//! decision is a function of the vote multiset: groups are keyed by canonical
//! form in a `BTreeMap`, so when two forms tie the smallest form wins no
//! matter which endpoint answered first.

use super::types::{Agreement, ConsensusOutcome, RejectionReason, Tally, Vote};
use crate::utils::canonical::form_digest;
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// Minimum number of agreeing values out of `n`: `ceil(n / 2)`.
#[must_use]
pub fn majority(n: usize) -> usize {
    n.div_ceil(2)
}

/// A vote paired with the canonical form it is compared by.
#[derive(Debug, Clone)]
pub struct Ballot<T> {
    pub vote: Vote<T>,
    pub form: Vec<u8>,
}

/// Runs an exact-match frequency vote.
///
/// Requires at least two ballots. The most frequent form wins if its count
/// reaches [`majority`] of the ballots; the accepted value is the first
/// ballot (in dispatch order) carrying the winning form.
#[must_use]
pub fn frequency_vote<T>(ballots: Vec<Ballot<T>>) -> Tally<T> {
    let voters: Vec<Arc<str>> = ballots.iter().map(|b| Arc::clone(&b.vote.endpoint)).collect();

    if ballots.is_empty() {
        return Tally::rejected(RejectionReason::AllEndpointsFailed, voters);
    }
    if ballots.len() < 2 {
        return Tally::rejected(RejectionReason::NoQuorum, voters);
    }

    let groups = group_by_form(&ballots);

    // Ties resolve to the first (smallest) form because only a strictly larger
    // count replaces the leader.
    let mut winner: Option<(&Vec<u8>, &Vec<usize>)> = None;
    for (form, members) in &groups {
        debug!(
            form_digest = form_digest(form),
            votes = members.len(),
            "vote group"
        );
        if winner.is_none_or(|(_, best)| members.len() > best.len()) {
            winner = Some((form, members));
        }
    }

    let Some((_, members)) = winner else {
        return Tally::rejected(RejectionReason::AllEndpointsFailed, voters);
    };

    let threshold = majority(ballots.len());
    if members.len() < threshold {
        debug!(
            best = members.len(),
            threshold,
            groups = groups.len(),
            "no form reached majority"
        );
        return Tally::rejected(RejectionReason::NoQuorum, voters);
    }

    let agreeing_indices = members.clone();
    let agreeing: Vec<Arc<str>> =
        agreeing_indices.iter().map(|&i| Arc::clone(&ballots[i].vote.endpoint)).collect();

    let first = agreeing_indices[0];
    let value = ballots.into_iter().nth(first).map(|b| b.vote.value);

    match value {
        Some(value) => Tally {
            outcome: ConsensusOutcome::Accepted(Agreement { value, agreeing }),
            voters,
            excluded: Vec::new(),
        },
        None => Tally::rejected(RejectionReason::NoQuorum, voters),
    }
}

/// Groups ballot indices by canonical form, preserving dispatch order within
/// each group.
fn group_by_form<T>(ballots: &[Ballot<T>]) -> BTreeMap<Vec<u8>, Vec<usize>> {
    let mut groups: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();
    for (idx, ballot) in ballots.iter().enumerate() {
        groups.entry(ballot.form.clone()).or_default().push(idx);
    }
    groups
}
