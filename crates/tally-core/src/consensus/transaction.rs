//! Signature-list vote for transaction records.
//!
//! A record only votes when it exists and carries the signature that was
//! asked for. Records are compared by their serialized signature list. A
//! single correlated record is accepted on its own because the signature
//! already pins it to one content-addressed transaction.

use super::{
    quorum::{frequency_vote, Ballot},
    types::{Agreement, ConsensusOutcome, EndpointFailure, RejectionReason, Tally, Vote},
};
use crate::{types::TransactionRecord, utils::canonical::to_canonical_bytes};
use tracing::{debug, warn};

/// Reduces transaction record votes for `signature` to one accepted record.
#[must_use]
pub fn reduce(votes: Vec<Vote<Option<TransactionRecord>>>, signature: &str) -> Tally<TransactionRecord> {
    let mut correlated = Vec::with_capacity(votes.len());
    let mut excluded = Vec::new();

    for Vote { endpoint, value } in votes {
        match value {
            Some(record) if record.has_signature(signature) => {
                correlated.push(Vote { endpoint, value: record });
            }
            Some(_) => {
                warn!(endpoint = %endpoint, signature, "transaction record does not carry the requested signature");
                excluded.push(EndpointFailure::new(endpoint, "record does not carry the requested signature"));
            }
            None => {
                debug!(endpoint = %endpoint, signature, "endpoint has no record of transaction");
                excluded.push(EndpointFailure::new(endpoint, "transaction not found"));
            }
        }
    }

    match correlated.len() {
        0 => Tally::rejected(RejectionReason::AllEndpointsFailed, Vec::new()).with_excluded(excluded),
        1 => {
            let vote = correlated.remove(0);
            debug!(endpoint = %vote.endpoint, signature, "accepting single correlated transaction record");
            Tally {
                outcome: ConsensusOutcome::Accepted(Agreement {
                    value: vote.value,
                    agreeing: vec![vote.endpoint.clone()],
                }),
                voters: vec![vote.endpoint],
                excluded,
            }
        }
        _ => {
            let mut ballots = Vec::with_capacity(correlated.len());
            for vote in correlated {
                match to_canonical_bytes(vote.value.signatures()) {
                    Ok(form) => ballots.push(Ballot { vote, form }),
                    Err(e) => excluded.push(EndpointFailure::new(
                        vote.endpoint,
                        format!("canonicalization failed: {e}"),
                    )),
                }
            }
            frequency_vote(ballots).with_excluded(excluded)
        }
    }
}
