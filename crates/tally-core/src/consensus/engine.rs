//! Consensus engine: turns one query's endpoint outcomes into a report.
//!
//! The engine selects a reducer by query kind. The reducers themselves live in
//! [`super::balance`], [`super::account`] and [`super::transaction`].

use super::{
    account, balance,
    config::ConsensusConfig,
    transaction,
    types::{ConsensusOutcome, ConsensusReport, EndpointFailure, RejectionReason, Tally, Vote},
};
use crate::types::{
    AccountSnapshot, EndpointOutcome, Query, QueryKind, QueryValue, TransactionRecord,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reduces endpoint outcomes according to the query kind.
///
/// Holds no state between calls; one engine can serve any number of
/// concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct ConsensusEngine {
    config: ConsensusConfig,
}

/// Successful values sorted into the vote list for the query kind, plus
/// everything that cannot vote.
struct Sorted {
    balances: Vec<Vote<u64>>,
    accounts: Vec<Vote<Option<AccountSnapshot>>>,
    transactions: Vec<Vote<Option<TransactionRecord>>>,
    failures: Vec<EndpointFailure>,
    successful: usize,
}

impl ConsensusEngine {
    #[must_use]
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Reduces the outcomes of one dispatched query.
    ///
    /// Outcomes are ordered by dispatch position first, so the report does not
    /// depend on the order in which legs finished.
    #[must_use]
    pub fn reduce(&self, query: &Query, mut outcomes: Vec<EndpointOutcome>) -> ConsensusReport {
        outcomes.sort_by_key(|o| o.position);
        let total_queried = outcomes.len();

        let sorted = Self::sort_outcomes(query.kind, outcomes);
        let Sorted { balances, accounts, transactions, mut failures, successful } = sorted;

        let tally: Tally<QueryValue> = match query.kind {
            QueryKind::Balance => {
                balance::reduce(balances, self.config.balance_tolerance).map(QueryValue::Balance)
            }
            QueryKind::AccountSnapshot => account::reduce(accounts).map(QueryValue::Account),
            QueryKind::TransactionRecord => transaction::reduce(transactions, &query.target)
                .map(|record| QueryValue::Transaction(Some(record))),
        };

        let Tally { outcome, voters, excluded } = tally;
        failures.extend(excluded);

        let (outcome, agreement_count, disagreeing_endpoints) = match outcome {
            ConsensusOutcome::Accepted(agreement) => {
                let disagreeing: Vec<Arc<str>> =
                    voters.into_iter().filter(|v| !agreement.agreeing.contains(v)).collect();
                debug!(
                    kind = %query.kind,
                    target = %query.target,
                    agreeing = agreement.agreeing.len(),
                    disagreeing = disagreeing.len(),
                    failed = failures.len(),
                    "consensus accepted"
                );
                for endpoint in &disagreeing {
                    warn!(endpoint = %endpoint, kind = %query.kind, "endpoint disagreed with consensus");
                }
                (ConsensusOutcome::Accepted(agreement.value), agreement.agreeing.len(), disagreeing)
            }
            ConsensusOutcome::Rejected(reason) => {
                warn!(
                    kind = %query.kind,
                    target = %query.target,
                    reason = reason.as_str(),
                    total_queried,
                    successful,
                    failed = failures.len(),
                    "consensus rejected"
                );
                (ConsensusOutcome::Rejected(reason), 0, Vec::new())
            }
        };

        ConsensusReport {
            kind: query.kind,
            target: Arc::clone(&query.target),
            outcome,
            agreement_count,
            total_queried,
            successful,
            failures,
            disagreeing_endpoints,
            duration_ms: 0,
        }
    }

    /// Report for a read whose deadline elapsed before every leg settled.
    ///
    /// Any values that had already arrived are discarded.
    #[must_use]
    pub fn timed_out(&self, query: &Query, dispatched: usize) -> ConsensusReport {
        warn!(
            kind = %query.kind,
            target = %query.target,
            dispatched,
            timeout_ms = self.config.timeout_ms,
            "consensus rejected: deadline elapsed"
        );

        ConsensusReport {
            kind: query.kind,
            target: Arc::clone(&query.target),
            outcome: ConsensusOutcome::Rejected(RejectionReason::Timeout),
            agreement_count: 0,
            total_queried: dispatched,
            successful: 0,
            failures: Vec::new(),
            disagreeing_endpoints: Vec::new(),
            duration_ms: 0,
        }
    }

    fn sort_outcomes(kind: QueryKind, outcomes: Vec<EndpointOutcome>) -> Sorted {
        let mut sorted = Sorted {
            balances: Vec::new(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            failures: Vec::new(),
            successful: 0,
        };

        for outcome in outcomes {
            let endpoint = outcome.endpoint;
            let value = match outcome.result {
                Ok(value) => value,
                Err(reason) => {
                    sorted.failures.push(EndpointFailure::new(endpoint, reason));
                    continue;
                }
            };

            sorted.successful += 1;
            match (kind, value) {
                (QueryKind::Balance, QueryValue::Balance(lamports)) => {
                    sorted.balances.push(Vote { endpoint, value: lamports });
                }
                (QueryKind::AccountSnapshot, QueryValue::Account(snapshot)) => {
                    sorted.accounts.push(Vote { endpoint, value: snapshot });
                }
                (QueryKind::TransactionRecord, QueryValue::Transaction(record)) => {
                    sorted.transactions.push(Vote { endpoint, value: record });
                }
                (expected, other) => {
                    sorted.failures.push(EndpointFailure::new(
                        endpoint,
                        format!("expected {expected} value, got {}", other.kind()),
                    ));
                }
            }
        }

        sorted
    }
}
