//! # Consensus
//!
//! Reduces the values several endpoints returned for one query to a single
//! trusted value, or to a rejection.
//!
//! ## Reducers
//!
//! | kind | comparison | minimum voters |
//! |------|------------|----------------|
//! | balance | within `balance_tolerance` of the median | 2 |
//! | account snapshot | canonical form, exact match | 2 |
//! | transaction record | serialized signature list, exact match | 1 |
//!
//! Every reducer accepts only when at least [`quorum::majority`] of the voting
//! values agree. Zero voting values reject with
//! [`RejectionReason::AllEndpointsFailed`]; anything short of majority rejects
//! with [`RejectionReason::NoQuorum`].
//!
//! # Module Organization
//!
//! - [`config`]: `ConsensusConfig`
//! - [`types`]: outcome, vote and report types
//! - [`quorum`]: majority threshold and the shared frequency vote
//! - [`balance`], [`account`], [`transaction`]: per-kind reducers
//! - [`engine`]: `ConsensusEngine`, the entry point used by the verified reader

pub mod account;
pub mod balance;
pub mod config;
pub mod engine;
pub mod quorum;
pub mod transaction;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::ConsensusConfig;
pub use engine::ConsensusEngine;
pub use types::{
    Agreement, ConsensusOutcome, ConsensusReport, EndpointFailure, RejectionReason, Tally, Vote,
};
