//! # Tally Core
//!
//! Verified reads of Solana chain state from untrusted RPC providers.
//!
//! A read is sent to a primary endpoint and a few backups at once, bounded by
//! a deadline, and reduced to one trusted value by a kind-specific vote:
//!
//! - **balances**: median accepted when a majority lies within a tolerance band
//! - **account snapshots**: exact match on a canonical form
//! - **transaction records**: exact match on the signature list, with a single
//!   correlated record accepted on its own
//!
//! This crate provides:
//!
//! - **[`verify`]**: [`VerifiedReader`](verify::VerifiedReader), the entry point callers use
//! - **[`consensus`]**: reducers and the [`ConsensusEngine`](consensus::ConsensusEngine)
//! - **[`dispatch`]**: concurrent fan-out and the deadline guard
//! - **[`upstream`]**: endpoint pool, the [`RpcClient`](upstream::RpcClient) seam and its
//!   Solana JSON-RPC implementation
//! - **[`config`]**: layered application configuration
//!
//! ## Request Flow
//!
//! ```text
//! verified_balance(account)
//!       │
//!       ▼
//! ┌──────────────┐
//! │ EndpointPool │  primary + up to N-1 backups
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌─────────────────┐
//! │ QueryDispatcher │  one task per endpoint, JoinSet
//! │  + deadline     │ ─── elapsed ──► Rejected(Timeout)
//! └──────┬──────────┘
//!        │ one EndpointOutcome per endpoint
//!        ▼
//! ┌─────────────────┐
//! │ ConsensusEngine │ ─── < majority ──► Rejected(NoQuorum)
//! └──────┬──────────┘ ─── no values ───► Rejected(AllEndpointsFailed)
//!        │
//!        ▼
//!   Accepted(value)
//! ```

pub mod config;
pub mod consensus;
pub mod dispatch;
pub mod types;
pub mod upstream;
pub mod utils;
pub mod verify;

pub use consensus::{ConsensusOutcome, ConsensusReport, RejectionReason};
pub use types::{AccountSnapshot, Query, QueryKind, QueryValue, TransactionRecord};
pub use verify::{VerificationError, VerifiedReader, VerifiedReaderBuilder};
