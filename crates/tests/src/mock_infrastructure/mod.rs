//! Mock infrastructure for exercising verified reads without real endpoints.
//!
//! ## Components
//!
//! - `SolanaRpcMock`: wraps a mockito server with Solana JSON-RPC responses
//! - `ScriptedClient`: an in-process [`RpcClient`](tally_core::upstream::RpcClient)
//!   whose per-endpoint behavior (value, delay, failure, panic) is fixed up front
//! - Fixture helpers for account and transaction payloads
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::SolanaRpcMock;
//!
//! let mut mock = SolanaRpcMock::new().await;
//! mock.mock_balance(1_000_000_000).await;
//!
//! // Use mock.url() as an endpoint URL
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::SolanaRpcMock;
pub use test_helpers::*;
