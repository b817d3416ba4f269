//! RPC endpoints and the clients that query them.
//!
//! - [`endpoint`] / [`pool`]: endpoint identity and the candidate pool a read
//!   fans out to
//! - [`client`]: the [`RpcClient`] seam the dispatcher calls through
//! - [`http_client`]: reqwest transport with a concurrency limit
//! - [`solana`]: [`SolanaRpcClient`], the JSON-RPC implementation of
//!   [`RpcClient`]
//! - [`errors`]: [`UpstreamError`], the failure of one endpoint call
//!
//! Nothing in this module retries. A failed call becomes a failed outcome for
//! that endpoint and the consensus layer decides what it means.

pub mod client;
pub mod endpoint;
pub mod errors;
pub mod http_client;
pub mod pool;
pub mod solana;

pub use client::RpcClient;
pub use endpoint::{normalize_url, Endpoint, EndpointRole};
pub use errors::{RpcErrorCategory, UpstreamError};
pub use http_client::{HttpClient, HttpClientConfig};
pub use pool::EndpointPool;
pub use solana::{Commitment, SolanaRpcClient};
