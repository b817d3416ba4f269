//! Seam between the verification layer and whatever talks to RPC endpoints.

use super::{endpoint::Endpoint, errors::UpstreamError};
use crate::types::{AccountSnapshot, Query, QueryKind, QueryValue, TransactionRecord};
use async_trait::async_trait;

/// Reads chain state from one endpoint.
///
/// Implementations own their transport (connection pools, rate limits,
/// authentication). The dispatcher calls them concurrently from several
/// tasks, so they must be `Send + Sync`.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Lamport balance of `account`.
    async fn get_balance(&self, endpoint: &Endpoint, account: &str) -> Result<u64, UpstreamError>;

    /// Account payload, or `None` if the account does not exist.
    async fn get_account_info(
        &self,
        endpoint: &Endpoint,
        account: &str,
    ) -> Result<Option<AccountSnapshot>, UpstreamError>;

    /// Confirmed transaction, or `None` if the endpoint has no record of it.
    async fn get_transaction(
        &self,
        endpoint: &Endpoint,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError>;

    /// Runs `query` against `endpoint`, routing by query kind.
    async fn fetch(&self, endpoint: &Endpoint, query: &Query) -> Result<QueryValue, UpstreamError> {
        match query.kind {
            QueryKind::Balance => self.get_balance(endpoint, &query.target).await.map(QueryValue::Balance),
            QueryKind::AccountSnapshot => {
                self.get_account_info(endpoint, &query.target).await.map(QueryValue::Account)
            }
            QueryKind::TransactionRecord => {
                self.get_transaction(endpoint, &query.target).await.map(QueryValue::Transaction)
            }
        }
    }
}
