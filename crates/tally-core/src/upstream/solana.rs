//! Solana JSON-RPC implementation of [`RpcClient`].

use super::{client::RpcClient, endpoint::Endpoint, errors::UpstreamError, http_client::HttpClient};
use crate::types::{
    AccountSnapshot, JsonRpcRequest, JsonRpcResponse, QueryKind, RpcContextual, TransactionRecord,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, trace};

/// Commitment level requested from the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Talks JSON-RPC 2.0 over HTTP to Solana endpoints.
///
/// One instance serves every endpoint; the endpoint URL is supplied per call.
pub struct SolanaRpcClient {
    http: Arc<HttpClient>,
    commitment: Commitment,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, commitment: Commitment, request_timeout: Duration) -> Self {
        Self { http, commitment, request_timeout, next_id: AtomicU64::new(1) }
    }

    #[must_use]
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// JSON-RPC params for a query of `kind` against `target`.
    #[must_use]
    pub fn params(&self, kind: QueryKind, target: &str) -> Value {
        let commitment = self.commitment.as_str();
        match kind {
            QueryKind::Balance => json!([target, {"commitment": commitment}]),
            QueryKind::AccountSnapshot => {
                json!([target, {"encoding": "base64", "commitment": commitment}])
            }
            QueryKind::TransactionRecord => json!([
                target,
                {"encoding": "json", "commitment": commitment, "maxSupportedTransactionVersion": 0}
            ]),
        }
    }

    /// Sends one request and decodes its `result`.
    ///
    /// A `null` result decodes to `None`.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        kind: QueryKind,
        target: &str,
    ) -> Result<Option<T>, UpstreamError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let method = kind.rpc_method();
        let request = JsonRpcRequest::new(method, self.params(kind, target), id);
        let body = serde_json::to_vec(&request)
            .map_err(|e| UpstreamError::InvalidRequest(format!("failed to encode {method}: {e}")))?;

        debug!(endpoint = %endpoint, method, id, "sending rpc request");

        let bytes = self.http.send_request(endpoint.url(), Bytes::from(body), self.request_timeout).await?;

        let response: JsonRpcResponse = serde_json::from_slice(&bytes).map_err(|e| {
            UpstreamError::InvalidResponse(format!("malformed JSON-RPC body from {method}: {e}"))
        })?;

        if let Some(error) = response.error {
            return Err(UpstreamError::RpcError(error.code, error.message));
        }

        trace!(endpoint = %endpoint, method, id, "rpc response received");

        match response.result {
            None | Some(Value::Null) => Ok(None),
            Some(result) => serde_json::from_value(result).map(Some).map_err(|e| {
                UpstreamError::InvalidResponse(format!("unexpected {method} result: {e}"))
            }),
        }
    }
}

#[async_trait]
impl RpcClient for SolanaRpcClient {
    async fn get_balance(&self, endpoint: &Endpoint, account: &str) -> Result<u64, UpstreamError> {
        self.call::<RpcContextual<u64>>(endpoint, QueryKind::Balance, account)
            .await?
            .map(|contextual| contextual.value)
            .ok_or_else(|| UpstreamError::InvalidResponse("getBalance returned a null result".to_string()))
    }

    async fn get_account_info(
        &self,
        endpoint: &Endpoint,
        account: &str,
    ) -> Result<Option<AccountSnapshot>, UpstreamError> {
        self.call::<RpcContextual<Option<AccountSnapshot>>>(endpoint, QueryKind::AccountSnapshot, account)
            .await?
            .map(|contextual| contextual.value)
            .ok_or_else(|| {
                UpstreamError::InvalidResponse("getAccountInfo returned a null result".to_string())
            })
    }

    async fn get_transaction(
        &self,
        endpoint: &Endpoint,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError> {
        self.call::<TransactionRecord>(endpoint, QueryKind::TransactionRecord, signature).await
    }
}
