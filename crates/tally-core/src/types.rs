//! Core type definitions for verified queries, account/transaction payloads and
//! the JSON-RPC envelopes exchanged with Solana endpoints.
//!
//! # Type Categories
//!
//! ## Query Types
//! - [`QueryKind`], [`Query`]: what a verified read asks for
//! - [`QueryValue`]: the successful value one endpoint returned for a query
//! - [`EndpointOutcome`]: one endpoint's result for one query, success or failure
//!
//! ## Payload Types
//! - [`AccountSnapshot`], [`TransactionRecord`]: typed views over the fields the
//!   consensus reducers inspect, with every other field kept in an opaque `extra` map
//!
//! ## JSON-RPC Protocol Types
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{borrow::Cow, fmt, sync::Arc};

/// JSON-RPC protocol version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for the JSON-RPC version.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// The three kinds of verified reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Lamport balance of an account.
    Balance,
    /// Full account payload (owner, data, lamports, ...).
    AccountSnapshot,
    /// Confirmed transaction looked up by signature.
    TransactionRecord,
}

impl QueryKind {
    /// Returns a static string representation for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::AccountSnapshot => "account_snapshot",
            Self::TransactionRecord => "transaction_record",
        }
    }

    /// Returns the Solana JSON-RPC method serving this kind.
    #[must_use]
    pub fn rpc_method(self) -> &'static str {
        match self {
            Self::Balance => "getBalance",
            Self::AccountSnapshot => "getAccountInfo",
            Self::TransactionRecord => "getTransaction",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one verified read. Built per call and discarded afterwards.
///
/// `target` is an account address for [`QueryKind::Balance`] and
/// [`QueryKind::AccountSnapshot`], and a transaction signature for
/// [`QueryKind::TransactionRecord`]. Identifiers are expected to be validated
/// by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: QueryKind,
    pub target: Arc<str>,
    /// Result limit for kinds that return lists. Reserved: none of the
    /// current kinds does, so clients and reducers ignore it.
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new(kind: QueryKind, target: &str) -> Self {
        Self { kind, target: Arc::from(target), limit: None }
    }

    #[must_use]
    pub fn balance(account: &str) -> Self {
        Self::new(QueryKind::Balance, account)
    }

    #[must_use]
    pub fn account_snapshot(account: &str) -> Self {
        Self::new(QueryKind::AccountSnapshot, account)
    }

    #[must_use]
    pub fn transaction_record(signature: &str) -> Self {
        Self::new(QueryKind::TransactionRecord, signature)
    }

    /// Attaches a result limit. Reserved for list-returning kinds; it does
    /// not change how any current kind is requested or reduced.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Encoded account data as returned by `getAccountInfo`: `[payload, encoding]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct AccountData {
    pub encoded: String,
    pub encoding: String,
}

impl From<(String, String)> for AccountData {
    fn from((encoded, encoding): (String, String)) -> Self {
        Self { encoded, encoding }
    }
}

impl From<AccountData> for (String, String) {
    fn from(data: AccountData) -> Self {
        (data.encoded, data.encoding)
    }
}

/// Account payload returned by `getAccountInfo`.
///
/// Only the fields the consensus layer reasons about are typed; everything
/// else the endpoint returned is preserved in `extra` and takes part in
/// exact-match voting through canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub lamports: u64,
    pub owner: String,
    pub executable: bool,
    pub rent_epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<u64>,
    pub data: AccountData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountSnapshot {
    /// Size of the account data in bytes.
    ///
    /// Uses the `space` field reported by the endpoint, falling back to the
    /// decoded length implied by a base64 payload. `None` when `space` is
    /// absent and the payload is in any other encoding.
    #[must_use]
    pub fn data_len(&self) -> Option<u64> {
        if let Some(space) = self.space {
            return Some(space);
        }
        if self.data.encoding != "base64" {
            return None;
        }
        let encoded = self.data.encoded.trim_end_matches('=');
        Some((encoded.len() as u64) * 3 / 4)
    }
}

/// `transaction` section of a `getTransaction` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub signatures: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `meta` section of a `getTransaction` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Confirmed transaction returned by `getTransaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionBody,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionRecord {
    /// Signatures embedded in the transaction, fee payer first.
    #[must_use]
    pub fn signatures(&self) -> &[String] {
        &self.transaction.signatures
    }

    /// Returns `true` if the record carries `signature`.
    #[must_use]
    pub fn has_signature(&self, signature: &str) -> bool {
        self.transaction.signatures.iter().any(|s| s == signature)
    }

    #[must_use]
    pub fn fee(&self) -> Option<u64> {
        self.meta.as_ref().and_then(|m| m.fee)
    }

    /// Returns `true` if the transaction executed without error.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.meta.as_ref().is_none_or(|m| m.err.as_ref().is_none_or(Value::is_null))
    }
}

/// A successful value for one query, tagged by kind.
///
/// `Account(None)` means the endpoint reported that the account does not
/// exist. `Transaction(None)` means the endpoint has no record of the
/// signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryValue {
    Balance(u64),
    Account(Option<AccountSnapshot>),
    Transaction(Option<TransactionRecord>),
}

impl QueryValue {
    #[must_use]
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Balance(_) => QueryKind::Balance,
            Self::Account(_) => QueryKind::AccountSnapshot,
            Self::Transaction(_) => QueryKind::TransactionRecord,
        }
    }
}

/// The result of one endpoint attempting one query.
///
/// `position` is the endpoint's index in the dispatch set (the primary is
/// `0`). Outcomes are created once by the dispatcher and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointOutcome {
    pub position: usize,
    pub endpoint: Arc<str>,
    pub kind: QueryKind,
    pub result: Result<QueryValue, String>,
}

impl EndpointOutcome {
    #[must_use]
    pub fn success(position: usize, endpoint: Arc<str>, value: QueryValue) -> Self {
        Self { position, endpoint, kind: value.kind(), result: Ok(value) }
    }

    #[must_use]
    pub fn failure(
        position: usize,
        endpoint: Arc<str>,
        kind: QueryKind,
        reason: impl Into<String>,
    ) -> Self {
        Self { position, endpoint, kind, result: Err(reason.into()) }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub id: u64,
    pub method: &'static str,
    pub params: Value,
}

impl JsonRpcRequest {
    #[must_use]
    pub fn new(method: &'static str, params: Value, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, id, method, params }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response. A `null` result deserializes to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Value,
}

/// `{ context, value }` wrapper used by Solana's contextual RPC methods.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcContextual<T> {
    #[serde(default)]
    pub context: Option<Value>,
    pub value: T,
}
