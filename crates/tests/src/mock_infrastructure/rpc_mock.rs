//! Solana JSON-RPC mock endpoint.
//!
//! Wraps mockito and matches requests on their `method` field.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// A single mock Solana endpoint.
pub struct SolanaRpcMock {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl SolanaRpcMock {
    /// Creates a mock endpoint backed by a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Answers `method` with a successful JSON-RPC `result`.
    pub async fn mock_result(&mut self, method: &str, result: Value) -> &mut Self {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string();
        self.mock_raw(method, 200, body).await
    }

    /// Answers `getBalance` with `lamports`.
    pub async fn mock_balance(&mut self, lamports: u64) -> &mut Self {
        self.mock_result("getBalance", json!({"context": {"slot": 250_000_000}, "value": lamports}))
            .await
    }

    /// Answers `getAccountInfo`; `None` reports a missing account.
    pub async fn mock_account(&mut self, account: Option<Value>) -> &mut Self {
        self.mock_result("getAccountInfo", json!({"context": {"slot": 250_000_000}, "value": account}))
            .await
    }

    /// Answers `getTransaction`; `None` reports an unknown signature.
    pub async fn mock_transaction(&mut self, record: Option<Value>) -> &mut Self {
        self.mock_result("getTransaction", record.unwrap_or(Value::Null)).await
    }

    /// Answers `method` with a JSON-RPC error object.
    pub async fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": code, "message": message}
        })
        .to_string();
        self.mock_raw(method, 200, body).await
    }

    /// Answers `method` with an HTTP error status.
    pub async fn mock_http_error(&mut self, method: &str, status: usize) -> &mut Self {
        self.mock_raw(method, status, "upstream unavailable".to_string()).await
    }

    /// Answers `method` with a body that is not valid JSON.
    pub async fn mock_malformed(&mut self, method: &str) -> &mut Self {
        self.mock_raw(method, 200, "{\"jsonrpc\": \"2.0\", \"result\": ".to_string()).await
    }

    async fn mock_raw(&mut self, method: &str, status: usize, body: String) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": method})))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Whether any registered mock has been hit.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.mocks.iter().any(Mock::matched)
    }

    /// Asserts every registered mock was hit at least once.
    pub fn assert_all_called(&self) {
        for mock in &self.mocks {
            assert!(mock.matched(), "mock on {} was never called", self.url());
        }
    }
}
