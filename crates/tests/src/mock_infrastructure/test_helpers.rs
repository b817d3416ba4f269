//! Test helper functions and a scripted in-process client.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tally_core::{
    upstream::{Endpoint, RpcClient, UpstreamError},
    AccountSnapshot, TransactionRecord,
};

/// Starts a TCP endpoint that accepts connections and never answers.
///
/// Accepted sockets stay open for the life of the runtime, so a client only
/// gets out through its own request timeout.
pub async fn spawn_silent_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind silent endpoint");
    let addr = listener.local_addr().expect("silent endpoint address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

/// Signature used by the transaction fixtures.
pub const KNOWN_SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

/// An account address used throughout the tests.
pub const TEST_ACCOUNT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

/// `getAccountInfo` value for an SPL token mint.
#[must_use]
pub fn create_test_account(lamports: u64) -> Value {
    json!({
        "lamports": lamports,
        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
        "executable": false,
        "rentEpoch": 18_446_744_073_709_551_615_u64,
        "space": 82,
        "data": ["AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==", "base64"]
    })
}

/// `getTransaction` value carrying `signature`.
#[must_use]
pub fn create_test_transaction(signature: &str, slot: u64) -> Value {
    json!({
        "slot": slot,
        "blockTime": 1_700_000_000,
        "meta": {
            "err": null,
            "fee": 5000,
            "preBalances": [1_000_000_000, 0],
            "postBalances": [999_995_000, 0],
            "status": {"Ok": null}
        },
        "transaction": {
            "signatures": [signature],
            "message": {
                "accountKeys": [TEST_ACCOUNT, "11111111111111111111111111111111"],
                "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                "instructions": []
            }
        },
        "version": 0
    })
}

/// Typed form of [`create_test_account`].
#[must_use]
pub fn account_snapshot(lamports: u64) -> AccountSnapshot {
    serde_json::from_value(create_test_account(lamports)).expect("account fixture must decode")
}

/// Typed form of [`create_test_transaction`].
#[must_use]
pub fn transaction_record(signature: &str, slot: u64) -> TransactionRecord {
    serde_json::from_value(create_test_transaction(signature, slot))
        .expect("transaction fixture must decode")
}

/// What one scripted endpoint does when asked.
#[derive(Clone)]
pub enum Script {
    Balance(u64),
    Account(Option<AccountSnapshot>),
    Transaction(Option<TransactionRecord>),
    /// Fails with a connection error.
    Fail(&'static str),
    /// Fails the way a per-request timeout does.
    TimedOut,
    /// Never answers.
    Hang,
    Panic,
}

/// [`RpcClient`] whose answers are fixed per endpoint URL.
///
/// Each answer is returned after its configured delay, which lets paused-time
/// tests order completions exactly.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: HashMap<String, (Duration, Script)>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl ScriptedClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `url` to answer with `script` immediately.
    #[must_use]
    pub fn with(self, url: &str, script: Script) -> Self {
        self.with_delay(url, Duration::ZERO, script)
    }

    /// Scripts `url` to answer with `script` after `delay`.
    #[must_use]
    pub fn with_delay(mut self, url: &str, delay: Duration, script: Script) -> Self {
        self.scripts.insert(url.to_string(), (delay, script));
        self
    }

    /// Requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that ran to completion, including failures.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn answer(&self, endpoint: &Endpoint) -> Result<Script, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some((delay, script)) = self.scripts.get(endpoint.url()).cloned() else {
            return Err(UpstreamError::ConnectionFailed(format!("no script for {endpoint}")));
        };

        if matches!(script, Script::Hang) {
            std::future::pending::<()>().await;
        }

        tokio::time::sleep(delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match script {
            Script::Fail(reason) => Err(UpstreamError::ConnectionFailed(reason.to_string())),
            Script::TimedOut => Err(UpstreamError::Timeout),
            Script::Panic => panic!("scripted panic for {endpoint}"),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl RpcClient for ScriptedClient {
    async fn get_balance(&self, endpoint: &Endpoint, _account: &str) -> Result<u64, UpstreamError> {
        match self.answer(endpoint).await? {
            Script::Balance(lamports) => Ok(lamports),
            _ => Err(UpstreamError::InvalidResponse("scripted value is not a balance".to_string())),
        }
    }

    async fn get_account_info(
        &self,
        endpoint: &Endpoint,
        _account: &str,
    ) -> Result<Option<AccountSnapshot>, UpstreamError> {
        match self.answer(endpoint).await? {
            Script::Account(snapshot) => Ok(snapshot),
            _ => Err(UpstreamError::InvalidResponse("scripted value is not an account".to_string())),
        }
    }

    async fn get_transaction(
        &self,
        endpoint: &Endpoint,
        _signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError> {
        match self.answer(endpoint).await? {
            Script::Transaction(record) => Ok(record),
            _ => Err(UpstreamError::InvalidResponse(
                "scripted value is not a transaction".to_string(),
            )),
        }
    }
}

/// Wraps `client` for [`VerifiedReaderBuilder::client`](tally_core::VerifiedReaderBuilder::client).
#[must_use]
pub fn shared(client: ScriptedClient) -> (Arc<ScriptedClient>, Arc<dyn RpcClient>) {
    let client = Arc::new(client);
    let dyn_client: Arc<dyn RpcClient> = Arc::clone(&client) as Arc<dyn RpcClient>;
    (client, dyn_client)
}
