//! Verified reads through the Solana JSON-RPC client against mockito endpoints.
//!
//! Every test stands up one mockito server per endpoint, so requests travel the
//! full path: HTTP client, JSON-RPC decoding, fan-out and consensus.

use crate::mock_infrastructure::{
    create_test_account, create_test_transaction, spawn_silent_endpoint, SolanaRpcMock,
    KNOWN_SIGNATURE, TEST_ACCOUNT,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;
use tally_core::{
    config::AppConfig, consensus::ConsensusConfig, upstream::Commitment, ConsensusOutcome, QueryValue, RejectionReason,
    VerificationError, VerifiedReader, VerifiedReaderBuilder,
};

fn create_reader(primary: &str, backups: &[String]) -> VerifiedReader {
    VerifiedReaderBuilder::new()
        .primary(primary)
        .endpoints(backups.iter().cloned())
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

async fn balance_mocks(balances: &[u64]) -> Vec<SolanaRpcMock> {
    let mut mocks = Vec::with_capacity(balances.len());
    for &lamports in balances {
        let mut mock = SolanaRpcMock::new().await;
        mock.mock_balance(lamports).await;
        mocks.push(mock);
    }
    mocks
}

fn urls(mocks: &[SolanaRpcMock]) -> Vec<String> {
    mocks.iter().map(SolanaRpcMock::url).collect()
}

#[tokio::test]
async fn test_balances_within_tolerance_accept_the_median() {
    let mocks = balance_mocks(&[1_000_000_000, 1_000_000_500, 1_005_000_000]).await;
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls[1..]);

    let report = reader.balance_report(TEST_ACCOUNT).await;

    assert_eq!(report.outcome, ConsensusOutcome::Accepted(QueryValue::Balance(1_000_000_500)));
    assert_eq!(report.agreement_count, 2);
    assert_eq!(report.total_queried, 3);
    assert_eq!(report.successful, 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.disagreeing_endpoints.len(), 1);
    assert_eq!(&*report.disagreeing_endpoints[0], urls[2].as_str());

    for mock in &mocks {
        mock.assert_all_called();
    }
}

#[tokio::test]
async fn test_scattered_balances_have_no_quorum() {
    let mocks = balance_mocks(&[1_000_000_000, 2_000_000_000, 3_000_000_000]).await;
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls[1..]);

    let result = reader.verified_balance(TEST_ACCOUNT).await;

    match result {
        Err(VerificationError::Rejected { reason, report, .. }) => {
            assert_eq!(reason, RejectionReason::NoQuorum);
            assert_eq!(report.successful, 3);
            assert!(report.disagreeing_endpoints.is_empty());
        }
        other => panic!("expected a no-quorum rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoints_fail_the_read() {
    // Nothing listens on port 1.
    let unreachable: Vec<String> =
        ["http://127.0.0.1:1", "http://127.0.0.2:1", "http://127.0.0.3:1"].map(String::from).to_vec();
    let reader = create_reader(&unreachable[0], &unreachable[1..]);

    let report = reader.balance_report(TEST_ACCOUNT).await;

    assert_eq!(report.rejection(), Some(RejectionReason::AllEndpointsFailed));
    assert_eq!(report.successful, 0);
    assert_eq!(report.failures.len(), 3);
    for failure in &report.failures {
        assert!(!failure.reason.is_empty());
        assert!(!failure.reason.contains("127.0.0"), "reason leaks the URL: {}", failure.reason);
    }
}

#[tokio::test]
async fn test_http_errors_fail_the_read() {
    let mut mocks = Vec::new();
    for _ in 0..3 {
        let mut mock = SolanaRpcMock::new().await;
        mock.mock_http_error("getBalance", 503).await;
        mocks.push(mock);
    }
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls[1..]);

    let report = reader.balance_report(TEST_ACCOUNT).await;

    assert_eq!(report.rejection(), Some(RejectionReason::AllEndpointsFailed));
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures.iter().all(|f| f.reason.starts_with("HTTP error 503")));
}

#[tokio::test]
async fn test_single_transaction_record_is_accepted() {
    let mut mock = SolanaRpcMock::new().await;
    mock.mock_transaction(Some(create_test_transaction(KNOWN_SIGNATURE, 250_000_000))).await;
    let reader = create_reader(&mock.url(), &[]);

    let record = reader.verified_transaction_record(KNOWN_SIGNATURE).await.unwrap();

    assert_eq!(record.slot, 250_000_000);
    assert!(record.has_signature(KNOWN_SIGNATURE));
    assert_eq!(record.fee(), Some(5000));
    mock.assert_all_called();
}

#[tokio::test]
async fn test_transaction_unknown_everywhere_fails() {
    let mut mocks = Vec::new();
    for _ in 0..3 {
        let mut mock = SolanaRpcMock::new().await;
        mock.mock_transaction(None).await;
        mocks.push(mock);
    }
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls[1..]);

    let report = reader.transaction_record_report(KNOWN_SIGNATURE).await;

    assert_eq!(report.rejection(), Some(RejectionReason::AllEndpointsFailed));
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures.iter().all(|f| f.reason == "transaction not found"));
}

#[tokio::test]
async fn test_transaction_for_another_signature_cannot_vote() {
    let mut honest_a = SolanaRpcMock::new().await;
    honest_a.mock_transaction(Some(create_test_transaction(KNOWN_SIGNATURE, 100))).await;
    let mut honest_b = SolanaRpcMock::new().await;
    honest_b.mock_transaction(Some(create_test_transaction(KNOWN_SIGNATURE, 100))).await;
    let mut confused = SolanaRpcMock::new().await;
    confused.mock_transaction(Some(create_test_transaction("unrelatedSignature", 100))).await;

    let reader = create_reader(&confused.url(), &[honest_a.url(), honest_b.url()]);
    let report = reader.transaction_record_report(KNOWN_SIGNATURE).await;

    assert!(report.is_accepted());
    assert_eq!(report.agreement_count, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(&*report.failures[0].endpoint, confused.url().as_str());
}

#[tokio::test]
async fn test_account_majority_outvotes_divergent_payload() {
    let mut agreeing_a = SolanaRpcMock::new().await;
    agreeing_a.mock_account(Some(create_test_account(1_461_600))).await;
    let mut agreeing_b = SolanaRpcMock::new().await;
    agreeing_b.mock_account(Some(create_test_account(1_461_600))).await;
    let mut divergent = SolanaRpcMock::new().await;
    divergent.mock_account(Some(create_test_account(2_039_280))).await;

    let reader = create_reader(&divergent.url(), &[agreeing_a.url(), agreeing_b.url()]);
    let report = reader.account_snapshot_report(TEST_ACCOUNT).await;

    match report.value() {
        Some(QueryValue::Account(Some(snapshot))) => assert_eq!(snapshot.lamports, 1_461_600),
        other => panic!("expected an accepted account, got {other:?}"),
    }
    assert_eq!(report.agreement_count, 2);
    assert_eq!(report.disagreeing_endpoints.len(), 1);
    assert_eq!(&*report.disagreeing_endpoints[0], divergent.url().as_str());
}

#[tokio::test]
async fn test_missing_account_agreement_is_accepted() {
    let mut mocks = Vec::new();
    for _ in 0..3 {
        let mut mock = SolanaRpcMock::new().await;
        mock.mock_account(None).await;
        mocks.push(mock);
    }
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls[1..]);

    let snapshot = reader.verified_account_snapshot(TEST_ACCOUNT).await.unwrap();

    assert!(snapshot.is_none());
}

#[tokio::test]
async fn test_rpc_error_and_malformed_body_are_failures() {
    let mut lagging = SolanaRpcMock::new().await;
    lagging.mock_rpc_error("getBalance", -32005, "Node is behind by 42 slots").await;
    let mut garbled = SolanaRpcMock::new().await;
    garbled.mock_malformed("getBalance").await;
    let mut healthy = SolanaRpcMock::new().await;
    healthy.mock_balance(1_000).await;

    let reader = create_reader(&lagging.url(), &[garbled.url(), healthy.url()]);
    let report = reader.balance_report(TEST_ACCOUNT).await;

    // One surviving balance is not enough to vote.
    assert_eq!(report.rejection(), Some(RejectionReason::NoQuorum));
    assert_eq!(report.successful, 1);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].reason, "RPC error -32005: Node is behind by 42 slots");
    assert!(report.failures[1].reason.starts_with("Invalid response"));
}

#[tokio::test]
async fn test_two_of_three_balances_survive_one_failure() {
    let mut failing = SolanaRpcMock::new().await;
    failing.mock_http_error("getBalance", 429).await;
    let mocks = balance_mocks(&[5_000_000, 5_000_000]).await;
    let backups = urls(&mocks);

    let reader = create_reader(&failing.url(), &backups);
    let lamports = reader.verified_balance(TEST_ACCOUNT).await.unwrap();

    assert_eq!(lamports, 5_000_000);
}

#[tokio::test]
async fn test_request_carries_method_and_commitment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "getBalance",
            "params": [TEST_ACCOUNT, {"commitment": "finalized"}]
        })))
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 7}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let reader = VerifiedReaderBuilder::new()
        .primary(server.url())
        .commitment(Commitment::Finalized)
        .consensus_config(ConsensusConfig { parallel_requests: 1, ..Default::default() })
        .build()
        .unwrap();

    let report = reader.balance_report(TEST_ACCOUNT).await;

    mock.assert_async().await;
    assert_eq!(report.total_queried, 1);
    assert_eq!(report.successful, 1);
}

#[tokio::test]
async fn test_dispatch_set_is_bounded_by_parallel_requests() {
    let mocks = balance_mocks(&[9, 9, 9, 9, 9]).await;
    let urls = urls(&mocks);
    let reader = create_reader(&urls[0], &urls);

    let report = reader.balance_report(TEST_ACCOUNT).await;

    assert_eq!(report.total_queried, 3);
    assert_eq!(report.agreement_count, 3);
    assert!(mocks[..3].iter().all(SolanaRpcMock::was_called));
    assert!(!mocks[3..].iter().any(SolanaRpcMock::was_called));
}

#[tokio::test]
async fn test_hung_primary_fails_before_deadline_with_default_config() {
    let silent = spawn_silent_endpoint().await;
    let mut backup_a = SolanaRpcMock::new().await;
    backup_a.mock_account(Some(create_test_account(1_461_600))).await;
    let mut backup_b = SolanaRpcMock::new().await;
    backup_b.mock_account(Some(create_test_account(1_461_600))).await;

    let mut config = AppConfig::default();
    config.upstreams.primary_url = silent.clone();
    config.upstreams.endpoints = vec![backup_a.url(), backup_b.url()];
    config.validate().unwrap();

    let reader = VerifiedReader::from_config(&config).unwrap();
    let report = reader.account_snapshot_report(TEST_ACCOUNT).await;

    assert!(report.is_accepted(), "two agreeing backups rejected: {:?}", report.rejection());
    assert_eq!(report.agreement_count, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(&*report.failures[0].endpoint, silent.as_str());
    assert_eq!(report.failures[0].reason, "Request timeout");
    assert!(report.duration_ms < config.consensus.timeout_ms);
}
