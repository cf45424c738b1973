//! Transaction submission and read paths against a scripted chain.

use chain_tx_client::blockchain::types::{BlockRef, ChainError, PermissionLevel};
use chain_tx_client::transaction::{
    build_action, build_transaction, classify, extract_all_transaction_summaries,
    extract_confirmations, ErrorKind, Outcome,
};
use serde_json::json;

mod common;
use common::{client_for, MockChain, HEAD_BLOCK, LIB_BLOCK};

fn eosio() -> Vec<PermissionLevel> {
    vec![PermissionLevel::active("eosio")]
}

fn alice_actions() -> Vec<chain_tx_client::blockchain::types::Action> {
    vec![
        build_action("eosio", "newaccount", eosio(), json!({ "creator": "eosio", "name": "alice" })).unwrap(),
        build_action("eosio", "buyrambytes", eosio(), json!({ "payer": "eosio", "receiver": "alice", "bytes": 8192 })).unwrap(),
        build_action(
            "eosio",
            "delegatebw",
            eosio(),
            json!({
                "from": "eosio",
                "receiver": "alice",
                "stake_net_quantity": "1.0000 SYS",
                "stake_cpu_quantity": "1.0000 SYS",
                "transfer": false
            }),
        )
        .unwrap(),
    ]
}

#[tokio::test]
async fn test_accepted_transaction_has_single_newaccount_trace() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap();

    let result = client.submit_transaction(&request).await.unwrap();

    assert!(result.success);
    assert!(result.broadcast);
    let newaccount: Vec<_> = result
        .action_traces
        .iter()
        .filter(|t| t.act.name == "newaccount")
        .collect();
    assert_eq!(newaccount.len(), 1);
    assert_eq!(newaccount[0].act.data["name"], "alice");
    assert_eq!(result.signatures.len(), 1);
    assert!(chain.account_exists("alice"));

    let confirmations = extract_confirmations(&result, "newaccount");
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0].name_processed, "alice");
    assert_eq!(confirmations[0].trx_id, result.transaction_id);
    assert_eq!(confirmations[0].block_num, HEAD_BLOCK + 1);
}

#[tokio::test]
async fn test_rejected_action_voids_whole_transaction() {
    let chain = MockChain::new().reject_action("buyrambytes");
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap();

    let outcome = classify(client.submit_transaction(&request).await);

    assert!(!outcome.is_success());
    let record = outcome.error().unwrap();
    assert_eq!(record.kind, ErrorKind::ChainRejected);
    assert!(record.message.contains("buyrambytes refused"));
    assert_eq!(
        record.detail.as_ref().unwrap()["name"],
        "eosio_assert_message_exception"
    );
    assert!(!chain.account_exists("alice"));
}

#[tokio::test]
async fn test_submission_preserves_action_order() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let mut actions = alice_actions();
    actions.reverse();
    let request = build_transaction(actions).unwrap();

    client.submit_transaction(&request).await.unwrap();

    let pushed = chain.pushed();
    assert_eq!(pushed.len(), 1);
    let names: Vec<_> = pushed[0]["transaction"]["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["delegatebw", "buyrambytes", "newaccount"]);
}

#[tokio::test]
async fn test_submission_anchors_to_reference_block() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap().with_blocks_behind(10);

    client.submit_transaction(&request).await.unwrap();

    assert_eq!(
        chain.calls(),
        vec![
            "/v1/chain/get_info",
            "/v1/chain/get_block",
            "/v1/chain/push_transaction"
        ]
    );
    let trx = &chain.pushed()[0]["transaction"];
    assert_eq!(trx["ref_block_num"], HEAD_BLOCK - 10);
    assert_eq!(trx["ref_block_prefix"], 42);
    assert_eq!(trx["expiration"], "2024-05-01T12:00:30");
}

#[tokio::test]
async fn test_unbroadcast_request_never_pushes() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap().with_broadcast(false);

    let result = client.submit_transaction(&request).await.unwrap();

    assert!(!result.broadcast);
    assert_eq!(result.transaction_id.len(), 64);
    assert_eq!(result.signatures.len(), 1);
    assert!(result.action_traces.is_empty());
    assert_eq!(chain.calls_to("/v1/chain/push_transaction"), 0);
}

#[tokio::test]
async fn test_unsigned_request_pushes_without_signatures() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap().with_sign(false);

    let result = client.submit_transaction(&request).await.unwrap();

    assert!(result.signatures.is_empty());
    assert_eq!(chain.pushed()[0]["signatures"], json!([]));
}

#[tokio::test]
async fn test_network_failure_surfaces_without_retry() {
    let chain = MockChain::new();
    chain.fail_network(1);
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap();

    let err = client.submit_transaction(&request).await.unwrap_err();

    assert!(matches!(err, ChainError::Network(_)));
    assert_eq!(chain.call_count(), 1);
    assert!(chain.pushed().is_empty());
}

#[tokio::test]
async fn test_concurrent_submissions_are_independent() {
    let chain = MockChain::new();
    let client = client_for(&chain);

    let mut handles = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let action = build_action(
                "eosio.token",
                "transfer",
                vec![PermissionLevel::active("alice")],
                json!({ "from": "alice", "to": "bob", "quantity": "1.0000 SYS", "memo": i.to_string() }),
            )
            .unwrap();
            client
                .submit_transaction(&build_transaction(vec![action]).unwrap())
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().transaction_id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(chain.calls_to("/v1/chain/push_transaction"), 4);
}

#[tokio::test]
async fn test_run_action_authorizes_as_contract() {
    let chain = MockChain::new();
    let client = client_for(&chain);

    let result = client
        .run_action("notes", "post", json!({ "text": "hello" }))
        .await
        .unwrap();

    assert_eq!(result.action_traces.len(), 1);
    let auth = &chain.pushed()[0]["transaction"]["actions"][0]["authorization"][0];
    assert_eq!(auth["actor"], "notes");
    assert_eq!(auth["permission"], "active");
}

#[tokio::test]
async fn test_summaries_from_submitted_transaction() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let request = build_transaction(alice_actions()).unwrap();

    let result = client.submit_transaction(&request).await.unwrap();
    let summaries = extract_all_transaction_summaries(&result, Some("user-7"));

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].trx_id, result.transaction_id);
    assert_eq!(summaries[0].elapsed, 900);
    assert_eq!(summaries[0].net_usage, 256);
}

#[tokio::test]
async fn test_table_limit_zero_makes_no_call() {
    let chain = MockChain::new();
    let client = client_for(&chain);

    let err = client
        .read_table_rows("notes", "notes", "posts", 0, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ChainError::InvalidArgument(_)));
    assert_eq!(chain.call_count(), 0);
}

#[tokio::test]
async fn test_table_rows_limit_and_reverse() {
    let rows = (1..=5).map(|i| json!({ "id": i })).collect();
    let chain = MockChain::new().with_table("posts", rows);
    let client = client_for(&chain);

    let forward = client.read_table_rows("notes", "notes", "posts", 2, false).await.unwrap();
    assert_eq!(forward, vec![json!({ "id": 1 }), json!({ "id": 2 })]);

    let backward = client.read_table_rows("notes", "notes", "posts", 2, true).await.unwrap();
    assert_eq!(backward, vec![json!({ "id": 5 }), json!({ "id": 4 })]);

    let all = client.get_table("notes", "posts", 10).await.unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_reads() {
    let chain = MockChain::new();
    let client = client_for(&chain);

    let info = client.get_chain_info().await.unwrap();
    assert_eq!(info.head_block_num, HEAD_BLOCK);

    let last = client.get_last_block().await.unwrap();
    assert_eq!(last.block_num, LIB_BLOCK);

    let err = client.get_block(BlockRef::Number(HEAD_BLOCK + 50)).await.unwrap_err();
    assert!(matches!(err, ChainError::NotFound(_)));

    let err = client.get_account("nobody").await.unwrap_err();
    assert!(matches!(err, ChainError::NotFound(_)));

    let err = client.get_transaction_history("deadbeef").await.unwrap_err();
    assert!(matches!(err, ChainError::NotFound(_)));
}

#[tokio::test]
async fn test_history_after_submission() {
    let chain = MockChain::new();
    let client = client_for(&chain);
    let result = client
        .submit_transaction(&build_transaction(alice_actions()).unwrap())
        .await
        .unwrap();

    let history = client.get_transaction_history(&result.transaction_id).await.unwrap();
    assert_eq!(history.id, result.transaction_id);
    assert_eq!(history.traces.len(), 3);

    let account = client.get_account("alice").await.unwrap();
    assert_eq!(account.account_name, "alice");
}

#[test]
fn test_outcome_success_shape() {
    let outcome: Outcome<u8> = classify(Ok(3));
    assert_eq!(outcome.into_result().unwrap(), 3);
}
