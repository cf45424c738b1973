//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chain_tx_client::blockchain::types::{ChainError, ChainResult, EndpointConfig};
use chain_tx_client::blockchain::{ChainClient, RpcReply, RpcTransport, Wallet};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Well-known test key; never holds funds anywhere.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const CHAIN_ID: &str = "cf057bbfb72640471fd910bcb67639c22df9f92470936cddc1ade0e2f2e7dc4f";
pub const HEAD_BLOCK: u64 = 1000;
pub const LIB_BLOCK: u64 = 990;

#[derive(Default)]
struct ChainState {
    calls: Vec<String>,
    pushed: Vec<Value>,
    reject_actions: HashSet<String>,
    untraced_actions: HashSet<String>,
    accounts: HashMap<String, Vec<String>>,
    tables: HashMap<String, Vec<Value>>,
    transactions: HashMap<String, Value>,
}

/// In-memory node that applies pushed transactions atomically.
///
/// Clones share state, so a test can keep one handle for inspection
/// while the client owns another.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
    network_failures: Arc<AtomicU32>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any transaction containing an action called `action`.
    pub fn reject_action(self, action: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .reject_actions
            .insert(action.to_string());
        self
    }

    /// Apply `action` but leave it out of the returned traces.
    pub fn omit_trace(self, action: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .untraced_actions
            .insert(action.to_string());
        self
    }

    pub fn with_table(self, table: &str, rows: Vec<Value>) -> Self {
        self.state.lock().unwrap().tables.insert(table.to_string(), rows);
        self
    }

    /// Fail the next `n` calls at the transport level.
    pub fn fail_network(&self, n: u32) {
        self.network_failures.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == path).count()
    }

    pub fn pushed(&self) -> Vec<Value> {
        self.state.lock().unwrap().pushed.clone()
    }

    pub fn account_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(name)
    }

    fn handle(&self, path: &str, body: &Value) -> RpcReply {
        let mut state = self.state.lock().unwrap();
        state.calls.push(path.to_string());

        match path {
            "/v1/chain/get_info" => RpcReply::ok(json!({
                "server_version": "mock",
                "chain_id": CHAIN_ID,
                "head_block_num": HEAD_BLOCK,
                "last_irreversible_block_num": LIB_BLOCK,
                "head_block_id": "000003e8",
                "head_block_time": "2024-05-01T12:00:00.000",
                "head_block_producer": "eosio"
            })),
            "/v1/chain/get_block" => match body["block_num_or_id"].as_u64() {
                Some(num) if num <= HEAD_BLOCK => RpcReply::ok(json!({
                    "id": format!("{:08x}", num),
                    "block_num": num,
                    "timestamp": "2024-05-01T12:00:00.000",
                    "ref_block_prefix": 42,
                    "producer": "eosio"
                })),
                _ => chain_error(3100002, "unknown_block_exception", "Could not find block"),
            },
            "/v1/chain/get_account" => {
                let name = body["account_name"].as_str().unwrap_or_default();
                match state.accounts.get(name) {
                    Some(keys) => RpcReply::ok(json!({
                        "account_name": name,
                        "ram_quota": 8192,
                        "permissions": [{ "perm_name": "active", "required_auth": { "keys": keys } }]
                    })),
                    None => chain_error(0, "exception", &format!("unknown key (eosio::chain::name): {}", name)),
                }
            }
            "/v1/chain/get_table_rows" => {
                let table = body["table"].as_str().unwrap_or_default();
                let limit = body["limit"].as_u64().unwrap_or(10) as usize;
                let mut rows = state.tables.get(table).cloned().unwrap_or_default();
                if body["reverse"].as_bool().unwrap_or(false) {
                    rows.reverse();
                }
                let more = rows.len() > limit;
                rows.truncate(limit);
                RpcReply::ok(json!({ "rows": rows, "more": more }))
            }
            "/v1/chain/push_transaction" => {
                state.pushed.push(body.clone());
                let actions = body["transaction"]["actions"].as_array().cloned().unwrap_or_default();

                if let Some(rejected) = actions.iter().find(|a| {
                    a["name"]
                        .as_str()
                        .is_some_and(|n| state.reject_actions.contains(n))
                }) {
                    let message = format!(
                        "assertion failure with message: {} refused",
                        rejected["name"].as_str().unwrap_or_default()
                    );
                    return chain_error(3050003, "eosio_assert_message_exception", &message);
                }

                let trx_id = format!("{:064x}", state.pushed.len());
                let traces: Vec<Value> = actions
                    .iter()
                    .enumerate()
                    .filter(|(_, act)| {
                        !act["name"]
                            .as_str()
                            .is_some_and(|n| state.untraced_actions.contains(n))
                    })
                    .map(|(i, act)| {
                        json!({
                            "action_ordinal": i + 1,
                            "act": act,
                            "trx_id": trx_id,
                            "block_num": HEAD_BLOCK + 1,
                            "block_time": "2024-05-01T12:00:00.500",
                            "elapsed": 100
                        })
                    })
                    .collect();

                // All actions applied together.
                for act in &actions {
                    if act["name"] == "newaccount" {
                        let name = act["data"]["name"].as_str().unwrap_or_default().to_string();
                        let key = act["data"]["owner"]["keys"][0]["key"]
                            .as_str()
                            .unwrap_or_default()
                            .to_string();
                        state.accounts.insert(name, vec![key]);
                    }
                }

                let processed = json!({
                    "id": trx_id,
                    "block_num": HEAD_BLOCK + 1,
                    "block_time": "2024-05-01T12:00:00.500",
                    "receipt": { "status": "executed", "cpu_usage_us": 400, "net_usage_words": 32 },
                    "elapsed": 300 * actions.len(),
                    "net_usage": 256,
                    "action_traces": traces,
                    "except": null
                });
                state.transactions.insert(
                    trx_id.clone(),
                    json!({ "id": trx_id, "block_num": HEAD_BLOCK + 1, "block_time": "2024-05-01T12:00:00.500", "traces": traces }),
                );
                RpcReply::ok(json!({ "transaction_id": trx_id, "processed": processed }))
            }
            "/v1/history/get_transaction" => {
                let id = body["id"].as_str().unwrap_or_default();
                match state.transactions.get(id) {
                    Some(trx) => RpcReply::ok(trx.clone()),
                    None => chain_error(3040011, "unknown_transaction_exception", "Transaction not found"),
                }
            }
            "/v1/history/get_key_accounts" => {
                let key = body["public_key"].as_str().unwrap_or_default();
                let mut names: Vec<_> = state
                    .accounts
                    .iter()
                    .filter(|(_, keys)| keys.iter().any(|k| k == key))
                    .map(|(name, _)| name.clone())
                    .collect();
                names.sort();
                RpcReply::ok(json!({ "account_names": names }))
            }
            _ => RpcReply {
                status: 404,
                body: json!({ "code": 404, "message": "Not Found" }),
            },
        }
    }
}

fn chain_error(code: i64, name: &str, message: &str) -> RpcReply {
    RpcReply {
        status: 500,
        body: json!({
            "code": 500,
            "message": "Internal Service Error",
            "error": {
                "code": code,
                "name": name,
                "what": name,
                "details": [{ "message": message, "file": "mock.cpp", "line_number": 1, "method": "handle" }]
            }
        }),
    }
}

impl RpcTransport for MockChain {
    async fn post(&self, path: &str, body: Value) -> ChainResult<RpcReply> {
        let pending = self.network_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.network_failures.store(pending - 1, Ordering::SeqCst);
            self.state.lock().unwrap().calls.push(path.to_string());
            return Err(ChainError::Network(format!("{} failed: connection refused", path)));
        }
        Ok(self.handle(path, &body))
    }
}

/// Client over `chain`, signing with the test key.
pub fn client_for(chain: &MockChain) -> ChainClient<MockChain, Wallet> {
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    ChainClient::with_parts(chain.clone(), wallet, EndpointConfig::default())
}

/// Start a programmable HTTP node stub on an ephemeral port.
///
/// `f` maps the request path to a status and raw body.
pub async fn start_node_stub<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 16 * 1024];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
