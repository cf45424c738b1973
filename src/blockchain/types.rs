//! Chain wire types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// Re-export EndpointConfig from config module to avoid duplication
pub use crate::config::schema::EndpointConfig;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Bad or missing endpoint/credential. Fatal at initialization.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller violated a precondition; no network call was attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure: timeout, refused connection or malformed response.
    #[error("Network error: {0}")]
    Network(String),

    /// The chain validated and rejected the request.
    #[error("Chain rejected request [{code} {name}]: {message}")]
    ChainRejected {
        code: i64,
        name: String,
        message: String,
        detail: Value,
    },

    /// Query target does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// An (actor, permission) pair authorizing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

impl PermissionLevel {
    pub fn new(actor: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.into(),
        }
    }

    /// `actor@active`, the level every system action in this crate uses.
    pub fn active(actor: impl Into<String>) -> Self {
        Self::new(actor, "active")
    }
}

/// A single named operation against a contract.
///
/// The payload is opaque to this crate; ABI encoding happens on the node side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Target contract.
    pub account: String,
    /// Action name.
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    #[serde(default)]
    pub data: Value,
}

/// Head/irreversible state reported by `get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    #[serde(default)]
    pub server_version: String,
    pub chain_id: String,
    pub head_block_num: u64,
    pub last_irreversible_block_num: u64,
    #[serde(default)]
    pub head_block_id: String,
    #[serde(default)]
    pub head_block_time: String,
    #[serde(default)]
    pub head_block_producer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Block lookup key: nodes accept either a height or a block id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockRef {
    Number(u64),
    Id(String),
}

impl From<u64> for BlockRef {
    fn from(num: u64) -> Self {
        Self::Number(num)
    }
}

impl std::str::FromStr for BlockRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(num) => Self::Number(num),
            Err(_) => Self::Id(s.to_string()),
        })
    }
}

/// Block as returned by `get_block`. Only the TAPOS fields are typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub block_num: u64,
    /// Block timestamp, `YYYY-MM-DDTHH:MM:SS.sss` in UTC.
    pub timestamp: String,
    pub ref_block_prefix: u32,
    #[serde(default)]
    pub producer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account state as returned by `get_account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_name: String,
    #[serde(default)]
    pub ram_quota: i64,
    #[serde(default)]
    pub ram_usage: i64,
    #[serde(default)]
    pub permissions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters of a `get_table_rows` read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQuery {
    /// Contract that owns the table.
    pub code: String,
    /// Account that owns the data.
    pub scope: String,
    pub table: String,
    pub limit: u32,
    pub reverse: bool,
    pub show_payer: bool,
    /// Always true: rows come back as JSON rather than hex.
    pub json: bool,
}

impl TableQuery {
    pub fn new(code: &str, scope: &str, table: &str, limit: u32) -> Self {
        Self {
            code: code.to_string(),
            scope: scope.to_string(),
            table: table.to_string(),
            limit,
            reverse: false,
            show_payer: false,
            json: true,
        }
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// Rows page returned by `get_table_rows`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRows {
    pub rows: Vec<Value>,
    #[serde(default)]
    pub more: Value,
}

/// Reply of the history plugin's `get_key_accounts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyAccounts {
    pub account_names: Vec<String>,
}

/// Reply of the history plugin's `get_transaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub id: String,
    #[serde(default)]
    pub block_num: u64,
    #[serde(default)]
    pub block_time: String,
    #[serde(default)]
    pub traces: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One action's execution record within a processed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTrace {
    pub act: Action,
    pub trx_id: String,
    #[serde(default)]
    pub block_num: u64,
    #[serde(default)]
    pub block_time: String,
    #[serde(default)]
    pub elapsed: i64,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// True when the chain executed the transaction.
    pub success: bool,
    /// False for sign-only submissions that were never pushed.
    pub broadcast: bool,
    pub transaction_id: String,
    pub block_num: u64,
    pub block_time: String,
    /// Total execution time in microseconds.
    pub elapsed: i64,
    /// Network bandwidth billed, in bytes.
    pub net_usage: i64,
    pub cpu_usage_us: i64,
    pub action_traces: Vec<ActionTrace>,
    /// Signatures attached to the pushed transaction.
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl TransactionResult {
    /// Result for a transaction that was built and signed but not pushed.
    pub fn not_broadcast(transaction_id: String, signatures: Vec<String>) -> Self {
        Self {
            success: true,
            broadcast: false,
            transaction_id,
            block_num: 0,
            block_time: String::new(),
            elapsed: 0,
            net_usage: 0,
            cpu_usage_us: 0,
            action_traces: Vec::new(),
            signatures,
        }
    }
}
