//! Result and error classification.
//!
//! # Responsibilities
//! - Turn raw node replies into typed results or classified `ChainError`s
//! - Flatten any `ChainError` into a reportable `ErrorRecord`
//! - Extract confirmation records and per-transaction summaries from a
//!   processed transaction

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::transport::RpcReply;
use crate::blockchain::types::{ActionTrace, ChainError, ChainResult, TransactionResult};

/// Chain error names that mean "no such thing" rather than "refused".
const NOT_FOUND_ERROR_NAMES: &[&str] = &[
    "unknown_block_exception",
    "unknown_transaction_exception",
    "unknown_key",
    "key_not_found_exception",
];

/// Receipt status of a transaction the chain applied.
const EXECUTED: &str = "executed";

/// Flat discriminant of `ChainError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "ConfigError")]
    Config,
    #[serde(rename = "InvalidArgument")]
    InvalidArgument,
    /// Transport-level failure.
    #[serde(rename = "NetworkError")]
    Network,
    #[serde(rename = "ChainRejected")]
    ChainRejected,
    #[serde(rename = "NotFoundError")]
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::Network => "NetworkError",
            ErrorKind::ChainRejected => "ChainRejected",
            ErrorKind::NotFound => "NotFoundError",
        }
    }
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::Config(_) => ErrorKind::Config,
            ChainError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ChainError::Network(_) => ErrorKind::Network,
            ChainError::ChainRejected { .. } => ErrorKind::ChainRejected,
            ChainError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Terminal, reportable form of a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    /// Chain-provided detail, present only for `ChainRejected`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl From<&ChainError> for ErrorRecord {
    fn from(err: &ChainError) -> Self {
        let detail = match err {
            ChainError::ChainRejected { detail, .. } => Some(detail.clone()),
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            detail,
        }
    }
}

impl From<ChainError> for ErrorRecord {
    fn from(err: ChainError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ErrorRecord {}

/// Either a fully populated result or a classified failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorRecord),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(record) => Some(record),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorRecord> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(record) => Err(record),
        }
    }
}

/// Classify the outcome of any chain operation.
pub fn classify<T>(result: ChainResult<T>) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Success(value),
        Err(err) => Outcome::Failure(ErrorRecord::from(&err)),
    }
}

/// Accept a 2xx reply body, or classify the failure it describes.
pub fn classify_reply(path: &str, reply: RpcReply) -> ChainResult<Value> {
    if reply.is_success() {
        return Ok(reply.body);
    }

    let error = reply.body.get("error").cloned().unwrap_or(Value::Null);
    let name = error
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if reply.status == 404 || is_not_found(&name, &error) {
        return Err(ChainError::NotFound(format!(
            "{}: {}",
            path,
            first_detail(&error).unwrap_or_else(|| describe(&reply.body, reply.status))
        )));
    }

    if error.is_object() {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = first_detail(&error)
            .or_else(|| error.get("what").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| describe(&reply.body, reply.status));
        return Err(ChainError::ChainRejected {
            code,
            name,
            message,
            detail: error,
        });
    }

    Err(ChainError::Network(format!(
        "{} returned status {}: {}",
        path,
        reply.status,
        describe(&reply.body, reply.status)
    )))
}

fn is_not_found(name: &str, error: &Value) -> bool {
    if NOT_FOUND_ERROR_NAMES.contains(&name) {
        return true;
    }
    // Account lookups surface as a generic exception with an "unknown key" detail.
    first_detail(error).is_some_and(|msg| msg.starts_with("unknown key"))
}

fn first_detail(error: &Value) -> Option<String> {
    error
        .get("details")?
        .as_array()?
        .first()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn describe(body: &Value, status: u16) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[derive(Debug, Default, Deserialize)]
struct PushReply {
    transaction_id: String,
    processed: Processed,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Processed {
    block_num: u64,
    block_time: String,
    elapsed: i64,
    net_usage: i64,
    receipt: Option<Receipt>,
    action_traces: Vec<ActionTrace>,
    except: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Receipt {
    status: String,
    cpu_usage_us: i64,
}

/// Parse a `push_transaction` reply into a `TransactionResult`.
///
/// A receipt status other than `executed`, or a populated `except`, is a
/// rejection even when the node answered 2xx.
pub fn parse_push_reply(body: Value, signatures: Vec<String>) -> ChainResult<TransactionResult> {
    let reply: PushReply = serde_json::from_value(body)
        .map_err(|e| ChainError::Network(format!("Malformed push_transaction response: {}", e)))?;
    let processed = reply.processed;

    if let Some(except) = processed.except.filter(|e| !e.is_null()) {
        return Err(ChainError::ChainRejected {
            code: except.get("code").and_then(Value::as_i64).unwrap_or_default(),
            name: except
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: first_detail(&except).unwrap_or_else(|| "transaction failed".to_string()),
            detail: except,
        });
    }

    let receipt = processed.receipt.unwrap_or_default();
    if receipt.status != EXECUTED {
        return Err(ChainError::ChainRejected {
            code: 0,
            name: "receipt_status".to_string(),
            message: format!(
                "transaction {} finished with status '{}'",
                reply.transaction_id, receipt.status
            ),
            detail: Value::String(receipt.status),
        });
    }

    Ok(TransactionResult {
        success: true,
        broadcast: true,
        transaction_id: reply.transaction_id,
        block_num: processed.block_num,
        block_time: processed.block_time,
        elapsed: processed.elapsed,
        net_usage: processed.net_usage,
        cpu_usage_us: receipt.cpu_usage_us,
        action_traces: processed.action_traces,
        signatures,
    })
}

/// Confirmation of one matched action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    /// `data.name` of the matched action (the account name for `newaccount`).
    pub name_processed: String,
    pub trx_id: String,
    pub block_num: u64,
    pub block_time: String,
}

/// Confirmation records for every trace whose action is `action_name`,
/// in trace order.
pub fn extract_confirmations(result: &TransactionResult, action_name: &str) -> Vec<ConfirmationRecord> {
    result
        .action_traces
        .iter()
        .filter(|trace| trace.act.name == action_name)
        .map(|trace| ConfirmationRecord {
            name_processed: trace
                .act
                .data
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            trx_id: trace.trx_id.clone(),
            block_num: trace.block_num,
            block_time: trace.block_time.clone(),
        })
        .collect()
}

/// Per-transaction summary annotated with the parent's usage figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrxSummary {
    /// Caller-supplied tag, e.g. the application user the account belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub trx_id: String,
    pub block_num: u64,
    pub block_time: String,
    pub elapsed: i64,
    pub net_usage: i64,
}

/// One summary per distinct transaction id; the first trace wins.
pub fn extract_all_transaction_summaries(
    result: &TransactionResult,
    user_id: Option<&str>,
) -> Vec<TrxSummary> {
    let mut seen = HashSet::new();
    result
        .action_traces
        .iter()
        .filter(|trace| seen.insert(trace.trx_id.as_str()))
        .map(|trace| TrxSummary {
            user_id: user_id.map(str::to_string),
            trx_id: trace.trx_id.clone(),
            block_num: trace.block_num,
            block_time: trace.block_time.clone(),
            elapsed: result.elapsed,
            net_usage: result.net_usage,
        })
        .collect()
}
