//! Metrics collection.
//!
//! # Metrics
//! - `chain_rpc_requests_total` (counter): RPC round trips by method, outcome
//! - `chain_rpc_duration_seconds` (histogram): RPC latency by method
//! - `chain_transactions_total` (counter): submissions by outcome
//! - `chain_accounts_provisioned_total` (counter): provisioning runs by outcome
//!
//! Outcome labels are `ok` or the error kind (`NetworkError`, `ChainRejected`, ...).

use std::time::Duration;

use metrics::{counter, histogram};

use crate::blockchain::types::ChainError;

fn outcome_label(outcome: Result<(), &ChainError>) -> &'static str {
    match outcome {
        Ok(()) => "ok",
        Err(e) => e.kind().as_str(),
    }
}

/// Record one RPC round trip.
pub fn record_rpc(method: &str, elapsed: Duration, outcome: Result<(), &ChainError>) {
    let method = method.to_string();
    counter!(
        "chain_rpc_requests_total",
        "method" => method.clone(),
        "outcome" => outcome_label(outcome)
    )
    .increment(1);
    histogram!("chain_rpc_duration_seconds", "method" => method).record(elapsed.as_secs_f64());
}

/// Record a transaction submission.
pub fn record_transaction(outcome: Result<(), &ChainError>) {
    counter!("chain_transactions_total", "outcome" => outcome_label(outcome)).increment(1);
}

/// Record an account provisioning run.
pub fn record_provisioning(outcome: Result<(), &ChainError>) {
    counter!("chain_accounts_provisioned_total", "outcome" => outcome_label(outcome)).increment(1);
}
