//! Transaction assembly.
//!
//! # Responsibilities
//! - Build actions from contract, name, authorizations and payload
//! - Group actions into an atomic, ordered transaction request
//! - Attach and override the submission policy
//! - Derive the TAPOS header (reference block + expiration) for signing

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::types::{Action, Block, ChainError, ChainResult, PermissionLevel};
use crate::config::schema::TransactionPolicyConfig;

/// Timestamp layout used by block headers and expirations.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Submission policy: how the request is anchored, signed and pushed.
pub type TransactionPolicy = TransactionPolicyConfig;

/// Build a single action.
///
/// Only checks that at least one authorization is present; contract and
/// action names are validated by the chain.
pub fn build_action(
    contract: &str,
    action: &str,
    authorization: Vec<PermissionLevel>,
    data: Value,
) -> ChainResult<Action> {
    if authorization.is_empty() {
        return Err(ChainError::InvalidArgument(format!(
            "action {}::{} needs at least one authorization",
            contract, action
        )));
    }

    Ok(Action {
        account: contract.to_string(),
        name: action.to_string(),
        authorization,
        data,
    })
}

/// Build a request with the default policy.
pub fn build_transaction(actions: Vec<Action>) -> ChainResult<TransactionRequest> {
    TransactionRequest::new(actions, TransactionPolicy::default())
}

/// An ordered, atomically applied group of actions plus its policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    actions: Vec<Action>,
    policy: TransactionPolicy,
}

impl TransactionRequest {
    /// Fails with `InvalidArgument` for an empty action list or a zero
    /// expiration window.
    pub fn new(actions: Vec<Action>, policy: TransactionPolicy) -> ChainResult<Self> {
        if actions.is_empty() {
            return Err(ChainError::InvalidArgument(
                "transaction needs at least one action".to_string(),
            ));
        }
        validate_policy(&policy)?;
        Ok(Self { actions, policy })
    }

    /// Replace the whole policy.
    pub fn with_policy(mut self, policy: TransactionPolicy) -> ChainResult<Self> {
        validate_policy(&policy)?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_blocks_behind(mut self, blocks_behind: u32) -> Self {
        self.policy.blocks_behind = blocks_behind;
        self
    }

    pub fn with_expire_seconds(mut self, expire_seconds: u32) -> ChainResult<Self> {
        self.policy.expire_seconds = expire_seconds;
        validate_policy(&self.policy)?;
        Ok(self)
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.policy.broadcast = broadcast;
        self
    }

    pub fn with_sign(mut self, sign: bool) -> Self {
        self.policy.sign = sign;
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn policy(&self) -> &TransactionPolicy {
        &self.policy
    }
}

fn validate_policy(policy: &TransactionPolicy) -> ChainResult<()> {
    if policy.expire_seconds == 0 {
        return Err(ChainError::InvalidArgument(
            "expiration window must be > 0 seconds".to_string(),
        ));
    }
    Ok(())
}

/// Transaction body in the node's JSON form, ready to be signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    pub transaction_extensions: Vec<Value>,
}

impl UnsignedTransaction {
    /// Anchor `request` to `reference` and set its expiration.
    pub fn anchored(request: &TransactionRequest, reference: &Block) -> ChainResult<Self> {
        let expiration = expiration_after(&reference.timestamp, request.policy.expire_seconds)?;

        Ok(Self {
            expiration,
            // Only the low 16 bits of the height are carried.
            ref_block_num: (reference.block_num & 0xffff) as u16,
            ref_block_prefix: reference.ref_block_prefix,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions: request.actions.clone(),
            transaction_extensions: Vec::new(),
        })
    }

    /// Canonical bytes the signature covers.
    pub fn signing_bytes(&self) -> ChainResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| ChainError::InvalidArgument(format!("Unserializable transaction: {}", e)))
    }
}

/// `block_time + seconds`, rendered without fractional seconds.
fn expiration_after(block_time: &str, seconds: u32) -> ChainResult<String> {
    let trimmed = block_time.trim_end_matches('Z');
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map_err(|e| {
        ChainError::Network(format!("Malformed block timestamp '{}': {}", block_time, e))
    })?;
    let expiration = parsed + ChronoDuration::seconds(i64::from(seconds));
    Ok(expiration.format(TIMESTAMP_FORMAT).to_string())
}
