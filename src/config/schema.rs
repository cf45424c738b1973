//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.
//! The signing credential is deliberately absent: it is only ever read
//! from the environment.

use serde::{Deserialize, Serialize};

/// Root configuration for the chain client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC endpoint settings.
    pub endpoint: EndpointConfig,

    /// Default submission policy for transactions.
    pub transaction: TransactionPolicyConfig,

    /// Account provisioning defaults.
    pub provisioning: ProvisioningConfig,

    /// Caller-side retry settings (read-only commands only).
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Node HTTP endpoint (e.g., "http://127.0.0.1:8888").
    pub url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8888".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Submission policy attached to every transaction unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionPolicyConfig {
    /// How far behind head the reference block is taken.
    pub blocks_behind: u32,

    /// Expiration window relative to the reference block, in seconds.
    pub expire_seconds: u32,

    /// Push the transaction to the node.
    pub broadcast: bool,

    /// Sign the transaction with the held credential.
    pub sign: bool,
}

impl Default for TransactionPolicyConfig {
    fn default() -> Self {
        Self {
            blocks_behind: 3,
            expire_seconds: 30,
            broadcast: true,
            sign: true,
        }
    }
}

/// Shape of key material in a provisioned account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyLayout {
    /// Flat record: `publickey` / `privatekey` next to the account fields.
    #[default]
    Embedded,
    /// Nested record: `keys: { public, private }`.
    Nested,
}

/// Account provisioning defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Account that creates, pays RAM for and stakes to new accounts.
    pub creator: String,

    /// Contract exposing newaccount/buyrambytes/delegatebw.
    pub system_contract: String,

    /// Permission of `creator` used to authorize provisioning.
    pub permission: String,

    /// RAM purchased for each new account, in bytes.
    pub ram_bytes: u32,

    /// Default network stake amount (without symbol).
    pub stake_net: String,

    /// Default CPU stake amount (without symbol).
    pub stake_cpu: String,

    /// Core token symbol.
    pub symbol: String,

    /// Length of generated account names.
    pub name_length: usize,

    /// Output shape for generated keys.
    pub key_layout: KeyLayout,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            creator: "eosio".to_string(),
            system_contract: "eosio".to_string(),
            permission: "active".to_string(),
            ram_bytes: 8192,
            stake_net: "1.0000".to_string(),
            stake_cpu: "1.0000".to_string(),
            symbol: "SYS".to_string(),
            name_length: 12,
            key_layout: KeyLayout::Embedded,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
