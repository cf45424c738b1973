//! Account provisioning workflow.
//!
//! # State Transitions
//! ```text
//! Pending(options)        defaults applied, name chosen
//!   → KeysGenerated       key pair attached
//!   → TransactionSubmitted newaccount + buyrambytes + delegatebw, one transaction
//!   → Confirmed           exactly one newaccount trace for the name
//!   ↘ Failed              first error, reported as an ErrorRecord
//! ```
//!
//! With `broadcast = false` the run stops at `TransactionSubmitted`:
//! nothing was pushed, so there is nothing to confirm.
//!
//! The three actions are only ever submitted together, so the chain
//! either applies all of them or none; there is no local rollback.
//! Caller-supplied names are passed through unchecked and rejected by
//! the chain if malformed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::accounts::keys::{generate_account_name, generate_key_pair, KeyPair};
use crate::blockchain::client::ChainClient;
use crate::blockchain::transport::RpcTransport;
use crate::blockchain::types::{Action, ChainError, ChainResult, PermissionLevel, TransactionResult};
use crate::blockchain::wallet::SignatureProvider;
use crate::config::schema::{KeyLayout, ProvisioningConfig, TransactionPolicyConfig};
use crate::observability::metrics;
use crate::transaction::builder::{build_action, TransactionRequest};
use crate::transaction::classifier::{extract_confirmations, ConfirmationRecord, ErrorRecord};

pub const NEWACCOUNT: &str = "newaccount";
pub const BUYRAMBYTES: &str = "buyrambytes";
pub const DELEGATEBW: &str = "delegatebw";

/// Caller overrides; anything left `None` falls back to `ProvisioningConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountOptions {
    /// Account name; generated when absent or empty.
    pub name: Option<String>,
    pub ram_bytes: Option<u32>,
    pub stake_net: Option<String>,
    pub stake_cpu: Option<String>,
    pub symbol: Option<String>,
}

/// Where a provisioning run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    Pending,
    KeysGenerated,
    TransactionSubmitted,
    Confirmed,
    Failed,
}

/// The account being provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDescriptor {
    pub name: String,
    pub public_key: String,
    pub ram_bytes: u32,
    /// Amount without symbol, e.g. "1.0000".
    pub stake_net: String,
    pub stake_cpu: String,
    pub symbol: String,
    pub status: ProvisioningState,
    /// Confirmation records, filled in once the chain has applied the transaction.
    pub processed: Vec<ConfirmationRecord>,
}

impl AccountDescriptor {
    /// `"<amount> <symbol>"`.
    pub fn stake_net_quantity(&self) -> String {
        format!("{} {}", self.stake_net, self.symbol)
    }

    pub fn stake_cpu_quantity(&self) -> String {
        format!("{} {}", self.stake_cpu, self.symbol)
    }
}

/// A successfully provisioned account with its keys and the raw result.
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub account: AccountDescriptor,
    pub keys: KeyPair,
    pub result: TransactionResult,
}

impl ProvisionedAccount {
    /// Caller-facing record with keys laid out per `layout`.
    pub fn to_record(&self, layout: KeyLayout) -> Value {
        let mut record = json!({
            "name": self.account.name,
            "ram": self.account.ram_bytes,
            "stake_net": self.account.stake_net,
            "stake_cpu": self.account.stake_cpu,
            "symbol": self.account.symbol,
            "status": self.account.status,
            "processed": self.account.processed,
        });

        if let Some(fields) = record.as_object_mut() {
            match layout {
                KeyLayout::Embedded => {
                    fields.insert("publickey".to_string(), json!(self.keys.public_key()));
                    fields.insert("privatekey".to_string(), json!(self.keys.private_key()));
                }
                KeyLayout::Nested => {
                    fields.insert(
                        "keys".to_string(),
                        json!({
                            "public": self.keys.public_key(),
                            "private": self.keys.private_key(),
                        }),
                    );
                }
            }
        }
        record
    }
}

/// Drives account creation through a `ChainClient`.
pub struct AccountProvisioner<T, S> {
    client: ChainClient<T, S>,
    config: ProvisioningConfig,
    policy: TransactionPolicyConfig,
}

impl<T: RpcTransport, S: SignatureProvider> AccountProvisioner<T, S> {
    pub fn new(client: ChainClient<T, S>, config: ProvisioningConfig) -> Self {
        Self {
            client,
            config,
            policy: TransactionPolicyConfig::default(),
        }
    }

    /// Override the submission policy used for the provisioning transaction.
    pub fn with_policy(mut self, policy: TransactionPolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Apply defaults to `options`, producing a `Pending` descriptor.
    pub fn prepare(&self, options: &AccountOptions) -> AccountDescriptor {
        let name = match options.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => generate_account_name(self.config.name_length),
        };

        AccountDescriptor {
            name,
            public_key: String::new(),
            ram_bytes: options.ram_bytes.unwrap_or(self.config.ram_bytes),
            stake_net: options
                .stake_net
                .clone()
                .unwrap_or_else(|| self.config.stake_net.clone()),
            stake_cpu: options
                .stake_cpu
                .clone()
                .unwrap_or_else(|| self.config.stake_cpu.clone()),
            symbol: options
                .symbol
                .clone()
                .unwrap_or_else(|| self.config.symbol.clone()),
            status: ProvisioningState::Pending,
            processed: Vec::new(),
        }
    }

    /// The three provisioning actions, in execution order.
    pub fn provisioning_actions(&self, account: &AccountDescriptor) -> ChainResult<Vec<Action>> {
        let contract = &self.config.system_contract;
        let creator = &self.config.creator;
        let auth = || vec![PermissionLevel::new(creator.as_str(), self.config.permission.as_str())];
        let authority = json!({
            "threshold": 1,
            "keys": [{ "key": account.public_key, "weight": 1 }],
            "accounts": [],
            "waits": []
        });

        let newaccount = build_action(
            contract,
            NEWACCOUNT,
            auth(),
            json!({
                "creator": creator,
                "name": account.name,
                "owner": authority,
                "active": authority,
            }),
        )?;

        let buyram = build_action(
            contract,
            BUYRAMBYTES,
            auth(),
            json!({
                "payer": creator,
                "receiver": account.name,
                "bytes": account.ram_bytes,
            }),
        )?;

        let stake = build_action(
            contract,
            DELEGATEBW,
            auth(),
            json!({
                "from": creator,
                "receiver": account.name,
                "stake_net_quantity": account.stake_net_quantity(),
                "stake_cpu_quantity": account.stake_cpu_quantity(),
                "transfer": false,
            }),
        )?;

        Ok(vec![newaccount, buyram, stake])
    }

    /// Create an account with freshly generated keys.
    pub async fn create_account(&self, options: &AccountOptions) -> Result<ProvisionedAccount, ErrorRecord> {
        let mut account = self.prepare(options);
        tracing::info!(account = %account.name, state = ?account.status, "Provisioning account");

        let keys = match generate_key_pair().await {
            Ok(keys) => keys,
            Err(e) => return Err(self.fail(&mut account, e)),
        };
        self.create_account_with_keys(account, keys).await
    }

    /// Create `account` (as returned by `prepare`) using `keys`.
    pub async fn create_account_with_keys(
        &self,
        mut account: AccountDescriptor,
        keys: KeyPair,
    ) -> Result<ProvisionedAccount, ErrorRecord> {
        account.public_key = keys.public_key().to_string();
        self.advance(&mut account, ProvisioningState::KeysGenerated);

        let request = match self
            .provisioning_actions(&account)
            .and_then(|actions| TransactionRequest::new(actions, self.policy))
        {
            Ok(request) => request,
            Err(e) => return Err(self.fail(&mut account, e)),
        };

        self.advance(&mut account, ProvisioningState::TransactionSubmitted);
        let result = match self.client.submit_transaction(&request).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(&mut account, e)),
        };

        if !result.broadcast {
            // Built and possibly signed, but nothing reached the chain.
            tracing::info!(
                account = %account.name,
                transaction_id = %result.transaction_id,
                "Provisioning transaction built without broadcast"
            );
            return Ok(ProvisionedAccount {
                account,
                keys,
                result,
            });
        }

        let processed = extract_confirmations(&result, NEWACCOUNT);
        let confirmed = matches!(
            processed.as_slice(),
            [only] if only.name_processed == account.name
        );
        if !confirmed {
            let err = ChainError::Network(format!(
                "transaction {} executed with {} newaccount trace(s), expected one for '{}'",
                result.transaction_id,
                processed.len(),
                account.name
            ));
            return Err(self.fail(&mut account, err));
        }

        account.processed = processed;
        self.advance(&mut account, ProvisioningState::Confirmed);
        metrics::record_provisioning(Ok(()));

        Ok(ProvisionedAccount {
            account,
            keys,
            result,
        })
    }

    fn advance(&self, account: &mut AccountDescriptor, next: ProvisioningState) {
        account.status = next;
        tracing::debug!(account = %account.name, state = ?next, "Provisioning state changed");
    }

    fn fail(&self, account: &mut AccountDescriptor, err: ChainError) -> ErrorRecord {
        tracing::warn!(
            account = %account.name,
            state = ?account.status,
            error = %err,
            "Account provisioning failed"
        );
        account.status = ProvisioningState::Failed;
        metrics::record_provisioning(Err(&err));
        ErrorRecord::from(err)
    }
}
