//! Chain RPC client.
//!
//! # Responsibilities
//! - Hold the endpoint configuration and signing credential
//! - Read chain state (info, blocks, accounts, table rows, history)
//! - Anchor, sign and broadcast transaction requests
//!
//! The client holds no mutable state, so clones can issue calls
//! concurrently. Nothing here retries; see `resilience` for the
//! caller-side layer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::{hex, keccak256};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::transport::{HttpTransport, RpcTransport};
use crate::blockchain::types::{
    AccountInfo, Block, BlockRef, ChainError, ChainInfo, ChainResult, EndpointConfig, KeyAccounts,
    PermissionLevel, TableQuery, TableRows, TransactionHistory, TransactionResult,
};
use crate::blockchain::wallet::{signing_digest, SignatureProvider, Wallet};
use crate::observability::metrics;
use crate::transaction::builder::{build_action, build_transaction, TransactionRequest, UnsignedTransaction};
use crate::transaction::classifier::{classify_reply, parse_push_reply};

const GET_INFO: &str = "/v1/chain/get_info";
const GET_BLOCK: &str = "/v1/chain/get_block";
const GET_ACCOUNT: &str = "/v1/chain/get_account";
const GET_TABLE_ROWS: &str = "/v1/chain/get_table_rows";
const PUSH_TRANSACTION: &str = "/v1/chain/push_transaction";
const GET_TRANSACTION: &str = "/v1/history/get_transaction";
const GET_KEY_ACCOUNTS: &str = "/v1/history/get_key_accounts";

/// Handle to one endpoint + credential pair.
pub struct ChainClient<T = HttpTransport, S = Wallet> {
    transport: Arc<T>,
    signer: Arc<S>,
    config: EndpointConfig,
}

impl ChainClient {
    /// Create a client over HTTP.
    ///
    /// # Arguments
    /// * `config` - Endpoint configuration
    /// * `credential` - Encoded private key used to sign submissions
    ///
    /// # Returns
    /// A new client, or `ChainError::Config` if the endpoint or the
    /// credential cannot be loaded. No network call is made.
    pub fn initialize(config: EndpointConfig, credential: &str) -> ChainResult<Self> {
        let transport = HttpTransport::new(&config.url, Duration::from_secs(config.timeout_secs))?;
        let wallet = Wallet::from_private_key(credential)?;

        tracing::info!(endpoint = %config.url, "Chain client initialized");

        Ok(Self::with_parts(transport, wallet, config))
    }

    /// Like `initialize`, reading the credential from the environment.
    pub fn from_env(config: EndpointConfig) -> ChainResult<Self> {
        let transport = HttpTransport::new(&config.url, Duration::from_secs(config.timeout_secs))?;
        let wallet = Wallet::from_env()?;
        Ok(Self::with_parts(transport, wallet, config))
    }
}

impl<T: RpcTransport, S: SignatureProvider> ChainClient<T, S> {
    /// Assemble a client from an arbitrary transport and signer.
    pub fn with_parts(transport: T, signer: S, config: EndpointConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            signer: Arc::new(signer),
            config,
        }
    }

    /// Get chain head and irreversibility info.
    pub async fn get_chain_info(&self) -> ChainResult<ChainInfo> {
        self.call(GET_INFO, json!({})).await
    }

    /// Get a block by height or id.
    pub async fn get_block(&self, block: BlockRef) -> ChainResult<Block> {
        self.call(GET_BLOCK, json!({ "block_num_or_id": block })).await
    }

    /// Get the last irreversible block.
    pub async fn get_last_block(&self) -> ChainResult<Block> {
        let info = self.get_chain_info().await?;
        self.get_block(BlockRef::Number(info.last_irreversible_block_num))
            .await
    }

    /// Get an account by name.
    pub async fn get_account(&self, name: &str) -> ChainResult<AccountInfo> {
        self.call(GET_ACCOUNT, json!({ "account_name": name })).await
    }

    /// Read rows of a contract table, in table order (or reversed).
    ///
    /// Fails with `InvalidArgument` before any network call if `limit` is 0.
    pub async fn read_table_rows(
        &self,
        contract: &str,
        scope: &str,
        table: &str,
        limit: u32,
        reverse: bool,
    ) -> ChainResult<Vec<Value>> {
        let query = TableQuery::new(contract, scope, table, limit).reversed(reverse);
        Ok(self.get_table_rows(&query).await?.rows)
    }

    /// Read rows of a table scoped to its own contract.
    pub async fn get_table(&self, contract: &str, table: &str, limit: u32) -> ChainResult<Vec<Value>> {
        self.read_table_rows(contract, contract, table, limit, false)
            .await
    }

    /// Full `get_table_rows` reply for a prepared query.
    pub async fn get_table_rows(&self, query: &TableQuery) -> ChainResult<TableRows> {
        if query.limit == 0 {
            return Err(ChainError::InvalidArgument(
                "table row limit must be > 0".to_string(),
            ));
        }
        let body = serde_json::to_value(query)
            .map_err(|e| ChainError::InvalidArgument(format!("Unserializable table query: {}", e)))?;
        self.call(GET_TABLE_ROWS, body).await
    }

    /// Accounts controlled by `public_key` (history plugin).
    pub async fn get_key_accounts(&self, public_key: &str) -> ChainResult<Vec<String>> {
        let reply: KeyAccounts = self
            .call(GET_KEY_ACCOUNTS, json!({ "public_key": public_key }))
            .await?;
        Ok(reply.account_names)
    }

    /// Look up a past transaction by id (history plugin).
    pub async fn get_transaction_history(&self, id: &str) -> ChainResult<TransactionHistory> {
        self.call(GET_TRANSACTION, json!({ "id": id })).await
    }

    /// Anchor, sign and broadcast a transaction request.
    ///
    /// Reads chain info and the reference block, then pushes once. A
    /// pushed transaction cannot be recalled: dropping this future after
    /// the push only discards the reply.
    pub async fn submit_transaction(&self, request: &TransactionRequest) -> ChainResult<TransactionResult> {
        let outcome = self.submit_inner(request).await;
        metrics::record_transaction(outcome.as_ref().map(|_| ()));
        outcome
    }

    async fn submit_inner(&self, request: &TransactionRequest) -> ChainResult<TransactionResult> {
        let policy = *request.policy();

        let info = self.get_chain_info().await?;
        let reference_num = info
            .head_block_num
            .saturating_sub(u64::from(policy.blocks_behind));
        let reference = self.get_block(BlockRef::Number(reference_num)).await?;

        let transaction = UnsignedTransaction::anchored(request, &reference)?;
        let bytes = transaction.signing_bytes()?;
        let transaction_id = hex::encode(keccak256(&bytes));

        let signatures = if policy.sign {
            let digest = signing_digest(&info.chain_id, &bytes);
            vec![self.signer.sign_digest(digest).await?]
        } else {
            Vec::new()
        };

        if !policy.broadcast {
            tracing::info!(
                transaction_id = %transaction_id,
                actions = request.actions().len(),
                "Transaction built without broadcast"
            );
            return Ok(TransactionResult::not_broadcast(transaction_id, signatures));
        }

        let body = json!({
            "signatures": signatures,
            "compression": "none",
            "packed_context_free_data": "",
            "transaction": transaction,
        });
        let reply = self.call_raw(PUSH_TRANSACTION, body).await?;
        let result = parse_push_reply(reply, signatures)?;

        tracing::info!(
            transaction_id = %result.transaction_id,
            block_num = result.block_num,
            actions = request.actions().len(),
            "Transaction executed"
        );
        Ok(result)
    }

    /// Submit a single action authorized by `contract@active`.
    pub async fn run_action(&self, contract: &str, action: &str, data: Value) -> ChainResult<TransactionResult> {
        let action = build_action(contract, action, vec![PermissionLevel::active(contract)], data)?;
        let request = build_transaction(vec![action])?;
        self.submit_transaction(&request).await
    }

    /// Public key of the held credential.
    pub fn public_key(&self) -> &str {
        self.signer.public_key()
    }

    /// Get the configuration.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    async fn call<R: DeserializeOwned>(&self, path: &'static str, body: Value) -> ChainResult<R> {
        let value = self.call_raw(path, body).await?;
        serde_json::from_value(value)
            .map_err(|e| ChainError::Network(format!("Malformed response from {}: {}", path, e)))
    }

    async fn call_raw(&self, path: &'static str, body: Value) -> ChainResult<Value> {
        let method = path.rsplit('/').next().unwrap_or(path);
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("rpc", %request_id, method);

        async move {
            let started = Instant::now();
            let outcome = match self.transport.post(path, body).await {
                Ok(reply) => classify_reply(path, reply),
                Err(e) => Err(e),
            };
            metrics::record_rpc(method, started.elapsed(), outcome.as_ref().map(|_| ()));

            match &outcome {
                Ok(_) => tracing::debug!("RPC succeeded"),
                Err(e) => tracing::warn!(error = %e, "RPC failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

impl<T, S> Clone for ChainClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            signer: self.signer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T, S> std::fmt::Debug for ChainClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("endpoint", &self.config.url)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
