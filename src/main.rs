//! `chainctl`: command-line front end for the chain client.
//!
//! Read-only commands work without a signing key and are retried on
//! transport failures. `push` and `create-account` need
//! `CHAIN_SIGNING_KEY` and are submitted exactly once.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use alloy::primitives::B256;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use chain_tx_client::accounts::keys::{derive_key_pair, generate_key_pair, try_generate_account_name};
use chain_tx_client::accounts::{AccountOptions, AccountProvisioner};
use chain_tx_client::blockchain::types::{BlockRef, PermissionLevel, TableQuery};
use chain_tx_client::blockchain::wallet::{SignatureProvider, Wallet};
use chain_tx_client::blockchain::{ChainClient, ChainError, ChainResult, HttpTransport};
use chain_tx_client::config::loader::load_config;
use chain_tx_client::config::ClientConfig;
use chain_tx_client::observability::logging::init_logging;
use chain_tx_client::resilience::with_retries;
use chain_tx_client::transaction::{build_action, ErrorRecord, TransactionRequest};

#[derive(Parser)]
#[command(name = "chainctl")]
#[command(about = "Submit transactions and provision accounts on a nodeos-style chain", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the endpoint URL from the configuration.
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chain head and irreversibility info
    Info,
    /// Show the last irreversible block
    LastBlock,
    /// Show a block by height or id
    Block { block: String },
    /// Show an account
    Account { name: String },
    /// Read rows of a contract table
    Table {
        contract: String,
        table: String,
        /// Defaults to the contract itself.
        #[arg(long)]
        scope: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        reverse: bool,
    },
    /// List accounts controlled by a public key
    KeyAccounts { public_key: String },
    /// Look up a transaction by id
    Transaction { id: String },
    /// Generate a key pair (deterministic when a secret is given)
    Keygen {
        #[arg(long)]
        secret: Option<String>,
    },
    /// Generate a random account name (length 1 to 12)
    Name {
        #[arg(long, default_value_t = 12)]
        length: usize,
    },
    /// Push a single action authorized by <contract>@active (or --actor)
    Push {
        contract: String,
        action: String,
        /// Action payload as JSON.
        data: String,
        #[arg(long)]
        actor: Option<String>,
        /// Sign but do not broadcast.
        #[arg(long)]
        dry_run: bool,
    },
    /// Create, fund and stake a new account in one transaction
    CreateAccount {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ram: Option<u32>,
        #[arg(long)]
        stake_net: Option<String>,
        #[arg(long)]
        stake_cpu: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Signer for read-only sessions; refuses to sign.
struct ReadOnly;

impl SignatureProvider for ReadOnly {
    fn public_key(&self) -> &str {
        ""
    }

    async fn sign_digest(&self, _digest: B256) -> ChainResult<String> {
        Err(ChainError::Config(
            "no signing key loaded; set CHAIN_SIGNING_KEY".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => return report(ErrorRecord::from(ChainError::from(e))),
        },
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.url {
        config.endpoint.url = url;
    }

    init_logging(&config.observability);
    tracing::debug!(endpoint = %config.endpoint.url, "chainctl starting");

    match run(cli.command, &config).await {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => report(ErrorRecord::from(ChainError::Network(format!(
                "Failed to render output: {}",
                e
            )))),
        },
        Err(record) => report(record),
    }
}

fn report(record: ErrorRecord) -> ExitCode {
    match serde_json::to_string_pretty(&record) {
        Ok(text) => eprintln!("{}", text),
        Err(_) => eprintln!("{}", record),
    }
    ExitCode::FAILURE
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ErrorRecord> {
    serde_json::to_value(value)
        .map_err(|e| ErrorRecord::from(ChainError::Network(format!("Unserializable reply: {}", e))))
}

fn transport(config: &ClientConfig) -> ChainResult<HttpTransport> {
    HttpTransport::new(
        &config.endpoint.url,
        Duration::from_secs(config.endpoint.timeout_secs),
    )
}

fn reader(config: &ClientConfig) -> ChainResult<ChainClient<HttpTransport, ReadOnly>> {
    Ok(ChainClient::with_parts(transport(config)?, ReadOnly, config.endpoint.clone()))
}

fn signer(config: &ClientConfig) -> ChainResult<ChainClient<HttpTransport, Wallet>> {
    Ok(ChainClient::with_parts(transport(config)?, Wallet::from_env()?, config.endpoint.clone()))
}

async fn run(command: Commands, config: &ClientConfig) -> Result<Value, ErrorRecord> {
    let retry = &config.retry;

    match command {
        Commands::Info => {
            let client = reader(config)?;
            to_json(with_retries(retry, || client.get_chain_info()).await?)
        }
        Commands::LastBlock => {
            let client = reader(config)?;
            to_json(with_retries(retry, || client.get_last_block()).await?)
        }
        Commands::Block { block } => {
            let client = reader(config)?;
            let block: BlockRef = block.parse().unwrap_or_else(|never| match never {});
            to_json(with_retries(retry, || client.get_block(block.clone())).await?)
        }
        Commands::Account { name } => {
            let client = reader(config)?;
            to_json(with_retries(retry, || client.get_account(&name)).await?)
        }
        Commands::Table {
            contract,
            table,
            scope,
            limit,
            reverse,
        } => {
            let client = reader(config)?;
            let scope = scope.unwrap_or_else(|| contract.clone());
            let query = TableQuery::new(&contract, &scope, &table, limit).reversed(reverse);
            to_json(with_retries(retry, || client.get_table_rows(&query)).await?)
        }
        Commands::KeyAccounts { public_key } => {
            let client = reader(config)?;
            to_json(with_retries(retry, || client.get_key_accounts(&public_key)).await?)
        }
        Commands::Transaction { id } => {
            let client = reader(config)?;
            to_json(with_retries(retry, || client.get_transaction_history(&id)).await?)
        }
        Commands::Keygen { secret } => {
            let pair = match secret {
                Some(secret) => derive_key_pair(secret.as_bytes())?,
                None => generate_key_pair().await?,
            };
            to_json(&pair)
        }
        Commands::Name { length } => to_json(try_generate_account_name(length)?),
        Commands::Push {
            contract,
            action,
            data,
            actor,
            dry_run,
        } => {
            let data: Value = serde_json::from_str(&data).map_err(|e| {
                ErrorRecord::from(ChainError::InvalidArgument(format!("Invalid action data: {}", e)))
            })?;
            let actor = actor.unwrap_or_else(|| contract.clone());
            let action = build_action(&contract, &action, vec![PermissionLevel::active(actor)], data)?;
            let request = TransactionRequest::new(vec![action], config.transaction)?
                .with_broadcast(config.transaction.broadcast && !dry_run);

            let client = signer(config)?;
            to_json(client.submit_transaction(&request).await?)
        }
        Commands::CreateAccount {
            name,
            ram,
            stake_net,
            stake_cpu,
            symbol,
        } => {
            let options = AccountOptions {
                name,
                ram_bytes: ram,
                stake_net,
                stake_cpu,
                symbol,
            };
            let provisioner = AccountProvisioner::new(signer(config)?, config.provisioning.clone())
                .with_policy(config.transaction);
            let provisioned = provisioner.create_account(&options).await?;
            Ok(provisioned.to_record(config.provisioning.key_layout))
        }
    }
}
