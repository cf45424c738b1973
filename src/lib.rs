//! Transaction submission and account provisioning client for
//! account-based chains with a nodeos-style HTTP API.

pub mod accounts;
pub mod blockchain;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod transaction;

pub use accounts::{AccountOptions, AccountProvisioner};
pub use blockchain::{ChainClient, ChainError, ChainResult};
pub use config::schema::ClientConfig;
pub use transaction::{ErrorKind, ErrorRecord};
