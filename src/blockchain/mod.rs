//! Chain connection subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (CHAIN_SIGNING_KEY) + EndpointConfig
//!     → wallet.rs (credential loading, digest signing)
//!     → transport.rs (JSON over HTTP to one node)
//!     → client.rs (reads, anchor + sign + push)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from the environment or an explicit caller string
//! - Never log private keys or sensitive data
//! - Every RPC call has a configurable timeout

pub mod client;
pub mod transport;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use transport::{HttpTransport, RpcReply, RpcTransport};
pub use types::{Action, ChainError, ChainResult, PermissionLevel, TransactionResult};
pub use wallet::{SignatureProvider, Wallet};
