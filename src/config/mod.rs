//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → EndpointConfig handed to ChainClient
//!     → ProvisioningConfig handed to AccountProvisioner
//!
//! Signing credential:
//!     CHAIN_SIGNING_KEY environment variable only
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ClientConfig;
pub use schema::EndpointConfig;
pub use schema::KeyLayout;
pub use schema::ProvisioningConfig;
pub use schema::TransactionPolicyConfig;
