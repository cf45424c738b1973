//! Account provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! AccountOptions + ProvisioningConfig
//!     → keys.rs (name + key pair)
//!     → provisioning.rs (newaccount, buyrambytes, delegatebw as one transaction)
//!     → classifier (newaccount confirmation records)
//! ```

pub mod keys;
pub mod provisioning;

pub use keys::{
    derive_key_pair, generate_account_name, generate_key_pair, try_generate_account_name, KeyPair,
};
pub use provisioning::{
    AccountDescriptor, AccountOptions, AccountProvisioner, ProvisionedAccount, ProvisioningState,
};
