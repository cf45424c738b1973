//! Transaction assembly and outcome classification.
//!
//! # Data Flow
//! ```text
//! caller actions
//!     → builder.rs (ordered TransactionRequest + policy)
//!     → ChainClient::submit_transaction (anchor, sign, push)
//!     → classifier.rs (TransactionResult | ErrorRecord, confirmations)
//! ```

pub mod builder;
pub mod classifier;

pub use builder::{build_action, build_transaction, TransactionPolicy, TransactionRequest};
pub use classifier::{
    classify, extract_all_transaction_summaries, extract_confirmations, ConfirmationRecord,
    ErrorKind, ErrorRecord, Outcome, TrxSummary,
};
