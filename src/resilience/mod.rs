//! Caller-side resilience.
//!
//! # Data Flow
//! ```text
//! Read-only call from a caller (e.g. chainctl):
//!     → retries.rs (re-run on NetworkError only)
//!     → backoff.rs (exponential delay + jitter between attempts)
//! ```
//!
//! # Design Decisions
//! - The client core never retries; this layer sits outside it
//! - Only transport failures are retried; rejections and not-found are final
//! - Submissions are never wrapped: a pushed transaction may already be applied

pub mod backoff;
pub mod retries;

pub use retries::with_retries;
