//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per RPC round trip)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log output (stderr, pretty or JSON)
//!     → Whatever `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID on every RPC span
//! - Private key material never reaches a log line
//! - No recorder installed here: metric calls are no-ops until the host adds one

pub mod logging;
pub mod metrics;
