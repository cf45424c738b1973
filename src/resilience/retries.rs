//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is retryable (`ChainError::Network` only)
//! - Re-run the operation with exponential backoff + jitter
//! - Stop after `max_attempts`, returning the last error

use std::future::Future;

use crate::blockchain::types::{ChainError, ChainResult};
use crate::config::schema::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Whether `err` is worth another attempt.
pub fn is_retryable(err: &ChainError) -> bool {
    matches!(err, ChainError::Network(_))
}

/// Run `op`, retrying transport failures according to `config`.
pub async fn with_retries<T, F, Fut>(config: &RetryConfig, mut op: F) -> ChainResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ChainResult<T>>,
{
    let max_attempts = if config.enabled { config.max_attempts.max(1) } else { 1 };
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after transport failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
