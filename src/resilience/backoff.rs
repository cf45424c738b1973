//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Un-jittered delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped.
pub fn backoff_ceiling(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    if attempt == 0 {
        return 0;
    }
    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(max_ms)
}

/// Delay before retry number `attempt`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let ceiling = backoff_ceiling(attempt, base_ms, max_ms);
    let jitter_range = ceiling / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };
    Duration::from_millis(ceiling + jitter)
}
