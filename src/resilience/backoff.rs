//! Exponential backoff.
//!
//! Unjittered: the delay before retry `k` is exactly `2^k` seconds. Callers
//! that fail together in a correlated outage will retry together.

use std::time::Duration;

/// Delay before the given retry attempt (1 = first retry).
pub fn calculate_backoff(attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    Duration::from_secs(2u64.saturating_pow(attempt))
}
