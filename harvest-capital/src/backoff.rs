use std::time::Duration;

use harvest_core::RetryConfig;
use rand::Rng;

/// `base_ms` plus a random jitter of up to `jitter_percent` of it.
#[must_use]
pub fn jitter_wait(base_ms: u64, jitter_percent: u8) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent)) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Delay before retry number `attempt` (1-based): the base doubled per prior retry.
#[must_use]
pub fn retry_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let base = cfg.base_backoff_ms.saturating_mul(1u64 << exp);
    Duration::from_millis(jitter_wait(base, cfg.jitter_percent))
}
