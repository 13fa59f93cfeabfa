use std::time::Duration;

use crate::config::RetryPolicyConfig;

/// Compute the delay before retrying a job that has failed `attempt`
/// times: `min(base * multiplier^(attempt-1), max)`, optionally scaled by
/// a uniform jitter factor in [0.5, 1.0] and floored to whole
/// milliseconds.
pub fn retry_delay(attempt: u32, policy: &RetryPolicyConfig) -> Duration {
    let attempt = attempt.max(1);
    let exponent = policy.backoff_multiplier.powi(attempt as i32 - 1);
    let mut delay_ms = (policy.base_delay_ms as f64 * exponent).min(policy.max_delay_ms as f64);

    if policy.jitter_enabled {
        delay_ms *= 0.5 + rand::random::<f64>() * 0.5;
    }

    Duration::from_millis(delay_ms.floor() as u64)
}
