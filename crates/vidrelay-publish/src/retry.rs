//! Exponential backoff for idempotent publisher requests.

use std::future::Future;
use std::time::Duration;

use crate::traits::PublishResult;

/// Default initial backoff delay in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
/// Default maximum backoff delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_retries: 2,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Calculate exponential backoff delay with +/-10% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self
            .initial_delay_ms
            .saturating_mul(1u64 << attempt.min(31));
        let capped = base.min(self.max_delay_ms);
        let jitter_range = capped / 10;
        if jitter_range == 0 {
            return Duration::from_millis(capped);
        }
        let jitter = (attempt as u64 * 7 + 13) % (jitter_range * 2 + 1);
        Duration::from_millis(capped - jitter_range + jitter)
    }
}

/// Run `operation`, retrying transient failures according to `policy`.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    what: &str,
    mut operation: F,
) -> PublishResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PublishResult<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                tracing::warn!(
                    operation = what,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient publisher error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
