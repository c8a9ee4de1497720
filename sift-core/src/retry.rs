//! Exponential backoff shared by every remote provider client.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::SiftError;

/// Attempts an operation up to `max_attempts` times, sleeping
/// `base_delay * 2^(n-1)` after the n-th failed attempt.
/// Non-transient errors stop the loop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

/// The error from the final attempt, plus how many attempts were made.
#[derive(Debug)]
pub struct RetryFailure {
    pub attempts: u32,
    pub last_error: SiftError,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_millis(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self::new(max_attempts, Duration::from_millis(base_delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SiftError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() || attempt >= self.max_attempts => {
                    warn!(operation, attempt, error = %e, "giving up");
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::errors::EmbeddingError;

    fn transient() -> SiftError {
        EmbeddingError::RequestFailed {
            reason: "503".to_string(),
            transient: true,
        }
        .into()
    }

    #[test]
    fn delays_double_from_base() {
        let policy = RetryPolicy::from_millis(3, 1_000);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_succeeds() {
        let policy = RetryPolicy::from_millis(3, 1_000);
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(transient())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_attempts() {
        let policy = RetryPolicy::from_millis(3, 1_000);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;
        let failure = result.unwrap_err();
        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_failures_are_not_retried() {
        let policy = RetryPolicy::from_millis(3, 1_000);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(EmbeddingError::AuthFailed { status: 401 }.into()) }
            })
            .await;
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
