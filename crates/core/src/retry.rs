//! Bounded retry with linear backoff for venue requests.
//!
//! After failed attempt `n` the caller sleeps `n * backoff_unit` before trying
//! again. Only [`FetchError::is_retryable`] failures are retried; the final
//! error is wrapped with the venue and the number of requests sent. A 429's
//! `Retry-After` value is logged but does not change the backoff.

use crate::error::{FetchError, SourceError};
use crate::types::Platform;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy shared by all source clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base unit for linear backoff.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Sets the attempt budget (clamped to at least one).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the backoff unit.
    #[must_use]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }
}

/// Runs `operation` under `policy`, tagging the final failure with `venue`.
///
/// # Errors
/// Returns the last [`FetchError`] wrapped in a [`SourceError`] when the error
/// is not retryable or the attempt budget is exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    venue: Platform,
    op_name: &str,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(venue = %venue, op = op_name, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                debug!(venue = %venue, op = op_name, attempt, error = %err, "Non-retryable failure");
                return Err(SourceError::new(venue, attempt, err));
            }
            Err(err) if attempt >= max_attempts => {
                warn!(
                    venue = %venue,
                    op = op_name,
                    attempts = attempt,
                    retry_after_secs = ?err.retry_after_secs(),
                    error = %err,
                    "Retry budget exhausted"
                );
                return Err(SourceError::new(venue, attempt, err));
            }
            Err(err) => {
                let delay = policy.backoff(attempt);
                warn!(
                    venue = %venue,
                    op = op_name,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    retry_after_secs = ?err.retry_after_secs(),
                    error = %err,
                    "Retrying request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_backoff_unit(Duration::from_millis(1))
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
    }

    #[test]
    fn test_max_attempts_clamped() {
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_policy(), Platform::Kalshi, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, FetchError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_policy(), Platform::Kalshi, "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(FetchError::Timeout("slow".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausts_budget_on_rate_limit() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&fast_policy(), Platform::Polymarket, "test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::from_status(429, ""))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.venue, Platform::Polymarket);
        assert!(err.kind.is_rate_limit());
    }

    #[tokio::test]
    async fn test_retry_after_survives_exhaustion() {
        let result: Result<(), _> =
            retry_with_backoff(&fast_policy(), Platform::Kalshi, "test", || async {
                Err(FetchError::RateLimited {
                    retry_after_secs: Some(30),
                })
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.kind.retry_after_secs(), Some(30));
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&fast_policy(), Platform::Kalshi, "test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::from_status(401, "bad token"))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.attempts, 1);
        assert!(err.kind.is_configuration());
    }
}
