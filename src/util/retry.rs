//! Capped exponential backoff for single Discord operations.
//!
//! Serenity already waits out the rate-limit buckets it knows about, but a burst of index
//! writes can still hit a global 429 or a 5xx from Discord. Single writes (send, edit, delete,
//! create thread) are wrapped with `with_backoff` so these failures are retried a bounded number
//! of times before the caller logs and skips the item.

use dioxus_logger::tracing;
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Default number of attempts, including the first one.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default delay before the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
/// Default upper bound for any single retry delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Errors that can tell whether a retry may succeed.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for AppError {
    fn is_transient(&self) -> bool {
        AppError::is_transient(self)
    }
}

/// Retry settings for a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each following retry.
    pub base_delay: Duration,
    /// Cap applied to every computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping.
    ///
    /// # Arguments
    /// - `max_attempts` - Total number of attempts, including the first one
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// # Arguments
    /// - `attempt` - Number of the attempt that just failed
    ///
    /// # Returns
    /// - `Duration` - `base_delay * 2^(attempt - 1)`, capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// # Arguments
/// - `policy` - Attempt count and delay settings
/// - `operation` - Short description used in log lines
/// - `op` - Closure producing a fresh future for every attempt
///
/// # Returns
/// - `Ok(T)` - Result of the first successful attempt
/// - `Err(E)` - The permanent error, or the last transient error once attempts are exhausted
pub async fn with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    operation,
                    attempt,
                    policy.max_attempts,
                    delay,
                    e
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    tracing::error!(
                        "{} failed after {} attempts: {}",
                        operation,
                        policy.max_attempts,
                        e
                    );
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FakeError {
        transient: bool,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake error (transient: {})", self.transient)
        }
    }

    impl Retryable for FakeError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    /// Tests the exponential delay schedule and its cap.
    ///
    /// Expected: 2s, 4s, 8s, 16s, 32s, then capped at 60s
    #[test]
    fn delay_doubles_and_is_capped() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(32));
        assert_eq!(policy.delay_for(6), Duration::from_secs(60));
        assert_eq!(policy.delay_for(40), Duration::from_secs(60));
    }

    /// Tests that a transient failure is retried until success.
    ///
    /// Expected: Ok after three attempts
    #[tokio::test]
    async fn retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<u32, FakeError> =
            with_backoff(&RetryPolicy::immediate(5), "test op", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(FakeError { transient: true })
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Tests that permanent failures return immediately.
    ///
    /// Expected: Err after a single attempt
    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), FakeError> =
            with_backoff(&RetryPolicy::immediate(5), "test op", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError { transient: false })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Tests that retries stop at the attempt limit.
    ///
    /// Expected: Err after exactly `max_attempts` attempts
    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), FakeError> =
            with_backoff(&RetryPolicy::immediate(5), "test op", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError { transient: true })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
