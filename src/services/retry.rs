//! Bounded retry for transient collaborator failures.

use crate::services::collaborators::CollaboratorError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_MULTIPLIER: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// Non-transient failure, returned on the attempt that produced it
    #[error(transparent)]
    Failed(CollaboratorError),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: CollaboratorError,
    },
}

/// Retry schedule: `max_retries` extra attempts, waiting
/// `base_delay * multiplier^(n-1)` before retry `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `operation` until it succeeds, fails non-transiently, or the
    /// retries run out. `on_retry` is called with the retry number before
    /// each wait.
    pub async fn run<T, F, Fut, R>(
        &self,
        name: &str,
        mut operation: F,
        mut on_retry: R,
    ) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
        R: FnMut(u32, &CollaboratorError),
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(RetryError::Failed(err)),
                Err(err) if attempt > self.max_retries => {
                    tracing::warn!("{} failed after {} attempts: {}", name, attempt, err);
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        name,
                        attempt,
                        err,
                        delay
                    );
                    on_retry(attempt, &err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> CollaboratorError {
        CollaboratorError::Transient("Receiving end does not exist".to_string())
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let mut retries = Vec::new();
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result = policy
            .run(
                "fetch",
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { if n == 0 { Err(transient()) } else { Ok(n) } }
                },
                |retry, _| retries.push(retry),
            )
            .await;

        let value = tokio_test::assert_ok!(result);
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(retries, vec![1]);
    }

    #[tokio::test]
    async fn test_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result: Result<(), _> = policy
            .run(
                "fetch",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(transient()) }
                },
                |_, _| {},
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 3,
                last: transient()
            })
        );
    }

    #[test]
    fn test_permanent_failure_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let result: Result<(), _> = tokio_test::block_on(policy.run(
            "fetch",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(CollaboratorError::Io("disk full".to_string())) }
            },
            |_, _| {},
        ));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Failed(CollaboratorError::Io(_)))));
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let policy = RetryPolicy::none();
        let result: Result<(), _> = policy
            .run("fetch", || async { Err(transient()) }, |_, _| {})
            .await;
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
    }
}
