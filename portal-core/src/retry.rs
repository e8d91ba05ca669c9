//! Retry utilities for calls to upstream HTTP services.
//!
//! A [`RetryPolicy`] is a plain value describing the retry budget; the
//! generic runner owns the loop, the waits, and cancellation. Callers decide
//! which errors are worth retrying via a predicate.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial one.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the wait after each failed attempt.
    pub multiplier: f64,
    /// Upper bound on a single wait, if any.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Some(Duration::from_secs(10)),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit budget and no per-wait cap.
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            multiplier,
            max_delay: None,
        }
    }

    /// Create a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Wait before the given retry (1-based: the first retry waits
    /// `initial_delay`, the second `initial_delay * multiplier`, and so on).
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let delay_ms = match self.max_delay {
            Some(cap) => delay_ms.min(cap.as_millis() as f64),
            None => delay_ms,
        };
        Duration::from_millis(delay_ms as u64)
    }
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded on the given attempt.
    Succeeded { value: T, attempts: u32 },
    /// Every attempt in the budget failed, or a non-retryable error stopped
    /// the loop early.
    Exhausted { last_error: E, attempts: u32 },
    /// The cancellation token fired while a wait was pending.
    Cancelled,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn succeeded(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }
}

/// Run `f` until it succeeds, the policy is exhausted, or `cancel` fires.
///
/// Attempts are strictly sequential: each wait elapses fully before the next
/// attempt is issued, and never more than one call is in flight. A cancelled
/// token aborts a pending wait immediately; an attempt already in flight
/// runs to completion but no further attempt is made.
pub async fn retry_with_policy<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    cancel: &CancellationToken,
    is_retryable: impl Fn(&E) -> bool,
    f: F,
) -> RetryOutcome<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled;
        }

        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt, "call succeeded after retry"
                    );
                }
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) => {
                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %error,
                        "call failed after max attempts"
                    );
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }

                if !is_retryable(&error) {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %error,
                        "call failed with non-retryable error"
                    );
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }

                let delay = policy.delay_before_retry(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "call failed, retrying after wait"
                );

                tokio::select! {
                    _ = cancel.cancelled() => return RetryOutcome::Cancelled,
                    _ = sleep(delay) => {}
                }

                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
    }

    #[test]
    fn delay_sequence_follows_multiplier() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1000), 1.5);

        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(1500));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(2250));
        assert_eq!(policy.delay_before_retry(4), Duration::from_millis(3375));
    }

    #[test]
    fn delay_respects_cap() {
        let policy = RetryPolicy {
            max_delay: Some(Duration::from_millis(300)),
            ..RetryPolicy::new(5, Duration::from_millis(200), 2.0)
        };

        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(300));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let cancel = CancellationToken::new();
        let outcome = retry_with_policy(
            &RetryPolicy::default(),
            "test_op",
            &cancel,
            |_: &String| true,
            || async { Ok::<_, String>(42) },
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                assert_eq!(value, 42);
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_budget_with_sequential_waits() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1000), 1.5);
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let outcome = retry_with_policy(&policy, "test_op", &cancel, |_: &String| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>("boom".to_string()) }
        })
        .await;

        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 5),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 1000 + 1500 + 2250 + 3375
        assert_eq!(started.elapsed(), Duration::from_millis(8125));
    }

    #[tokio::test]
    async fn stops_on_non_retryable_error() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let outcome = retry_with_policy(
            &RetryPolicy::new(5, Duration::from_millis(10), 2.0),
            "test_op",
            &cancel,
            |_: &String| false,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("denied".to_string()) }
            },
        )
        .await;

        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_pending_wait() {
        let policy = RetryPolicy::new(5, Duration::from_secs(60), 2.0);
        let cancel = CancellationToken::new();
        let calls = std::sync::Arc::new(AtomicU32::new(0));

        let task_calls = calls.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            retry_with_policy(&policy, "test_op", &task_cancel, |_: &String| true, || {
                task_calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("boom".to_string()) }
            })
            .await
        });

        // Let the first attempt fail and the wait begin.
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        let outcome = handle.await.expect("task panicked");
        assert!(matches!(outcome, RetryOutcome::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
