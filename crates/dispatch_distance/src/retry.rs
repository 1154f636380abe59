use std::{fmt::Display, future::Future, time::Duration};

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Retry schedule for flaky external lookups: bounded attempts, exponential
/// backoff, a per-attempt timeout and an optional overall deadline that cuts
/// remaining attempts short.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
    pub overall_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
            overall_timeout: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("all {attempts} attempts failed: {last_error}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: String,
}

/// Runs `operation` under `policy`. A timed-out attempt counts as a failed
/// attempt. The error message of the final failure is preserved for
/// diagnostics.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let started = Instant::now();
    let mut last_error = String::from("no attempts were made");
    let mut attempts = 0;

    for attempt in 1..=policy.max_attempts.max(1) {
        if let Some(overall) = policy.overall_timeout {
            if started.elapsed() >= overall {
                warn!(attempt, "overall retry deadline reached, giving up");
                break;
            }
        }

        attempts = attempt;

        match tokio::time::timeout(policy.attempt_timeout, operation(policy.attempt_timeout)).await
        {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => {
                last_error = error.to_string();
                debug!(attempt, %last_error, "attempt failed");
            }
            Err(_) => {
                last_error = format!("attempt timed out after {:?}", policy.attempt_timeout);
                debug!(attempt, "attempt timed out");
            }
        }

        if attempt < policy.max_attempts {
            let mut delay = policy.backoff_delay(attempt);
            if let Some(overall) = policy.overall_timeout {
                let remaining = overall.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    warn!(attempt, "overall retry deadline reached during backoff");
                    break;
                }
                delay = delay.min(remaining);
            }
            tokio::time::sleep(delay).await;
        }
    }

    warn!(attempts, %last_error, "retries exhausted");
    Err(RetryExhausted {
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            attempt_timeout: Duration::from_millis(50),
            overall_timeout: None,
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = run_with_retry(&fast_policy(), move |_| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SourceFailure)
                } else {
                    Ok(42.0)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42.0));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_and_keeps_last_error() {
        let result: Result<f64, _> =
            run_with_retry(&fast_policy(), |_| async { Err(SourceFailure) }).await;

        let error = result.unwrap_err();
        assert_eq!(error.attempts, 3);
        assert_eq!(error.last_error, "source failure");
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_counts_as_failure() {
        let result: Result<f64, RetryExhausted> = run_with_retry(&fast_policy(), |_| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<f64, SourceFailure>(1.0)
        })
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.attempts, 3);
        assert!(error.last_error.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn overall_deadline_cuts_attempts_short() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
            overall_timeout: Some(Duration::from_millis(1500)),
        };

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<f64, _> = run_with_retry(&policy, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(SourceFailure) }
        })
        .await;

        assert!(result.is_err());
        assert!(calls.load(Ordering::SeqCst) < 10);
    }

    #[derive(Debug)]
    struct SourceFailure;

    impl Display for SourceFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "source failure")
        }
    }
}
