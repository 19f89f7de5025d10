//! Retry logic with linear backoff.
//!
//! Attempts are numbered from 1. After failed attempt `n` (and only if
//! another attempt remains) the loop sleeps `base_delay + n * step`.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Fixed part of every backoff
    pub base_delay: Duration,
    /// Added once per attempt number
    pub step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            step: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Config for page navigation, from the scraper settings
    pub fn navigation(max_attempts: u32, base_delay_secs: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(base_delay_secs),
            step: Duration::from_secs(1),
        }
    }

    /// Delay to wait after `attempt` failed
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay + self.step * attempt
    }
}

/// A successful result together with how it was obtained.
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
    pub backoffs: Vec<Duration>,
}

/// Every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
    pub backoffs: Vec<Duration>,
}

/// Retry an async operation with linear backoff.
///
/// The operation receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<Retried<T>, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut backoffs = Vec::new();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(Retried {
                    value,
                    attempts: attempt,
                    backoffs,
                });
            }
            Err(e) if attempt < max_attempts => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name, attempt, max_attempts, e, delay
                );
                sleep(delay).await;
                backoffs.push(delay);
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}. Giving up",
                    operation_name, attempt, max_attempts, e
                );
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                    backoffs,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            step: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let config = RetryConfig::default();
        let result: Result<_, Exhausted<&str>> =
            retry(&config, "test", |_| async { Ok(42) }).await;
        let retried = result.unwrap();
        assert_eq!(retried.value, 42);
        assert_eq!(retried.attempts, 1);
        assert!(retried.backoffs.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let config = fast_config(5);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<_, Exhausted<&str>> = retry(&config, "test", |_| {
            let c = counter_clone.clone();
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err("temporary failure")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        let retried = result.unwrap();
        assert_eq!(retried.value, 42);
        assert_eq!(retried.attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Two failures, two waits, each longer than the previous
        assert_eq!(retried.backoffs.len(), 2);
        assert!(retried.backoffs[0] < retried.backoffs[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_all_failures() {
        let config = fast_config(4);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<Retried<i32>, _> = retry(&config, "test", |_| {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("permanent failure")
            }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(exhausted.last_error, "permanent failure");
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        // No wait after the final attempt
        assert_eq!(exhausted.backoffs.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_numbers_passed_to_operation() {
        let config = fast_config(3);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _: Result<Retried<()>, _> = retry(&config, "test", |attempt| {
            seen_clone.lock().unwrap().push(attempt);
            async { Err("nope") }
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig::default();

        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(3));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let config = RetryConfig::navigation(0, 1);
        assert_eq!(config.max_attempts, 1);
    }
}
