//! Fixed-interval pacing between batch items.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Spaces consecutive requests at least `interval` apart.
///
/// The first call never waits.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimiterState>>,
}

struct RateLimiterState {
    last_request: Option<Instant>,
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimiterState {
                last_request: None,
                interval,
            })),
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// No pacing at all (tests, single-item commands)
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until the interval since the previous call has elapsed
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let ready_at = last + state.interval;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }

        state.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::from_millis(1500);
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_acquires_are_spaced() {
        let limiter = RateLimiter::from_millis(1500);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_passed() {
        let limiter = RateLimiter::from_millis(100);
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
