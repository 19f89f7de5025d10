//! Retrying page fetcher: the seam between sync operations and the browser.

use tracing::info;

use super::navigator::{open, Document, SessionLauncher};
use crate::error::FetchFailure;
use crate::retry::{retry, RetryConfig, Retried};

/// Anything that can turn a URL into a rendered document.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchFailure>;
}

/// Fetch `url`, opening a fresh session per attempt and backing off linearly.
pub async fn fetch_with_retry<L: SessionLauncher>(
    launcher: &L,
    url: &str,
    config: &RetryConfig,
) -> Result<Retried<Document>, FetchFailure> {
    retry(config, url, |attempt| {
        info!("Opening {} (attempt {}/{})", url, attempt, config.max_attempts);
        open(launcher, url)
    })
    .await
    .map_err(|exhausted| FetchFailure {
        url: url.to_string(),
        attempts: exhausted.attempts,
        last_error: exhausted.last_error,
        backoffs: exhausted.backoffs,
    })
}

/// `PageFetcher` backed by a session launcher and a retry policy.
pub struct RetryingFetcher<L> {
    launcher: L,
    retry: RetryConfig,
}

impl<L: SessionLauncher> RetryingFetcher<L> {
    pub fn new(launcher: L, retry: RetryConfig) -> Self {
        Self { launcher, retry }
    }
}

impl<L: SessionLauncher> PageFetcher for RetryingFetcher<L> {
    async fn fetch(&self, url: &str) -> Result<Document, FetchFailure> {
        let retried = fetch_with_retry(&self.launcher, url, &self.retry).await?;
        if retried.attempts > 1 {
            info!(
                "Loaded {} after {} attempts (backed off {:?})",
                url, retried.attempts, retried.backoffs
            );
        }
        Ok(retried.value)
    }
}
