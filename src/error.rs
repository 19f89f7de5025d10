//! Error types for navigation and fetching.
//!
//! Extraction never errors (missing fields become `None`) and persistence
//! uses `anyhow`, so only the navigation side needs a typed taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Why a single navigation attempt did not produce a usable document.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The site served an anti-bot interstitial instead of content.
    #[error("challenge page detected at {url} ({signals} signals)")]
    ChallengeDetected { url: String, signals: usize },

    /// The browser process could not be started.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// The page did not load within the navigation timeout.
    #[error("navigation to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// Any other failure while loading or reading the page.
    #[error("navigation to {url} failed: {message}")]
    Page { url: String, message: String },
}

impl NavigationError {
    pub fn page(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Page {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_challenge(&self) -> bool {
        matches!(self, Self::ChallengeDetected { .. })
    }
}

/// Returned once every attempt for a URL has failed.
#[derive(Debug, Error)]
#[error("giving up on {url} after {attempts} attempts: {last_error}")]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    pub last_error: NavigationError,
    pub backoffs: Vec<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_classification() {
        let challenge = NavigationError::ChallengeDetected {
            url: "https://www.hltv.org/events".to_string(),
            signals: 2,
        };
        assert!(challenge.is_challenge());

        let timeout = NavigationError::Timeout {
            url: "https://www.hltv.org/events".to_string(),
            after: Duration::from_secs(60),
        };
        assert!(!timeout.is_challenge());
    }

    #[test]
    fn test_fetch_failure_message() {
        let failure = FetchFailure {
            url: "https://www.hltv.org/team/1/a".to_string(),
            attempts: 3,
            last_error: NavigationError::Launch("no chrome".to_string()),
            backoffs: vec![],
        };
        let msg = failure.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("no chrome"));
    }
}
