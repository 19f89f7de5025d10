//! One navigation attempt: fresh session, load, release, challenge gate.

use tracing::{debug, warn};

use super::challenge::{count_signals, MIN_SIGNALS};
use crate::error::NavigationError;

/// A rendered page, ready for extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub html: String,
}

/// An isolated browser session able to load pages.
#[allow(async_fn_in_trait)]
pub trait PageSession {
    /// Navigate, let client-side rendering settle and return the rendered HTML.
    async fn load(&mut self, url: &str) -> Result<String, NavigationError>;

    /// Release the session. Must not fail.
    async fn close(self);
}

/// Starts fresh sessions. One session is used for exactly one `open` call.
#[allow(async_fn_in_trait)]
pub trait SessionLauncher {
    type Session: PageSession;

    async fn launch(&self) -> Result<Self::Session, NavigationError>;
}

/// Open `url` in a brand new session.
///
/// The session is closed before returning on every path, including load
/// errors and challenge pages.
pub async fn open<L: SessionLauncher>(launcher: &L, url: &str) -> Result<Document, NavigationError> {
    let mut session = launcher.launch().await?;
    let loaded = session.load(url).await;
    session.close().await;

    let html = loaded?;
    let signals = count_signals(&html);
    if signals >= MIN_SIGNALS {
        warn!("Challenge page at {} ({} signals)", url, signals);
        return Err(NavigationError::ChallengeDetected {
            url: url.to_string(),
            signals,
        });
    }

    debug!("Loaded {} ({} bytes)", url, html.len());
    Ok(Document {
        url: url.to_string(),
        html,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted launcher: each launch pops the next outcome.
    #[derive(Clone, Default)]
    pub struct ScriptedLauncher {
        pub outcomes: Rc<RefCell<VecDeque<Result<String, NavigationError>>>>,
        pub launched: Rc<RefCell<u32>>,
        pub closed: Rc<RefCell<u32>>,
    }

    impl ScriptedLauncher {
        pub fn new(outcomes: Vec<Result<String, NavigationError>>) -> Self {
            Self {
                outcomes: Rc::new(RefCell::new(outcomes.into())),
                ..Default::default()
            }
        }
    }

    pub struct ScriptedSession {
        outcome: Option<Result<String, NavigationError>>,
        closed: Rc<RefCell<u32>>,
    }

    impl PageSession for ScriptedSession {
        async fn load(&mut self, url: &str) -> Result<String, NavigationError> {
            self.outcome
                .take()
                .unwrap_or_else(|| Err(NavigationError::page(url, "script exhausted")))
        }

        async fn close(self) {
            *self.closed.borrow_mut() += 1;
        }
    }

    impl SessionLauncher for ScriptedLauncher {
        type Session = ScriptedSession;

        async fn launch(&self) -> Result<ScriptedSession, NavigationError> {
            *self.launched.borrow_mut() += 1;
            let outcome = self.outcomes.borrow_mut().pop_front();
            Ok(ScriptedSession {
                outcome,
                closed: self.closed.clone(),
            })
        }
    }

    pub const CHALLENGE_HTML: &str =
        "<html><head><title>Just a moment...</title></head><body>Checking your browser before accessing hltv.org</body></html>";
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_open_returns_document() {
        let launcher = ScriptedLauncher::new(vec![Ok("<html>ok</html>".to_string())]);
        let doc = open(&launcher, "https://www.hltv.org/events").await.unwrap();
        assert_eq!(doc.html, "<html>ok</html>");
        assert_eq!(doc.url, "https://www.hltv.org/events");
        assert_eq!(*launcher.closed.borrow(), 1);
    }

    #[tokio::test]
    async fn test_open_flags_challenge_and_closes() {
        let launcher = ScriptedLauncher::new(vec![Ok(CHALLENGE_HTML.to_string())]);
        let err = open(&launcher, "https://www.hltv.org/events").await.unwrap_err();
        assert!(err.is_challenge());
        assert_eq!(*launcher.closed.borrow(), 1);
    }

    #[tokio::test]
    async fn test_open_closes_on_load_error() {
        let launcher = ScriptedLauncher::new(vec![Err(NavigationError::page(
            "https://www.hltv.org/events",
            "net::ERR_NAME_NOT_RESOLVED",
        ))]);
        let err = open(&launcher, "https://www.hltv.org/events").await.unwrap_err();
        assert!(!err.is_challenge());
        assert_eq!(*launcher.launched.borrow(), 1);
        assert_eq!(*launcher.closed.borrow(), 1);
    }

    #[tokio::test]
    async fn test_single_signal_page_passes() {
        let html = "<html><body>Please enable JavaScript and cookies for the comments widget</body></html>";
        let launcher = ScriptedLauncher::new(vec![Ok(html.to_string())]);
        assert!(open(&launcher, "https://www.hltv.org/team/1/a").await.is_ok());
    }
}
