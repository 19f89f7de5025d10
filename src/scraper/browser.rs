//! Browser automation using chromiumoxide.

use std::time::Duration;

use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::debug;

use super::navigator::{PageSession, SessionLauncher};
use crate::config::ScraperConfig;
use crate::error::NavigationError;

/// Clicks the cookie banner's accept button if one is rendered.
const ACCEPT_COOKIES_JS: &str = r#"(() => {
    const byId = document.querySelector('#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll');
    const byText = Array.from(document.querySelectorAll('button, a'))
        .find(el => el.textContent.trim() === 'Accept All Cookies');
    const button = byId || byText;
    if (button) { button.click(); return true; }
    return false;
})()"#;

/// Settings applied to every session launched.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub user_agent: String,
    pub settle_delay: Duration,
    pub navigation_timeout: Duration,
}

impl BrowserOptions {
    pub fn from_config(config: &ScraperConfig, headless: bool) -> Self {
        Self {
            headless,
            chrome_path: config.chrome_path.clone(),
            user_agent: config.user_agent.clone(),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }

    fn chrome_executable(&self) -> String {
        if let Some(path) = &self.chrome_path {
            return path.clone();
        }
        if cfg!(target_os = "macos") {
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
        } else if cfg!(target_os = "windows") {
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe".to_string()
        } else {
            "google-chrome".to_string()
        }
    }
}

/// Launches one Chrome process per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    options: BrowserOptions,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Session = Browser;

    async fn launch(&self) -> Result<Browser, NavigationError> {
        Browser::launch(&self.options).await
    }
}

/// Browser wrapper for a single isolated session
pub struct Browser {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
    settle_delay: Duration,
    navigation_timeout: Duration,
}

impl Browser {
    /// Launch a new browser instance
    pub async fn launch(options: &BrowserOptions) -> Result<Self, NavigationError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(options.chrome_executable())
            .no_sandbox()
            .disable_default_args()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--mute-audio")
            .arg(format!("--user-agent={}", options.user_agent))
            .request_timeout(options.navigation_timeout)
            .window_size(1920, 1080);

        builder = if options.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };

        let config = builder.build().map_err(NavigationError::Launch)?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .map_err(|e| NavigationError::Launch(e.to_string()))?;

        // Spawn handler task - must keep running for browser to work
        let handle = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => continue, // Don't break on errors
                    None => break,
                }
            }
        });

        Ok(Self {
            browser,
            handle,
            settle_delay: options.settle_delay,
            navigation_timeout: options.navigation_timeout,
        })
    }

    /// Fetch page content with JavaScript rendering
    pub async fn fetch_page(&self, url: &str) -> Result<String, NavigationError> {
        let page = tokio::time::timeout(self.navigation_timeout, self.browser.new_page(url))
            .await
            .map_err(|_| NavigationError::Timeout {
                url: url.to_string(),
                after: self.navigation_timeout,
            })?
            .map_err(|e| NavigationError::page(url, e))?;

        // Content is rendered client-side after the initial response
        tokio::time::sleep(self.settle_delay).await;

        Self::dismiss_cookie_banner(&page).await;

        let html = page.content().await.map_err(|e| NavigationError::page(url, e));

        let _ = page.close().await;

        html
    }

    async fn dismiss_cookie_banner(page: &Page) {
        match page.evaluate(ACCEPT_COOKIES_JS).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    debug!("Cookie banner dismissed");
                    tokio::time::sleep(Duration::from_millis(300)).await;
                }
            }
            Err(e) => debug!("Cookie banner check failed: {}", e),
        }
    }
}

impl PageSession for Browser {
    async fn load(&mut self, url: &str) -> Result<String, NavigationError> {
        self.fetch_page(url).await
    }

    async fn close(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handle.abort();
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
