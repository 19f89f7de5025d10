//! Configuration for hltv-sync.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryConfig;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "data/hltv_data.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Browser and navigation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Chrome/Chromium executable; platform default when unset
    #[serde(default)]
    pub chrome_path: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Wait after navigation for client-side rendering
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
    #[serde(default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,
    /// Pause between items in batch loops
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string()
}

fn default_settle_delay_ms() -> u64 {
    2500
}

fn default_navigation_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_secs() -> u64 {
    1
}

fn default_backoff_step_secs() -> u64 {
    1
}

fn default_item_delay_ms() -> u64 {
    1500
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            user_agent: default_user_agent(),
            settle_delay_ms: default_settle_delay_ms(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_step_secs: default_backoff_step_secs(),
            item_delay_ms: default_item_delay_ms(),
        }
    }
}

impl ScraperConfig {
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            step: Duration::from_secs(self.backoff_step_secs),
            ..RetryConfig::navigation(self.max_attempts, self.backoff_base_secs)
        }
    }
}

/// Output locations for JSON interchange files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_archive_file")]
    pub archive_file: String,
}

fn default_output_dir() -> String {
    "data/events".to_string()
}

fn default_archive_file() -> String {
    "hltv_archive_events.json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            archive_file: default_archive_file(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (HLTV_DATABASE__PATH, etc.)
            .add_source(
                config::Environment::with_prefix("HLTV")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database.path)
    }
}
