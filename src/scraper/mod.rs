//! Web scraper module for hltv.org
//!
//! Provides browser automation, challenge detection, retrying fetches and
//! HTML parsing.

pub mod browser;
pub mod challenge;
pub mod fetcher;
pub mod navigator;
pub mod parsers;
pub mod rate_limiter;

pub use browser::{BrowserOptions, ChromeLauncher};
pub use fetcher::{PageFetcher, RetryingFetcher};
pub use navigator::Document;
pub use rate_limiter::RateLimiter;

/// Base URL for hltv.org
pub const BASE_URL: &str = "https://www.hltv.org";

/// Build ongoing/upcoming events listing URL
pub fn events_url() -> String {
    format!("{}/events", BASE_URL)
}

/// Build event page URL; the slug is ignored by the site
pub fn event_url(event_id: i64) -> String {
    format!("{}/events/{}/a", BASE_URL, event_id)
}

/// Build team profile URL
pub fn team_url(team_id: i64) -> String {
    format!("{}/team/{}/a", BASE_URL, team_id)
}

/// Build player career statistics URL
pub fn player_stats_url(player_id: i64) -> String {
    format!("{}/stats/players/{}/a", BASE_URL, player_id)
}

/// Build per-event player statistics URL
pub fn event_stats_url(event_id: i64) -> String {
    format!("{}/stats/players?event={}", BASE_URL, event_id)
}

/// Build archived events listing URL
pub fn archive_url(offset: u32) -> String {
    format!("{}/events/archive?offset={}", BASE_URL, offset)
}
