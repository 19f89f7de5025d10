//! HTML parsers for hltv.org pages.
//!
//! Field lookups go through the `Option`-returning helpers below: a missing
//! element or an unparseable value yields `None` for that field only.

pub mod archive;
pub mod event_list;
pub mod event_page;
pub mod event_stats;
pub mod match_page;
pub mod player;
pub mod team;

pub use archive::ArchiveParser;
pub use event_list::EventListParser;
pub use event_page::EventPageParser;
pub use event_stats::EventStatsParser;
pub use match_page::MatchParser;
pub use player::PlayerParser;
pub use team::TeamParser;

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Selector};

/// All elements under `scope` matching `css`; an invalid selector matches nothing.
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// First element under `scope` matching `css`.
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Trimmed, whitespace-collapsed text of an element; `None` when empty.
pub(crate) fn element_text(element: ElementRef) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Text of the first element matching `css`.
pub(crate) fn first_text(scope: ElementRef, css: &str) -> Option<String> {
    select_first(scope, css).and_then(element_text)
}

/// Attribute of the first element matching `css`.
pub(crate) fn first_attr(scope: ElementRef, css: &str, attr: &str) -> Option<String> {
    select_first(scope, css)
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Non-empty attribute value of an element.
pub(crate) fn attr(element: ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap())
}

fn strip_decorations(text: &str) -> String {
    text.replace([',', '%', '#'], "")
}

/// First decimal number in `text` after removing separators and percent signs.
pub fn parse_float(text: &str) -> Option<f64> {
    let cleaned = strip_decorations(text);
    number_re().find(&cleaned)?.as_str().parse().ok()
}

/// First integer in `text` after removing separators, `%` and `#`.
pub fn parse_int(text: &str) -> Option<i64> {
    let cleaned = strip_decorations(text);
    let number = number_re().find(&cleaned)?.as_str();
    match number.split_once('.') {
        Some((whole, _)) => whole.parse().ok(),
        None => number.parse().ok(),
    }
}

/// Numeric path segment following one of `segments`.
///
/// `/stats/players/16848/hades` with `["player", "players"]` gives 16848.
pub fn id_after_segment(url: &str, segments: &[&str]) -> Option<i64> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let parts: Vec<&str> = path.split('/').collect();
    parts
        .windows(2)
        .find(|pair| segments.contains(&pair[0]))
        .and_then(|pair| pair[1].parse().ok())
}

pub fn team_id_from_url(url: &str) -> Option<i64> {
    id_after_segment(url, &["team", "teams"])
}

pub fn player_id_from_url(url: &str) -> Option<i64> {
    id_after_segment(url, &["player", "players"])
}

pub fn event_id_from_url(url: &str) -> Option<i64> {
    id_after_segment(url, &["events", "event"])
}

pub fn match_id_from_url(url: &str) -> Option<i64> {
    id_after_segment(url, &["matches"])
}

/// Date from a `data-unix` millisecond timestamp (UTC).
pub fn date_from_unix_millis(text: &str) -> Option<NaiveDate> {
    let millis: i64 = text.trim().parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Whether text looks like a date range such as "Nov 24th - Nov 27th".
pub(crate) fn looks_like_date(text: &str) -> bool {
    MONTHS.iter().any(|m| text.contains(m))
}
