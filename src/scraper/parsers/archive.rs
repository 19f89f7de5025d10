//! Archived events listing parser (`/events/archive?offset=<n>`).

use scraper::{ElementRef, Html};

use super::{attr, element_text, event_id_from_url, first_text, select_all, select_first};
use crate::scraper::BASE_URL;
use crate::types::ArchiveEvent;

/// Cards per archive page; the `offset` query parameter steps by this.
pub const ARCHIVE_PAGE_SIZE: u32 = 50;

const UNKNOWN: &str = "Unknown";

/// Parser for archive listing pages
pub struct ArchiveParser;

impl ArchiveParser {
    /// Parse archive cards. Cards whose link carries no event id are skipped.
    pub fn parse(html: &str) -> Vec<ArchiveEvent> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        select_all(root, "a.small-event[href*='/events/']")
            .into_iter()
            .filter_map(Self::parse_card)
            .collect()
    }

    fn parse_card(card: ElementRef) -> Option<ArchiveEvent> {
        let href = attr(card, "href")?;
        let id = event_id_from_url(&href)?;

        let values: Vec<String> = select_all(card, "td.col-value")
            .into_iter()
            .map(|td| element_text(td).unwrap_or_default())
            .collect();
        let value = |index: usize, fallback: &str| {
            values
                .get(index)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let details = select_first(card, "tr.eventDetails");
        let location = details
            .and_then(|row| first_text(row, ".smallCountry .col-desc"))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let date_texts: Vec<String> = details
            .map(|row| select_all(row, "span[data-unix]"))
            .unwrap_or_default()
            .into_iter()
            .filter_map(element_text)
            .collect();
        let dates = match date_texts.as_slice() {
            [] => UNKNOWN.to_string(),
            [single] => single.clone(),
            [start, end, ..] => format!("{} - {}", start, end),
        };

        Some(ArchiveEvent {
            id: id.to_string(),
            name: first_text(card, ".text-ellipsis").unwrap_or_else(|| UNKNOWN.to_string()),
            teams_count: value(1, "0"),
            prize_pool: value(2, UNKNOWN),
            format: value(3, UNKNOWN),
            location,
            dates,
            url: format!("{}{}", BASE_URL, href),
        })
    }
}
