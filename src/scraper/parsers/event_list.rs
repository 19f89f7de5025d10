//! Events listing parser for hltv.org/events.

use scraper::Html;

use super::{
    attr, date_from_unix_millis, element_text, event_id_from_url, first_text, looks_like_date,
    select_all,
};
use crate::types::EventRecord;

/// Parser for the ongoing/upcoming events listing
pub struct EventListParser;

impl EventListParser {
    /// Parse every event card; cards without an id are kept with `id: None`
    pub fn parse(html: &str) -> Vec<EventRecord> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        select_all(root, "a.big-event, a.small-event, a.ongoing-event")
            .into_iter()
            .map(|card| {
                let id = attr(card, "href").and_then(|href| event_id_from_url(&href));

                let name = first_text(card, ".big-event-name, .small-event-name, .event-name-small")
                    .or_else(|| {
                        element_text(card)
                            .and_then(|t| t.lines().next().map(|l| l.trim().to_string()))
                    });

                let dates: Vec<_> = select_all(card, "span[data-unix]")
                    .into_iter()
                    .filter_map(|span| attr(span, "data-unix"))
                    .filter_map(|millis| date_from_unix_millis(&millis))
                    .collect();
                let start_date = dates.first().copied();
                let end_date = dates.get(1).copied().or(start_date);

                let location = select_all(card, ".big-event-location, span.text-ellipsis")
                    .into_iter()
                    .filter_map(element_text)
                    .find(|t| !looks_like_date(t) && Some(t) != name.as_ref());

                let is_big = card
                    .value()
                    .attr("class")
                    .is_some_and(|class| class.contains("big-event"));
                let event_type = Some(if is_big { "LAN" } else { "Online" }.to_string());

                EventRecord {
                    id,
                    name,
                    start_date,
                    end_date,
                    location,
                    event_type,
                    prize_pool: None,
                }
            })
            .collect()
    }
}
