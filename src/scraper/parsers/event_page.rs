//! Event overview page parser.
//!
//! Reads the `table.info` overview block, the older `.event-data` rows as a
//! fallback, participating team links and the final placements list.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::{
    attr, date_from_unix_millis, element_text, first_text, parse_int, select_all, select_first,
    team_id_from_url,
};
use crate::types::{EventPage, EventRecord, Placement, TeamRecord};

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)(?:st|nd|rd|th)").unwrap())
}

fn prize_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$[\d,]+").unwrap())
}

/// Parser for `/events/<id>/<slug>`
pub struct EventPageParser;

impl EventPageParser {
    pub fn parse(html: &str, event_id: i64) -> EventPage {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut event = EventRecord {
            id: Some(event_id),
            name: Self::parse_name(root),
            ..Default::default()
        };
        let mut teams_count = None;

        if let Some(info) = select_first(root, "table.info") {
            Self::parse_info_table(info, &mut event, &mut teams_count);
        }
        Self::parse_event_data_rows(root, &mut event, &mut teams_count);

        if event.prize_pool.is_none() {
            event.prize_pool = Self::largest_prize(root);
        }

        EventPage {
            event,
            teams_count,
            teams: Self::parse_teams(root),
            placements: Self::parse_placements(root),
        }
    }

    fn parse_name(root: ElementRef) -> Option<String> {
        first_text(root, ".event-hub-title").or_else(|| {
            first_text(root, "title").and_then(|title| {
                let name = title.split(" | HLTV").next().unwrap_or("").trim();
                (!name.is_empty()).then(|| name.to_string())
            })
        })
    }

    fn parse_info_table(info: ElementRef, event: &mut EventRecord, teams_count: &mut Option<i64>) {
        if let Some(cell) = select_first(info, "td.eventdate") {
            let dates: Vec<_> = select_all(cell, "span[data-unix]")
                .into_iter()
                .filter_map(|span| attr(span, "data-unix"))
                .filter_map(|millis| date_from_unix_millis(&millis))
                .collect();
            event.start_date = dates.first().copied();
            event.end_date = dates.get(1).copied().or(event.start_date);
        }

        event.prize_pool = first_text(info, "td.prizepool");
        *teams_count = first_text(info, "td.teamsNumber").and_then(|t| parse_int(&t));

        if let Some(cell) = select_first(info, "td.location") {
            event.location = first_text(cell, "span.text-ellipsis");
            event.event_type = element_text(cell).and_then(|text| event_type_from_location(&text));
        }
    }

    /// Older layout: `<tr><th>Key</th><td>Value</td></tr>`. Only fills gaps.
    fn parse_event_data_rows(
        root: ElementRef,
        event: &mut EventRecord,
        teams_count: &mut Option<i64>,
    ) {
        for row in select_all(root, ".event-data tr") {
            let (Some(key), Some(value)) = (first_text(row, "th"), first_text(row, "td")) else {
                continue;
            };
            let key = key.to_lowercase();

            if key.contains("prize pool") {
                event.prize_pool.get_or_insert(value);
            } else if key.starts_with("teams") {
                if teams_count.is_none() {
                    *teams_count = parse_int(&value);
                }
            } else if key.contains("location") {
                event.location.get_or_insert(value);
            }
        }
    }

    fn largest_prize(root: ElementRef) -> Option<String> {
        let text = element_text(root)?;
        prize_re()
            .find_iter(&text)
            .filter_map(|m| {
                let amount = parse_int(m.as_str())?;
                Some((amount, m.as_str().to_string()))
            })
            .max_by_key(|(amount, _)| *amount)
            .map(|(_, prize)| prize)
    }

    fn parse_teams(root: ElementRef) -> Vec<TeamRecord> {
        let mut teams: Vec<TeamRecord> = Vec::new();

        for link in select_all(root, "a[href]") {
            let Some(id) = attr(link, "href").and_then(|href| team_id_from_url(&href)) else {
                continue;
            };
            let name = element_text(link).or_else(|| {
                select_first(link, "img").and_then(|img| attr(img, "title"))
            });

            match teams.iter_mut().find(|t| t.id == Some(id)) {
                Some(existing) => {
                    if existing.name.is_none() {
                        existing.name = name;
                    }
                }
                None => teams.push(TeamRecord {
                    id: Some(id),
                    name,
                    ..Default::default()
                }),
            }
        }

        teams
    }

    fn parse_placements(root: ElementRef) -> Vec<Placement> {
        select_all(root, ".placement")
            .into_iter()
            .filter_map(|block| {
                let team_id = select_all(block, "a[href]")
                    .into_iter()
                    .find_map(|link| attr(link, "href").and_then(|href| team_id_from_url(&href)))?;
                let text = element_text(block).unwrap_or_default();

                let placement = ordinal_re()
                    .captures(&text)
                    .and_then(|caps| caps[1].parse().ok());
                let prize = first_text(block, ".prizeMoney")
                    .or_else(|| prize_re().find(&text).map(|m| m.as_str().to_string()));

                Some(Placement {
                    team_id: Some(team_id),
                    placement,
                    prize,
                })
            })
            .collect()
    }
}

/// Event type from the location cell, e.g. "Intl. LAN" or "Online".
fn event_type_from_location(text: &str) -> Option<String> {
    let kind = if text.contains("Online") {
        "Online"
    } else if text.contains("LAN") {
        if text.contains("Reg.") {
            "Regional"
        } else if text.contains("Local") {
            "Local"
        } else {
            "LAN"
        }
    } else {
        return None;
    };
    Some(kind.to_string())
}
