//! Per-event player statistics table parser.

use scraper::{ElementRef, Html};

use super::{
    attr, element_text, first_text, parse_float, parse_int, player_id_from_url, select_all,
    select_first,
};
use crate::types::EventStatRecord;

/// Column positions within a stats row
#[derive(Debug, PartialEq)]
struct Columns {
    maps: usize,
    rating: usize,
    kd: usize,
}

impl Default for Columns {
    /// Player | Maps | Rating | K/D
    fn default() -> Self {
        Self {
            maps: 1,
            rating: 2,
            kd: 3,
        }
    }
}

impl Columns {
    /// Locate columns by header label, keeping the default for any not found.
    fn from_header(table: ElementRef) -> Self {
        let mut columns = Self::default();
        let labels: Vec<String> = select_all(table, "thead th")
            .into_iter()
            .map(|th| element_text(th).unwrap_or_default().to_lowercase())
            .collect();

        for (index, label) in labels.iter().enumerate() {
            if label.starts_with("maps") {
                columns.maps = index;
            } else if label.starts_with("rating") {
                columns.rating = index;
            } else if label == "k/d" {
                columns.kd = index;
            }
        }

        columns
    }
}

/// Parser for `/stats/players?event=<id>`
pub struct EventStatsParser;

impl EventStatsParser {
    pub fn parse(html: &str) -> Vec<EventStatRecord> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let Some(table) = select_first(root, "table.stats-table") else {
            return Vec::new();
        };
        let columns = Columns::from_header(table);

        select_all(table, "tbody tr")
            .into_iter()
            .filter_map(|row| {
                let link = select_first(row, "td.playerCol a[href]")?;
                let cells = select_all(row, "td");
                let cell = |index: usize| cells.get(index).and_then(|td| element_text(*td));

                Some(EventStatRecord {
                    player_id: attr(link, "href").and_then(|href| player_id_from_url(&href)),
                    nickname: first_text(row, "td.playerCol a"),
                    maps_played: cell(columns.maps).and_then(|t| parse_int(&t)),
                    rating: cell(columns.rating).and_then(|t| parse_float(&t)),
                    kd_ratio: cell(columns.kd).and_then(|t| parse_float(&t)),
                })
            })
            .collect()
    }
}
