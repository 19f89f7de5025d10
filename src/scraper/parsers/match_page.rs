//! Match page scorecard parser.

use scraper::{ElementRef, Html};

use super::{
    attr, element_text, first_attr, first_text, match_id_from_url, parse_float, parse_int,
    player_id_from_url, select_all, select_first,
};
use crate::types::{MapResult, MatchPlayerLine, MatchScorecard, MatchTeam};

/// Parser for `/matches/<id>/<slug>`
pub struct MatchParser;

impl MatchParser {
    pub fn parse(html: &str, url: &str) -> MatchScorecard {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let maps = select_all(root, ".mapholder")
            .into_iter()
            .map(|holder| MapResult {
                map_name: first_text(holder, ".mapname"),
                result: first_text(holder, ".results"),
            })
            .filter(|map| map.map_name.is_some())
            .collect();

        MatchScorecard {
            match_id: match_id_from_url(url),
            url: url.to_string(),
            team1: Self::parse_team(root, "team1"),
            team2: Self::parse_team(root, "team2"),
            maps,
            players: Self::parse_totals(root),
        }
    }

    fn parse_team(root: ElementRef, side: &str) -> MatchTeam {
        let gradient = format!(
            ".{side}-gradient div.won, .{side}-gradient div.lost, .{side}-gradient div.tie"
        );
        let score = first_text(root, &format!(".{side} .{side}-score"))
            .or_else(|| first_text(root, &gradient))
            .and_then(|text| parse_int(&text));

        MatchTeam {
            name: first_text(root, &format!(".{side} .teamName")),
            score,
        }
    }

    /// Visible `totalstats` tables only; the first two are the match totals.
    fn parse_totals(root: ElementRef) -> Vec<MatchPlayerLine> {
        select_all(root, ".stats-content table.totalstats")
            .into_iter()
            .filter(|table| {
                !table
                    .value()
                    .attr("class")
                    .is_some_and(|class| class.contains("hidden"))
            })
            .take(2)
            .flat_map(|table| {
                let team = first_text(table, ".teamName");
                select_all(table, "tr")
                    .into_iter()
                    .skip(1)
                    .filter_map(move |row| Self::parse_player_row(row, team.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn parse_player_row(row: ElementRef, team: Option<String>) -> Option<MatchPlayerLine> {
        let cols = select_all(row, "td");
        if cols.len() < 6 {
            return None;
        }
        let player_cell = cols[0];
        let text = |index: usize| element_text(cols[index]);

        Some(MatchPlayerLine {
            team,
            player_id: select_first(player_cell, "a[href]")
                .and_then(|link| attr(link, "href"))
                .and_then(|href| player_id_from_url(&href)),
            nickname: first_text(player_cell, ".player-nick").or_else(|| element_text(player_cell)),
            country: first_attr(player_cell, "img.flag", "title"),
            kd: text(1),
            plus_minus: text(2),
            adr: text(3).and_then(|t| parse_float(&t)),
            swing: text(4),
            rating: text(5).and_then(|t| parse_float(&t)),
        })
    }
}
