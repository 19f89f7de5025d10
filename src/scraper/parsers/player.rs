//! Player statistics page parser.
//!
//! Profile fields come from the summary header, falling back to the page
//! title (`First 'nick' Last Counter-Strike Statistics | HLTV.org`). Career
//! metrics come from `.stats-row` label/value pairs and the summary
//! breakdown boxes; the first value found for a metric wins.

use scraper::Html;

use super::{
    attr, element_text, first_attr, first_text, parse_float, parse_int, select_all,
    team_id_from_url,
};
use crate::types::PlayerRecord;

/// Parser for `/stats/players/<id>/<slug>`
pub struct PlayerParser;

impl PlayerParser {
    pub fn parse(html: &str, player_id: i64) -> PlayerRecord {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let title = TitleName::parse(first_text(root, "title").as_deref().unwrap_or(""));

        let mut player = PlayerRecord {
            id: Some(player_id),
            nickname: first_text(root, ".summaryNickname, .playerNickname, .player-nick")
                .or(title.nickname),
            real_name: first_text(root, ".summaryRealname, .playerRealname, .player-realname")
                .or(title.real_name),
            country: first_attr(
                root,
                ".summaryRealname img.flag, .playerRealname .flag, .player-summary-stat-box-left-flag .flag",
                "title",
            ),
            age: first_text(
                root,
                ".summaryPlayerAge, .playerAge, .player-summary-stat-box-left-player-age",
            )
            .and_then(|text| parse_int(&text)),
            current_team_id: select_all(root, ".SummaryTeamname a[href], .playerTeam a[href]")
                .into_iter()
                .find_map(|link| attr(link, "href").and_then(|href| team_id_from_url(&href))),
            ..Default::default()
        };

        for row in select_all(root, ".stats-row") {
            let spans = select_all(row, "span");
            if let (Some(label), Some(value)) = (
                spans.first().and_then(|s| element_text(*s)),
                spans.get(1).and_then(|s| element_text(*s)),
            ) {
                apply_stat(&mut player, &label, &value);
            }
        }

        for breakdown in select_all(root, ".summaryBreakdown") {
            if let (Some(label), Some(value)) = (
                first_text(breakdown, ".summaryStatBreakdownSubHeader"),
                first_text(breakdown, ".summaryStatBreakdownDataValue"),
            ) {
                apply_stat(&mut player, &label, &value);
            }
        }

        for wrapper in select_all(root, ".player-summary-stat-box-data-wrapper") {
            if let (Some(label), Some(value)) = (
                first_text(wrapper, ".player-summary-stat-box-data-description-text"),
                first_text(wrapper, ".player-summary-stat-box-data"),
            ) {
                apply_stat(&mut player, &label, &value);
            }
        }

        if player.rating.is_none() {
            player.rating = first_text(root, ".player-summary-stat-box-rating-data-text")
                .and_then(|text| parse_float(&text));
        }

        player
    }
}

/// Record one labelled metric unless it is already known.
fn apply_stat(player: &mut PlayerRecord, label: &str, value: &str) {
    let label = label.to_lowercase();
    let per_round = label.contains('/') || label.contains("per round");

    fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
        if slot.is_none() {
            *slot = value;
        }
    }

    if label.contains("headshot") {
        fill(&mut player.headshot_percentage, parse_float(value));
    } else if label.contains("k/d ratio") {
        fill(&mut player.kd_ratio, parse_float(value));
    } else if label.contains("maps played") {
        fill(&mut player.total_maps, parse_int(value));
    } else if label.contains("rounds played") {
        fill(&mut player.total_rounds, parse_int(value));
    } else if label.contains("assists") && per_round {
        fill(&mut player.apr, parse_float(value));
    } else if (label.contains("kills") && per_round) || label == "kpr" {
        fill(&mut player.kpr, parse_float(value));
    } else if label.contains("kills") {
        fill(&mut player.total_kills, parse_int(value));
    } else if label.contains("deaths") && !per_round {
        fill(&mut player.total_deaths, parse_int(value));
    } else if label.contains("adr") || (label.contains("damage") && per_round) {
        fill(&mut player.adr, parse_float(value));
    } else if label.contains("kast") {
        fill(&mut player.kast, parse_float(value));
    } else if label.contains("impact") {
        fill(&mut player.impact, parse_float(value));
    } else if label.contains("rating") {
        fill(&mut player.rating, parse_float(value));
    }
}

/// Names embedded in a title like `Jonathan 'EliGE' Jablonowski ...`
#[derive(Debug, Default, PartialEq)]
struct TitleName {
    nickname: Option<String>,
    real_name: Option<String>,
}

impl TitleName {
    fn parse(title: &str) -> Self {
        let mut parts = title.splitn(3, '\'');
        let (Some(first), Some(nick), Some(rest)) = (parts.next(), parts.next(), parts.next())
        else {
            return Self::default();
        };

        let nick = nick.trim();
        let last = rest
            .split(" Counter-Strike")
            .next()
            .unwrap_or("")
            .split(" | ")
            .next()
            .unwrap_or("")
            .trim();
        let real_name = [first.trim(), last]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            nickname: (!nick.is_empty()).then(|| nick.to_string()),
            real_name: (!real_name.is_empty()).then_some(real_name),
        }
    }
}
