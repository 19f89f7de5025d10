//! Team profile parser.

use scraper::{ElementRef, Html};

use super::{
    attr, element_text, first_attr, first_text, parse_int, player_id_from_url, select_all,
    select_first,
};
use crate::types::{RosterEntry, TeamPage, TeamRecord};

/// Parser for `/team/<id>/<slug>`
pub struct TeamParser;

impl TeamParser {
    pub fn parse(html: &str, team_id: i64) -> TeamPage {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let team = TeamRecord {
            id: Some(team_id),
            name: first_text(root, ".profile-team-name"),
            country: first_attr(root, ".team-country img.flag, .team-country .flag", "title")
                .or_else(|| first_text(root, ".team-country")),
            world_rank: Self::parse_world_rank(root),
        };

        let mut roster = Self::parse_lineup(root);
        if let Some(coach) = Self::parse_coach(root) {
            if !roster.iter().any(|p| p.player_id == coach.player_id) {
                roster.push(coach);
            }
        }

        TeamPage { team, roster }
    }

    /// "#12" from the world ranking stat box
    fn parse_world_rank(root: ElementRef) -> Option<i64> {
        select_all(root, ".profile-team-stat")
            .into_iter()
            .find(|stat| {
                element_text(*stat).is_some_and(|t| t.to_lowercase().contains("world ranking"))
            })
            .or_else(|| select_first(root, ".profile-team-stat"))
            .and_then(|stat| first_text(stat, ".right"))
            .and_then(|text| parse_int(&text))
    }

    fn parse_lineup(root: ElementRef) -> Vec<RosterEntry> {
        let mut roster: Vec<RosterEntry> = Vec::new();

        for link in select_all(root, ".bodyshot-team a[href]") {
            let Some(player_id) = attr(link, "href").and_then(|href| player_id_from_url(&href))
            else {
                continue;
            };
            if roster.iter().any(|p| p.player_id == Some(player_id)) {
                continue;
            }

            let nickname = first_text(link, ".playerFlagName .text-ellipsis, .text-ellipsis")
                .or_else(|| attr(link, "title"))
                .or_else(|| element_text(link));

            roster.push(RosterEntry {
                player_id: Some(player_id),
                nickname,
                role: Some("player".to_string()),
            });
        }

        roster
    }

    fn parse_coach(root: ElementRef) -> Option<RosterEntry> {
        let link = select_first(root, ".coach-col a[href]")?;
        let player_id = attr(link, "href").and_then(|href| player_id_from_url(&href))?;
        Some(RosterEntry {
            player_id: Some(player_id),
            nickname: first_text(link, ".text-ellipsis").or_else(|| element_text(link)),
            role: Some("coach".to_string()),
        })
    }
}
