//! Partial records produced by the parsers.
//!
//! Every field is optional: `None` means the page did not yield a value, and
//! the store never overwrites existing data with it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Event (tournament) fields as scraped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub prize_pool: Option<String>,
}

/// Team profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub world_rank: Option<i64>,
}

/// Player profile and career metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: Option<i64>,
    pub nickname: Option<String>,
    pub real_name: Option<String>,
    pub country: Option<String>,
    pub age: Option<i64>,
    pub current_team_id: Option<i64>,
    // Career totals
    pub total_maps: Option<i64>,
    pub total_rounds: Option<i64>,
    pub total_kills: Option<i64>,
    pub total_deaths: Option<i64>,
    // Ratios and rates
    pub kd_ratio: Option<f64>,
    pub headshot_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub kpr: Option<f64>,
    pub apr: Option<f64>,
    pub kast: Option<f64>,
    pub impact: Option<f64>,
    pub adr: Option<f64>,
}

/// One player listed on a team page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: Option<i64>,
    pub nickname: Option<String>,
    pub role: Option<String>,
}

/// Everything a team page yields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPage {
    pub team: TeamRecord,
    pub roster: Vec<RosterEntry>,
}

/// A team's final placement in an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub team_id: Option<i64>,
    pub placement: Option<i64>,
    pub prize: Option<String>,
}

/// Everything an event page yields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    pub event: EventRecord,
    pub teams_count: Option<i64>,
    /// Participating teams, one entry per distinct id
    pub teams: Vec<TeamRecord>,
    pub placements: Vec<Placement>,
}

/// A player's line in an event's stats table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStatRecord {
    pub player_id: Option<i64>,
    pub nickname: Option<String>,
    pub maps_played: Option<i64>,
    pub rating: Option<f64>,
    pub kd_ratio: Option<f64>,
}

/// Attributes of an event/team link row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTeamRecord {
    pub placement: Option<i64>,
    pub prize: Option<String>,
}

/// Attributes of a team/player roster row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamPlayerRecord {
    pub role: Option<String>,
    pub is_current: Option<bool>,
}

/// Card from the archived events listing.
///
/// Kept as loose strings: this is what the archive JSON file stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveEvent {
    pub id: String,
    pub name: String,
    pub teams_count: String,
    pub prize_pool: String,
    pub format: String,
    pub location: String,
    pub dates: String,
    pub url: String,
}

impl ArchiveEvent {
    /// Numeric team count, accepting forms like "16+"
    pub fn teams(&self) -> Option<u32> {
        self.teams_count.trim().trim_end_matches('+').parse().ok()
    }

    /// Convert to an event record; placeholder values become `None`
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            id: self.id.trim().parse().ok(),
            name: known(&self.name),
            location: known(&self.location),
            event_type: known(&self.format),
            prize_pool: known(&self.prize_pool),
            ..Default::default()
        }
    }
}

fn known(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(value.to_string())
    }
}

/// One side of a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchTeam {
    pub name: Option<String>,
    pub score: Option<i64>,
}

/// Result on a single map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapResult {
    pub map_name: Option<String>,
    pub result: Option<String>,
}

/// A player's total-stats line on a match page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayerLine {
    pub team: Option<String>,
    pub player_id: Option<i64>,
    pub nickname: Option<String>,
    pub country: Option<String>,
    pub kd: Option<String>,
    pub plus_minus: Option<String>,
    pub adr: Option<f64>,
    pub swing: Option<String>,
    pub rating: Option<f64>,
}

/// Match page scorecard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchScorecard {
    pub match_id: Option<i64>,
    pub url: String,
    pub team1: MatchTeam,
    pub team2: MatchTeam,
    pub maps: Vec<MapResult>,
    pub players: Vec<MatchPlayerLine>,
}
