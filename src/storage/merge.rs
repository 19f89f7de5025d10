//! Stored rows and their merge rules.
//!
//! A merge copies every incoming `Some` over the stored value and leaves the
//! stored value alone on `None`. Nothing scraped can null out a column.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{
    EventRecord, EventStatRecord, EventTeamRecord, PlayerRecord, TeamPlayerRecord, TeamRecord,
};

/// Overwrite `slot` with `incoming` when present. Returns true on change.
fn merge_field<T: Clone + PartialEq>(slot: &mut Option<T>, incoming: &Option<T>) -> bool {
    match incoming {
        Some(value) if slot.as_ref() != Some(value) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: i64,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub prize_pool: Option<String>,
}

impl Event {
    pub fn from_record(id: i64, record: &EventRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            start_date: record.start_date,
            end_date: record.end_date,
            location: record.location.clone(),
            event_type: record.event_type.clone(),
            prize_pool: record.prize_pool.clone(),
        }
    }

    pub fn merge(&mut self, record: &EventRecord) -> bool {
        let mut changed = merge_field(&mut self.name, &record.name);
        changed |= merge_field(&mut self.start_date, &record.start_date);
        changed |= merge_field(&mut self.end_date, &record.end_date);
        changed |= merge_field(&mut self.location, &record.location);
        changed |= merge_field(&mut self.event_type, &record.event_type);
        changed |= merge_field(&mut self.prize_pool, &record.prize_pool);
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
    pub world_rank: Option<i64>,
}

impl Team {
    pub fn from_record(id: i64, record: &TeamRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            country: record.country.clone(),
            world_rank: record.world_rank,
        }
    }

    pub fn merge(&mut self, record: &TeamRecord) -> bool {
        let mut changed = merge_field(&mut self.name, &record.name);
        changed |= merge_field(&mut self.country, &record.country);
        changed |= merge_field(&mut self.world_rank, &record.world_rank);
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: i64,
    pub nickname: Option<String>,
    pub real_name: Option<String>,
    pub country: Option<String>,
    pub age: Option<i64>,
    pub current_team_id: Option<i64>,
    pub total_maps: Option<i64>,
    pub total_rounds: Option<i64>,
    pub total_kills: Option<i64>,
    pub total_deaths: Option<i64>,
    pub kd_ratio: Option<f64>,
    pub headshot_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub kpr: Option<f64>,
    pub apr: Option<f64>,
    pub kast: Option<f64>,
    pub impact: Option<f64>,
    pub adr: Option<f64>,
}

impl Player {
    pub fn from_record(id: i64, record: &PlayerRecord) -> Self {
        Self {
            id,
            nickname: record.nickname.clone(),
            real_name: record.real_name.clone(),
            country: record.country.clone(),
            age: record.age,
            current_team_id: record.current_team_id,
            total_maps: record.total_maps,
            total_rounds: record.total_rounds,
            total_kills: record.total_kills,
            total_deaths: record.total_deaths,
            kd_ratio: record.kd_ratio,
            headshot_percentage: record.headshot_percentage,
            rating: record.rating,
            kpr: record.kpr,
            apr: record.apr,
            kast: record.kast,
            impact: record.impact,
            adr: record.adr,
        }
    }

    pub fn merge(&mut self, record: &PlayerRecord) -> bool {
        let mut changed = merge_field(&mut self.nickname, &record.nickname);
        changed |= merge_field(&mut self.real_name, &record.real_name);
        changed |= merge_field(&mut self.country, &record.country);
        changed |= merge_field(&mut self.age, &record.age);
        changed |= merge_field(&mut self.current_team_id, &record.current_team_id);
        changed |= merge_field(&mut self.total_maps, &record.total_maps);
        changed |= merge_field(&mut self.total_rounds, &record.total_rounds);
        changed |= merge_field(&mut self.total_kills, &record.total_kills);
        changed |= merge_field(&mut self.total_deaths, &record.total_deaths);
        changed |= merge_field(&mut self.kd_ratio, &record.kd_ratio);
        changed |= merge_field(&mut self.headshot_percentage, &record.headshot_percentage);
        changed |= merge_field(&mut self.rating, &record.rating);
        changed |= merge_field(&mut self.kpr, &record.kpr);
        changed |= merge_field(&mut self.apr, &record.apr);
        changed |= merge_field(&mut self.kast, &record.kast);
        changed |= merge_field(&mut self.impact, &record.impact);
        changed |= merge_field(&mut self.adr, &record.adr);
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTeam {
    pub event_id: i64,
    pub team_id: i64,
    pub placement: Option<i64>,
    pub prize: Option<String>,
}

impl EventTeam {
    pub fn from_record(event_id: i64, team_id: i64, record: &EventTeamRecord) -> Self {
        Self {
            event_id,
            team_id,
            placement: record.placement,
            prize: record.prize.clone(),
        }
    }

    pub fn merge(&mut self, record: &EventTeamRecord) -> bool {
        let mut changed = merge_field(&mut self.placement, &record.placement);
        changed |= merge_field(&mut self.prize, &record.prize);
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPlayer {
    pub team_id: i64,
    pub player_id: i64,
    pub role: Option<String>,
    pub is_current: Option<bool>,
}

impl TeamPlayer {
    pub fn from_record(team_id: i64, player_id: i64, record: &TeamPlayerRecord) -> Self {
        Self {
            team_id,
            player_id,
            role: record.role.clone(),
            is_current: record.is_current,
        }
    }

    pub fn merge(&mut self, record: &TeamPlayerRecord) -> bool {
        let mut changed = merge_field(&mut self.role, &record.role);
        changed |= merge_field(&mut self.is_current, &record.is_current);
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStat {
    pub event_id: i64,
    pub player_id: i64,
    pub rating: Option<f64>,
    pub maps_played: Option<i64>,
    pub kd_ratio: Option<f64>,
}

impl EventStat {
    pub fn from_record(event_id: i64, player_id: i64, record: &EventStatRecord) -> Self {
        Self {
            event_id,
            player_id,
            rating: record.rating,
            maps_played: record.maps_played,
            kd_ratio: record.kd_ratio,
        }
    }

    pub fn merge(&mut self, record: &EventStatRecord) -> bool {
        let mut changed = merge_field(&mut self.rating, &record.rating);
        changed |= merge_field(&mut self.maps_played, &record.maps_played);
        changed |= merge_field(&mut self.kd_ratio, &record.kd_ratio);
        changed
    }
}
