//! JSON interchange files.
//!
//! - archive listing: `hltv_archive_events.json`, an array of archive cards
//! - full event payloads: `hltv_event_<id>_full.json`
//! - match scorecards: `hltv_match_<id>.json`
//!
//! Readers tolerate missing keys; writers emit pretty JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::{
    ArchiveEvent, EventPage, EventRecord, EventStatRecord, MatchScorecard, Placement, TeamRecord,
};

const PAYLOAD_PREFIX: &str = "hltv_event_";
const PAYLOAD_SUFFIX: &str = "_full.json";

/// Everything scraped for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    pub event_id: Option<i64>,
    pub name: Option<String>,
    pub overview: EventRecord,
    pub teams_count: Option<i64>,
    pub teams_attending: Vec<TeamRecord>,
    pub placements: Vec<Placement>,
    pub stats: PayloadStats,
    pub scraped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadStats {
    pub top_players: Vec<EventStatRecord>,
}

impl EventPayload {
    pub fn new(event_id: i64, page: EventPage, top_players: Vec<EventStatRecord>) -> Self {
        Self {
            event_id: Some(event_id),
            name: page.event.name.clone(),
            overview: page.event,
            teams_count: page.teams_count,
            teams_attending: page.teams,
            placements: page.placements,
            stats: PayloadStats { top_players },
            scraped_at: Some(Utc::now()),
        }
    }

    /// Event id from the payload, falling back to the overview
    pub fn id(&self) -> Option<i64> {
        self.event_id.or(self.overview.id)
    }

    /// The event page this payload was built from
    pub fn to_page(&self) -> EventPage {
        let mut event = self.overview.clone();
        if event.name.is_none() {
            event.name = self.name.clone();
        }
        EventPage {
            event,
            teams_count: self.teams_count,
            teams: self.teams_attending.clone(),
            placements: self.placements.clone(),
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ==================== Archive ====================

/// Load the archive file; a missing file is an empty archive
pub fn load_archive(path: &Path) -> Result<Vec<ArchiveEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let events = serde_json::from_str(&content)
        .with_context(|| format!("Malformed archive file {}", path.display()))?;
    Ok(events)
}

pub fn save_archive(path: &Path, events: &[ArchiveEvent]) -> Result<()> {
    write_json(path, &events)
}

/// Append cards whose id is not yet present. Returns how many were added.
pub fn merge_archive(existing: &mut Vec<ArchiveEvent>, scraped: Vec<ArchiveEvent>) -> usize {
    let mut known: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();
    let before = existing.len();
    for event in scraped {
        if known.insert(event.id.clone()) {
            existing.push(event);
        }
    }
    existing.len() - before
}

// ==================== Event payloads ====================

pub fn payload_path(dir: &Path, event_id: i64) -> PathBuf {
    dir.join(format!("{}{}{}", PAYLOAD_PREFIX, event_id, PAYLOAD_SUFFIX))
}

pub fn save_payload(dir: &Path, event_id: i64, payload: &EventPayload) -> Result<PathBuf> {
    let path = payload_path(dir, event_id);
    write_json(&path, payload)?;
    Ok(path)
}

pub fn load_payload(path: &Path) -> Result<EventPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload = serde_json::from_str(&content)
        .with_context(|| format!("Malformed event payload {}", path.display()))?;
    Ok(payload)
}

/// Payload files in `dir`, sorted by name
pub fn list_payloads(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with(PAYLOAD_PREFIX) && name.ends_with(PAYLOAD_SUFFIX)
                })
        })
        .collect();
    paths.sort();
    Ok(paths)
}

// ==================== Matches ====================

pub fn save_match(dir: &Path, scorecard: &MatchScorecard) -> Result<PathBuf> {
    let id = scorecard
        .match_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = dir.join(format!("hltv_match_{}.json", id));
    write_json(&path, scorecard)?;
    Ok(path)
}
