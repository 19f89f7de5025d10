//! Sync operations: fetch a page, extract records, upsert them.
//!
//! Every operation goes through a [`Syncer`], which owns the pacing between
//! requests and borrows the fetcher and the store. Batch operations isolate
//! failures per item and tally them in a [`BatchReport`].

mod archive;
mod events;
mod payloads;
mod players;
mod teams;

use std::fmt;

use anyhow::Result;
use tracing::warn;

use crate::error::FetchFailure;
use crate::scraper::{Document, PageFetcher, RateLimiter};
use crate::storage::{Store, UnitOfWork};
use crate::types::{EventPage, EventRecord, EventStatRecord, EventTeamRecord, PlayerRecord, TeamRecord};

pub use archive::{import_archive, ArchiveImport};
pub use payloads::import_payloads;
pub use players::PlayerSelection;

/// Outcome tally of a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    /// Count one item's outcome, logging the failure. Returns the value on success.
    pub fn record<T>(&mut self, item: &str, outcome: Result<T>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.succeeded += 1;
                Some(value)
            }
            Err(e) => {
                warn!("{} failed: {:#}", item, e);
                self.failed += 1;
                None
            }
        }
    }

    pub fn skip(&mut self, item: &str, reason: &str) {
        warn!("Skipping {}: {}", item, reason);
        self.skipped += 1;
    }

    pub fn absorb(&mut self, other: BatchReport) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded, self.failed, self.skipped
        )
    }
}

/// Runs sync operations against one fetcher and one store.
pub struct Syncer<'a, F> {
    fetcher: &'a F,
    store: &'a Store,
    limiter: RateLimiter,
}

impl<'a, F: PageFetcher> Syncer<'a, F> {
    pub fn new(fetcher: &'a F, store: &'a Store, limiter: RateLimiter) -> Self {
        Self {
            fetcher,
            store,
            limiter,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Document, FetchFailure> {
        self.limiter.acquire().await;
        self.fetcher.fetch(url).await
    }
}

// ==================== Persistence ====================

/// Store an event overview, its participating teams and placements.
fn persist_event_page(uow: &UnitOfWork, event_id: i64, page: &EventPage) -> Result<()> {
    uow.upsert_event(event_id, &page.event)?;

    for team in &page.teams {
        let Some(team_id) = team.id else {
            warn!("Event {}: dropping team without id", event_id);
            continue;
        };
        uow.upsert_team(team_id, team)?;
        uow.upsert_event_team(event_id, team_id, &EventTeamRecord::default())?;
    }

    for placement in &page.placements {
        let Some(team_id) = placement.team_id else {
            warn!("Event {}: dropping placement without team id", event_id);
            continue;
        };
        uow.upsert_team(team_id, &TeamRecord::default())?;
        uow.upsert_event_team(
            event_id,
            team_id,
            &EventTeamRecord {
                placement: placement.placement,
                prize: placement.prize.clone(),
            },
        )?;
    }

    Ok(())
}

/// Store per-event stat lines, creating the event and players on first sighting.
/// Returns the number of lines stored.
fn persist_event_stats(uow: &UnitOfWork, event_id: i64, rows: &[EventStatRecord]) -> Result<usize> {
    uow.upsert_event(event_id, &EventRecord::default())?;

    let mut stored = 0;
    for row in rows {
        let Some(player_id) = row.player_id else {
            warn!(
                "Event {}: dropping stats row without player id ({:?})",
                event_id, row.nickname
            );
            continue;
        };
        let player = PlayerRecord {
            nickname: row.nickname.clone(),
            ..Default::default()
        };
        uow.upsert_player(player_id, &player)?;
        uow.upsert_event_stat(event_id, player_id, row)?;
        stored += 1;
    }

    Ok(stored)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal pages in the shapes the parsers read.

    pub const EVENTS_HTML: &str = r#"<html><body>
<a href="/events/8719/exort-series-17" class="a-reset small-event">
  <div class="small-event-name">Exort Series 17</div>
  <span data-unix="1753920000000">Jul 31st</span>
</a>
<a href="/events/7148/iem-cologne-2025" class="a-reset big-event">
  <div class="big-event-name">IEM Cologne 2025</div>
  <span class="big-event-location">Cologne, Germany</span>
</a>
<a href="/events/" class="a-reset small-event"><div class="small-event-name">Broken card</div></a>
</body></html>"#;

    pub const EVENT_HTML: &str = r#"<html><head><title>Exort Series 17 | HLTV.org</title></head><body>
<h1 class="event-hub-title">Exort Series 17</h1>
<table class="info"><tr>
  <td class="eventdate"><span data-unix="1753920000000">Jul 31st</span></td>
  <td class="prizepool">$50,000</td>
  <td class="teamsNumber">8</td>
  <td class="location"><span class="text-ellipsis">Europe</span> (Online)</td>
</tr></table>
<div class="teams-attending">
  <a href="/team/5973/liquid">Liquid</a>
  <a href="/team/9565/vitality"><img title="Vitality" src="vitality.png"></a>
</div>
<div class="placement"><a href="/team/5973/liquid">Liquid</a><div>1st</div><div class="prizeMoney">$25,000</div></div>
<div class="placement"><a href="/team/9565/vitality">Vitality</a><div>2nd</div><div class="prizeMoney">$10,000</div></div>
</body></html>"#;

    pub const LIQUID_HTML: &str = r#"<html><body>
<div class="profile-team-name">Liquid</div>
<div class="team-country"><img class="flag" title="United States"></div>
<div class="profile-team-stat"><b>World ranking</b><span class="right">#12</span></div>
<div class="bodyshot-team">
  <a href="/player/8738/elige" title="EliGE"><span class="text-ellipsis">EliGE</span></a>
  <a href="/player/11916/naf" title="NAF"><span class="text-ellipsis">NAF</span></a>
</div>
<div class="coach-col"><a href="/player/9216/peacemaker"><span class="text-ellipsis">peacemaker</span></a></div>
</body></html>"#;

    pub const ELIGE_HTML: &str = r#"<html>
<head><title>Jonathan 'EliGE' Jablonowski Counter-Strike Statistics | HLTV.org</title></head>
<body>
<div class="SummaryTeamname"><a href="/stats/teams/5973/liquid">Liquid</a></div>
<div class="summaryBreakdown">
  <div class="summaryStatBreakdownSubHeader">Rating 2.0</div>
  <div class="summaryStatBreakdownDataValue">1.12</div>
</div>
</body></html>"#;

    pub const EVENT_STATS_HTML: &str = r#"<html><body>
<table class="stats-table">
  <thead><tr><th>Player</th><th>Maps</th><th>K/D</th><th>Rating 2.0</th></tr></thead>
  <tbody>
    <tr><td class="playerCol"><a href="/stats/players/8738/elige?event=8719">EliGE</a></td><td>12</td><td>1.15</td><td>1.21</td></tr>
    <tr><td class="playerCol"><a href="/stats/players/unknown">ghost</a></td><td>3</td><td>0.80</td><td>0.90</td></tr>
  </tbody>
</table>
</body></html>"#;

    pub const ARCHIVE_HTML: &str = r#"<html><body>
<a href="/events/8719/exort-series-17" class="a-reset small-event">
  <table><tr>
    <td class="col-value event-col"><div class="text-ellipsis">Exort Series 17</div></td>
    <td class="col-value small-col">8</td>
    <td class="col-value small-col">$50,000</td>
    <td class="col-value small-col">Online</td>
  </tr></table>
</a>
<a href="/events/7148/iem-cologne-2025" class="a-reset small-event">
  <table><tr>
    <td class="col-value event-col"><div class="text-ellipsis">IEM Cologne 2025</div></td>
    <td class="col-value small-col">24</td>
    <td class="col-value small-col">$1,250,000</td>
    <td class="col-value small-col">Intl. LAN</td>
  </tr></table>
</a>
</body></html>"#;

    pub const MATCH_URL: &str = "https://www.hltv.org/matches/2386801/og-vs-9z";

    pub const MATCH_HTML: &str = r#"<html><body>
<div class="team1-gradient"><div class="team1"><div class="teamName">OG</div></div><div class="won">2</div></div>
<div class="team2-gradient"><div class="team2"><div class="teamName">9z</div></div><div class="lost">1</div></div>
<div class="mapholder"><div class="mapname">Mirage</div><div class="results">13 - 9</div></div>
<div class="stats-content">
  <table class="table totalstats">
    <tr><td><div class="teamName">OG</div></td><td>K-D</td><td>+/-</td><td>ADR</td><td>Swing</td><td>Rating</td></tr>
    <tr>
      <td><a href="/player/18221/nexa"><img class="flag" title="Serbia"><span class="player-nick">nexa</span></a></td>
      <td>54-41</td><td>+13</td><td>88.4</td><td>+3.12%</td><td>1.27</td>
    </tr>
    <tr>
      <td><span class="player-nick">standin</span></td>
      <td>30-40</td><td>-10</td><td>60.1</td><td>-2.00%</td><td>0.81</td>
    </tr>
  </table>
</div>
</body></html>"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Placement;

    #[test]
    fn test_report_tally() {
        let mut report = BatchReport::default();
        assert_eq!(report.record("a", Ok(1)), Some(1));
        assert_eq!(report.record::<i32>("b", Err(anyhow::anyhow!("boom"))), None);
        report.skip("c", "no id");

        let mut total = BatchReport {
            succeeded: 2,
            ..Default::default()
        };
        total.absorb(report);

        assert_eq!(total.succeeded, 3);
        assert_eq!(total.failed, 1);
        assert_eq!(total.skipped, 1);
        assert_eq!(total.total(), 5);
        assert_eq!(total.to_string(), "3 succeeded, 1 failed, 1 skipped");
    }

    #[test]
    fn test_persist_event_page_links_teams_and_placements() {
        let store = Store::in_memory().unwrap();
        let page = EventPage {
            event: EventRecord {
                name: Some("Exort Series 17".to_string()),
                ..Default::default()
            },
            teams_count: Some(2),
            teams: vec![
                TeamRecord {
                    id: Some(5973),
                    name: Some("Liquid".to_string()),
                    ..Default::default()
                },
                TeamRecord::default(),
            ],
            placements: vec![Placement {
                team_id: Some(4608),
                placement: Some(1),
                prize: Some("$25,000".to_string()),
            }],
        };

        store
            .unit_of_work(|uow| persist_event_page(uow, 8719, &page))
            .unwrap();

        assert_eq!(store.event_team_ids(8719).unwrap().len(), 2);
        let team = store.get_team(5973).unwrap().unwrap();
        assert_eq!(team.name.as_deref(), Some("Liquid"));
        // A placement for a team not listed as attending still creates it
        assert!(store.get_team(4608).unwrap().is_some());
        let link = store.get_event_team(8719, 4608).unwrap().unwrap();
        assert_eq!(link.placement, Some(1));
    }

    #[test]
    fn test_persist_event_stats_drops_rows_without_player() {
        let store = Store::in_memory().unwrap();
        let rows = vec![
            EventStatRecord {
                player_id: Some(11893),
                nickname: Some("ZywOo".to_string()),
                maps_played: Some(12),
                rating: Some(1.45),
                kd_ratio: Some(1.6),
            },
            EventStatRecord {
                nickname: Some("ghost".to_string()),
                ..Default::default()
            },
        ];

        let stored = store
            .unit_of_work(|uow| persist_event_stats(uow, 7148, &rows))
            .unwrap();

        assert_eq!(stored, 1);
        assert!(store.event_exists(7148).unwrap());
        let player = store.get_player(11893).unwrap().unwrap();
        assert_eq!(player.nickname.as_deref(), Some("ZywOo"));
        let stat = store.get_event_stat(7148, 11893).unwrap().unwrap();
        assert_eq!(stat.rating, Some(1.45));
    }
}
