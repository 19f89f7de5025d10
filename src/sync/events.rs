//! Events listing, event pages, event stats and the full-flow sync.

use anyhow::Result;
use tracing::info;

use super::{persist_event_page, persist_event_stats, BatchReport, PlayerSelection, Syncer};
use crate::scraper::parsers::{EventListParser, EventPageParser, EventStatsParser};
use crate::scraper::{event_stats_url, event_url, events_url, PageFetcher};
use crate::types::EventPage;

impl<F: PageFetcher> Syncer<'_, F> {
    /// Store the ongoing/upcoming events listing.
    ///
    /// Returns the tally and the ids of the events stored, in listing order.
    pub async fn sync_events(&self, limit: Option<usize>) -> (BatchReport, Vec<i64>) {
        let mut report = BatchReport::default();

        let document = match self.fetch(&events_url()).await {
            Ok(document) => document,
            Err(e) => {
                report.record::<()>("events listing", Err(e.into()));
                return (report, Vec::new());
            }
        };

        let mut records = EventListParser::parse(&document.html);
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        info!("Found {} events", records.len());

        let mut ids = Vec::new();
        for record in records {
            let Some(id) = record.id else {
                let name = record.name.as_deref().unwrap_or("unnamed event card");
                report.skip(name, "no event id");
                continue;
            };
            let stored = self.store.unit_of_work(|uow| uow.upsert_event(id, &record));
            if report.record(&format!("event {}", id), stored).is_some() {
                ids.push(id);
            }
        }

        (report, ids)
    }

    /// Scrape one event page and store its overview, teams and placements.
    pub async fn sync_event_page(&self, event_id: i64) -> Result<EventPage> {
        let document = self.fetch(&event_url(event_id)).await?;
        let page = EventPageParser::parse(&document.html, event_id);

        self.store
            .unit_of_work(|uow| persist_event_page(uow, event_id, &page))?;

        info!(
            "Event {} ({}): {} teams, {} placements",
            event_id,
            page.event.name.as_deref().unwrap_or("?"),
            page.teams.len(),
            page.placements.len()
        );
        Ok(page)
    }

    /// Event page, then the profile and roster of every team linked to it.
    pub async fn sync_event_teams(&self, event_id: i64) -> BatchReport {
        let mut report = BatchReport::default();
        report.record(
            &format!("event {}", event_id),
            self.sync_event_page(event_id).await,
        );

        let team_ids = match self.store.event_team_ids(event_id) {
            Ok(ids) => ids,
            Err(e) => {
                report.record::<()>(&format!("teams of event {}", event_id), Err(e));
                return report;
            }
        };

        for (index, team_id) in team_ids.iter().enumerate() {
            info!("[{}/{}] Team {}", index + 1, team_ids.len(), team_id);
            report.record(&format!("team {}", team_id), self.sync_team(*team_id).await);
        }

        report
    }

    /// Scrape the per-event player stats table. Returns the number of lines stored.
    pub async fn sync_event_stats(&self, event_id: i64) -> Result<usize> {
        let document = self.fetch(&event_stats_url(event_id)).await?;
        let rows = EventStatsParser::parse(&document.html);

        let stored = self
            .store
            .unit_of_work(|uow| persist_event_stats(uow, event_id, &rows))?;

        info!("Event {}: stats for {} players", event_id, stored);
        Ok(stored)
    }

    /// Everything for one event: page, teams and rosters, event stats, then
    /// career stats of every player involved.
    pub async fn sync_full_event(&self, event_id: i64) -> BatchReport {
        let mut report = self.sync_event_teams(event_id).await;
        report.record(
            &format!("stats of event {}", event_id),
            self.sync_event_stats(event_id).await,
        );
        report.absorb(self.sync_players(PlayerSelection::Event(event_id)).await);
        report
    }

    /// Events listing, then the full sync of every event found.
    pub async fn sync_all(&self, limit: Option<usize>) -> BatchReport {
        let (mut report, event_ids) = self.sync_events(limit).await;

        for (index, event_id) in event_ids.iter().enumerate() {
            info!("[{}/{}] Event {}", index + 1, event_ids.len(), event_id);
            report.absorb(self.sync_full_event(*event_id).await);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::scraper::fetcher::testing::FixtureFetcher;
    use crate::scraper::{player_stats_url, team_url, RateLimiter};
    use crate::storage::Store;
    use chrono::NaiveDate;

    fn full_event_fetcher() -> FixtureFetcher {
        FixtureFetcher::default()
            .with_page(events_url(), EVENTS_HTML)
            .with_page(event_url(8719), EVENT_HTML)
            .with_page(team_url(5973), LIQUID_HTML)
            .with_page(event_stats_url(8719), EVENT_STATS_HTML)
            .with_page(player_stats_url(8738), ELIGE_HTML)
    }

    #[tokio::test]
    async fn test_sync_events_skips_cards_without_id() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let (report, ids) = syncer.sync_events(None).await;

        assert_eq!(ids, vec![8719, 7148]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 1);
        let event = store.get_event(7148).unwrap().unwrap();
        assert_eq!(event.event_type.as_deref(), Some("LAN"));
        assert_eq!(event.location.as_deref(), Some("Cologne, Germany"));
    }

    #[tokio::test]
    async fn test_sync_events_respects_limit() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let (report, ids) = syncer.sync_events(Some(1)).await;

        assert_eq!(ids, vec![8719]);
        assert_eq!(report.total(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_is_one_failed_item() {
        let store = Store::in_memory().unwrap();
        let fetcher = FixtureFetcher::default();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let (report, ids) = syncer.sync_events(None).await;

        assert!(ids.is_empty());
        assert_eq!(report.failed, 1);
        assert_eq!(store.counts().unwrap().events, 0);
    }

    #[tokio::test]
    async fn test_sync_event_page_stores_overview_and_placements() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let page = syncer.sync_event_page(8719).await.unwrap();
        assert_eq!(page.teams_count, Some(8));

        let event = store.get_event(8719).unwrap().unwrap();
        assert_eq!(event.name.as_deref(), Some("Exort Series 17"));
        assert_eq!(event.prize_pool.as_deref(), Some("$50,000"));
        assert_eq!(event.event_type.as_deref(), Some("Online"));
        assert_eq!(event.start_date, NaiveDate::from_ymd_opt(2025, 7, 31));

        assert_eq!(store.event_team_ids(8719).unwrap(), vec![5973, 9565]);
        let vitality = store.get_team(9565).unwrap().unwrap();
        assert_eq!(vitality.name.as_deref(), Some("Vitality"));
        let second = store.get_event_team(8719, 9565).unwrap().unwrap();
        assert_eq!(second.placement, Some(2));
        assert_eq!(second.prize.as_deref(), Some("$10,000"));
    }

    #[tokio::test]
    async fn test_event_page_rerun_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        syncer.sync_event_page(8719).await.unwrap();
        let first = store.counts().unwrap();
        syncer.sync_event_page(8719).await.unwrap();

        assert_eq!(store.counts().unwrap(), first);
    }

    #[tokio::test]
    async fn test_sync_event_stats_keeps_identified_rows() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let stored = syncer.sync_event_stats(8719).await.unwrap();

        assert_eq!(stored, 1);
        let stat = store.get_event_stat(8719, 8738).unwrap().unwrap();
        assert_eq!(stat.maps_played, Some(12));
        assert_eq!(stat.kd_ratio, Some(1.15));
        assert_eq!(stat.rating, Some(1.21));
    }

    #[tokio::test]
    async fn test_failed_team_does_not_stop_event() {
        let store = Store::in_memory().unwrap();
        // No page for team 9565
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let report = syncer.sync_event_teams(8719).await;

        // event page + Liquid succeed, Vitality fails
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(store.current_roster(5973).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sync_all_walks_the_full_flow() {
        let store = Store::in_memory().unwrap();
        let fetcher = full_event_fetcher();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let report = syncer.sync_all(Some(1)).await;

        let requested = fetcher.requested.borrow();
        assert_eq!(requested[0], events_url());
        assert_eq!(requested[1], event_url(8719));
        assert!(requested.contains(&event_stats_url(8719)));
        assert!(requested.contains(&player_stats_url(8738)));

        let elige = store.get_player(8738).unwrap().unwrap();
        assert_eq!(elige.real_name.as_deref(), Some("Jonathan Jablonowski"));
        assert_eq!(elige.rating, Some(1.12));
        assert_eq!(elige.current_team_id, Some(5973));
        assert!(store.get_event_stat(8719, 8738).unwrap().is_some());
        // Vitality and the players without fixtures fail individually
        assert!(report.failed > 0);
        assert!(report.succeeded > report.failed);
    }
}
