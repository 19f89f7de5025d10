//! Full event payload files: scrape one event into JSON, and ingest a
//! directory of such files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{persist_event_page, persist_event_stats, BatchReport, Syncer};
use crate::interchange::{list_payloads, load_payload, save_payload, EventPayload};
use crate::scraper::parsers::{EventPageParser, EventStatsParser};
use crate::scraper::{event_stats_url, event_url, PageFetcher};
use crate::storage::Store;

impl<F: PageFetcher> Syncer<'_, F> {
    /// Scrape an event's overview, teams, placements and stats into
    /// `hltv_event_<id>_full.json` under `dir`.
    ///
    /// A missing stats page is not fatal: the payload is written with no
    /// stat lines.
    pub async fn scrape_event_payload(&self, event_id: i64, dir: &Path) -> Result<PathBuf> {
        let document = self.fetch(&event_url(event_id)).await?;
        let page = EventPageParser::parse(&document.html, event_id);

        let top_players = match self.fetch(&event_stats_url(event_id)).await {
            Ok(document) => EventStatsParser::parse(&document.html),
            Err(e) => {
                warn!("Event {}: no stats ({})", event_id, e);
                Vec::new()
            }
        };

        let payload = EventPayload::new(event_id, page, top_players);
        let path = save_payload(dir, event_id, &payload)?;

        info!(
            "Event {}: {} teams, {} placements, {} stat lines saved to {}",
            event_id,
            payload.teams_attending.len(),
            payload.placements.len(),
            payload.stats.top_players.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Ingest every `hltv_event_*_full.json` file in `dir`. Each file is one
/// unit of work.
pub fn import_payloads(store: &Store, dir: &Path) -> Result<BatchReport> {
    let paths = list_payloads(dir)?;
    info!("Found {} event payloads in {}", paths.len(), dir.display());

    let mut report = BatchReport::default();
    for path in paths {
        let item = path.display().to_string();
        let payload = match load_payload(&path) {
            Ok(payload) => payload,
            Err(e) => {
                report.record::<()>(&item, Err(e));
                continue;
            }
        };
        let Some(event_id) = payload.id() else {
            report.skip(&item, "no event id");
            continue;
        };
        report.record(&item, import_payload(store, event_id, &payload));
    }

    Ok(report)
}

fn import_payload(store: &Store, event_id: i64, payload: &EventPayload) -> Result<()> {
    let page = payload.to_page();
    let stats = store
        .unit_of_work(|uow| {
            persist_event_page(uow, event_id, &page)?;
            persist_event_stats(uow, event_id, &payload.stats.top_players)
        })
        .with_context(|| format!("Failed to import event {}", event_id))?;

    info!(
        "Imported event {} ({}): {} teams, {} stat lines",
        event_id,
        page.event.name.as_deref().unwrap_or("?"),
        page.teams.len(),
        stats
    );
    Ok(())
}
