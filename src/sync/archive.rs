//! Archived events: listing pages into the JSON archive file, and archive
//! entries into the events table.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::{BatchReport, Syncer};
use crate::interchange::{load_archive, merge_archive, save_archive};
use crate::scraper::parsers::archive::ARCHIVE_PAGE_SIZE;
use crate::scraper::parsers::ArchiveParser;
use crate::scraper::{archive_url, PageFetcher};
use crate::storage::Store;
use crate::types::ArchiveEvent;

/// Which archive entries an import covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveImport {
    /// Explicit event ids; when empty, the team-count filter applies
    pub ids: Vec<i64>,
    pub min_teams: u32,
    pub limit: usize,
}

impl Default for ArchiveImport {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            min_teams: 16,
            limit: 5,
        }
    }
}

impl ArchiveImport {
    fn select<'e>(&self, archive: &'e [ArchiveEvent]) -> Vec<&'e ArchiveEvent> {
        if self.ids.is_empty() {
            archive
                .iter()
                .filter(|event| event.teams().is_some_and(|teams| teams >= self.min_teams))
                .take(self.limit)
                .collect()
        } else {
            archive
                .iter()
                .filter(|event| {
                    event
                        .id
                        .trim()
                        .parse::<i64>()
                        .is_ok_and(|id| self.ids.contains(&id))
                })
                .collect()
        }
    }
}

impl<F: PageFetcher> Syncer<'_, F> {
    /// Scrape `pages` archive listing pages starting at `offset`, merging new
    /// cards into the archive file at `path`. The file is saved after every page.
    pub async fn scrape_archive(&self, pages: u32, offset: u32, path: &Path) -> Result<BatchReport> {
        let mut archive = load_archive(path)?;
        info!("Archive {} holds {} events", path.display(), archive.len());

        let mut report = BatchReport::default();
        for page in 0..pages {
            let page_offset = offset + page * ARCHIVE_PAGE_SIZE;
            info!("[{}/{}] Archive offset {}", page + 1, pages, page_offset);
            let outcome = self.scrape_archive_page(page_offset, &mut archive, path).await;
            report.record(&format!("archive offset {}", page_offset), outcome);
        }

        Ok(report)
    }

    async fn scrape_archive_page(
        &self,
        offset: u32,
        archive: &mut Vec<ArchiveEvent>,
        path: &Path,
    ) -> Result<usize> {
        let document = self.fetch(&archive_url(offset)).await?;
        let cards = ArchiveParser::parse(&document.html);
        let found = cards.len();

        let added = merge_archive(archive, cards);
        save_archive(path, archive)?;

        info!(
            "Offset {}: {} cards, {} new (total {})",
            offset,
            found,
            added,
            archive.len()
        );
        Ok(added)
    }
}

/// Create events from archive entries. Events already stored are skipped
/// so the archive's coarse values never replace scraped ones.
pub fn import_archive(store: &Store, path: &Path, import: &ArchiveImport) -> Result<BatchReport> {
    let archive = load_archive(path)?;
    let selected = import.select(&archive);
    info!(
        "Loaded {} archive events, {} selected",
        archive.len(),
        selected.len()
    );

    let mut report = BatchReport::default();
    for entry in selected {
        let record = entry.to_record();
        let Some(event_id) = record.id else {
            report.skip(&entry.name, "no event id");
            continue;
        };

        match store.event_exists(event_id) {
            Ok(true) => {
                report.skip(&format!("event {}", event_id), "already stored");
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                report.record::<()>(&format!("event {}", event_id), Err(e));
                continue;
            }
        }

        let stored = store.unit_of_work(|uow| uow.upsert_event(event_id, &record));
        if report.record(&format!("event {}", event_id), stored).is_some() {
            info!(
                "Imported [{}] {} (teams: {}, prize: {})",
                event_id, entry.name, entry.teams_count, entry.prize_pool
            );
        }
    }

    Ok(report)
}
