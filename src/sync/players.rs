//! Player career stats and match scorecards.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use super::{BatchReport, Syncer};
use crate::interchange::save_match;
use crate::scraper::parsers::{MatchParser, PlayerParser};
use crate::scraper::{player_stats_url, PageFetcher, BASE_URL};
use crate::storage::Store;
use crate::types::{MatchScorecard, PlayerRecord};

/// Which stored players a player sync covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSelection {
    All,
    /// Current roster of one team
    Team(i64),
    /// Rostered or stat-listed players of one event
    Event(i64),
}

impl PlayerSelection {
    fn player_ids(&self, store: &Store) -> Result<Vec<i64>> {
        match self {
            Self::All => store.player_ids(),
            Self::Team(team_id) => store.current_roster(*team_id),
            Self::Event(event_id) => store.event_player_ids(*event_id),
        }
    }
}

impl<F: PageFetcher> Syncer<'_, F> {
    /// Scrape one player's career stats page and merge it into the store.
    pub async fn sync_player(&self, player_id: i64) -> Result<PlayerRecord> {
        let document = self.fetch(&player_stats_url(player_id)).await?;
        let record = PlayerParser::parse(&document.html, player_id);

        self.store
            .unit_of_work(|uow| uow.upsert_player(player_id, &record))?;

        info!(
            "Player {} ({}): rating {:?}",
            player_id,
            record.nickname.as_deref().unwrap_or("?"),
            record.rating
        );
        Ok(record)
    }

    pub async fn sync_players(&self, selection: PlayerSelection) -> BatchReport {
        let mut report = BatchReport::default();

        let player_ids = match selection.player_ids(self.store) {
            Ok(ids) => ids,
            Err(e) => {
                report.record::<()>(&format!("players of {:?}", selection), Err(e));
                return report;
            }
        };
        info!("Syncing {} players ({:?})", player_ids.len(), selection);

        for (index, player_id) in player_ids.iter().enumerate() {
            info!("[{}/{}] Player {}", index + 1, player_ids.len(), player_id);
            report.record(
                &format!("player {}", player_id),
                self.sync_player(*player_id).await,
            );
        }

        report
    }

    /// Scrape a match page into `hltv_match_<id>.json` under `dir` and store
    /// every identified player on the scorecard.
    pub async fn scrape_match(&self, url: &str, dir: &Path) -> Result<(MatchScorecard, PathBuf)> {
        let url = if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{}", BASE_URL, url)
        };

        let document = self.fetch(&url).await?;
        let scorecard = MatchParser::parse(&document.html, &url);
        let path = save_match(dir, &scorecard)?;

        let sighted = self.store.unit_of_work(|uow| {
            let mut sighted = 0;
            for line in &scorecard.players {
                let Some(player_id) = line.player_id else {
                    warn!("Match {}: dropping line without player id ({:?})", url, line.nickname);
                    continue;
                };
                let player = PlayerRecord {
                    nickname: line.nickname.clone(),
                    country: line.country.clone(),
                    ..Default::default()
                };
                uow.upsert_player(player_id, &player)?;
                sighted += 1;
            }
            Ok(sighted)
        })?;

        info!(
            "Match {:?}: {} maps, {} players stored, saved to {}",
            scorecard.match_id,
            scorecard.maps.len(),
            sighted,
            path.display()
        );
        Ok((scorecard, path))
    }
}
