//! Team profiles and rosters.

use anyhow::Result;
use tracing::{info, warn};

use super::Syncer;
use crate::scraper::parsers::TeamParser;
use crate::scraper::{team_url, PageFetcher};
use crate::storage::UnitOfWork;
use crate::types::{PlayerRecord, TeamPage, TeamPlayerRecord};

const COACH_ROLE: &str = "coach";

impl<F: PageFetcher> Syncer<'_, F> {
    /// Scrape a team page and store the team, its players and roster rows.
    pub async fn sync_team(&self, team_id: i64) -> Result<TeamPage> {
        let document = self.fetch(&team_url(team_id)).await?;
        let page = TeamParser::parse(&document.html, team_id);

        self.store
            .unit_of_work(|uow| persist_team_page(uow, team_id, &page))?;

        info!(
            "Team {} ({}): {} roster entries",
            team_id,
            page.team.name.as_deref().unwrap_or("?"),
            page.roster.len()
        );
        Ok(page)
    }
}

/// Store a team page. Listed players point their current team here;
/// coaches only get a roster row.
fn persist_team_page(uow: &UnitOfWork, team_id: i64, page: &TeamPage) -> Result<()> {
    uow.upsert_team(team_id, &page.team)?;

    for entry in &page.roster {
        let Some(player_id) = entry.player_id else {
            warn!("Team {}: dropping roster entry without player id", team_id);
            continue;
        };
        let is_coach = entry.role.as_deref() == Some(COACH_ROLE);

        let player = PlayerRecord {
            nickname: entry.nickname.clone(),
            current_team_id: (!is_coach).then_some(team_id),
            ..Default::default()
        };
        uow.upsert_player(player_id, &player)?;
        uow.upsert_team_player(
            team_id,
            player_id,
            &TeamPlayerRecord {
                role: entry.role.clone(),
                is_current: Some(true),
            },
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fetcher::testing::FixtureFetcher;
    use crate::scraper::RateLimiter;
    use crate::storage::Store;
    use crate::sync::fixtures::LIQUID_HTML;
    use crate::types::{RosterEntry, TeamRecord};

    #[tokio::test]
    async fn test_sync_team_stores_roster() {
        let store = Store::in_memory().unwrap();
        let fetcher = FixtureFetcher::default().with_page(team_url(5973), LIQUID_HTML);
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        let page = syncer.sync_team(5973).await.unwrap();
        assert_eq!(page.roster.len(), 3);

        let team = store.get_team(5973).unwrap().unwrap();
        assert_eq!(team.name.as_deref(), Some("Liquid"));
        assert_eq!(team.world_rank, Some(12));
        assert_eq!(store.current_roster(5973).unwrap(), vec![8738, 9216, 11916]);

        let elige = store.get_player(8738).unwrap().unwrap();
        assert_eq!(elige.nickname.as_deref(), Some("EliGE"));
        assert_eq!(elige.current_team_id, Some(5973));

        let coach = store.get_player(9216).unwrap().unwrap();
        assert_eq!(coach.current_team_id, None);
        let link = store.get_team_player(5973, 9216).unwrap().unwrap();
        assert_eq!(link.role.as_deref(), Some("coach"));
    }

    #[tokio::test]
    async fn test_sync_team_failure_leaves_store_untouched() {
        let store = Store::in_memory().unwrap();
        let fetcher = FixtureFetcher::default();
        let syncer = Syncer::new(&fetcher, &store, RateLimiter::unpaced());

        assert!(syncer.sync_team(5973).await.is_err());
        assert_eq!(store.counts().unwrap().teams, 0);
    }

    #[test]
    fn test_roster_entry_without_id_is_dropped() {
        let store = Store::in_memory().unwrap();
        let page = TeamPage {
            team: TeamRecord {
                id: Some(4608),
                name: Some("Natus Vincere".to_string()),
                ..Default::default()
            },
            roster: vec![
                RosterEntry {
                    player_id: None,
                    nickname: Some("trial".to_string()),
                    role: Some("player".to_string()),
                },
                RosterEntry {
                    player_id: Some(7998),
                    nickname: Some("s1mple".to_string()),
                    role: Some("player".to_string()),
                },
            ],
        };

        store
            .unit_of_work(|uow| persist_team_page(uow, 4608, &page))
            .unwrap();

        let counts = store.counts().unwrap();
        assert_eq!(counts.players, 1);
        assert_eq!(counts.team_players, 1);
    }
}
