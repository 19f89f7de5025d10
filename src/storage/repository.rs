//! SQLite repository: unit of work, upserts and queries

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use super::merge::{Event, EventStat, EventTeam, Player, Team, TeamPlayer};
use super::schema::create_tables;
use crate::types::{
    EventRecord, EventStatRecord, EventTeamRecord, PlayerRecord, TeamPlayerRecord, TeamRecord,
};

/// Row counts per table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCounts {
    pub events: i64,
    pub teams: i64,
    pub players: i64,
    pub event_teams: i64,
    pub team_players: i64,
    pub event_stats: i64,
}

/// An event with the number of teams linked to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub team_count: i64,
}

/// A player's average rating across the events they have stats for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub id: i64,
    pub nickname: Option<String>,
    pub average_rating: f64,
    pub events: i64,
}

/// Handle on the SQLite database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database, creating directories and tables if needed
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;
        Self::init(conn)
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Cascades rely on this
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Run `work` in one transaction: commit on `Ok`, roll everything back on `Err`.
    pub fn unit_of_work<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&UnitOfWork) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = work(&UnitOfWork { conn: &tx })?;
        tx.commit()?;
        Ok(value)
    }

    // ==================== Lookups ====================

    pub fn get_event(&self, id: i64) -> Result<Option<Event>> {
        find_event(&self.conn, id)
    }

    pub fn get_team(&self, id: i64) -> Result<Option<Team>> {
        find_team(&self.conn, id)
    }

    pub fn get_player(&self, id: i64) -> Result<Option<Player>> {
        find_player(&self.conn, id)
    }

    pub fn get_event_team(&self, event_id: i64, team_id: i64) -> Result<Option<EventTeam>> {
        find_event_team(&self.conn, event_id, team_id)
    }

    pub fn get_team_player(&self, team_id: i64, player_id: i64) -> Result<Option<TeamPlayer>> {
        find_team_player(&self.conn, team_id, player_id)
    }

    pub fn get_event_stat(&self, event_id: i64, player_id: i64) -> Result<Option<EventStat>> {
        find_event_stat(&self.conn, event_id, player_id)
    }

    pub fn event_exists(&self, id: i64) -> Result<bool> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM events WHERE id = ?1", [id], |row| {
                    row.get(0)
                })?;
        Ok(count > 0)
    }

    // ==================== Query Operations ====================

    /// Stored event ids, most recent first
    pub fn event_ids(&self, limit: Option<usize>) -> Result<Vec<i64>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        self.ids(
            "SELECT id FROM events ORDER BY start_date DESC NULLS LAST, id DESC LIMIT ?1",
            [limit],
        )
    }

    /// Teams linked to an event
    pub fn event_team_ids(&self, event_id: i64) -> Result<Vec<i64>> {
        self.ids(
            "SELECT team_id FROM event_teams WHERE event_id = ?1 ORDER BY placement IS NULL, placement, team_id",
            [event_id],
        )
    }

    /// Current roster of a team
    pub fn current_roster(&self, team_id: i64) -> Result<Vec<i64>> {
        self.ids(
            "SELECT player_id FROM team_players WHERE team_id = ?1 AND is_current = 1 ORDER BY player_id",
            [team_id],
        )
    }

    /// Current roster players of every team attending an event, plus
    /// anyone with a stats line for it
    pub fn event_player_ids(&self, event_id: i64) -> Result<Vec<i64>> {
        self.ids(
            r#"
            SELECT tp.player_id
            FROM team_players tp
            JOIN event_teams et ON et.team_id = tp.team_id
            WHERE et.event_id = ?1 AND tp.is_current = 1
            UNION
            SELECT player_id FROM event_stats WHERE event_id = ?1
            ORDER BY 1
            "#,
            [event_id],
        )
    }

    /// Every stored player
    pub fn player_ids(&self) -> Result<Vec<i64>> {
        self.ids("SELECT id FROM players ORDER BY id", [])
    }

    fn ids<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    pub fn counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<i64> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n)
        };

        Ok(TableCounts {
            events: count("events")?,
            teams: count("teams")?,
            players: count("players")?,
            event_teams: count("event_teams")?,
            team_players: count("team_players")?,
            event_stats: count("event_stats")?,
        })
    }

    /// Most recent events with their team counts
    pub fn recent_events(&self, limit: usize) -> Result<Vec<EventSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT e.id, e.name, e.start_date, COUNT(et.team_id)
            FROM events e
            LEFT JOIN event_teams et ON et.event_id = e.id
            GROUP BY e.id
            ORDER BY e.start_date DESC NULLS LAST, e.id DESC
            LIMIT ?1
            "#,
        )?;

        let events = stmt
            .query_map([limit as i64], |row| {
                Ok(EventSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    start_date: date_column(row, 2)?,
                    team_count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Players ranked by average event rating
    pub fn top_players(&self, limit: usize) -> Result<Vec<PlayerRating>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.id, p.nickname, AVG(es.rating), COUNT(es.event_id)
            FROM event_stats es
            JOIN players p ON p.id = es.player_id
            WHERE es.rating IS NOT NULL
            GROUP BY p.id
            ORDER BY AVG(es.rating) DESC, p.id
            LIMIT ?1
            "#,
        )?;

        let players = stmt
            .query_map([limit as i64], |row| {
                Ok(PlayerRating {
                    id: row.get(0)?,
                    nickname: row.get(1)?,
                    average_rating: row.get(2)?,
                    events: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(players)
    }
}

/// Write access inside a transaction opened by [`Store::unit_of_work`]
pub struct UnitOfWork<'a> {
    conn: &'a Connection,
}

impl UnitOfWork<'_> {
    // ==================== Entity Upserts ====================

    /// Look up the event, merge non-null fields, or create it
    pub fn upsert_event(&self, id: i64, record: &EventRecord) -> Result<Event> {
        if let Some(event) = self.merge_existing_event(id, record)? {
            return Ok(event);
        }
        let row = Event::from_record(id, record);
        let inserted = self.conn.execute(
            r#"
            INSERT INTO events (id, name, start_date, end_date, location, event_type, prize_pool)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                row.id,
                row.name,
                row.start_date.map(|d| d.to_string()),
                row.end_date.map(|d| d.to_string()),
                row.location,
                row.event_type,
                row.prize_pool,
            ],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_event(id, record)?
                .context("event missing after unique violation")
        })
    }

    fn merge_existing_event(&self, id: i64, record: &EventRecord) -> Result<Option<Event>> {
        let Some(mut event) = find_event(self.conn, id)? else {
            return Ok(None);
        };
        if event.merge(record) {
            self.conn.execute(
                r#"
                UPDATE events
                SET name = ?2, start_date = ?3, end_date = ?4, location = ?5,
                    event_type = ?6, prize_pool = ?7, updated_at = datetime('now')
                WHERE id = ?1
                "#,
                params![
                    event.id,
                    event.name,
                    event.start_date.map(|d| d.to_string()),
                    event.end_date.map(|d| d.to_string()),
                    event.location,
                    event.event_type,
                    event.prize_pool,
                ],
            )?;
        }
        Ok(Some(event))
    }

    pub fn upsert_team(&self, id: i64, record: &TeamRecord) -> Result<Team> {
        if let Some(team) = self.merge_existing_team(id, record)? {
            return Ok(team);
        }
        let row = Team::from_record(id, record);
        let inserted = self.conn.execute(
            "INSERT INTO teams (id, name, country, world_rank) VALUES (?1, ?2, ?3, ?4)",
            params![row.id, row.name, row.country, row.world_rank],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_team(id, record)?
                .context("team missing after unique violation")
        })
    }

    fn merge_existing_team(&self, id: i64, record: &TeamRecord) -> Result<Option<Team>> {
        let Some(mut team) = find_team(self.conn, id)? else {
            return Ok(None);
        };
        if team.merge(record) {
            self.conn.execute(
                r#"
                UPDATE teams
                SET name = ?2, country = ?3, world_rank = ?4, updated_at = datetime('now')
                WHERE id = ?1
                "#,
                params![team.id, team.name, team.country, team.world_rank],
            )?;
        }
        Ok(Some(team))
    }

    /// Upsert a player. A referenced current team is created on first sighting.
    pub fn upsert_player(&self, id: i64, record: &PlayerRecord) -> Result<Player> {
        if let Some(team_id) = record.current_team_id {
            self.upsert_team(team_id, &TeamRecord::default())?;
        }
        if let Some(player) = self.merge_existing_player(id, record)? {
            return Ok(player);
        }
        let row = Player::from_record(id, record);
        let inserted = self.conn.execute(
            r#"
            INSERT INTO players
            (id, nickname, real_name, country, age, current_team_id, total_maps, total_rounds,
             total_kills, total_deaths, kd_ratio, headshot_percentage, rating, kpr, apr,
             kast, impact, adr)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                row.id,
                row.nickname,
                row.real_name,
                row.country,
                row.age,
                row.current_team_id,
                row.total_maps,
                row.total_rounds,
                row.total_kills,
                row.total_deaths,
                row.kd_ratio,
                row.headshot_percentage,
                row.rating,
                row.kpr,
                row.apr,
                row.kast,
                row.impact,
                row.adr,
            ],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_player(id, record)?
                .context("player missing after unique violation")
        })
    }

    fn merge_existing_player(&self, id: i64, record: &PlayerRecord) -> Result<Option<Player>> {
        let Some(mut player) = find_player(self.conn, id)? else {
            return Ok(None);
        };
        if player.merge(record) {
            self.conn.execute(
                r#"
                UPDATE players
                SET nickname = ?2, real_name = ?3, country = ?4, age = ?5, current_team_id = ?6,
                    total_maps = ?7, total_rounds = ?8, total_kills = ?9, total_deaths = ?10,
                    kd_ratio = ?11, headshot_percentage = ?12, rating = ?13, kpr = ?14,
                    apr = ?15, kast = ?16, impact = ?17, adr = ?18, updated_at = datetime('now')
                WHERE id = ?1
                "#,
                params![
                    player.id,
                    player.nickname,
                    player.real_name,
                    player.country,
                    player.age,
                    player.current_team_id,
                    player.total_maps,
                    player.total_rounds,
                    player.total_kills,
                    player.total_deaths,
                    player.kd_ratio,
                    player.headshot_percentage,
                    player.rating,
                    player.kpr,
                    player.apr,
                    player.kast,
                    player.impact,
                    player.adr,
                ],
            )?;
        }
        Ok(Some(player))
    }

    // ==================== Join Upserts ====================

    /// Link a team to an event. Both rows must already exist.
    pub fn upsert_event_team(
        &self,
        event_id: i64,
        team_id: i64,
        record: &EventTeamRecord,
    ) -> Result<EventTeam> {
        if let Some(link) = self.merge_existing_event_team(event_id, team_id, record)? {
            return Ok(link);
        }
        let row = EventTeam::from_record(event_id, team_id, record);
        let inserted = self.conn.execute(
            "INSERT INTO event_teams (event_id, team_id, placement, prize) VALUES (?1, ?2, ?3, ?4)",
            params![row.event_id, row.team_id, row.placement, row.prize],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_event_team(event_id, team_id, record)?
                .context("event_team missing after unique violation")
        })
    }

    fn merge_existing_event_team(
        &self,
        event_id: i64,
        team_id: i64,
        record: &EventTeamRecord,
    ) -> Result<Option<EventTeam>> {
        let Some(mut link) = find_event_team(self.conn, event_id, team_id)? else {
            return Ok(None);
        };
        if link.merge(record) {
            self.conn.execute(
                "UPDATE event_teams SET placement = ?3, prize = ?4 WHERE event_id = ?1 AND team_id = ?2",
                params![link.event_id, link.team_id, link.placement, link.prize],
            )?;
        }
        Ok(Some(link))
    }

    /// Add a player to a team roster. Both rows must already exist.
    pub fn upsert_team_player(
        &self,
        team_id: i64,
        player_id: i64,
        record: &TeamPlayerRecord,
    ) -> Result<TeamPlayer> {
        if let Some(link) = self.merge_existing_team_player(team_id, player_id, record)? {
            return Ok(link);
        }
        let row = TeamPlayer::from_record(team_id, player_id, record);
        let inserted = self.conn.execute(
            "INSERT INTO team_players (team_id, player_id, role, is_current) VALUES (?1, ?2, ?3, ?4)",
            params![row.team_id, row.player_id, row.role, row.is_current],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_team_player(team_id, player_id, record)?
                .context("team_player missing after unique violation")
        })
    }

    fn merge_existing_team_player(
        &self,
        team_id: i64,
        player_id: i64,
        record: &TeamPlayerRecord,
    ) -> Result<Option<TeamPlayer>> {
        let Some(mut link) = find_team_player(self.conn, team_id, player_id)? else {
            return Ok(None);
        };
        if link.merge(record) {
            self.conn.execute(
                "UPDATE team_players SET role = ?3, is_current = ?4 WHERE team_id = ?1 AND player_id = ?2",
                params![link.team_id, link.player_id, link.role, link.is_current],
            )?;
        }
        Ok(Some(link))
    }

    /// Record a player's stats for an event. Both rows must already exist.
    pub fn upsert_event_stat(
        &self,
        event_id: i64,
        player_id: i64,
        record: &EventStatRecord,
    ) -> Result<EventStat> {
        if let Some(stat) = self.merge_existing_event_stat(event_id, player_id, record)? {
            return Ok(stat);
        }
        let row = EventStat::from_record(event_id, player_id, record);
        let inserted = self.conn.execute(
            r#"
            INSERT INTO event_stats (event_id, player_id, rating, maps_played, kd_ratio)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                row.event_id,
                row.player_id,
                row.rating,
                row.maps_played,
                row.kd_ratio
            ],
        );
        insert_or_else(inserted, row, || {
            self.merge_existing_event_stat(event_id, player_id, record)?
                .context("event_stat missing after unique violation")
        })
    }

    fn merge_existing_event_stat(
        &self,
        event_id: i64,
        player_id: i64,
        record: &EventStatRecord,
    ) -> Result<Option<EventStat>> {
        let Some(mut stat) = find_event_stat(self.conn, event_id, player_id)? else {
            return Ok(None);
        };
        if stat.merge(record) {
            self.conn.execute(
                r#"
                UPDATE event_stats SET rating = ?3, maps_played = ?4, kd_ratio = ?5
                WHERE event_id = ?1 AND player_id = ?2
                "#,
                params![
                    stat.event_id,
                    stat.player_id,
                    stat.rating,
                    stat.maps_played,
                    stat.kd_ratio
                ],
            )?;
        }
        Ok(Some(stat))
    }
}

/// Keep `row` if the insert went through; resolve a uniqueness conflict with `on_conflict`.
fn insert_or_else<R>(
    inserted: rusqlite::Result<usize>,
    row: R,
    on_conflict: impl FnOnce() -> Result<R>,
) -> Result<R> {
    match inserted {
        Ok(_) => Ok(row),
        Err(err) if is_unique_violation(&err) => {
            debug!("Unique violation on insert, re-querying: {}", err);
            on_conflict()
        }
        Err(err) => Err(err.into()),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

fn date_column(row: &Row, index: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(index)?;
    Ok(text.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
}

// ==================== Row Lookups ====================

fn find_event(conn: &Connection, id: i64) -> Result<Option<Event>> {
    let event = conn
        .query_row(
            r#"
            SELECT id, name, start_date, end_date, location, event_type, prize_pool
            FROM events WHERE id = ?1
            "#,
            [id],
            |row| {
                Ok(Event {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    start_date: date_column(row, 2)?,
                    end_date: date_column(row, 3)?,
                    location: row.get(4)?,
                    event_type: row.get(5)?,
                    prize_pool: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(event)
}

fn find_team(conn: &Connection, id: i64) -> Result<Option<Team>> {
    let team = conn
        .query_row(
            "SELECT id, name, country, world_rank FROM teams WHERE id = ?1",
            [id],
            |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    country: row.get(2)?,
                    world_rank: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(team)
}

fn find_player(conn: &Connection, id: i64) -> Result<Option<Player>> {
    let player = conn
        .query_row(
            r#"
            SELECT id, nickname, real_name, country, age, current_team_id, total_maps,
                   total_rounds, total_kills, total_deaths, kd_ratio, headshot_percentage,
                   rating, kpr, apr, kast, impact, adr
            FROM players WHERE id = ?1
            "#,
            [id],
            |row| {
                Ok(Player {
                    id: row.get(0)?,
                    nickname: row.get(1)?,
                    real_name: row.get(2)?,
                    country: row.get(3)?,
                    age: row.get(4)?,
                    current_team_id: row.get(5)?,
                    total_maps: row.get(6)?,
                    total_rounds: row.get(7)?,
                    total_kills: row.get(8)?,
                    total_deaths: row.get(9)?,
                    kd_ratio: row.get(10)?,
                    headshot_percentage: row.get(11)?,
                    rating: row.get(12)?,
                    kpr: row.get(13)?,
                    apr: row.get(14)?,
                    kast: row.get(15)?,
                    impact: row.get(16)?,
                    adr: row.get(17)?,
                })
            },
        )
        .optional()?;
    Ok(player)
}

fn find_event_team(conn: &Connection, event_id: i64, team_id: i64) -> Result<Option<EventTeam>> {
    let link = conn
        .query_row(
            r#"
            SELECT event_id, team_id, placement, prize
            FROM event_teams WHERE event_id = ?1 AND team_id = ?2
            "#,
            [event_id, team_id],
            |row| {
                Ok(EventTeam {
                    event_id: row.get(0)?,
                    team_id: row.get(1)?,
                    placement: row.get(2)?,
                    prize: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(link)
}

fn find_team_player(
    conn: &Connection,
    team_id: i64,
    player_id: i64,
) -> Result<Option<TeamPlayer>> {
    let link = conn
        .query_row(
            r#"
            SELECT team_id, player_id, role, is_current
            FROM team_players WHERE team_id = ?1 AND player_id = ?2
            "#,
            [team_id, player_id],
            |row| {
                Ok(TeamPlayer {
                    team_id: row.get(0)?,
                    player_id: row.get(1)?,
                    role: row.get(2)?,
                    is_current: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(link)
}

fn find_event_stat(
    conn: &Connection,
    event_id: i64,
    player_id: i64,
) -> Result<Option<EventStat>> {
    let stat = conn
        .query_row(
            r#"
            SELECT event_id, player_id, rating, maps_played, kd_ratio
            FROM event_stats WHERE event_id = ?1 AND player_id = ?2
            "#,
            [event_id, player_id],
            |row| {
                Ok(EventStat {
                    event_id: row.get(0)?,
                    player_id: row.get(1)?,
                    rating: row.get(2)?,
                    maps_played: row.get(3)?,
                    kd_ratio: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(stat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: Option<&str>, country: Option<&str>) -> TeamRecord {
        TeamRecord {
            name: name.map(String::from),
            country: country.map(String::from),
            ..Default::default()
        }
    }

    fn seed_event_and_team(store: &Store) {
        store
            .unit_of_work(|uow| {
                uow.upsert_event(
                    8719,
                    &EventRecord {
                        name: Some("Exort Series 17".to_string()),
                        ..Default::default()
                    },
                )?;
                uow.upsert_team(5973, &team(Some("Liquid"), None))?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let record = PlayerRecord {
            nickname: Some("EliGE".to_string()),
            rating: Some(1.12),
            ..Default::default()
        };

        let first = store.unit_of_work(|uow| uow.upsert_player(8738, &record)).unwrap();
        let second = store.unit_of_work(|uow| uow.upsert_player(8738, &record)).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.counts().unwrap().players, 1);
        assert_eq!(store.get_player(8738).unwrap(), Some(first));
    }

    #[test]
    fn test_merge_never_nulls_existing_fields() {
        let store = Store::in_memory().unwrap();
        store
            .unit_of_work(|uow| uow.upsert_team(1, &team(Some("A"), None)))
            .unwrap();
        store
            .unit_of_work(|uow| uow.upsert_team(1, &team(None, Some("X"))))
            .unwrap();

        let stored = store.get_team(1).unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("A"));
        assert_eq!(stored.country.as_deref(), Some("X"));
    }

    #[test]
    fn test_event_dates_round_trip() {
        let store = Store::in_memory().unwrap();
        let record = EventRecord {
            start_date: NaiveDate::from_ymd_opt(2025, 9, 2),
            end_date: NaiveDate::from_ymd_opt(2025, 9, 8),
            ..Default::default()
        };
        store.unit_of_work(|uow| uow.upsert_event(8719, &record)).unwrap();

        let stored = store.get_event(8719).unwrap().unwrap();
        assert_eq!(stored.start_date, NaiveDate::from_ymd_opt(2025, 9, 2));
        assert_eq!(stored.end_date, NaiveDate::from_ymd_opt(2025, 9, 8));
        assert_eq!(stored.name, None);
    }

    #[test]
    fn test_join_unique_keeps_latest_placement() {
        let store = Store::in_memory().unwrap();
        seed_event_and_team(&store);

        for placement in [4, 2] {
            store
                .unit_of_work(|uow| {
                    uow.upsert_event_team(
                        8719,
                        5973,
                        &EventTeamRecord {
                            placement: Some(placement),
                            prize: None,
                        },
                    )
                })
                .unwrap();
        }

        assert_eq!(store.counts().unwrap().event_teams, 1);
        let link = store.get_event_team(8719, 5973).unwrap().unwrap();
        assert_eq!(link.placement, Some(2));
    }

    #[test]
    fn test_unique_violation_resolves_to_update() {
        let store = Store::in_memory().unwrap();
        seed_event_and_team(&store);
        store
            .unit_of_work(|uow| {
                uow.upsert_event_team(8719, 5973, &EventTeamRecord::default())?;
                // Simulate a racing insert of the same key
                let inserted = uow.conn.execute(
                    "INSERT INTO event_teams (event_id, team_id) VALUES (8719, 5973)",
                    [],
                );
                let record = EventTeamRecord {
                    placement: Some(1),
                    prize: Some("$25,000".to_string()),
                };
                let resolved = insert_or_else(
                    inserted,
                    EventTeam::from_record(8719, 5973, &record),
                    || {
                        uow.merge_existing_event_team(8719, 5973, &record)?
                            .context("missing")
                    },
                )?;
                assert_eq!(resolved.placement, Some(1));
                Ok(())
            })
            .unwrap();

        let link = store.get_event_team(8719, 5973).unwrap().unwrap();
        assert_eq!(link.prize.as_deref(), Some("$25,000"));
    }

    #[test]
    fn test_foreign_key_violation_is_not_swallowed() {
        let store = Store::in_memory().unwrap();
        let result = store.unit_of_work(|uow| {
            uow.upsert_event_team(1, 2, &EventTeamRecord::default())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_of_work_rolls_back_on_error() {
        let store = Store::in_memory().unwrap();
        let result: Result<()> = store.unit_of_work(|uow| {
            uow.upsert_team(1, &team(Some("A"), None))?;
            anyhow::bail!("scrape failed halfway")
        });

        assert!(result.is_err());
        assert_eq!(store.counts().unwrap().teams, 0);
    }

    #[test]
    fn test_player_creates_current_team_placeholder() {
        let store = Store::in_memory().unwrap();
        store
            .unit_of_work(|uow| {
                uow.upsert_player(
                    8738,
                    &PlayerRecord {
                        current_team_id: Some(5973),
                        ..Default::default()
                    },
                )
            })
            .unwrap();

        let team = store.get_team(5973).unwrap().unwrap();
        assert_eq!(team.name, None);
        assert_eq!(
            store.get_player(8738).unwrap().unwrap().current_team_id,
            Some(5973)
        );
    }

    #[test]
    fn test_event_delete_cascades() {
        let store = Store::in_memory().unwrap();
        seed_event_and_team(&store);
        store
            .unit_of_work(|uow| {
                uow.upsert_event_team(8719, 5973, &EventTeamRecord::default())?;
                uow.upsert_player(8738, &PlayerRecord::default())?;
                uow.upsert_event_stat(8719, 8738, &EventStatRecord::default())?;
                Ok(())
            })
            .unwrap();

        let deleted = store
            .conn
            .execute("DELETE FROM events WHERE id = ?1", [8719])
            .unwrap();
        assert_eq!(deleted, 1);

        let counts = store.counts().unwrap();
        assert_eq!(counts.events, 0);
        assert_eq!(counts.event_teams, 0);
        assert_eq!(counts.event_stats, 0);
        assert_eq!(counts.teams, 1);
        assert_eq!(counts.players, 1);
    }

    #[test]
    fn test_roster_queries_and_status() {
        let store = Store::in_memory().unwrap();
        seed_event_and_team(&store);
        store
            .unit_of_work(|uow| {
                uow.upsert_event_team(8719, 5973, &EventTeamRecord::default())?;
                for (id, rating) in [(8738, 1.12), (16848, 0.98)] {
                    uow.upsert_player(id, &PlayerRecord::default())?;
                    uow.upsert_team_player(
                        5973,
                        id,
                        &TeamPlayerRecord {
                            role: Some("player".to_string()),
                            is_current: Some(true),
                        },
                    )?;
                    uow.upsert_event_stat(
                        8719,
                        id,
                        &EventStatRecord {
                            rating: Some(rating),
                            ..Default::default()
                        },
                    )?;
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(store.current_roster(5973).unwrap(), vec![8738, 16848]);
        assert_eq!(store.event_player_ids(8719).unwrap(), vec![8738, 16848]);
        assert_eq!(store.event_team_ids(8719).unwrap(), vec![5973]);

        let recent = store.recent_events(5).unwrap();
        assert_eq!(recent[0].id, 8719);
        assert_eq!(recent[0].team_count, 1);

        let top = store.top_players(10).unwrap();
        assert_eq!(top[0].id, 8738);
        assert_eq!(top[0].events, 1);
        assert!((top[0].average_rating - 1.12).abs() < 1e-9);
    }

    #[test]
    fn test_removing_team_keeps_players() {
        let store = Store::in_memory().unwrap();
        store
            .unit_of_work(|uow| {
                uow.upsert_team(5973, &TeamRecord::default())?;
                uow.upsert_player(
                    8738,
                    &PlayerRecord {
                        current_team_id: Some(5973),
                        ..Default::default()
                    },
                )?;
                uow.upsert_team_player(5973, 8738, &TeamPlayerRecord::default())?;
                Ok(())
            })
            .unwrap();

        store
            .conn
            .execute("DELETE FROM teams WHERE id = 5973", [])
            .unwrap();

        let player = store.get_player(8738).unwrap().unwrap();
        assert_eq!(player.current_team_id, None);
        assert_eq!(store.counts().unwrap().team_players, 0);
    }
}
