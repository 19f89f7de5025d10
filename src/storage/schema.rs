//! SQLite schema definitions for scraped esports data
//!
//! Tables:
//! - events: Tournaments, keyed by the site's event id
//! - teams: Team profiles
//! - players: Player profiles and career metrics
//! - event_teams: Teams attending an event, with placement and prize
//! - team_players: Roster membership
//! - event_stats: Per-event player statistics

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            name TEXT,
            start_date TEXT,
            end_date TEXT,
            location TEXT,
            event_type TEXT,
            prize_pool TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            name TEXT,
            country TEXT,
            world_rank INTEGER,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // current_team_id is a weak reference: losing the team keeps the player
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            nickname TEXT,
            real_name TEXT,
            country TEXT,
            age INTEGER,
            current_team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
            total_maps INTEGER,
            total_rounds INTEGER,
            total_kills INTEGER,
            total_deaths INTEGER,
            kd_ratio REAL,
            headshot_percentage REAL,
            rating REAL,
            kpr REAL,
            apr REAL,
            kast REAL,
            impact REAL,
            adr REAL,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS event_teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            placement INTEGER,
            prize TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            UNIQUE(event_id, team_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS team_players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            role TEXT,
            is_current INTEGER,
            created_at TEXT DEFAULT (datetime('now')),
            UNIQUE(team_id, player_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS event_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            rating REAL,
            maps_played INTEGER,
            kd_ratio REAL,
            created_at TEXT DEFAULT (datetime('now')),
            UNIQUE(event_id, player_id)
        )
        "#,
        [],
    )?;

    // Create indexes for common queries
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_players_team ON players(current_team_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_teams_team ON event_teams(team_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_team_players_player ON team_players(player_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_stats_player ON event_stats(player_id)",
        [],
    )?;

    Ok(())
}
