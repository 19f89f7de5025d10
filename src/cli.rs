//! CLI commands for hltv-sync.
//!
//! Each scraping command builds its own browser-backed fetcher; a failed item
//! is logged and counted, and only setup errors end the run with an error.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::scraper::{BrowserOptions, ChromeLauncher, RateLimiter, RetryingFetcher};
use crate::storage::Store;
use crate::sync::{
    import_archive, import_payloads, ArchiveImport, BatchReport, PlayerSelection, Syncer,
};

#[derive(Parser)]
#[command(name = "hltv-sync")]
#[command(version, about = "HLTV scraper: events, teams, players and matches into SQLite", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database tables
    Init,

    /// Sync the ongoing/upcoming events listing
    Events {
        /// Maximum number of events to store
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Sync teams, placements and rosters of an event
    Teams {
        #[arg(value_name = "EVENT_ID")]
        event_id: i64,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Sync player career stats (all stored players by default)
    Players {
        /// Only the current roster of this team
        #[arg(long, conflicts_with = "event")]
        team: Option<i64>,

        /// Only players of this event; also syncs the event's stats table
        #[arg(long)]
        event: Option<i64>,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Show row counts, recent events and top players
    Status,

    /// Scrape archived events listing pages into the archive JSON file
    Archive {
        /// Number of listing pages to scrape
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Offset of the first page
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Archive file (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Import archive entries as events
    ImportArchive {
        /// Archive file (default from config)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Specific event ids to import
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ids: Vec<i64>,

        /// Minimum team count when no ids are given
        #[arg(long, default_value_t = 16)]
        min_teams: u32,

        /// Maximum number of events when no ids are given
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Scrape one event fully into hltv_event_<id>_full.json
    Event {
        #[arg(value_name = "EVENT_ID")]
        event_id: i64,

        /// Show the browser window
        #[arg(long)]
        show: bool,

        /// Output directory (default from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Import every hltv_event_*_full.json file in a directory
    Import {
        /// Payload directory (default from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Scrape and store one team
    Team {
        #[arg(value_name = "TEAM_ID")]
        team_id: i64,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Scrape and store one player's career stats
    Player {
        #[arg(value_name = "PLAYER_ID")]
        player_id: i64,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },

    /// Scrape one match scorecard into hltv_match_<id>.json
    Match {
        /// Match URL or path, e.g. /matches/2386801/og-vs-9z
        #[arg(value_name = "URL")]
        url: String,

        /// Show the browser window
        #[arg(long)]
        show: bool,

        /// Output directory (default from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Full flow: events listing, then details, rosters, player and event stats
    Sync {
        /// Maximum number of events
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show the browser window
        #[arg(long)]
        show: bool,
    },
}

// ==================== Setup ====================

fn open_store(config: &AppConfig) -> anyhow::Result<Store> {
    let path = config.database_path();
    Store::open(&path).with_context(|| format!("Failed to open database {}", path.display()))
}

fn browser_fetcher(config: &AppConfig, show: bool) -> RetryingFetcher<ChromeLauncher> {
    let options = BrowserOptions::from_config(&config.scraper, !show);
    RetryingFetcher::new(ChromeLauncher::new(options), config.scraper.retry())
}

fn limiter(config: &AppConfig) -> RateLimiter {
    RateLimiter::from_millis(config.scraper.item_delay_ms)
}

fn output_dir(config: &AppConfig, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from(&config.output.dir))
}

fn archive_file(config: &AppConfig, file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(&config.output.archive_file))
}

fn print_report(command: &str, report: &BatchReport) {
    eprintln!();
    eprintln!("{} finished, {} items: {}", command, report.total(), report);
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ==================== Commands ====================

pub fn run_init(config: &AppConfig) -> anyhow::Result<()> {
    open_store(config)?;
    eprintln!("Database ready: {}", config.database.path);
    Ok(())
}

pub async fn run_events(config: &AppConfig, limit: Option<usize>, show: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    let (report, ids) = syncer.sync_events(limit).await;
    eprintln!("Stored {} events", ids.len());
    print_report("events", &report);
    Ok(())
}

pub async fn run_teams(config: &AppConfig, event_id: i64, show: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if !store.event_exists(event_id)? {
        eprintln!("Event {} is not stored yet; it will be created", event_id);
    }
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    let report = syncer.sync_event_teams(event_id).await;
    print_report("teams", &report);
    Ok(())
}

pub async fn run_players(
    config: &AppConfig,
    team: Option<i64>,
    event: Option<i64>,
    show: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    let mut report = BatchReport::default();
    let selection = match (team, event) {
        (Some(team_id), _) => PlayerSelection::Team(team_id),
        (None, Some(event_id)) => {
            report.record(
                &format!("stats of event {}", event_id),
                syncer.sync_event_stats(event_id).await,
            );
            PlayerSelection::Event(event_id)
        }
        (None, None) => PlayerSelection::All,
    };
    report.absorb(syncer.sync_players(selection).await);

    print_report("players", &report);
    Ok(())
}

pub fn run_status(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    print_status(&store)
}

fn print_status(store: &Store) -> anyhow::Result<()> {
    let counts = store.counts()?;

    println!("=== Database ===");
    println!("  {:<14} {:>8}", "events", counts.events);
    println!("  {:<14} {:>8}", "teams", counts.teams);
    println!("  {:<14} {:>8}", "players", counts.players);
    println!("  {:<14} {:>8}", "event_teams", counts.event_teams);
    println!("  {:<14} {:>8}", "team_players", counts.team_players);
    println!("  {:<14} {:>8}", "event_stats", counts.event_stats);
    println!();

    println!("=== Recent Events ===");
    for event in store.recent_events(5)? {
        let date = event
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{:>5}] {:<40} {:>10}  {} teams",
            event.id,
            event.name.as_deref().unwrap_or("?"),
            date,
            event.team_count
        );
    }
    println!();

    println!("=== Top Players (avg event rating) ===");
    for player in store.top_players(10)? {
        println!(
            "  [{:>5}] {:<20} {:.2}  ({} events)",
            player.id,
            player.nickname.as_deref().unwrap_or("?"),
            player.average_rating,
            player.events
        );
    }

    Ok(())
}

pub async fn run_archive(
    config: &AppConfig,
    pages: u32,
    offset: u32,
    output: Option<PathBuf>,
    show: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let path = archive_file(config, output);
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    let report = syncer.scrape_archive(pages, offset, &path).await?;
    eprintln!("Archive saved to {}", path.display());
    print_report("archive", &report);
    Ok(())
}

pub fn run_import_archive(
    config: &AppConfig,
    file: Option<PathBuf>,
    import: ArchiveImport,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let path = archive_file(config, file);

    let report = import_archive(&store, &path, &import)?;
    print_report("import-archive", &report);
    Ok(())
}

pub async fn run_event(
    config: &AppConfig,
    event_id: i64,
    show: bool,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let dir = output_dir(config, dir);
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    match syncer.scrape_event_payload(event_id, &dir).await {
        Ok(path) => eprintln!("Saved {}", path.display()),
        Err(e) => eprintln!("Event {} failed: {:#}", event_id, e),
    }
    Ok(())
}

pub fn run_import(config: &AppConfig, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let dir = output_dir(config, dir);

    let report = import_payloads(&store, &dir)?;
    print_report("import", &report);
    Ok(())
}

pub async fn run_team(config: &AppConfig, team_id: i64, show: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    match syncer.sync_team(team_id).await {
        Ok(page) => print_json(&page)?,
        Err(e) => eprintln!("Team {} failed: {:#}", team_id, e),
    }
    Ok(())
}

pub async fn run_player(config: &AppConfig, player_id: i64, show: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    match syncer.sync_player(player_id).await {
        Ok(record) => print_json(&record)?,
        Err(e) => eprintln!("Player {} failed: {:#}", player_id, e),
    }
    Ok(())
}

pub async fn run_match(
    config: &AppConfig,
    url: &str,
    show: bool,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let dir = output_dir(config, dir);
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    match syncer.scrape_match(url, &dir).await {
        Ok((scorecard, path)) => {
            eprintln!("Saved {}", path.display());
            print_json(&scorecard)?;
        }
        Err(e) => eprintln!("Match {} failed: {:#}", url, e),
    }
    Ok(())
}

pub async fn run_sync(config: &AppConfig, limit: Option<usize>, show: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fetcher = browser_fetcher(config, show);
    let syncer = Syncer::new(&fetcher, &store, limiter(config));

    let report = syncer.sync_all(limit).await;
    print_report("sync", &report);
    eprintln!();
    print_status(&store)
}
