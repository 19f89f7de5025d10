//! hltv-sync
//!
//! Scrapes HLTV events, teams, players and matches through a real browser and
//! keeps them in a local SQLite database.

mod cli;
mod config;
mod error;
mod interchange;
mod retry;
mod scraper;
mod storage;
mod sync;
mod types;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::sync::ArchiveImport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hltv_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::debug!("Database path: {}", config.database.path);

    match cli.command {
        Commands::Init => cli::run_init(&config),
        Commands::Events { limit, show } => cli::run_events(&config, limit, show).await,
        Commands::Teams { event_id, show } => cli::run_teams(&config, event_id, show).await,
        Commands::Players { team, event, show } => {
            cli::run_players(&config, team, event, show).await
        }
        Commands::Status => cli::run_status(&config),
        Commands::Archive {
            pages,
            offset,
            output,
            show,
        } => cli::run_archive(&config, pages, offset, output, show).await,
        Commands::ImportArchive {
            file,
            ids,
            min_teams,
            limit,
        } => cli::run_import_archive(
            &config,
            file,
            ArchiveImport {
                ids,
                min_teams,
                limit,
            },
        ),
        Commands::Event {
            event_id,
            show,
            output_dir,
        } => cli::run_event(&config, event_id, show, output_dir).await,
        Commands::Import { dir } => cli::run_import(&config, dir),
        Commands::Team { team_id, show } => cli::run_team(&config, team_id, show).await,
        Commands::Player { player_id, show } => cli::run_player(&config, player_id, show).await,
        Commands::Match {
            url,
            show,
            output_dir,
        } => cli::run_match(&config, &url, show, output_dir).await,
        Commands::Sync { limit, show } => cli::run_sync(&config, limit, show).await,
    }
}
