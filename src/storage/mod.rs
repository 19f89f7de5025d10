//! SQLite storage module for scraped esports data
//!
//! Every write goes through [`Store::unit_of_work`]; rows are looked up by
//! their site id and merged field by field, so re-running a sync is safe.

pub mod merge;
pub mod repository;
pub mod schema;

pub use merge::{Event, EventStat, EventTeam, Player, Team, TeamPlayer};
pub use repository::{EventSummary, PlayerRating, Store, TableCounts, UnitOfWork};
pub use schema::create_tables;
