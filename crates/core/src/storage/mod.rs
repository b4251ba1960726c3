//! SQLite storage layer for Pollboard

mod interactions;
mod migrations;
mod parse;
mod surveys;
mod traits;

use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::board::SurveySet;
use crate::error::Result;

pub use interactions::InteractionStore;
pub use surveys::SurveyStore;
pub use traits::{InteractionRepository, Storage, SurveyRepository};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::get_current_version(&self.conn).unwrap_or(0)
    }

    /// Survey document store
    pub fn surveys(&self) -> SurveyStore<'_> {
        SurveyStore::new(&self.conn)
    }

    /// Per-user interaction dates
    pub fn interactions(&self) -> InteractionStore<'_> {
        InteractionStore::new(&self.conn)
    }
}

impl SurveyRepository for Database {
    fn load_surveys(&self) -> SurveySet {
        self.surveys().load()
    }

    fn save_surveys(&self, set: &mut SurveySet) -> Result<usize> {
        self.surveys().save(set)
    }
}

impl InteractionRepository for Database {
    fn record_interaction(&self, user_key: &str, day: NaiveDate) -> Result<bool> {
        self.interactions().record(user_key, day)
    }

    fn last_interaction(&self, user_key: &str) -> Result<Option<NaiveDate>> {
        self.interactions().last(user_key)
    }
}
