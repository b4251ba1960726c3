//! Application state management

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use pollboard_core::{Config, Database, Error, InteractionRepository, Result};
use tracing::{error, warn};

/// Shared handles for front ends and background tasks
pub struct AppState {
    pub config: Config,
    pub db: Arc<Mutex<Database>>,
}

impl AppState {
    /// Open the configured database, creating its directory if needed
    pub fn open(config: Config) -> Result<Self> {
        let db_path = Self::database_path(&config)?;

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Database) -> Self {
        Self {
            config,
            db: Arc::new(Mutex::new(db)),
        }
    }

    fn database_path(config: &Config) -> Result<PathBuf> {
        config.database_path().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })
    }

    /// Whether this is the user's first interaction today, recording it if so
    pub fn is_first_interaction_today(&self, user_key: &str) -> bool {
        self.is_first_interaction_on(user_key, Local::now().date_naive())
    }

    pub fn is_first_interaction_on(&self, user_key: &str, day: NaiveDate) -> bool {
        let db = lock_db(&self.db);
        match db.record_interaction(user_key, day) {
            Ok(first) => first,
            Err(e) => {
                warn!(user_key, error = %e, "Failed to record interaction");
                false
            }
        }
    }

    pub fn last_interaction(&self, user_key: &str) -> Option<NaiveDate> {
        let db = lock_db(&self.db);
        db.last_interaction(user_key).ok().flatten()
    }
}

/// Lock the store, recovering from a panicked holder
pub(crate) fn lock_db(db: &Mutex<Database>) -> MutexGuard<'_, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("Database mutex poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memory_state() -> AppState {
        AppState::with_database(Config::default(), Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_first_interaction_once_per_day() {
        let state = memory_state();
        let monday = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();

        assert!(state.is_first_interaction_on("tg:5", monday));
        assert!(!state.is_first_interaction_on("tg:5", monday));
        assert!(state.is_first_interaction_on("tg:5", tuesday));
        assert_eq!(state.last_interaction("tg:5"), Some(tuesday));
        assert_eq!(state.last_interaction("tg:6"), None);
    }

    #[test]
    fn test_today_is_recorded() {
        let state = memory_state();
        assert!(state.is_first_interaction_today("tg:1"));
        assert!(!state.is_first_interaction_today("tg:1"));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("nested/dir/board.db"));

        let state = AppState::open(config).unwrap();
        assert!(dir.path().join("nested/dir/board.db").exists());
        assert_eq!(lock_db(&state.db).schema_version(), 2);
    }
}
