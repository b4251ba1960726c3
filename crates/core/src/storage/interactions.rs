//! Interaction date storage for greeting throttling

use chrono::NaiveDate;
use rusqlite::params;

use crate::error::Result;
use crate::storage::parse::{parse_date, DATE_FORMAT};

/// Interaction date storage operations
pub struct InteractionStore<'a> {
    conn: &'a rusqlite::Connection,
}

impl<'a> InteractionStore<'a> {
    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Last day the user interacted
    pub fn last(&self, user_key: &str) -> Result<Option<NaiveDate>> {
        let result = self.conn.query_row(
            "SELECT last_date FROM interactions WHERE user_key = ?1",
            params![user_key],
            |row| {
                let day: String = row.get(0)?;
                parse_date(&day)
            },
        );

        match result {
            Ok(day) => Ok(Some(day)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Upsert the user's interaction day; true if the stored day changed
    pub fn record(&self, user_key: &str, day: NaiveDate) -> Result<bool> {
        if self.last(user_key)? == Some(day) {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO interactions (user_key, last_date) VALUES (?1, ?2)
             ON CONFLICT(user_key) DO UPDATE SET last_date = ?2",
            params![user_key, day.format(DATE_FORMAT).to_string()],
        )?;
        Ok(true)
    }

    /// Number of users with a recorded interaction
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.interactions().last("telegram:1").unwrap().is_none());
    }

    #[test]
    fn test_first_interaction_per_day() {
        let db = Database::open_in_memory().unwrap();
        let store = db.interactions();

        assert!(store.record("telegram:1", day(3)).unwrap());
        assert!(!store.record("telegram:1", day(3)).unwrap());
        assert!(store.record("telegram:1", day(4)).unwrap());
        assert!(store.record("discord:1", day(4)).unwrap());

        assert_eq!(store.last("telegram:1").unwrap(), Some(day(4)));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_dates_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.db");
        {
            let db = Database::open(&path).unwrap();
            db.interactions().record("telegram:9", day(12)).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.interactions().last("telegram:9").unwrap(), Some(day(12)));
    }
}
