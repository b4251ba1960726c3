//! Survey document storage
//!
//! The whole survey set lives in one JSON document, rewritten on every
//! mutation. Callers serialize load-modify-save cycles themselves.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, error, info, instrument};

use crate::board::SurveySet;
use crate::error::Result;
use crate::storage::parse::parse_datetime;

/// Survey document storage operations
pub struct SurveyStore<'a> {
    conn: &'a rusqlite::Connection,
}

impl<'a> SurveyStore<'a> {
    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Load the survey set, falling back to an empty one on any failure
    #[instrument(skip(self))]
    pub fn load(&self) -> SurveySet {
        let body: Option<String> = match self
            .conn
            .query_row("SELECT body FROM survey_document WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
        {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to read survey document");
                return SurveySet::new();
            }
        };

        let Some(body) = body else {
            debug!("No survey document yet");
            return SurveySet::new();
        };

        match serde_json::from_str::<SurveySet>(&body) {
            Ok(set) => set,
            Err(e) => {
                error!(error = %e, "Survey document is malformed, starting empty");
                SurveySet::new()
            }
        }
    }

    /// Sweep expired surveys and write the set
    pub fn save(&self, set: &mut SurveySet) -> Result<usize> {
        self.save_at(set, Utc::now())
    }

    /// Same as [`save`](Self::save) with an explicit clock
    #[instrument(skip(self, set), fields(surveys = set.len()))]
    pub fn save_at(&self, set: &mut SurveySet, now: DateTime<Utc>) -> Result<usize> {
        let removed = set.sweep_expired(now);
        if removed > 0 {
            info!(removed, "Swept expired surveys");
        }

        let body = serde_json::to_string(set)?;
        self.conn
            .execute(
                "INSERT INTO survey_document (id, body, updated_at) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET body = ?1, updated_at = ?2",
                params![body, now.to_rfc3339()],
            )
            .map_err(|e| {
                error!(error = %e, "Failed to write survey document");
                e
            })?;

        Ok(removed)
    }

    /// When the document was last written
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let stamp: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM survey_document WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stamp {
            Some(s) => Ok(Some(parse_datetime(&s)?)),
            None => Ok(None),
        }
    }
}
