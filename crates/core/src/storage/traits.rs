//! Storage repository traits
//!
//! Front ends and background tasks talk to storage through these, so the
//! SQLite backend can be swapped for a mock in tests.

use chrono::NaiveDate;

use crate::board::SurveySet;
use crate::error::Result;

/// Survey document operations
pub trait SurveyRepository {
    /// Load the full survey set; missing or unreadable data yields an empty set
    fn load_surveys(&self) -> SurveySet;

    /// Sweep expired surveys, then persist the set. Returns how many were swept.
    fn save_surveys(&self, set: &mut SurveySet) -> Result<usize>;
}

/// Per-user interaction dates, used for once-a-day greetings
pub trait InteractionRepository {
    /// Record an interaction on `day`; true if it is the user's first that day
    fn record_interaction(&self, user_key: &str, day: NaiveDate) -> Result<bool>;

    /// Most recent day the user interacted
    fn last_interaction(&self, user_key: &str) -> Result<Option<NaiveDate>>;
}

/// Combined storage interface
pub trait Storage: SurveyRepository + InteractionRepository {}

impl<T> Storage for T where T: SurveyRepository + InteractionRepository {}
