//! Survey creator identity

use serde::{Deserialize, Serialize};

/// Creator id reserved for surveys the system generates on its own
pub const AUTOMATED_CREATOR_ID: i64 = 0;

/// Who created a survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: i64,
    pub name: String,
}

impl Creator {
    pub fn person(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The system identity used for filler surveys
    pub fn automated() -> Self {
        Self {
            id: AUTOMATED_CREATOR_ID,
            name: "Automatic".to_string(),
        }
    }

    pub fn is_automated(&self) -> bool {
        self.id == AUTOMATED_CREATOR_ID
    }
}
