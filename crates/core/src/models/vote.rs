//! Vote choices and the append-only vote log entries

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the two options of a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::A => write!(f, "A"),
            Choice::B => write!(f, "B"),
        }
    }
}

impl FromStr for Choice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Choice::A),
            "B" | "b" => Ok(Choice::B),
            other => Err(Error::Validation {
                field: "choice",
                reason: format!("expected A or B, got {:?}", other),
            }),
        }
    }
}

/// A single cast vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub choice: Choice,
    /// Option text as it read when the vote was cast
    pub choice_text: String,
    pub cast_at: DateTime<Utc>,
    /// Front-end identity of the voter; physical votes carry none
    #[serde(default)]
    pub voter_id: Option<i64>,
}

/// Vote counts for both options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub a: u32,
    pub b: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.a.saturating_add(self.b)
    }
}
