//! Survey model - a two-option poll with a queued/active/retired lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Choice, Creator, Tally, VoteRecord};
use crate::error::{Error, Result};

/// Survey identifier, allocated as `max(existing) + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub u64);

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a survey
///
/// `Queued -> Active -> Retired` is the only path. A retired survey keeps
/// the timestamp of its activation and never returns to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    Queued,
    Active { activated_at: DateTime<Utc> },
    Retired { activated_at: DateTime<Utc> },
}

/// State without payload, for display and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Queued,
    Active,
    Retired,
}

impl SurveyState {
    pub fn status(&self) -> SurveyStatus {
        match self {
            SurveyState::Queued => SurveyStatus::Queued,
            SurveyState::Active { .. } => SurveyStatus::Active,
            SurveyState::Retired { .. } => SurveyStatus::Retired,
        }
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SurveyState::Queued => None,
            SurveyState::Active { activated_at } | SurveyState::Retired { activated_at } => {
                Some(*activated_at)
            }
        }
    }
}

/// A two-option community survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SurveyRecord", into = "SurveyRecord")]
pub struct Survey {
    pub id: SurveyId,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub creator: Creator,
    pub created_at: DateTime<Utc>,
    state: SurveyState,
    tally: Tally,
    votes: Vec<VoteRecord>,
}

impl Survey {
    /// Build a fresh queued survey
    pub fn new(
        id: SurveyId,
        prompt: String,
        option_a: String,
        option_b: String,
        creator: Creator,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prompt,
            option_a,
            option_b,
            creator,
            created_at,
            state: SurveyState::Queued,
            tally: Tally::default(),
            votes: Vec::new(),
        }
    }

    pub fn state(&self) -> SurveyState {
        self.state
    }

    pub fn status(&self) -> SurveyStatus {
        self.state.status()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SurveyState::Active { .. })
    }

    pub fn is_queued(&self) -> bool {
        matches!(self.state, SurveyState::Queued)
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.state.activated_at()
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn votes(&self) -> &[VoteRecord] {
        &self.votes
    }

    /// Option text for a choice
    pub fn option_text(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.option_a,
            Choice::B => &self.option_b,
        }
    }

    /// Distinct voter ids in first-vote order
    pub fn voter_ids(&self) -> Vec<i64> {
        let mut seen = Vec::new();
        for id in self.votes.iter().filter_map(|v| v.voter_id) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Queued -> Active
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.state {
            SurveyState::Queued => {
                self.state = SurveyState::Active { activated_at: now };
                Ok(())
            }
            other => Err(Error::InvalidTransition(format!(
                "survey {} cannot be activated from {:?}",
                self.id,
                other.status()
            ))),
        }
    }

    /// Active -> Retired, keeping the activation timestamp
    pub fn retire(&mut self) -> Result<()> {
        match self.state {
            SurveyState::Active { activated_at } => {
                self.state = SurveyState::Retired { activated_at };
                Ok(())
            }
            other => Err(Error::InvalidTransition(format!(
                "survey {} cannot be retired from {:?}",
                self.id,
                other.status()
            ))),
        }
    }

    /// Append a vote and bump the matching tally
    ///
    /// Accepted in any state: front ends only offer the active survey, but a
    /// vote racing a rotation still lands on the survey it was cast for.
    pub(crate) fn record_vote(
        &mut self,
        choice: Choice,
        voter_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Tally {
        self.votes.push(VoteRecord {
            choice,
            choice_text: self.option_text(choice).to_string(),
            cast_at: now,
            voter_id,
        });
        match choice {
            Choice::A => self.tally.a += 1,
            Choice::B => self.tally.b += 1,
        }
        self.tally
    }

    /// Copy without the vote log, for administrative listings
    pub fn summary(&self) -> SurveySummary {
        SurveySummary {
            id: self.id,
            prompt: self.prompt.clone(),
            option_a: self.option_a.clone(),
            option_b: self.option_b.clone(),
            creator: self.creator.clone(),
            created_at: self.created_at,
            activated_at: self.activated_at(),
            status: self.status(),
            votes_a: self.tally.a,
            votes_b: self.tally.b,
        }
    }
}

/// Survey without its vote log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveySummary {
    pub id: SurveyId,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub creator: Creator,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub status: SurveyStatus,
    pub votes_a: u32,
    pub votes_b: u32,
}

/// On-disk shape of a survey: the tagged state is flattened to the
/// `active` / `activated_at` pair.
#[derive(Serialize, Deserialize)]
struct SurveyRecord {
    id: SurveyId,
    prompt: String,
    option_a: String,
    option_b: String,
    creator_id: i64,
    creator_name: String,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    active: bool,
    #[serde(default)]
    votes_a: u32,
    #[serde(default)]
    votes_b: u32,
    #[serde(default)]
    votes: Vec<VoteRecord>,
}

impl From<Survey> for SurveyRecord {
    fn from(s: Survey) -> Self {
        Self {
            id: s.id,
            prompt: s.prompt,
            option_a: s.option_a,
            option_b: s.option_b,
            creator_id: s.creator.id,
            creator_name: s.creator.name,
            created_at: s.created_at,
            activated_at: s.state.activated_at(),
            active: matches!(s.state, SurveyState::Active { .. }),
            votes_a: s.tally.a,
            votes_b: s.tally.b,
            votes: s.votes,
        }
    }
}

impl From<SurveyRecord> for Survey {
    fn from(r: SurveyRecord) -> Self {
        let state = match (r.active, r.activated_at) {
            (false, None) => SurveyState::Queued,
            (false, Some(activated_at)) => SurveyState::Retired { activated_at },
            (true, Some(activated_at)) => SurveyState::Active { activated_at },
            (true, None) => {
                tracing::warn!(survey_id = %r.id, "Active survey without activation time");
                SurveyState::Active {
                    activated_at: r.created_at,
                }
            }
        };

        Self {
            id: r.id,
            prompt: r.prompt,
            option_a: r.option_a,
            option_b: r.option_b,
            creator: Creator {
                id: r.creator_id,
                name: r.creator_name,
            },
            created_at: r.created_at,
            state,
            tally: Tally {
                a: r.votes_a,
                b: r.votes_b,
            },
            votes: r.votes,
        }
    }
}
