//! The survey set and its lifecycle operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FillerDeck, StepConfig};
use crate::error::{Error, Result};
use crate::models::{Choice, Creator, Survey, SurveyId, SurveySummary, Tally};
use crate::validation;

/// Surveys older than this many days are dropped on every save
pub const RETENTION_DAYS: i64 = 1825;

/// Validated input for a new survey
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
}

impl SurveyDraft {
    /// Trim and bound-check front-end input
    pub fn new(prompt: &str, option_a: &str, option_b: &str) -> Result<Self> {
        let prompt = prompt.trim();
        let option_a = option_a.trim();
        let option_b = option_b.trim();

        validation::validate_prompt(prompt)?;
        validation::validate_option("option_a", option_a)?;
        validation::validate_option("option_b", option_b)?;

        Ok(Self {
            prompt: prompt.to_string(),
            option_a: option_a.to_string(),
            option_b: option_b.to_string(),
        })
    }
}

/// Where a newly created survey ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Nothing was active; the survey went live immediately
    Activated,
    /// An automated survey was pushed out in favour of this one
    Preempted { retired: SurveyId },
    /// Another survey is live; this one waits in the queue
    Queued { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: SurveyId,
    pub outcome: PlacementOutcome,
}

impl Placement {
    /// Whether the new survey is now the live one
    pub fn is_active(&self) -> bool {
        !matches!(self.outcome, PlacementOutcome::Queued { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionSource {
    Queue,
    Filler,
}

/// A survey brought online by rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub survey_id: SurveyId,
    pub source: PromotionSource,
}

/// Snapshot of a survey at the moment it was force-closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureSummary {
    pub survey_id: SurveyId,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub tally: Tally,
    pub net_steps: i64,
    /// Distinct front-end voters, in first-vote order
    pub voters: Vec<i64>,
}

impl ClosureSummary {
    /// Move that returns the indicator to neutral
    pub fn compensation(&self) -> i64 {
        -self.net_steps
    }
}

/// Every survey ever created, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveySet {
    #[serde(default)]
    surveys: Vec<Survey>,
}

impl SurveySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_surveys(surveys: Vec<Survey>) -> Self {
        Self { surveys }
    }

    pub fn surveys(&self) -> &[Survey] {
        &self.surveys
    }

    pub fn len(&self) -> usize {
        self.surveys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surveys.is_empty()
    }

    pub fn next_id(&self) -> SurveyId {
        let max = self.surveys.iter().map(|s| s.id.0).max().unwrap_or(0);
        SurveyId(max + 1)
    }

    pub fn get(&self, id: SurveyId) -> Option<&Survey> {
        self.surveys.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: SurveyId) -> Result<&mut Survey> {
        self.surveys
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("survey {}", id)))
    }

    /// Index of the live survey, newest first should more than one claim it
    fn active_index(&self) -> Option<usize> {
        self.surveys.iter().rposition(|s| s.is_active())
    }

    pub fn active(&self) -> Option<&Survey> {
        self.active_index().map(|i| &self.surveys[i])
    }

    pub fn active_count(&self) -> usize {
        self.surveys.iter().filter(|s| s.is_active()).count()
    }

    pub fn queued_count(&self) -> usize {
        self.surveys.iter().filter(|s| s.is_queued()).count()
    }

    pub fn summaries(&self) -> Vec<SurveySummary> {
        self.surveys.iter().map(Survey::summary).collect()
    }

    /// Add a survey and resolve whether it goes live, preempts, or queues
    pub fn create(
        &mut self,
        draft: SurveyDraft,
        creator: Creator,
        now: DateTime<Utc>,
    ) -> Result<Placement> {
        let id = self.next_id();
        let mut survey = Survey::new(
            id,
            draft.prompt,
            draft.option_a,
            draft.option_b,
            creator,
            now,
        );

        let outcome = match self.active_index() {
            None => {
                survey.activate(now)?;
                PlacementOutcome::Activated
            }
            Some(idx)
                if self.surveys[idx].creator.is_automated() && !survey.creator.is_automated() =>
            {
                let current = &mut self.surveys[idx];
                current.retire()?;
                let retired = current.id;
                survey.activate(now)?;
                PlacementOutcome::Preempted { retired }
            }
            Some(_) => PlacementOutcome::Queued {
                position: self.queued_count() + 1,
            },
        };

        self.surveys.push(survey);
        Ok(Placement { id, outcome })
    }

    /// Bring the oldest queued survey online, or a filler if the queue is empty
    ///
    /// Does nothing while a survey is live.
    pub fn promote_next(
        &mut self,
        now: DateTime<Utc>,
        deck: &FillerDeck,
    ) -> Result<Option<Promotion>> {
        if self.active_index().is_some() {
            return Ok(None);
        }

        if let Some(next) = self
            .surveys
            .iter_mut()
            .filter(|s| s.is_queued())
            .min_by_key(|s| s.id)
        {
            next.activate(now)?;
            return Ok(Some(Promotion {
                survey_id: next.id,
                source: PromotionSource::Queue,
            }));
        }

        let filler = deck.draw();
        let id = self.next_id();
        let mut survey = Survey::new(
            id,
            filler.prompt,
            filler.option_a,
            filler.option_b,
            Creator::automated(),
            now,
        );
        survey.activate(now)?;
        self.surveys.push(survey);

        Ok(Some(Promotion {
            survey_id: id,
            source: PromotionSource::Filler,
        }))
    }

    /// Append a vote to any existing survey; the only writer of tallies
    pub fn cast_vote(
        &mut self,
        id: SurveyId,
        choice: Choice,
        voter_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Tally> {
        let survey = self.get_mut(id)?;
        Ok(survey.record_vote(choice, voter_id, now))
    }

    /// Retire the live survey and summarize it
    pub fn close(&mut self, id: SurveyId, steps: &StepConfig) -> Result<ClosureSummary> {
        let survey = self.get_mut(id)?;
        survey.retire()?;

        Ok(ClosureSummary {
            survey_id: survey.id,
            prompt: survey.prompt.clone(),
            option_a: survey.option_a.clone(),
            option_b: survey.option_b.clone(),
            tally: survey.tally(),
            net_steps: steps.net_steps(survey),
            voters: survey.voter_ids(),
        })
    }

    /// Drop surveys past the retention horizon, whatever their state
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.surveys.len();
        self.surveys
            .retain(|s| (now - s.created_at).num_days() <= RETENTION_DAYS);
        before - self.surveys.len()
    }
}
