//! Forced closure once a survey collects enough votes

use chrono::{DateTime, Utc};
use pollboard_core::{
    ClosureSummary, FillerDeck, Promotion, Result, StepConfig, SurveyId, SurveySet, Tally,
};
use tracing::info;

/// What happened when a survey was force-closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureReport {
    pub summary: ClosureSummary,
    /// Move that returns the indicator to neutral
    pub compensation: i64,
    /// Survey brought online in its place
    pub promoted: Option<Promotion>,
}

#[derive(Debug, Clone, Copy)]
pub struct ClosurePolicy {
    threshold: u32,
    steps: StepConfig,
}

impl ClosurePolicy {
    pub fn new(threshold: u32, steps: StepConfig) -> Self {
        Self { threshold, steps }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn should_close(&self, tally: Tally) -> bool {
        tally.total() >= self.threshold
    }

    /// Close `id` if it is live and at the threshold, then promote the next survey
    ///
    /// Votes on surveys that are no longer live never trigger a closure.
    pub fn check(
        &self,
        set: &mut SurveySet,
        id: SurveyId,
        deck: &FillerDeck,
        now: DateTime<Utc>,
    ) -> Result<Option<ClosureReport>> {
        let due = set
            .get(id)
            .map(|s| s.is_active() && self.should_close(s.tally()))
            .unwrap_or(false);
        if !due {
            return Ok(None);
        }

        let summary = set.close(id, &self.steps)?;
        let compensation = summary.compensation();
        info!(
            survey_id = %id,
            votes_a = summary.tally.a,
            votes_b = summary.tally.b,
            compensation,
            "Vote threshold reached, survey closed"
        );

        let promoted = set.promote_next(now, deck)?;
        Ok(Some(ClosureReport {
            summary,
            compensation,
            promoted,
        }))
    }
}
