//! Motor step bookkeeping

use serde::{Deserialize, Serialize};

use crate::models::{Choice, Survey, Tally};

/// Signed motor displacement applied per vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub steps_a: i64,
    pub steps_b: i64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            steps_a: 68,
            steps_b: -68,
        }
    }
}

impl StepConfig {
    pub fn steps_for(&self, choice: Choice) -> i64 {
        match choice {
            Choice::A => self.steps_a,
            Choice::B => self.steps_b,
        }
    }

    /// Displacement implied by replaying every vote of a tally
    pub fn net_steps_for(&self, tally: Tally) -> i64 {
        i64::from(tally.a) * self.steps_a + i64::from(tally.b) * self.steps_b
    }

    /// Displacement implied by replaying every vote cast on a survey
    pub fn net_steps(&self, survey: &Survey) -> i64 {
        self.net_steps_for(survey.tally())
    }
}
