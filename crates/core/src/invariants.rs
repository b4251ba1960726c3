//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::board::SurveySet;
use crate::models::{Choice, Survey};

/// At most one survey may be live
pub fn assert_single_active(set: &SurveySet) {
    let active = set.active_count();
    debug_assert!(
        active <= 1,
        "Survey set has {} active surveys, expected 0 or 1",
        active
    );
}

/// Tallies must match the vote log they summarize
pub fn assert_survey_invariants(survey: &Survey) {
    let logged_a = survey.votes().iter().filter(|v| v.choice == Choice::A).count();
    let logged_b = survey.votes().len() - logged_a;

    debug_assert!(
        survey.tally().a as usize == logged_a && survey.tally().b as usize == logged_b,
        "Survey {} tally {:?} disagrees with {} logged A and {} logged B votes",
        survey.id,
        survey.tally(),
        logged_a,
        logged_b
    );

    if let Some(activated_at) = survey.activated_at() {
        debug_assert!(
            activated_at >= survey.created_at,
            "Survey {} activated before it was created",
            survey.id
        );
    }
}

/// Check every survey plus the set-wide invariant
pub fn assert_set_invariants(set: &SurveySet) {
    assert_single_active(set);
    for survey in set.surveys() {
        assert_survey_invariants(survey);
    }
}
