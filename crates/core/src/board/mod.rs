//! Survey lifecycle over the whole survey set
//!
//! Everything here is pure: callers load a [`SurveySet`], apply one of the
//! operations, and save it back while holding the store lock.

mod filler;
mod set;
mod steps;

pub use filler::{FillerDeck, FillerPrompt};
pub use set::{
    ClosureSummary, Placement, PlacementOutcome, Promotion, PromotionSource, SurveyDraft,
    SurveySet, RETENTION_DAYS,
};
pub use steps::StepConfig;
