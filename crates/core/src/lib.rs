//! Pollboard Core Library
//!
//! Survey model, lifecycle logic, configuration, and storage for the
//! community poll board.

pub mod board;
pub mod config;
pub mod error;
pub mod invariants;
pub mod models;
pub mod storage;
pub mod validation;

pub use board::{
    ClosureSummary, FillerDeck, FillerPrompt, Placement, PlacementOutcome, Promotion,
    PromotionSource, StepConfig, SurveyDraft, SurveySet, RETENTION_DAYS,
};
pub use config::{ActuatorConfig, ClosureConfig, Config, ConfigError, ScheduleConfig, StorageConfig};
pub use error::{Error, Result};
pub use models::*;
pub use storage::{Database, InteractionRepository, Storage, SurveyRepository};
