//! Pollboard - community poll board synced with a physical indicator
//!
//! Front ends (chat bots, kiosks) link this crate and talk to
//! [`SurveyEngine`]. The binary runs the background tasks.

pub mod bridge;
pub mod closure;
pub mod dispatch;
pub mod engine;
pub mod notify;
pub mod rotation;
pub mod state;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

pub use closure::{ClosurePolicy, ClosureReport};
pub use dispatch::{Command, CommandPlan, Dispatcher};
pub use engine::{
    EngineSettings, ReplayOutcome, SurveyEngine, VoteOutcome, MAX_REPLAY_PER_OPTION,
};
pub use notify::{closure_message, ClosureNotifier, LogNotifier};
pub use state::AppState;
pub use tasks::BackgroundTasks;
