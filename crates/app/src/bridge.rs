//! Physical vote bridge: imports votes cast on the device itself

use std::sync::Arc;
use std::time::Duration;

use pollboard_actuator::Actuator;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::engine::SurveyEngine;

/// Poll the device every `every` until shutdown
///
/// Poll failures are dropped; the next tick simply tries again.
pub async fn run_bridge(
    engine: Arc<SurveyEngine>,
    actuator: Arc<dyn Actuator>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => poll_once(&engine, actuator.as_ref()).await,
            _ = shutdown.recv() => {
                info!("Vote bridge stopping");
                break;
            }
        }
    }
}

async fn poll_once(engine: &SurveyEngine, actuator: &dyn Actuator) {
    let votes = match actuator.poll_votes().await {
        Ok(votes) => votes,
        Err(e) => {
            debug!(error = %e, "Vote poll failed");
            return;
        }
    };
    if votes.is_empty() {
        return;
    }

    if let Err(e) = engine.replay_physical_votes(votes) {
        error!(error = %e, "Failed to record physical votes");
    }
}
