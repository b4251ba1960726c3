//! Periodic rotation: keeps exactly one survey live

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::engine::SurveyEngine;

/// Rotate every `every` until shutdown; the first check runs immediately
pub async fn run_rotation(
    engine: Arc<SurveyEngine>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = engine.rotate() {
                    error!(error = %e, "Survey rotation failed");
                }
            }
            _ = shutdown.recv() => {
                info!("Rotation task stopping");
                break;
            }
        }
    }
}
