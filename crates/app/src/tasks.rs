//! Background task lifecycle

use std::sync::Arc;

use pollboard_actuator::Actuator;
use pollboard_core::ScheduleConfig;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bridge::run_bridge;
use crate::engine::SurveyEngine;
use crate::rotation::run_rotation;

/// Rotation and vote bridge tasks, stopped together
pub struct BackgroundTasks {
    shutdown: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Start rotation, plus the vote bridge when a device is configured
    pub fn start(
        engine: Arc<SurveyEngine>,
        actuator: Arc<dyn Actuator>,
        schedule: &ScheduleConfig,
    ) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        let mut handles = Vec::new();

        handles.push(tokio::spawn(run_rotation(
            engine.clone(),
            schedule.rotation_interval(),
            shutdown.subscribe(),
        )));

        if actuator.is_configured() {
            handles.push(tokio::spawn(run_bridge(
                engine,
                actuator,
                schedule.poll_interval(),
                shutdown.subscribe(),
            )));
        } else {
            info!("No actuator configured, physical vote bridge disabled");
        }

        Self { shutdown, handles }
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Signal every task and wait for the loops to exit
    ///
    /// In-flight actuator commands are not awaited.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
    }
}
