//! Pollboard - community poll board service
//!
//! Runs survey rotation and the physical vote bridge against the shared
//! store until Ctrl-C.

use std::sync::Arc;

use pollboard::{AppState, BackgroundTasks, Dispatcher, EngineSettings, SurveyEngine};
use pollboard_actuator::{Actuator, HttpActuator, OfflineActuator};
use pollboard_core::Config;
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Pollboard");

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let actuator = build_actuator(&config);

    let state = match AppState::open(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to open survey store: {}", e);
            std::process::exit(1);
        }
    };

    let engine = Arc::new(SurveyEngine::new(
        state.db.clone(),
        Dispatcher::new(actuator.clone(), Handle::current()),
        EngineSettings::from_config(&state.config),
    ));

    // Show whatever is already live before the first rotation tick
    engine.resync_display();

    let tasks = BackgroundTasks::start(engine, actuator, &state.config.schedule);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutting down");
    tasks.shutdown().await;
}

fn build_actuator(config: &Config) -> Arc<dyn Actuator> {
    let Some(base_url) = config.actuator.normalized_base_url() else {
        tracing::info!("No actuator URL configured, running without hardware");
        return Arc::new(OfflineActuator);
    };

    match HttpActuator::new(base_url.clone(), config.actuator.timeout()) {
        Ok(actuator) => {
            tracing::info!(base_url = %base_url, "Actuator configured");
            Arc::new(actuator)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build actuator client, running without hardware");
            Arc::new(OfflineActuator)
        }
    }
}
