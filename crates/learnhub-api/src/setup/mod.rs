//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use learnhub_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        store_backend = %config.store_backend(),
        "Configuration loaded and validated successfully"
    );

    let repos = database::setup_repositories(&config).await?;
    let state = services::initialize_services(&config, &repos).await?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
