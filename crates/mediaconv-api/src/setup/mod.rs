//! Application setup and initialization
//!
//! Builds the shared state and the router from a [`Config`]. Integration tests call
//! [`services::initialize_services`] and [`routes::setup_routes`] directly, skipping telemetry
//! and the background sweeper.

pub mod routes;
pub mod server;
pub mod services;

use crate::constants::SERVICE_NAME;
use crate::state::AppState;
use anyhow::{Context, Result};
use mediaconv_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    mediaconv_infra::init_telemetry(SERVICE_NAME, config.environment(), config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        upload_dir = %config.upload_dir().display(),
        converted_dir = %config.converted_dir().display(),
        max_upload_size_bytes = config.max_upload_size_bytes(),
        ffmpeg_path = %config.ffmpeg_path(),
        conversion_timeout_secs = config.conversion_timeout().as_secs(),
        max_concurrent_conversions = config.max_concurrent_conversions(),
        file_ttl_secs = config.file_ttl().map(|ttl| ttl.as_secs()).unwrap_or(0),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;

    if services::start_cleanup(&config, &state).is_none() {
        tracing::info!("Retention sweeper disabled (FILE_TTL_SECS=0)");
    }

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
