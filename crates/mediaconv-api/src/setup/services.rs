//! Service initialization

use crate::state::AppState;
use anyhow::{Context, Result};
use mediaconv_core::{Config, FORMATS};
use mediaconv_infra::CleanupService;
use mediaconv_processing::{ConversionDispatcher, MediaValidator};
use mediaconv_storage::LocalStorage;
use std::sync::Arc;

/// Create the storage directories and the conversion services.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage = LocalStorage::new(config.upload_dir(), config.converted_dir())
        .await
        .context("Failed to initialize local storage")?;

    let validator = MediaValidator::new(config.max_upload_size_bytes() as u64, &FORMATS);

    let dispatcher = ConversionDispatcher::new(
        storage.clone(),
        config.ffmpeg_path(),
        config.max_concurrent_conversions(),
        config.conversion_timeout(),
    );

    tracing::info!(
        max_concurrent_conversions = config.max_concurrent_conversions(),
        "Conversion dispatcher initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        formats: &FORMATS,
        storage,
        validator,
        dispatcher,
    }))
}

/// Start the retention sweeper. Returns `None` when no TTL is configured.
pub fn start_cleanup(
    config: &Config,
    state: &AppState,
) -> Option<tokio::task::JoinHandle<()>> {
    let ttl = config.file_ttl()?;
    let service = Arc::new(CleanupService::new(
        state.storage.clone(),
        ttl,
        config.cleanup_interval(),
    ));

    tracing::info!(
        ttl_secs = ttl.as_secs(),
        interval_secs = config.cleanup_interval().as_secs(),
        "Retention sweeper started"
    );

    Some(service.start())
}
