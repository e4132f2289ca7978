//! Retention sweeper
//!
//! Stored uploads and conversion outputs are only kept for a limited time. The sweeper
//! periodically removes files older than the configured TTL from both storage areas.

use mediaconv_storage::{LocalStorage, StorageArea};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Clone)]
pub struct CleanupService {
    storage: LocalStorage,
    ttl: Duration,
    every: Duration,
}

impl CleanupService {
    pub fn new(storage: LocalStorage, ttl: Duration, every: Duration) -> Self {
        Self {
            storage,
            ttl,
            every,
        }
    }

    /// Start the background sweep loop.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut cleanup_interval = interval(self.every);
            cleanup_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                cleanup_interval.tick().await;

                match self.sweep().await {
                    Ok(0) => tracing::debug!("No expired files to sweep"),
                    Ok(deleted) => tracing::info!(deleted, "Swept expired files"),
                    Err(e) => tracing::error!(error = %e, "Cleanup task failed"),
                }
            }
        })
    }

    /// Delete every file older than the TTL from both areas. Returns the number deleted.
    #[tracing::instrument(skip(self), fields(ttl_secs = self.ttl.as_secs()))]
    pub async fn sweep(&self) -> Result<usize, anyhow::Error> {
        let mut deleted = 0;

        for area in [StorageArea::Incoming, StorageArea::Converted] {
            let expired = self.storage.list_older_than(area, self.ttl).await?;
            for name in expired {
                match self.storage.delete(area, &name).await {
                    Ok(()) => {
                        tracing::debug!(area = area.as_str(), name = %name, "Deleted expired file");
                        deleted += 1;
                    }
                    Err(e) => {
                        tracing::warn!(area = area.as_str(), name = %name, error = %e, "Failed to delete expired file");
                    }
                }
            }
        }

        Ok(deleted)
    }
}
