//! Core traits for media conversion

use async_trait::async_trait;
use mediaconv_core::ImageDimensions;
use std::path::Path;
use tokio::sync::OwnedSemaphorePermit;

/// What a converter reports about the file it wrote.
#[derive(Debug, Clone, Default)]
pub struct ConversionOutput {
    /// Set by image converters
    pub dimensions: Option<ImageDimensions>,
}

/// Converter trait - turns the file at `input` into `output` in a target format
#[async_trait]
pub trait MediaConverter: Send + Sync {
    type Options: Send + Sync;

    /// Convert `input` and write the result to `output`.
    ///
    /// `format` is the canonical lowercase output format. Implementations must not leave
    /// the process blocked on the async runtime; CPU-bound work goes to the blocking pool.
    ///
    /// `permit` is the worker-pool slot. It must stay alive until the external work has
    /// stopped, which for blocking-pool work can be after this future is dropped.
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: &str,
        options: Self::Options,
        permit: OwnedSemaphorePermit,
    ) -> Result<ConversionOutput, anyhow::Error>;
}
