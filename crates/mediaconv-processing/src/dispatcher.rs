//! Conversion dispatcher
//!
//! Routes an uploaded file to the image or audio converter, bounds the number of
//! conversions running at once, enforces the conversion timeout and owns file cleanup:
//! the uploaded file is always removed, and a failed conversion never leaves output behind.

use crate::audio::AudioTranscoder;
use crate::image::ImageConverter;
use crate::traits::{ConversionOutput, MediaConverter};
use mediaconv_core::{
    AudioOptions, ConvertedFile, ImageOptions, MediaKind, OptionsBag, UploadedFile, FORMATS,
};
use mediaconv_storage::{LocalStorage, StorageArea, StorageError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid format '{format}'")]
    InvalidFormat {
        format: String,
        allowed: Vec<String>,
    },

    #[error("Error converting {kind}: {details}")]
    Failed { kind: MediaKind, details: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Conversion worker pool is closed")]
    PoolClosed,
}

/// One conversion job. Request-scoped.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: UploadedFile,
    pub target_format: String,
    pub options: OptionsBag,
}

/// Options after defaults were applied, per media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOptions {
    Image(ImageOptions),
    Audio(AudioOptions),
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub source: UploadedFile,
    pub kind: MediaKind,
    pub converted: ConvertedFile,
    pub options: ResolvedOptions,
    pub duration: Duration,
}

pub struct ConversionDispatcher {
    storage: LocalStorage,
    image: ImageConverter,
    audio: AudioTranscoder,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl ConversionDispatcher {
    pub fn new(
        storage: LocalStorage,
        ffmpeg_path: impl Into<String>,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            image: ImageConverter::new(),
            audio: AudioTranscoder::new(ffmpeg_path),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Free worker-pool slots.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Convert a file of any supported media kind.
    pub async fn convert(&self, request: ConversionRequest) -> Result<Conversion, ConversionError> {
        self.run(request, None).await
    }

    /// Convert a file that must be of `expected` kind; anything else is an unsupported
    /// media type.
    pub async fn convert_expecting(
        &self,
        expected: MediaKind,
        request: ConversionRequest,
    ) -> Result<Conversion, ConversionError> {
        self.run(request, Some(expected)).await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            file = %request.source.generated_name,
            original_name = %request.source.original_name,
            target_format = %request.target_format,
        )
    )]
    async fn run(
        &self,
        request: ConversionRequest,
        expected: Option<MediaKind>,
    ) -> Result<Conversion, ConversionError> {
        let mut pending = PendingFiles::new(&self.storage, &request.source.generated_name);

        let result = self.dispatch(&request, expected, &mut pending).await;
        pending.release().await;

        match result {
            Ok((kind, converted, options, duration)) => {
                tracing::info!(
                    kind = %kind,
                    output = %converted.filename,
                    size_bytes = converted.size_bytes,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    "Conversion succeeded"
                );
                Ok(Conversion {
                    source: request.source,
                    kind,
                    converted,
                    options,
                    duration,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Conversion failed");
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ConversionRequest,
        expected: Option<MediaKind>,
        pending: &mut PendingFiles,
    ) -> Result<(MediaKind, ConvertedFile, ResolvedOptions, Duration), ConversionError> {
        let source = &request.source;
        let kind = FORMATS
            .resolve_media_kind(&source.declared_mime_type, &source.original_name)
            .ok_or_else(|| {
                ConversionError::UnsupportedMediaType(format!(
                    "Cannot convert files of type '{}'",
                    source.declared_mime_type
                ))
            })?;

        if let Some(expected) = expected {
            if expected != kind {
                return Err(ConversionError::UnsupportedMediaType(format!(
                    "Expected an {} file, got {} ('{}')",
                    expected, kind, source.declared_mime_type
                )));
            }
        }

        let format = FORMATS
            .canonical_output_format(kind, &request.target_format)
            .ok_or_else(|| ConversionError::InvalidFormat {
                format: request.target_format.clone(),
                allowed: FORMATS
                    .output_formats_for(kind)
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
            })?;

        let options = match kind {
            MediaKind::Image => ResolvedOptions::Image(request.options.image_options()),
            MediaKind::Audio => ResolvedOptions::Audio(request.options.audio_options()),
        };

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ConversionError::PoolClosed)?;

        let (name, output_path) = self.storage.reserve_converted(format)?;
        pending.output = Some(name.clone());
        let start = Instant::now();

        let outcome = match &options {
            ResolvedOptions::Image(opts) => {
                self.run_with_timeout(
                    &self.image,
                    &source.stored_path,
                    &output_path,
                    format,
                    *opts,
                    permit,
                )
                .await
            }
            ResolvedOptions::Audio(opts) => {
                self.run_with_timeout(
                    &self.audio,
                    &source.stored_path,
                    &output_path,
                    format,
                    opts.clone(),
                    permit,
                )
                .await
            }
        };

        let output = outcome.map_err(|details| ConversionError::Failed { kind, details })?;

        let size_bytes = match self.storage.size(StorageArea::Converted, &name).await {
            Ok(size) if size > 0 => size,
            Ok(_) | Err(StorageError::NotFound(_)) => {
                return Err(ConversionError::Failed {
                    kind,
                    details: "converter produced no output".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        pending.output = None;

        let converted = ConvertedFile {
            stored_path: output_path,
            filename: name,
            size_bytes,
            format: format.to_string(),
            dimensions: output.dimensions,
        };

        Ok((kind, converted, options, start.elapsed()))
    }

    /// Run one converter under the timeout. Errors come back as the client-facing detail
    /// string.
    async fn run_with_timeout<C: MediaConverter>(
        &self,
        converter: &C,
        input: &std::path::Path,
        output: &std::path::Path,
        format: &str,
        options: C::Options,
        permit: OwnedSemaphorePermit,
    ) -> Result<ConversionOutput, String> {
        let conversion = converter.convert(input, output, format, options, permit);
        match tokio::time::timeout(self.timeout, conversion).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(_) => Err(format!(
                "conversion timed out after {}s",
                self.timeout.as_secs_f64()
            )),
        }
    }
}

/// Files owned by an in-flight conversion: the uploaded input and, until the conversion
/// succeeds, the reserved output.
///
/// `release` removes them on every completed path. If the conversion future is dropped
/// first, `Drop` hands the removal to a background task.
struct PendingFiles {
    storage: LocalStorage,
    input: String,
    output: Option<String>,
    released: bool,
}

impl PendingFiles {
    fn new(storage: &LocalStorage, input: &str) -> Self {
        Self {
            storage: storage.clone(),
            input: input.to_string(),
            output: None,
            released: false,
        }
    }

    async fn release(mut self) {
        if let Some(output) = self.output.as_deref() {
            self.storage.discard(StorageArea::Converted, output).await;
        }
        self.storage.discard(StorageArea::Incoming, &self.input).await;
        self.released = true;
    }
}

impl Drop for PendingFiles {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                input = %self.input,
                output = ?self.output,
                "No runtime to clean up files of a cancelled conversion"
            );
            return;
        };

        tracing::debug!(input = %self.input, output = ?self.output, "Conversion cancelled");
        let storage = self.storage.clone();
        let input = std::mem::take(&mut self.input);
        let output = self.output.take();
        runtime.spawn(async move {
            if let Some(output) = output {
                storage.discard(StorageArea::Converted, &output).await;
            }
            storage.discard(StorageArea::Incoming, &input).await;
        });
    }
}
