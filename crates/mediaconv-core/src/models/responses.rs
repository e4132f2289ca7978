//! JSON bodies returned by the HTTP API

use crate::models::media::{ImageDimensions, UploadedFile};
use crate::models::options::{AudioOptions, ImageOptions};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputFormats {
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputFormats {
    /// Image output formats
    pub formats: Vec<String>,
    pub audio_formats: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormatsResponse {
    pub input: InputFormats,
    pub output: OutputFormats,
}

/// The uploaded file as received.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginalFileInfo {
    pub filename: String,
    pub original_name: String,
    /// Extension of the uploaded file, without the dot
    pub format: String,
    pub size: u64,
    pub mimetype: String,
}

impl From<&UploadedFile> for OriginalFileInfo {
    fn from(file: &UploadedFile) -> Self {
        Self {
            filename: file.generated_name.clone(),
            original_name: file.original_name.clone(),
            format: file.original_format().to_string(),
            size: file.size_bytes,
            mimetype: file.declared_mime_type.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertedImageInfo {
    pub filename: String,
    pub format: String,
    pub size: u64,
    /// Public URL path (`/converted/<filename>`)
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    pub quality: u8,
    /// Caller options merged with the resolved values and the target format
    #[schema(value_type = Object)]
    pub options: Map<String, Value>,
}

impl ConvertedImageInfo {
    /// Echo of the caller's options: unknown keys are kept, known keys carry the value
    /// actually used, and `format` is the canonical target format.
    pub fn options_echo(
        raw: &Map<String, Value>,
        resolved: &ImageOptions,
        format: &str,
    ) -> Map<String, Value> {
        let mut echo = raw.clone();
        echo.insert("quality".to_string(), Value::from(resolved.quality));
        if let Some(width) = resolved.width {
            echo.insert("width".to_string(), Value::from(width));
        }
        if let Some(height) = resolved.height {
            echo.insert("height".to_string(), Value::from(height));
        }
        echo.insert(
            "maintainAspectRatio".to_string(),
            Value::from(resolved.maintain_aspect_ratio),
        );
        echo.insert("format".to_string(), Value::from(format));
        echo
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageConversionResponse {
    pub message: String,
    pub original: OriginalFileInfo,
    pub converted: ConvertedImageInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertedAudioInfo {
    pub filename: String,
    pub path: String,
    pub size: u64,
    pub format: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AudioConversionResponse {
    pub message: String,
    pub original: OriginalFileInfo,
    pub converted: ConvertedAudioInfo,
    pub options: AudioOptions,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileInfo {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub mimetype: String,
    /// Public URL path (`/uploads/<filename>`)
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub file: StoredFileInfo,
}
