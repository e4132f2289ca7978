//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. Each variant describes its
//! own HTTP presentation through [`ErrorMetadata`], so the API layer renders errors without
//! matching on variants itself.

use crate::models::MediaKind;
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_FORMAT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid format '{format}'. Supported formats: {}", allowed.join(", "))]
    InvalidFormat {
        format: String,
        allowed: Vec<String>,
    },

    #[error("Error converting {kind}: {details}")]
    ConversionFailed { kind: MediaKind, details: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::NoFileProvided => (
            400,
            "NO_FILE_PROVIDED",
            false,
            Some("Attach the file under the 'file' form field"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            400,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Check GET /api/formats for accepted input types"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFormat { .. } => (
            400,
            "INVALID_FORMAT",
            false,
            Some("Choose one of the supported output formats"),
            false,
            LogLevel::Debug,
        ),
        AppError::ConversionFailed { .. } => (
            500,
            "CONVERSION_FAILED",
            false,
            Some("Check the source file and try a different format"),
            false,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the file name exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NoFileProvided => "NoFileProvided",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::InvalidFormat { .. } => "InvalidFormat",
            AppError::ConversionFailed { .. } => "ConversionFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Secondary human-readable message shown next to `error`, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            AppError::UnsupportedMediaType(msg) => Some(msg.clone()),
            AppError::InvalidFormat { format, allowed } => Some(format!(
                "Format '{}' is not supported. Supported formats: {}",
                format,
                allowed.join(", ")
            )),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        if let AppError::ConversionFailed { details, .. } = self {
            return details.clone();
        }

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoFileProvided => "No file uploaded".to_string(),
            AppError::UnsupportedMediaType(_) => "Invalid file type".to_string(),
            AppError::InvalidFormat { .. } => "Invalid format".to_string(),
            AppError::ConversionFailed {
                kind: MediaKind::Image,
                ..
            } => "Error converting image".to_string(),
            AppError::ConversionFailed {
                kind: MediaKind::Audio,
                ..
            } => "Error converting audio file".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
