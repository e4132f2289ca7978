//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Library errors convert into
//! [`HttpAppError`] with `?`, so every failure renders the same JSON body and is logged at the
//! level its [`AppError`] variant asks for.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediaconv_core::{AppError, ErrorMetadata, LogLevel};
use mediaconv_infra::ErrorResponse;
use mediaconv_processing::{ConversionError, ValidationError};
use mediaconv_storage::StorageError;

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and AppError live in other crates)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::InvalidName(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(name) => AppError::NotFound(format!("File not found: {}", name)),
            other => AppError::InternalWithSource {
                message: other.to_string(),
                source: anyhow::Error::new(other),
            },
        };
        HttpAppError(app_error)
    }
}

impl From<ConversionError> for HttpAppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::UnsupportedMediaType(msg) => {
                HttpAppError(AppError::UnsupportedMediaType(msg))
            }
            ConversionError::InvalidFormat { format, allowed } => {
                HttpAppError(AppError::InvalidFormat { format, allowed })
            }
            ConversionError::Failed { kind, details } => {
                HttpAppError(AppError::ConversionFailed { kind, details })
            }
            ConversionError::Storage(e) => HttpAppError::from(e),
            ConversionError::PoolClosed => {
                HttpAppError(AppError::Internal("Conversion worker pool is closed".to_string()))
            }
        }
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app_error = match err {
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            )),
            ValidationError::UnsupportedType {
                content_type,
                filename,
            } => AppError::UnsupportedMediaType(format!(
                "File type '{}' ({}) is not accepted",
                content_type, filename
            )),
            ValidationError::EmptyFile => {
                AppError::InvalidInput("Uploaded file is empty".to_string())
            }
        };
        HttpAppError(app_error)
    }
}

/// Body limit hits become 413; anything else is a malformed request.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body exceeds the maximum upload size".to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart body: {}",
            err.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the JSON body for an error. Sensitive errors never carry details in production.
pub fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let (details, error_type) = if is_production && app_error.is_sensitive() {
        (None, None)
    } else {
        (
            Some(app_error.detailed_message()),
            Some(app_error.error_type().to_string()),
        )
    };

    ErrorResponse {
        error: app_error.client_message(),
        message: app_error.message(),
        details,
        code: app_error.error_code().to_string(),
        error_type,
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}
