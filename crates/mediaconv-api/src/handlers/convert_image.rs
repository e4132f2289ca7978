use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::receive_upload;
use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use mediaconv_core::models::{ConvertedImageInfo, ImageConversionResponse, OriginalFileInfo};
use mediaconv_core::{AppError, MediaKind, OptionsBag};
use mediaconv_infra::{ErrorResponse, RequestId};
use mediaconv_processing::{ConversionRequest, ResolvedOptions};
use mediaconv_storage::{LocalStorage, StorageArea};
use std::sync::Arc;

/// Convert an uploaded image.
///
/// Multipart fields: `file`, `format` (target image format) and an optional `options` JSON
/// string (`quality`, `width`, `height`, `maintainAspectRatio`).
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "conversion",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image converted successfully", body = ImageConversionResponse),
        (status = 400, description = "No file, invalid file type or invalid format", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.0, operation = "convert_image")
)]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<Json<ImageConversionResponse>, HttpAppError> {
    let (file, fields) = receive_upload(&state, multipart).await?;
    let options = OptionsBag::from_form_field(fields.options.as_deref());

    let conversion = state
        .dispatcher
        .convert_expecting(
            MediaKind::Image,
            ConversionRequest {
                source: file,
                target_format: fields.format.unwrap_or_default(),
                options: options.clone(),
            },
        )
        .await?;

    let ResolvedOptions::Image(resolved) = conversion.options else {
        return Err(AppError::Internal(
            "Image conversion resolved non-image options".to_string(),
        )
        .into());
    };
    let converted = &conversion.converted;

    Ok(Json(ImageConversionResponse {
        message: "Image converted successfully".to_string(),
        original: OriginalFileInfo::from(&conversion.source),
        converted: ConvertedImageInfo {
            filename: converted.filename.clone(),
            format: converted.format.clone(),
            size: converted.size_bytes,
            path: LocalStorage::public_path(StorageArea::Converted, &converted.filename),
            dimensions: converted.dimensions.clone(),
            quality: resolved.quality,
            options: ConvertedImageInfo::options_echo(options.raw(), &resolved, &converted.format),
        },
    }))
}
