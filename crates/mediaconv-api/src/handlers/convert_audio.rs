use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::receive_upload;
use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use mediaconv_core::models::{AudioConversionResponse, ConvertedAudioInfo, OriginalFileInfo};
use mediaconv_core::{AppError, MediaKind, OptionsBag};
use mediaconv_infra::{ErrorResponse, RequestId};
use mediaconv_processing::{ConversionRequest, ResolvedOptions};
use mediaconv_storage::{LocalStorage, StorageArea};
use std::sync::Arc;

/// Transcode an uploaded audio file with ffmpeg.
///
/// Multipart fields: `file`, `format` (target audio format) and an optional `options` JSON
/// string (`bitrate`, `sampleRate`, `channels`).
#[utoipa::path(
    post,
    path = "/api/convert-audio",
    tag = "conversion",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Audio file converted successfully", body = AudioConversionResponse),
        (status = 400, description = "No file, invalid file type or invalid format", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Transcoding failed or timed out", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.0, operation = "convert_audio")
)]
pub async fn convert_audio(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<Json<AudioConversionResponse>, HttpAppError> {
    let (file, fields) = receive_upload(&state, multipart).await?;

    let conversion = state
        .dispatcher
        .convert_expecting(
            MediaKind::Audio,
            ConversionRequest {
                source: file,
                target_format: fields.format.unwrap_or_default(),
                options: OptionsBag::from_form_field(fields.options.as_deref()),
            },
        )
        .await?;

    let ResolvedOptions::Audio(options) = conversion.options else {
        return Err(AppError::Internal(
            "Audio conversion resolved non-audio options".to_string(),
        )
        .into());
    };
    let converted = conversion.converted;

    Ok(Json(AudioConversionResponse {
        message: "Audio file converted successfully".to_string(),
        original: OriginalFileInfo::from(&conversion.source),
        converted: ConvertedAudioInfo {
            path: LocalStorage::public_path(StorageArea::Converted, &converted.filename),
            filename: converted.filename,
            size: converted.size_bytes,
            format: converted.format,
        },
        options,
    }))
}
