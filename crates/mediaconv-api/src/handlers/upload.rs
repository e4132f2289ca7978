use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::receive_upload;
use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use mediaconv_core::models::{StoredFileInfo, UploadResponse};
use mediaconv_core::MediaKind;
use mediaconv_infra::{ErrorResponse, RequestId};
use mediaconv_processing::ImageConverter;
use mediaconv_storage::{LocalStorage, StorageArea};
use std::sync::Arc;

/// Store a file without converting it. It stays under `/uploads` until the retention
/// sweeper removes it.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file or invalid file type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.0, operation = "upload_file")
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (file, _fields) = receive_upload(&state, multipart).await?;

    let dimensions = match state
        .formats
        .resolve_media_kind(&file.declared_mime_type, &file.original_name)
    {
        Some(MediaKind::Image) => ImageConverter::probe_dimensions(&file.stored_path).await,
        _ => None,
    };

    tracing::info!(
        file = %file.generated_name,
        size_bytes = file.size_bytes,
        "File stored"
    );

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file: StoredFileInfo {
            path: LocalStorage::public_path(StorageArea::Incoming, &file.generated_name),
            filename: file.generated_name,
            original_name: file.original_name,
            size: file.size_bytes,
            mimetype: file.declared_mime_type,
            dimensions,
        },
    }))
}
