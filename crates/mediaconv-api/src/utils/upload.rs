//! Multipart upload receiver shared by the upload and conversion handlers

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::multipart::Field;
use axum::extract::Multipart;
use mediaconv_core::formats::normalize_mime;
use mediaconv_core::{AppError, UploadedFile};
use mediaconv_storage::StorageArea;
use tokio::io::AsyncWriteExt;

const FILE_FIELD: &str = "file";
const FORMAT_FIELD: &str = "format";
const OPTIONS_FIELD: &str = "options";

/// Text fields sent next to the file.
#[derive(Debug, Default)]
pub struct UploadFields {
    pub format: Option<String>,
    pub options: Option<String>,
}

/// Receive exactly one `file` field, streaming it into the incoming directory, and collect
/// the `format` and `options` text fields in whatever order they arrive.
///
/// The stored file is validated once the stream ends. On any failure the stored file
/// (complete or partial) is removed before the error is returned.
pub async fn receive_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(UploadedFile, UploadFields), HttpAppError> {
    let mut upload: Option<UploadedFile> = None;
    let mut fields = UploadFields::default();

    let read = read_fields(state, &mut multipart, &mut upload, &mut fields).await;

    let checked = read.and_then(|()| {
        let file = upload.as_ref().ok_or(AppError::NoFileProvided)?;
        state.validator.validate(
            &file.declared_mime_type,
            &file.original_name,
            file.size_bytes,
        )?;
        Ok(())
    });

    match (checked, upload) {
        (Ok(()), Some(file)) => {
            tracing::debug!(
                file = %file.generated_name,
                original_name = %file.original_name,
                mime_type = %file.declared_mime_type,
                size_bytes = file.size_bytes,
                "Upload received"
            );
            Ok((file, fields))
        }
        (Ok(()), None) => Err(AppError::NoFileProvided.into()),
        (Err(e), upload) => {
            if let Some(file) = upload {
                state
                    .storage
                    .discard(StorageArea::Incoming, &file.generated_name)
                    .await;
            }
            Err(e)
        }
    }
}

async fn read_fields(
    state: &AppState,
    multipart: &mut Multipart,
    upload: &mut Option<UploadedFile>,
    fields: &mut UploadFields,
) -> Result<(), HttpAppError> {
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if upload.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    )
                    .into());
                }
                store_file(state, field, upload).await?;
            }
            FORMAT_FIELD => fields.format = Some(field.text().await?.trim().to_string()),
            OPTIONS_FIELD => fields.options = Some(field.text().await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }
    Ok(())
}

/// Stream one file field to disk. `upload` is filled in before the first chunk is written
/// so the caller can remove a partial file.
async fn store_file(
    state: &AppState,
    mut field: Field<'_>,
    upload: &mut Option<UploadedFile>,
) -> Result<(), HttpAppError> {
    let original_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or("unknown")
        .to_string();
    let declared_mime_type = field
        .content_type()
        .map(normalize_mime)
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let (generated_name, stored_path, mut out) =
        state.storage.create_incoming(&original_name).await?;

    let file = upload.insert(UploadedFile {
        generated_name,
        original_name,
        stored_path,
        declared_mime_type,
        size_bytes: 0,
    });

    let max = state.config.max_upload_size_bytes() as u64;
    while let Some(chunk) = field.chunk().await? {
        file.size_bytes += chunk.len() as u64;
        if file.size_bytes > max {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            ))
            .into());
        }
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    Ok(())
}
