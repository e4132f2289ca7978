use crate::state::AppState;
use axum::{extract::State, Json};
use mediaconv_core::models::{FormatsResponse, InputFormats, OutputFormats};
use std::sync::Arc;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Accepted input types and available output formats.
#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "formats",
    responses(
        (status = 200, description = "Supported formats", body = FormatsResponse)
    )
)]
pub async fn list_formats(State(state): State<Arc<AppState>>) -> Json<FormatsResponse> {
    let formats = state.formats;
    Json(FormatsResponse {
        input: InputFormats {
            mime_types: owned(&formats.input_mime_types()),
            extensions: owned(&formats.input_extensions()),
        },
        output: OutputFormats {
            formats: owned(formats.image_output_formats()),
            audio_formats: owned(formats.audio_output_formats()),
        },
    })
}
