//! Audio conversion integration tests against stub ffmpeg executables.
//!
//! Run with: `cargo test -p mediaconv-api --test convert_audio_test`

#![cfg(unix)]

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use helpers::fixtures::{self, form};
use helpers::transcoder::{write_stub, FAILS, HANGS, SUCCEEDS};
use helpers::{api_path, setup_test_app_with, TestApp};
use serde_json::Value;
use tempfile::TempDir;

async fn app_with_stub(script: &str, extra: &[(&str, &str)]) -> (TempDir, TestApp) {
    let stubs = tempfile::tempdir().expect("Failed to create stub directory");
    let ffmpeg = write_stub(stubs.path(), "ffmpeg", script);
    let ffmpeg = ffmpeg.to_str().expect("Non UTF-8 temp path").to_string();

    let mut overrides = vec![("FFMPEG_PATH", ffmpeg.as_str())];
    overrides.extend_from_slice(extra);
    let app = setup_test_app_with(&overrides).await;
    (stubs, app)
}

#[tokio::test]
async fn test_audio_conversion_succeeds() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(
            form(fixtures::wav(), "Song.WAV", "audio/wav", Some("MP3"))
                .add_text("options", r#"{"bitrate": 192, "sampleRate": "48000", "channels": 1}"#),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();

    assert_eq!(body["message"], "Audio file converted successfully");
    assert_eq!(body["original"]["originalName"], "Song.WAV");
    assert_eq!(body["original"]["format"], "wav");
    assert_eq!(body["converted"]["format"], "mp3");
    assert_eq!(body["converted"]["size"], 4);
    assert_eq!(
        body["options"],
        serde_json::json!({ "bitrate": "192k", "sampleRate": 48000, "channels": 1 })
    );

    let name = body["converted"]["filename"].as_str().unwrap();
    assert_eq!(body["converted"]["path"], format!("/converted/{}", name));
    assert_eq!(
        std::fs::read(app.converted_dir().join(name)).unwrap(),
        b"data"
    );
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_malformed_options_use_audio_defaults() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(
            form(fixtures::wav(), "a.wav", "audio/wav", Some("ogg")).add_text("options", "[1, 2"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["options"],
        serde_json::json!({ "bitrate": "128k", "sampleRate": 44100, "channels": 2 })
    );
}

#[tokio::test]
async fn test_transcoder_failure_leaves_no_output() {
    let (_stubs, app) = app_with_stub(FAILS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(form(fixtures::wav(), "a.wav", "audio/wav", Some("flac")))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Error converting audio file");
    assert_eq!(body["code"], "CONVERSION_FAILED");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Invalid data found when processing input"));

    assert!(app.converted_files().is_empty());
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_hanging_transcoder_is_killed_at_timeout() {
    let (_stubs, app) = app_with_stub(HANGS, &[("CONVERSION_TIMEOUT_SECS", "1")]).await;

    let started = std::time::Instant::now();
    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(form(fixtures::wav(), "a.wav", "audio/wav", Some("m4a")))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(started.elapsed() < std::time::Duration::from_secs(20));
    let body: Value = response.json();
    assert!(body["details"].as_str().unwrap().contains("timed out"));
    assert!(app.converted_files().is_empty());
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_image_format_on_audio_endpoint_is_invalid_format() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(form(fixtures::wav(), "a.wav", "audio/wav", Some("png")))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid format");
    assert!(body["message"].as_str().unwrap().contains("mp3"));
    assert!(app.converted_files().is_empty());
}

#[tokio::test]
async fn test_image_on_audio_endpoint_is_invalid_file_type() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(form(fixtures::png(4, 4), "a.png", "image/png", Some("mp3")))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid file type");
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_no_file_is_rejected() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(MultipartForm::new().add_text("format", "mp3"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "No file uploaded");
}

#[tokio::test]
async fn test_octet_stream_upload_resolved_by_extension() {
    let (_stubs, app) = app_with_stub(SUCCEEDS, &[]).await;

    let response = app
        .client()
        .post(&api_path("/convert-audio"))
        .multipart(form(
            fixtures::wav(),
            "track.flac",
            "application/octet-stream",
            Some("wav"),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    assert_eq!(response.json::<Value>()["converted"]["format"], "wav");
}
