//! Plain upload and static file serving tests.
//!
//! Run with: `cargo test -p mediaconv-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use helpers::fixtures::{self, form};
use helpers::{api_path, setup_test_app};
use serde_json::Value;

#[tokio::test]
async fn test_upload_stores_file_with_dimensions() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(form(fixtures::png(30, 20), "Cat.PNG", "image/png", None))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["message"], "File uploaded successfully");

    let file = &body["file"];
    let name = file["filename"].as_str().unwrap();
    assert!(name.starts_with("file-") && name.ends_with(".png"));
    assert_eq!(file["originalName"], "Cat.PNG");
    assert_eq!(file["mimetype"], "image/png");
    assert_eq!(file["path"], format!("/uploads/{}", name));
    assert_eq!(
        file["dimensions"],
        serde_json::json!({ "width": 30, "height": 20, "type": "png" })
    );
    assert_eq!(
        file["size"].as_u64().unwrap(),
        std::fs::metadata(app.upload_dir().join(name)).unwrap().len()
    );
}

#[tokio::test]
async fn test_upload_audio_has_no_dimensions() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(form(fixtures::wav(), "a.wav", "audio/wav", None))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["file"].get("dimensions").is_none());
    assert_eq!(app.uploaded_files().len(), 1);
}

#[tokio::test]
async fn test_upload_rejects_unaccepted_type() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(form(b"#!/bin/sh".to_vec(), "run.sh", "application/x-sh", None))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid file type");
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(MultipartForm::new().add_text("note", "hello"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "NO_FILE_PROVIDED");
}

#[tokio::test]
async fn test_converted_file_is_served() {
    let app = setup_test_app().await;

    let converted = app
        .client()
        .post(&api_path("/convert"))
        .multipart(form(fixtures::png(6, 6), "a.png", "image/png", Some("png")))
        .await;
    assert_eq!(converted.status_code(), StatusCode::OK);
    let body: Value = converted.json();
    let path = body["converted"]["path"].as_str().unwrap().to_string();
    let size = body["converted"]["size"].as_u64().unwrap();

    let served = app.client().get(&path).await;
    assert_eq!(served.status_code(), StatusCode::OK);
    assert_eq!(served.header("content-type"), "image/png");
    assert_eq!(served.as_bytes().len() as u64, size);
}

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let app = setup_test_app().await;

    let uploaded = app
        .client()
        .post(&api_path("/upload"))
        .multipart(form(fixtures::png(3, 3), "a.png", "image/png", None))
        .await;
    let path = uploaded.json::<Value>()["file"]["path"]
        .as_str()
        .unwrap()
        .to_string();

    let served = app.client().get(&path).await;
    assert_eq!(served.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_mounts_reject_missing_and_traversal() {
    let app = setup_test_app().await;
    std::fs::write(app.upload_dir().join("..").join("secret.txt"), b"secret").unwrap();

    let missing = app.client().get("/converted/converted-1-1.png").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    for path in [
        "/converted/..%2Fsecret.txt",
        "/uploads/..%2Fsecret.txt",
        "/converted/%2E%2E/secret.txt",
    ] {
        let response = app.client().get(path).await;
        assert_ne!(response.status_code(), StatusCode::OK, "{} was served", path);
        assert_ne!(response.text(), "secret");
    }
}
