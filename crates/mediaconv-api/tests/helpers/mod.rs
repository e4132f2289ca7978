//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temporary upload and converted directories. The retention sweeper
//! is not started.

#![allow(dead_code)]

pub mod fixtures;
pub mod transcoder;

use axum_test::TestServer;
use mediaconv_api::constants;
use mediaconv_api::setup::{routes, services};
use mediaconv_api::state::AppState;
use mediaconv_core::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// API path for tests (e.g. `/api/convert`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        self.state
            .storage
            .dir(mediaconv_storage::StorageArea::Incoming)
    }

    pub fn converted_dir(&self) -> &Path {
        self.state
            .storage
            .dir(mediaconv_storage::StorageArea::Converted)
    }

    pub fn uploaded_files(&self) -> Vec<PathBuf> {
        list_files(self.upload_dir())
    }

    pub fn converted_files(&self) -> Vec<PathBuf> {
        list_files(self.converted_dir())
    }
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.expect("Failed to read entry").path())
        .collect();
    files.sort();
    files
}

/// Setup test app with default settings.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Setup test app; `overrides` replace configuration variables (e.g. `FFMPEG_PATH`).
pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "UPLOAD_DIR".to_string(),
        temp_dir.path().join("uploads").display().to_string(),
    );
    vars.insert(
        "CONVERTED_DIR".to_string(),
        temp_dir.path().join("converted").display().to_string(),
    );
    vars.insert("FILE_TTL_SECS".to_string(), "0".to_string());
    vars.insert("ENVIRONMENT".to_string(), "test".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
    config.validate().expect("Test config failed validation");

    let state = services::initialize_services(&config)
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&config, state.clone())
        .await
        .expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
