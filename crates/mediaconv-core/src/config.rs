//! Configuration module
//!
//! Service configuration is read once at start-up from the process environment (and a
//! `.env` file when present). Invalid numeric values fall back to their defaults, except
//! `PORT` which must parse.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PORT: u16 = 3001;
const UPLOAD_DIR: &str = "uploads";
const CONVERTED_DIR: &str = "converted";
const MAX_UPLOAD_SIZE_MB: usize = 50;
const FFMPEG_PATH: &str = "ffmpeg";
const CONVERSION_TIMEOUT_SECS: u64 = 60;
const MAX_CONCURRENT_CONVERSIONS: usize = 4;
const FILE_TTL_SECS: u64 = 3600;
const CLEANUP_INTERVAL_SECS: u64 = 300;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Settings of the conversion service
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub converted_dir: PathBuf,
    pub max_upload_size_bytes: usize,
    pub ffmpeg_path: String,
    pub conversion_timeout_secs: u64,
    pub max_concurrent_conversions: usize,
    /// Age after which stored files are swept. 0 = sweeping disabled.
    pub file_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub environment: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_service().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. `from_env` uses the process
    /// environment; tests pass a closure over a fixed table.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ServiceConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().server_port
    }

    pub fn upload_dir(&self) -> &Path {
        &self.as_service().upload_dir
    }

    pub fn converted_dir(&self) -> &Path {
        &self.as_service().converted_dir
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_service().max_upload_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_service().ffmpeg_path
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().conversion_timeout_secs)
    }

    pub fn max_concurrent_conversions(&self) -> usize {
        self.as_service().max_concurrent_conversions
    }

    /// `None` when the retention sweeper is disabled.
    pub fn file_ttl(&self) -> Option<Duration> {
        match self.as_service().file_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.as_service().cleanup_interval_secs.max(1))
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_service().http_concurrency_limit
    }

    pub fn environment(&self) -> &str {
        &self.as_service().environment
    }
}

impl ServiceConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(ServiceConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| UPLOAD_DIR.to_string())
                .into(),
            converted_dir: lookup("CONVERTED_DIR")
                .unwrap_or_else(|| CONVERTED_DIR.to_string())
                .into(),
            max_upload_size_bytes: max_upload_size_mb.saturating_mul(1024 * 1024),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| FFMPEG_PATH.to_string()),
            conversion_timeout_secs: lookup("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|| CONVERSION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            max_concurrent_conversions: lookup("MAX_CONCURRENT_CONVERSIONS")
                .unwrap_or_else(|| MAX_CONCURRENT_CONVERSIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_CONVERSIONS),
            file_ttl_secs: lookup("FILE_TTL_SECS")
                .unwrap_or_else(|| FILE_TTL_SECS.to_string())
                .parse()
                .unwrap_or(FILE_TTL_SECS),
            cleanup_interval_secs: lookup("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            cors_origins,
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .unwrap_or_else(|| HTTP_CONCURRENCY_LIMIT.to_string())
                .parse()
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            environment,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.max_concurrent_conversions == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_CONVERSIONS must be greater than 0"
            ));
        }

        if self.conversion_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CONVERSION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        if self.upload_dir == self.converted_dir {
            return Err(anyhow::anyhow!(
                "UPLOAD_DIR and CONVERTED_DIR must point to different directories"
            ));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH must not be empty"));
        }

        Ok(())
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}
