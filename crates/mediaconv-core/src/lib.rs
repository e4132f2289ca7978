//! Mediaconv Core Library
//!
//! This crate provides the domain models, error types, configuration and the format
//! registry shared by all mediaconv components.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use formats::{FormatRegistry, FORMATS};
pub use models::{
    AudioOptions, ConvertedFile, ImageDimensions, ImageOptions, MediaKind, OptionsBag,
    UploadedFile,
};
