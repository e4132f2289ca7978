//! Mediaconv Media Processing Library
//!
//! This crate provides the image and audio converters and the dispatcher that runs them
//! with bounded concurrency, a timeout and file cleanup.

pub mod audio;
pub mod dispatcher;
pub mod image;
pub mod traits;
pub mod validator;

// Re-export commonly used types
pub use audio::AudioTranscoder;
pub use dispatcher::{
    Conversion, ConversionDispatcher, ConversionError, ConversionRequest, ResolvedOptions,
};
pub use image::ImageConverter;
pub use traits::{ConversionOutput, MediaConverter};
pub use validator::{MediaValidator, ValidationError};
