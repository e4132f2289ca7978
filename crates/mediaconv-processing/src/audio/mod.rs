//! Audio conversion module

pub mod transcoder;

pub use transcoder::AudioTranscoder;
