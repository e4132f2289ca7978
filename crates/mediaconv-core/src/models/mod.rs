//! Domain models

pub mod media;
pub mod options;
pub mod responses;

pub use media::{ConvertedFile, ImageDimensions, MediaKind, UploadedFile};
pub use options::{
    AudioOptions, ImageOptions, OptionsBag, OptionsParseWarning, DEFAULT_BITRATE,
    DEFAULT_CHANNELS, DEFAULT_QUALITY, DEFAULT_SAMPLE_RATE,
};
pub use responses::{
    AudioConversionResponse, ConvertedAudioInfo, ConvertedImageInfo, FormatsResponse,
    HealthResponse, ImageConversionResponse, InputFormats, OriginalFileInfo, OutputFormats,
    StoredFileInfo, UploadResponse,
};
