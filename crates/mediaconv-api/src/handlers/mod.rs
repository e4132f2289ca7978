pub mod convert_audio;
pub mod convert_image;
pub mod formats;
pub mod upload;
