//! Image conversion module

pub mod converter;
pub mod encode;
pub mod resize;
pub mod svg;

pub use converter::ImageConverter;
pub use encode::ImageEncoder;
pub use resize::{ImageResize, ResizeDimensions};
