//! Output encoders, one per image target format

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, Frame, GenericImageView, ImageFormat};
use mediaconv_core::ImageDimensions;
use std::io::Cursor;

/// Quantizer speed for GIF output (1 = best, 30 = fastest).
const GIF_SPEED: i32 = 10;

/// Largest width or height libwebp can encode.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode `img` in the canonical output `format`.
    pub fn encode(img: &DynamicImage, format: &str, quality: u8) -> Result<Bytes> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity((width as usize).saturating_mul(height as usize));

        match format {
            "jpeg" => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
            }
            "png" => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                Self::png_compatible(img).write_with_encoder(encoder)?;
            }
            "webp" => {
                if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
                    return Err(anyhow!(
                        "Image of {}x{} exceeds the WebP limit of {} pixels per side",
                        width,
                        height,
                        WEBP_MAX_DIMENSION
                    ));
                }
                let rgba = img.to_rgba8();
                let encoded = webp::Encoder::from_rgba(&rgba, width, height)
                    .encode_simple(false, quality as f32)
                    .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?;
                buffer.extend_from_slice(&encoded);
            }
            "gif" => {
                let mut encoder = GifEncoder::new_with_speed(&mut buffer, GIF_SPEED);
                encoder.encode_frame(Frame::new(img.to_rgba8()))?;
            }
            "tiff" => {
                img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Tiff)?;
            }
            other => return Err(anyhow!("Unsupported image output format: {}", other)),
        }

        Ok(Bytes::from(buffer))
    }

    /// Read the dimensions and format back from encoded bytes.
    pub fn probe(data: &[u8]) -> Result<ImageDimensions> {
        let reader = image::ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| anyhow!("Unrecognized image format"))?;
        let (width, height) = reader
            .into_dimensions()
            .context("Failed to read image dimensions")?;
        Ok(ImageDimensions {
            width,
            height,
            kind: format_name(format).to_string(),
        })
    }

    // Float images (e.g. from HDR TIFFs) have no PNG representation
    fn png_compatible(img: &DynamicImage) -> std::borrow::Cow<'_, DynamicImage> {
        match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                std::borrow::Cow::Owned(DynamicImage::ImageRgba16(img.to_rgba16()))
            }
            _ => std::borrow::Cow::Borrowed(img),
        }
    }
}

/// Short lowercase name of a format as reported in responses.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}
