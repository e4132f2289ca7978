//! Test fixtures: small images generated with the `image` crate, and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Encode a gradient image of the given size in `format`.
pub fn image_bytes(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode fixture image");
    buffer
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(ImageFormat::Png, width, height)
}

/// Raster input formats with their file name and MIME type.
pub fn raster_inputs() -> Vec<(ImageFormat, &'static str, &'static str)> {
    vec![
        (ImageFormat::Png, "input.png", "image/png"),
        (ImageFormat::Jpeg, "input.jpg", "image/jpeg"),
        (ImageFormat::Gif, "input.gif", "image/gif"),
        (ImageFormat::WebP, "input.webp", "image/webp"),
        (ImageFormat::Bmp, "input.bmp", "image/bmp"),
        (ImageFormat::Tiff, "input.tiff", "image/tiff"),
    ]
}

/// 200x100 SVG with a 2:1 aspect ratio.
pub fn svg() -> Vec<u8> {
    br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100">
  <rect width="200" height="100" fill="#3366cc"/>
  <circle cx="100" cy="50" r="40" fill="#ffcc00"/>
</svg>"##
        .to_vec()
}

/// A few bytes that pass as an audio upload; the stub transcoder never reads them.
pub fn wav() -> Vec<u8> {
    b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec()
}

pub fn file_part(data: Vec<u8>, filename: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(filename).mime_type(mime_type)
}

/// Multipart form with a file and an optional target format.
pub fn form(data: Vec<u8>, filename: &str, mime_type: &str, format: Option<&str>) -> MultipartForm {
    let form = MultipartForm::new().add_part("file", file_part(data, filename, mime_type));
    match format {
        Some(format) => form.add_text("format", format),
        None => form,
    }
}
