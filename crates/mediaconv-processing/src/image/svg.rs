//! SVG rasterization

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

/// Longest side of a rasterized SVG.
pub const SVG_RASTER_SIZE: u32 = 1024;

/// Whether the input should be treated as SVG: by extension, or by an XML/SVG prologue.
pub fn looks_like_svg(extension: Option<&str>, data: &[u8]) -> bool {
    if extension.is_some_and(|ext| ext.eq_ignore_ascii_case("svg")) {
        return true;
    }
    let head = &data[..data.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Render an SVG document so that it fits inside `max_size`×`max_size`, preserving the
/// aspect ratio.
pub fn rasterize(data: &[u8], max_size: u32) -> Result<DynamicImage> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(data, &options).context("Failed to parse SVG")?;

    let size = tree.size();
    let scale = (max_size as f32 / size.width()).min(max_size as f32 / size.height());
    let width = ((size.width() * scale).round() as u32).clamp(1, max_size);
    let height = ((size.height() * scale).round() as u32).clamp(1, max_size);

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("Invalid SVG raster size {}x{}", width, height))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let buffer = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("SVG raster buffer has unexpected size"))?;
    Ok(DynamicImage::ImageRgba8(buffer))
}
