use crate::image::encode::ImageEncoder;
use crate::image::resize::{ImageResize, ResizeDimensions};
use crate::image::svg;
use crate::traits::{ConversionOutput, MediaConverter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use mediaconv_core::{ImageDimensions, ImageOptions};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tokio::sync::OwnedSemaphorePermit;

/// In-process image converter built on the `image` crate family.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    svg_raster_size: u32,
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self {
            svg_raster_size: svg::SVG_RASTER_SIZE,
        }
    }
}

impl ImageConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode, resize and encode. Runs synchronously; call from the blocking pool.
    pub fn transform(
        &self,
        data: &[u8],
        extension: Option<&str>,
        format: &str,
        options: ImageOptions,
    ) -> Result<(Bytes, ImageDimensions)> {
        let img = self.decode(data, extension)?;

        let img = match ResizeDimensions::new(options.width, options.height) {
            Some(dims) => ImageResize::apply_resize(img, dims, options.maintain_aspect_ratio),
            None => img,
        };

        let encoded = ImageEncoder::encode(&img, format, options.quality)?;
        let dimensions = ImageEncoder::probe(&encoded)?;
        Ok((encoded, dimensions))
    }

    fn decode(&self, data: &[u8], extension: Option<&str>) -> Result<DynamicImage> {
        if svg::looks_like_svg(extension, data) {
            return svg::rasterize(data, self.svg_raster_size);
        }
        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        Ok(img)
    }

    /// Dimensions of a stored raster image, or `None` when the image library cannot read it.
    pub async fn probe_dimensions(path: &Path) -> Option<ImageDimensions> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let reader = image::ImageReader::open(&path).ok()?.with_guessed_format().ok()?;
            let format = reader.format()?;
            let (width, height) = reader.into_dimensions().ok()?;
            Some(ImageDimensions {
                width,
                height,
                kind: crate::image::encode::format_name(format).to_string(),
            })
        })
        .await
        .ok()
        .flatten()
    }
}

#[async_trait]
impl MediaConverter for ImageConverter {
    type Options = ImageOptions;

    #[tracing::instrument(skip_all, fields(input = %input.display(), format = %format))]
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: &str,
        options: ImageOptions,
        permit: OwnedSemaphorePermit,
    ) -> Result<ConversionOutput> {
        let start = Instant::now();
        let data = tokio::fs::read(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let extension = input
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);

        let converter = self.clone();
        let format_owned = format.to_string();
        // The permit lives as long as the blocking task, which keeps running on timeout
        let (encoded, dimensions) = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            converter.transform(&data, extension.as_deref(), &format_owned, options)
        })
        .await
        .context("Image conversion task panicked")??;

        tokio::fs::write(output, &encoded)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            size_bytes = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image converted"
        );

        Ok(ConversionOutput {
            dimensions: Some(dimensions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::sync::Semaphore;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_transform_with_resize() {
        let options = ImageOptions {
            width: Some(50),
            ..ImageOptions::default()
        };
        let (data, dims) = ImageConverter::new()
            .transform(&png_bytes(200, 100), Some("png"), "webp", options)
            .unwrap();
        assert!(!data.is_empty());
        assert_eq!((dims.width, dims.height, dims.kind.as_str()), (50, 25, "webp"));
    }

    #[test]
    fn test_transform_svg_then_resize() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20"><rect width="10" height="20"/></svg>"#;
        let (_, dims) = ImageConverter::new()
            .transform(svg, Some("svg"), "png", ImageOptions::default())
            .unwrap();
        assert_eq!((dims.width, dims.height), (512, 1024));

        let options = ImageOptions {
            height: Some(100),
            ..ImageOptions::default()
        };
        let (_, dims) = ImageConverter::new()
            .transform(svg, Some("svg"), "png", options)
            .unwrap();
        assert_eq!((dims.width, dims.height), (50, 100));
    }

    #[test]
    fn test_undecodable_input_fails() {
        let result = ImageConverter::new().transform(
            b"8BPS\x00\x01 not really a psd",
            Some("psd"),
            "png",
            ImageOptions::default(),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_convert_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpeg");
        tokio::fs::write(&input, png_bytes(8, 8)).await.unwrap();

        let permits = Arc::new(Semaphore::new(1));
        let permit = permits.clone().acquire_owned().await.unwrap();

        let result = ImageConverter::new()
            .convert(&input, &output, "jpeg", ImageOptions::default(), permit)
            .await
            .unwrap();
        assert_eq!(result.dimensions.unwrap().kind, "jpeg");
        assert!(tokio::fs::metadata(&output).await.unwrap().len() > 0);
        assert_eq!(permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_probe_dimensions() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        let text = dir.path().join("a.txt");
        tokio::fs::write(&image, png_bytes(3, 4)).await.unwrap();
        tokio::fs::write(&text, b"hello").await.unwrap();

        let dims = ImageConverter::probe_dimensions(&image).await.unwrap();
        assert_eq!((dims.width, dims.height), (3, 4));
        assert!(ImageConverter::probe_dimensions(&text).await.is_none());
    }
}
