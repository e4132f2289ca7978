use image::{DynamicImage, GenericImageView};

/// Requested bounding box. A missing side is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeDimensions {
    /// `None` when neither side is set.
    pub fn new(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (None, None) => None,
            _ => Some(Self { width, height }),
        }
    }
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Target size for a resize. Never larger than the original on either axis.
    ///
    /// With `maintain_aspect_ratio` the image is scaled to fit inside the box. Otherwise it
    /// is stretched to the box; a missing side still keeps the aspect ratio.
    pub fn calculate_dimensions(
        orig_width: u32,
        orig_height: u32,
        dimensions: ResizeDimensions,
        maintain_aspect_ratio: bool,
    ) -> (u32, u32) {
        match (dimensions.width, dimensions.height) {
            (Some(w), Some(h)) if !maintain_aspect_ratio => (w.min(orig_width), h.min(orig_height)),
            (w, h) => {
                let scale_width = w.map_or(f64::INFINITY, |w| w as f64 / orig_width as f64);
                let scale_height = h.map_or(f64::INFINITY, |h| h as f64 / orig_height as f64);
                let scale = scale_width.min(scale_height).min(1.0);
                let width = ((orig_width as f64 * scale).round() as u32).max(1);
                let height = ((orig_height as f64 * scale).round() as u32).max(1);
                (width, height)
            }
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    pub fn apply_resize(
        img: DynamicImage,
        dimensions: ResizeDimensions,
        maintain_aspect_ratio: bool,
    ) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let (width, height) =
            Self::calculate_dimensions(orig_width, orig_height, dimensions, maintain_aspect_ratio);

        if (width, height) == (orig_width, orig_height) {
            return img;
        }

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            maintain_aspect_ratio,
            "Resizing image"
        );

        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }
}
