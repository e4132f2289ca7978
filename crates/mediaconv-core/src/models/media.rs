use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Media kind of an upload, derived from its declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received from a multipart request and persisted in the incoming directory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name under which the file is stored (`file-{millis}-{random}{.ext}`)
    pub generated_name: String,
    /// Filename sent by the client
    pub original_name: String,
    pub stored_path: PathBuf,
    pub declared_mime_type: String,
    pub size_bytes: u64,
}

impl UploadedFile {
    /// Extension of the stored file without the dot, or an empty string.
    pub fn original_format(&self) -> &str {
        self.generated_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default()
    }
}

/// Pixel dimensions of an encoded image. `type` is the short format name
/// of the written file (`jpeg`, `png`, `webp`, `gif`, `tiff`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Output of a successful conversion, stored in the converted directory.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub stored_path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    pub format: String,
    /// Present for images only
    pub dimensions: Option<ImageDimensions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(name: &str) -> UploadedFile {
        UploadedFile {
            generated_name: name.to_string(),
            original_name: "x".to_string(),
            stored_path: PathBuf::from(name),
            declared_mime_type: "image/png".to_string(),
            size_bytes: 1,
        }
    }

    #[test]
    fn test_original_format() {
        assert_eq!(uploaded("file-1-2.png").original_format(), "png");
        assert_eq!(uploaded("file-1-2").original_format(), "");
    }

    #[test]
    fn test_dimensions_serialize_type_field() {
        let dims = ImageDimensions {
            width: 3,
            height: 4,
            kind: "jpeg".to_string(),
        };
        let json = serde_json::to_value(&dims).unwrap();
        assert_eq!(json["type"], "jpeg");
        assert_eq!(json["width"], 3);
    }

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(
            serde_json::to_value(MediaKind::Audio).unwrap(),
            serde_json::json!("audio")
        );
    }
}
