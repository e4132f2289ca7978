//! Format registry
//!
//! Static table of accepted input MIME types / extensions and of the output formats each
//! media kind can be converted to. The registry is a process-wide immutable value; handlers
//! read it through [`FORMATS`].

use crate::models::MediaKind;
use std::path::Path;

/// MIME types sent by clients that carry no information about the payload.
const GENERIC_MIME_TYPES: &[&str] = &["", "application/octet-stream", "binary/octet-stream"];

/// Read-only lookup of supported formats.
#[derive(Debug)]
pub struct FormatRegistry {
    /// Accepted input MIME types and the media kind they map to.
    input_mime_types: &'static [(&'static str, MediaKind)],
    /// Accepted input extensions (with the leading dot) and their canonical MIME type.
    input_extensions: &'static [(&'static str, &'static str)],
    image_output_formats: &'static [&'static str],
    audio_output_formats: &'static [&'static str],
}

pub static FORMATS: FormatRegistry = FormatRegistry {
    input_mime_types: &[
        ("image/jpeg", MediaKind::Image),
        ("image/png", MediaKind::Image),
        ("image/gif", MediaKind::Image),
        ("image/webp", MediaKind::Image),
        ("image/bmp", MediaKind::Image),
        ("image/tiff", MediaKind::Image),
        ("image/svg+xml", MediaKind::Image),
        ("application/x-photoshop", MediaKind::Image),
        ("image/vnd.adobe.photoshop", MediaKind::Image),
        ("audio/mpeg", MediaKind::Audio),
        ("audio/wav", MediaKind::Audio),
        ("audio/ogg", MediaKind::Audio),
        ("audio/mp4", MediaKind::Audio),
        ("audio/aac", MediaKind::Audio),
        ("audio/flac", MediaKind::Audio),
    ],
    input_extensions: &[
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".png", "image/png"),
        (".gif", "image/gif"),
        (".webp", "image/webp"),
        (".bmp", "image/bmp"),
        (".tiff", "image/tiff"),
        (".svg", "image/svg+xml"),
        (".psd", "image/vnd.adobe.photoshop"),
        (".mp3", "audio/mpeg"),
        (".wav", "audio/wav"),
        (".ogg", "audio/ogg"),
        (".m4a", "audio/mp4"),
        (".aac", "audio/aac"),
        (".flac", "audio/flac"),
    ],
    image_output_formats: &["jpeg", "png", "webp", "gif", "tiff"],
    audio_output_formats: &["mp3", "wav", "ogg", "m4a", "aac", "flac"],
};

impl FormatRegistry {
    pub fn input_mime_types(&self) -> Vec<&'static str> {
        self.input_mime_types.iter().map(|(mime, _)| *mime).collect()
    }

    pub fn input_extensions(&self) -> Vec<&'static str> {
        self.input_extensions.iter().map(|(ext, _)| *ext).collect()
    }

    pub fn image_output_formats(&self) -> &'static [&'static str] {
        self.image_output_formats
    }

    pub fn audio_output_formats(&self) -> &'static [&'static str] {
        self.audio_output_formats
    }

    pub fn output_formats_for(&self, kind: MediaKind) -> &'static [&'static str] {
        match kind {
            MediaKind::Image => self.image_output_formats,
            MediaKind::Audio => self.audio_output_formats,
        }
    }

    /// Resolve a requested format to its canonical spelling for the given media kind.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. `jpg` is accepted
    /// as an alias of `jpeg`.
    pub fn canonical_output_format(&self, kind: MediaKind, format: &str) -> Option<&'static str> {
        let normalized = format.trim().to_lowercase();
        let normalized = match (kind, normalized.as_str()) {
            (MediaKind::Image, "jpg") => "jpeg".to_string(),
            _ => normalized,
        };
        self.output_formats_for(kind)
            .iter()
            .copied()
            .find(|candidate| *candidate == normalized)
    }

    pub fn is_valid_output_format(&self, format: &str) -> bool {
        self.canonical_output_format(MediaKind::Image, format)
            .is_some()
    }

    pub fn is_valid_audio_format(&self, format: &str) -> bool {
        self.canonical_output_format(MediaKind::Audio, format)
            .is_some()
    }

    /// Media kind for a declared MIME type: exact registry match first, then the
    /// `image/` / `audio/` prefix. Parameters such as `; charset=` are ignored.
    pub fn media_kind_for_mime(&self, mime: &str) -> Option<MediaKind> {
        let normalized = normalize_mime(mime);
        if let Some((_, kind)) = self
            .input_mime_types
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
        {
            return Some(*kind);
        }
        if normalized.starts_with("image/") {
            Some(MediaKind::Image)
        } else if normalized.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// Canonical MIME type for a filename's extension, if the extension is accepted.
    pub fn mime_for_extension(&self, filename: &str) -> Option<&'static str> {
        let extension = extension_of(filename)?;
        self.input_extensions
            .iter()
            .find(|(candidate, _)| *candidate == extension)
            .map(|(_, mime)| *mime)
    }

    /// Media kind of an upload. The declared MIME type wins; the extension is only
    /// consulted when the client sent no meaningful MIME type.
    pub fn resolve_media_kind(&self, declared_mime: &str, filename: &str) -> Option<MediaKind> {
        if is_generic_mime(declared_mime) {
            return self
                .mime_for_extension(filename)
                .and_then(|mime| self.media_kind_for_mime(mime));
        }
        self.media_kind_for_mime(declared_mime)
    }

    /// Upload filter: either the MIME type or the extension must be in the allow-list.
    pub fn is_accepted_input(&self, declared_mime: &str, filename: &str) -> bool {
        let normalized = normalize_mime(declared_mime);
        self.input_mime_types
            .iter()
            .any(|(candidate, _)| *candidate == normalized)
            || self.mime_for_extension(filename).is_some()
    }
}

/// Lowercased extension of a filename including the leading dot (`photo.PNG` → `.png`).
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Strip MIME parameters and lowercase (`Image/PNG; q=1` → `image/png`).
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn is_generic_mime(mime: &str) -> bool {
    GENERIC_MIME_TYPES.contains(&normalize_mime(mime).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_predicates_are_case_insensitive() {
        assert!(FORMATS.is_valid_output_format("PNG"));
        assert!(FORMATS.is_valid_output_format(" webp "));
        assert!(FORMATS.is_valid_output_format("jpg"));
        assert!(!FORMATS.is_valid_output_format("mp3"));
        assert!(!FORMATS.is_valid_output_format("bmp"));

        assert!(FORMATS.is_valid_audio_format("MP3"));
        assert!(FORMATS.is_valid_audio_format("flac"));
        assert!(!FORMATS.is_valid_audio_format("png"));
        assert!(!FORMATS.is_valid_audio_format("jpg"));
    }

    #[test]
    fn test_canonical_output_format() {
        assert_eq!(
            FORMATS.canonical_output_format(MediaKind::Image, "JPG"),
            Some("jpeg")
        );
        assert_eq!(
            FORMATS.canonical_output_format(MediaKind::Audio, "M4A"),
            Some("m4a")
        );
        assert_eq!(FORMATS.canonical_output_format(MediaKind::Audio, "jpg"), None);
        assert_eq!(FORMATS.canonical_output_format(MediaKind::Image, ""), None);
    }

    #[test]
    fn test_media_kind_for_mime() {
        assert_eq!(FORMATS.media_kind_for_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(
            FORMATS.media_kind_for_mime("application/x-photoshop"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            FORMATS.media_kind_for_mime("Audio/MPEG; charset=binary"),
            Some(MediaKind::Audio)
        );
        // Prefix fallback for types outside the table
        assert_eq!(FORMATS.media_kind_for_mime("audio/x-aiff"), Some(MediaKind::Audio));
        assert_eq!(FORMATS.media_kind_for_mime("video/mp4"), None);
        assert_eq!(FORMATS.media_kind_for_mime("application/pdf"), None);
    }

    #[test]
    fn test_resolve_media_kind_uses_extension_for_generic_mime() {
        assert_eq!(
            FORMATS.resolve_media_kind("application/octet-stream", "song.MP3"),
            Some(MediaKind::Audio)
        );
        assert_eq!(
            FORMATS.resolve_media_kind("", "logo.svg"),
            Some(MediaKind::Image)
        );
        assert_eq!(FORMATS.resolve_media_kind("text/plain", "song.mp3"), None);
        assert_eq!(
            FORMATS.resolve_media_kind("application/octet-stream", "notes.txt"),
            None
        );
    }

    #[test]
    fn test_is_accepted_input() {
        assert!(FORMATS.is_accepted_input("image/png", "whatever.bin"));
        assert!(FORMATS.is_accepted_input("application/octet-stream", "photo.JPEG"));
        assert!(!FORMATS.is_accepted_input("application/pdf", "doc.pdf"));
        assert!(!FORMATS.is_accepted_input("text/plain", "noextension"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.PNG"), Some(".png".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
    }

    #[test]
    fn test_every_extension_maps_to_a_registered_mime() {
        let mimes = FORMATS.input_mime_types();
        for ext in FORMATS.input_extensions() {
            let mime = FORMATS
                .mime_for_extension(&format!("file{}", ext))
                .expect("extension registered");
            assert!(mimes.contains(&mime), "{} -> {} not registered", ext, mime);
        }
    }
}
