//! Generated file names.
//!
//! Incoming: `file-{unix_millis}-{random}{.ext}`; converted: `converted-{unix_millis}-{random}.{format}`.
//! The random part is drawn from `0..1_000_000_000`.

use mediaconv_core::formats::extension_of;
use rand::Rng;

const RANDOM_UPPER_BOUND: u32 = 1_000_000_000;

/// Name for an uploaded file. Keeps the original extension (lowercased) when it is a plain
/// alphanumeric extension; otherwise the name has no extension.
pub fn incoming_name(original_filename: &str) -> String {
    let extension = extension_of(original_filename)
        .filter(|ext| ext.len() > 1 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_default();
    format!("file-{}{}", unique_suffix(), extension)
}

/// Name for a conversion output in the given (canonical, lowercase) format.
pub fn converted_name(format: &str) -> String {
    format!("converted-{}.{}", unique_suffix(), format.to_lowercase())
}

fn unique_suffix() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = rand::rng().random_range(0..RANDOM_UPPER_BOUND);
    format!("{}-{}", millis, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_incoming_name_keeps_lowercased_extension() {
        let name = incoming_name("Holiday Photo.JPG");
        assert!(name.starts_with("file-"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.matches('-').count(), 2);
    }

    #[test]
    fn test_incoming_name_drops_odd_extensions() {
        assert!(!incoming_name("noext").contains('.'));
        assert!(!incoming_name("weird.t x t").contains('.'));
    }

    #[test]
    fn test_converted_name() {
        let name = converted_name("WEBP");
        assert!(name.starts_with("converted-"));
        assert!(name.ends_with(".webp"));
    }

    #[test]
    fn test_names_do_not_collide() {
        let names: HashSet<String> = (0..200).map(|_| converted_name("png")).collect();
        assert_eq!(names.len(), 200);
    }
}
