//! # Classifier Module
//!
//! Decides what kind of media a file holds.
//!
//! Content sniffing comes first, so a JPEG saved as `.png` is still an
//! image. When the signature is unknown the extension decides.

use crate::core::record::MediaKind;
use file_format::FileFormat;
use std::path::Path;

const UNKNOWN_MIME: &str = "application/octet-stream";

/// Extensions that always get image extraction, even when sniffing disagrees
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "mpo", "bmp", "gif", "tiff", "tif", "webp", "heic", "heif",
];

/// Result of classifying one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mime_type: String,
    pub kind: MediaKind,
}

impl Classification {
    fn from_mime(mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let kind = MediaKind::from_mime(&mime_type);
        Self { mime_type, kind }
    }
}

/// Classify a file by content, falling back to its extension
pub fn classify(path: &Path) -> Classification {
    sniff(path).unwrap_or_else(|| from_extension(path))
}

/// Whether the path carries one of [`IMAGE_EXTENSIONS`]
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn sniff(path: &Path) -> Option<Classification> {
    let format = FileFormat::from_file(path).ok()?;
    let mime_type = format.media_type();

    if mime_type == UNKNOWN_MIME {
        return None;
    }

    Some(Classification::from_mime(mime_type))
}

fn from_extension(path: &Path) -> Classification {
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(UNKNOWN_MIME);
    Classification::from_mime(mime_type)
}
