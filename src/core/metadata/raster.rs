//! Raster image extraction: verify, decode, fingerprint and EXIF.

use super::exif::read_exif;
use super::fingerprint::fingerprint_image;
use crate::core::corruption::{classify_decode_error, CorruptionVerdict, Extraction, Severity};
use crate::core::hasher::HasherSet;
use crate::core::record::ImageMetadata;
use image::{ImageFormat, ImageReader};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Extracts [`ImageMetadata`] and a corruption verdict from image files
#[derive(Default)]
pub struct ImageExtractor {
    hashers: Arc<HasherSet>,
}

impl ImageExtractor {
    pub fn new(hashers: Arc<HasherSet>) -> Self {
        Self { hashers }
    }

    /// Extract metadata from one file.
    ///
    /// Steps stop at the first hard failure. A soft decode failure keeps
    /// the header dimensions and EXIF but leaves every pixel-derived field
    /// empty.
    pub fn extract(&self, path: &Path) -> Extraction<ImageMetadata> {
        let mut verdict = CorruptionVerdict::clean();

        // Verify: container and header
        let format = match open_format(path) {
            Ok(format) => format,
            Err(message) => return Extraction::failed(message),
        };

        let mut metadata = ImageMetadata::default();
        match open_reader(path).and_then(|r| r.into_dimensions().map_err(|e| e.to_string())) {
            Ok((width, height)) => {
                metadata.width = Some(width);
                metadata.height = Some(height);
            }
            Err(message) => {
                let severity = classify_decode_error(&message);
                verdict.record(severity, message);
                if severity == Severity::Hard {
                    return Extraction::new(None, verdict);
                }
            }
        }

        if let Some(message) = extension_mismatch(path, format) {
            verdict.record(Severity::Soft, message);
        }

        // Decode
        let decoded = match open_reader(path).and_then(|r| r.decode().map_err(|e| e.to_string())) {
            Ok(image) => Some(image),
            Err(message) => {
                let severity = classify_decode_error(&message);
                debug!(path = %path.display(), %message, ?severity, "image decode failed");
                verdict.record(severity, message);
                if severity == Severity::Hard {
                    return Extraction::new(None, verdict);
                }
                None
            }
        };

        if let Some(image) = decoded {
            metadata.width = Some(image.width());
            metadata.height = Some(image.height());

            let report = fingerprint_image(&image, &self.hashers);
            metadata.fingerprint = report.fingerprint;
            for warning in report.warnings {
                verdict.record(Severity::Soft, warning);
            }
        }

        if carries_exif(format) {
            let report = read_exif(path);
            metadata.exif = report.data;
            if let Some(warning) = report.warning {
                verdict.record(Severity::Soft, warning);
            }
        }

        Extraction::new(Some(metadata), verdict)
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, String> {
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())
}

/// The container detected from content; unknown content is a hard failure
fn open_format(path: &Path) -> Result<ImageFormat, String> {
    open_reader(path)?
        .format()
        .ok_or_else(|| "cannot identify image file".to_string())
}

/// Container expected from a file extension, for the extensions we check
fn expected_format(extension: &str) -> Option<ImageFormat> {
    match extension {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        "bmp" => Some(ImageFormat::Bmp),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

fn extension_mismatch(path: &Path, format: ImageFormat) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let expected = expected_format(&extension)?;

    (expected != format).then(|| {
        format!(
            "extension/format mismatch: ext=.{} format={}",
            extension,
            format!("{:?}", format).to_lowercase()
        )
    })
}

fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Png | ImageFormat::WebP
    )
}
