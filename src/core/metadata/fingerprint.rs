//! Pixel fingerprints shared by the image and frame extractors.

use super::tone::measure_tone;
use crate::core::hasher::{HashAlgorithmKind, HasherSet};
use crate::core::record::Fingerprint;
use image::DynamicImage;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A fingerprint and the soft problems met while computing it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintReport {
    pub fingerprint: Fingerprint,
    pub warnings: Vec<String>,
}

/// Hash and measure decoded pixels.
///
/// Each hash is computed independently. A failing or panicking hasher
/// leaves its field empty and adds a warning.
pub fn fingerprint_image(image: &DynamicImage, hashers: &HasherSet) -> FingerprintReport {
    let mut report = FingerprintReport::default();

    match catch_unwind(AssertUnwindSafe(|| hashers.hash_all(image))) {
        Ok(outcome) => {
            let fingerprint = &mut report.fingerprint;
            fingerprint.phash = outcome.get(HashAlgorithmKind::Perceptual).map(String::from);
            fingerprint.ahash = outcome.get(HashAlgorithmKind::Average).map(String::from);
            fingerprint.dhash = outcome.get(HashAlgorithmKind::Difference).map(String::from);
            fingerprint.whash = outcome.get(HashAlgorithmKind::Wavelet).map(String::from);

            for (kind, error) in outcome.errors {
                report.warnings.push(format!("{} failed: {}", kind, error));
            }
        }
        Err(_) => report.warnings.push("perceptual hashing panicked".to_string()),
    }

    match measure_tone(image) {
        Some(tone) => {
            report.fingerprint.brightness_mean = Some(tone.brightness_mean);
            report.fingerprint.histogram = Some(tone.histogram);
        }
        None => report.warnings.push("tone: image has no pixels".to_string()),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn full_fingerprint_for_normal_image() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, 128])
        }));

        let report = fingerprint_image(&image, &HasherSet::default());

        assert!(report.warnings.is_empty());
        let fp = report.fingerprint;
        assert!(fp.phash.is_some() && fp.ahash.is_some());
        assert!(fp.dhash.is_some() && fp.whash.is_some());
        assert!(fp.brightness_mean.is_some());
        assert!(fp.histogram.is_some());
    }

    #[test]
    fn empty_image_only_warns() {
        let report = fingerprint_image(&DynamicImage::new_rgb8(0, 0), &HasherSet::default());

        assert_eq!(report.fingerprint, Fingerprint::default());
        // four hashers plus tone
        assert_eq!(report.warnings.len(), 5);
    }
}
