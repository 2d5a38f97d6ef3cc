//! Perceptual Hash (pHash) implementation.
//!
//! pHash uses the Discrete Cosine Transform (DCT) to extract
//! frequency information from the image. This makes it more
//! robust to:
//! - Scaling
//! - Brightness/contrast changes
//! - Compression artifacts
//!
//! The DCT and mean threshold come from the image_hasher crate.

use super::super::traits::{ensure_not_empty, HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Perceptual Hash (pHash) implementation using DCT
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a new pHash hasher
    pub fn new(hash_size: u32) -> Self {
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        ensure_not_empty(image)?;

        let hash = self.hasher.hash_image(image);
        let bytes = hash.as_bytes().to_vec();

        Ok(ImageHashValue::new(bytes, HashAlgorithmKind::Perceptual))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Perceptual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_pattern_image(offset: u8) -> DynamicImage {
        let img = ImageBuffer::from_fn(100, 100, |x, y| {
            let v = if (x / 25 + y / 25) % 2 == 0 { 40 } else { 200 };
            let v = (v as u8).saturating_add(offset);
            Rgb([v, v, v])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = PerceptualHasher::new(8);
        let image = create_pattern_image(0);

        let hash1 = hasher.hash_image(&image).unwrap();
        let hash2 = hasher.hash_image(&image).unwrap();

        assert_eq!(hash1.distance(&hash2), 0);
    }

    #[test]
    fn brightness_shift_keeps_hash_close() {
        let hasher = PerceptualHasher::new(8);

        let hash1 = hasher.hash_image(&create_pattern_image(0)).unwrap();
        let hash2 = hasher.hash_image(&create_pattern_image(5)).unwrap();

        assert!(hash1.distance(&hash2) < 10);
    }

    #[test]
    fn produces_16_hex_digits() {
        let hash = PerceptualHasher::new(8)
            .hash_image(&create_pattern_image(0))
            .unwrap();
        assert_eq!(hash.to_hex().len(), 16);
    }
}
