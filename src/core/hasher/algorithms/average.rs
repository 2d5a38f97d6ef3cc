//! Average Hash (aHash) implementation.
//!
//! 1. Resize to hash_size x hash_size and convert to grayscale
//! 2. Compute the mean intensity
//! 3. One bit per pixel: brighter than the mean

use super::super::traits::{ensure_not_empty, HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use super::pack_bits;
use crate::error::HashError;
use image::imageops::FilterType;
use image::DynamicImage;

/// Average Hash (aHash) implementation
pub struct AverageHasher {
    hash_size: u32,
}

impl AverageHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        ensure_not_empty(image)?;

        let gray = image
            .resize_exact(self.hash_size, self.hash_size, FilterType::Lanczos3)
            .to_luma8();

        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
        let count = (self.hash_size * self.hash_size) as u64;
        let average = (total / count) as u8;

        let bytes = pack_bits(gray.pixels().map(|p| p[0] > average));
        Ok(ImageHashValue::new(bytes, HashAlgorithmKind::Average))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }
}
