//! Wavelet Hash (wHash) implementation.
//!
//! The image is reduced to a 64x64 grayscale grid and run through a
//! multi-level Haar transform until the approximation band is
//! hash_size x hash_size. Each approximation coefficient above the
//! band median sets a bit.

use super::super::traits::{ensure_not_empty, HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use super::pack_bits;
use crate::error::HashError;
use image::imageops::FilterType;
use image::DynamicImage;

const BASE_SIZE: u32 = 64;

/// Wavelet Hash (wHash) implementation
pub struct WaveletHasher {
    hash_size: u32,
}

impl WaveletHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for WaveletHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        ensure_not_empty(image)?;

        let base = BASE_SIZE.max(self.hash_size.next_power_of_two());
        let gray = image
            .resize_exact(base, base, FilterType::Lanczos3)
            .to_luma8();

        let mut size = base as usize;
        let mut band: Vec<f32> = gray.pixels().map(|p| p[0] as f32 / 255.0).collect();

        while size > self.hash_size as usize && size > 1 {
            band = haar_approximation(&band, size);
            size /= 2;
        }

        let median = median(&band);
        let bytes = pack_bits(band.iter().map(|&c| c > median));

        Ok(ImageHashValue::new(bytes, HashAlgorithmKind::Wavelet))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Wavelet
    }
}

/// One Haar level: the LL band of a square `size` x `size` grid
fn haar_approximation(values: &[f32], size: usize) -> Vec<f32> {
    let half = size / 2;
    let mut out = Vec::with_capacity(half * half);

    for y in 0..half {
        for x in 0..half {
            let top = (2 * y) * size + 2 * x;
            let bottom = top + size;
            let sum = values[top] + values[top + 1] + values[bottom] + values[bottom + 1];
            out.push(sum / 2.0);
        }
    }

    out
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_quadrant_image(bright_left: bool) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(128, 128, |x, _| {
            let bright = (x < 64) == bright_left;
            let v = if bright { 230 } else { 20 };
            Rgb([v, v, v])
        }))
    }

    #[test]
    fn haar_level_halves_the_grid() {
        let values = vec![1.0; 16];
        let reduced = haar_approximation(&values, 4);
        assert_eq!(reduced.len(), 4);
        assert!(reduced.iter().all(|&v| (v - 2.0).abs() < f32::EPSILON));
    }

    #[test]
    fn median_of_even_length() {
        assert_eq!(median(&[1.0, 4.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn mirrored_images_are_far_apart() {
        let hasher = WaveletHasher::new(8);
        let left = hasher.hash_image(&create_quadrant_image(true)).unwrap();
        let right = hasher.hash_image(&create_quadrant_image(false)).unwrap();

        assert_eq!(left.as_bytes().len(), 8);
        assert!(left.distance(&right) >= 32);
    }
}
