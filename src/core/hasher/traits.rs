//! Trait definitions for perceptual hashing.

use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash) - pixels against the mean intensity
    Average,
    /// Difference Hash (dHash) - horizontal brightness gradients
    Difference,
    /// Perceptual Hash (pHash) - low DCT frequencies
    #[default]
    Perceptual,
    /// Wavelet Hash (wHash) - Haar approximation coefficients
    Wavelet,
}

impl HashAlgorithmKind {
    pub const ALL: [HashAlgorithmKind; 4] = [
        HashAlgorithmKind::Perceptual,
        HashAlgorithmKind::Average,
        HashAlgorithmKind::Difference,
        HashAlgorithmKind::Wavelet,
    ];
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Average => write!(f, "aHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
            HashAlgorithmKind::Wavelet => write!(f, "wHash"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a hash from a decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;
}

/// Raw hash bits produced by one algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashValue {
    bytes: Vec<u8>,
    algorithm: HashAlgorithmKind,
}

impl ImageHashValue {
    pub fn new(bytes: Vec<u8>, algorithm: HashAlgorithmKind) -> Self {
        Self { bytes, algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithmKind {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-case hex, two digits per byte
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Number of differing bits against a hash of the same length
    pub fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Reject images with no pixels before resizing them
pub(crate) fn ensure_not_empty(image: &DynamicImage) -> Result<(), HashError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(HashError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_hash(bytes: &[u8]) -> ImageHashValue {
        ImageHashValue::new(bytes.to_vec(), HashAlgorithmKind::Difference)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let hash = create_test_hash(&[0xFF, 0x00, 0xAA, 0x55]);
        assert_eq!(hash.distance(&hash), 0);
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = create_test_hash(&[0b1111_0000]);
        let b = create_test_hash(&[0b0000_0000]);
        assert_eq!(a.distance(&b), 4);
    }

    #[test]
    fn to_hex_produces_correct_string() {
        let hash = create_test_hash(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(hash.to_hex(), "deadbeef");
    }

    #[test]
    fn algorithm_kind_display() {
        assert_eq!(HashAlgorithmKind::Average.to_string(), "aHash");
        assert_eq!(HashAlgorithmKind::Difference.to_string(), "dHash");
        assert_eq!(HashAlgorithmKind::Perceptual.to_string(), "pHash");
        assert_eq!(HashAlgorithmKind::Wavelet.to_string(), "wHash");
    }

    #[test]
    fn empty_image_is_rejected() {
        let image = DynamicImage::new_rgb8(0, 4);
        assert!(ensure_not_empty(&image).is_err());
    }
}
