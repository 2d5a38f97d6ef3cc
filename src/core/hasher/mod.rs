//! # Hasher Module
//!
//! Computes perceptual hashes for decoded images.
//!
//! ## Supported Algorithms
//! - **pHash (Perceptual Hash)** - DCT based, the default for similarity
//! - **aHash (Average Hash)** - pixels against the mean
//! - **dHash (Difference Hash)** - horizontal gradients
//! - **wHash (Wavelet Hash)** - Haar approximation band
//!
//! Every algorithm produces 64 bits (16 hex digits) at the default size.
//!
//! ## Example
//! ```rust,ignore
//! use media_atlas::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Difference)
//!     .build();
//!
//! let hash = hasher.hash_image(&image)?;
//! ```

mod algorithms;
mod traits;

pub use algorithms::{AverageHasher, DifferenceHasher, PerceptualHasher, WaveletHasher};
pub use traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};

use crate::error::HashError;
use image::DynamicImage;

/// Default grid size: 8x8 = 64 bits
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Configuration builder for a single hasher
#[derive(Debug, Clone)]
pub struct HasherConfig {
    hash_size: u32,
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults
    pub fn new() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            algorithm: HashAlgorithmKind::Perceptual,
        }
    }

    /// Set the grid size. 8 gives 64 bits, 16 gives 256 bits.
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Box<dyn HashAlgorithm> {
        match self.algorithm {
            HashAlgorithmKind::Average => Box::new(AverageHasher::new(self.hash_size)),
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new(self.hash_size)),
            HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new(self.hash_size)),
            HashAlgorithmKind::Wavelet => Box::new(WaveletHasher::new(self.hash_size)),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One hash per algorithm for the same image
#[derive(Debug, Default)]
pub struct HashSetOutcome {
    pub hashes: Vec<(HashAlgorithmKind, String)>,
    pub errors: Vec<(HashAlgorithmKind, HashError)>,
}

impl HashSetOutcome {
    pub fn get(&self, kind: HashAlgorithmKind) -> Option<&str> {
        self.hashes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, hex)| hex.as_str())
    }
}

/// All four hashers, run together over one decoded image
pub struct HasherSet {
    hashers: Vec<Box<dyn HashAlgorithm>>,
}

impl HasherSet {
    pub fn new(hash_size: u32) -> Self {
        let hashers = HashAlgorithmKind::ALL
            .iter()
            .map(|&kind| HasherConfig::new().algorithm(kind).hash_size(hash_size).build())
            .collect();
        Self { hashers }
    }

    /// Run every hasher; a failing algorithm does not stop the others
    pub fn hash_all(&self, image: &DynamicImage) -> HashSetOutcome {
        let mut outcome = HashSetOutcome::default();

        for hasher in &self.hashers {
            match hasher.hash_image(image) {
                Ok(value) => outcome.hashes.push((hasher.kind(), value.to_hex())),
                Err(e) => outcome.errors.push((hasher.kind(), e)),
            }
        }

        outcome
    }
}

impl Default for HasherSet {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}
