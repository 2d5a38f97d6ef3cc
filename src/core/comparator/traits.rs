//! Trait definitions for comparison strategies.

use super::MatchType;

/// Strategy trait for deciding whether two fingerprints are similar
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if two records should be considered similar based on distance
    fn is_similar(&self, distance: u32) -> bool;

    /// Classify the match type based on distance
    fn classify(&self, distance: u32) -> MatchType {
        MatchType::from_distance(distance)
    }

    /// Get the threshold used
    fn threshold(&self) -> u32;
}

/// Inclusive threshold on Hamming distance
#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a new threshold strategy
    ///
    /// For 64-bit hashes:
    /// - 5: Conservative, few false positives
    /// - 10: Default, catches resized and recompressed copies
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(super::DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_similar(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }
}
