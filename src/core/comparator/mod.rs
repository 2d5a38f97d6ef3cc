//! # Comparator Module
//!
//! Finds exact duplicates by content hash and visually similar files by
//! comparing perceptual hashes.
//!
//! ## How It Works
//! 1. Compare all fingerprinted record pairs using Hamming distance
//! 2. Apply a comparison strategy to keep similar pairs
//! 3. Group pairs into clusters (transitive grouping)
//!
//! ## Comparison Thresholds (64-bit hashes)
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Different     |

mod exact;
mod grouper;
mod traits;

pub use exact::{find_exact_duplicates, ExactDuplicateGroup};
pub use grouper::{DisjointSet, TransitiveGrouper};
pub use traits::{ComparisonStrategy, ThresholdStrategy};

use crate::core::hasher::HashAlgorithmKind;
use crate::core::record::FileRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Distance reported when either hash is missing or not hex
pub const MAX_DISTANCE: u32 = 9999;

/// Default inclusive Hamming threshold
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 10;

/// Classification of match types, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely the same scene
    Similar,
    /// Distance 11+, possibly related
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}

/// Options for similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Inclusive Hamming threshold
    pub threshold: u32,
    /// Which fingerprint hash to compare
    pub hash_kind: HashAlgorithmKind,
    /// Whether corrupted-but-usable records take part
    pub include_degraded: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            hash_kind: HashAlgorithmKind::Perceptual,
            include_degraded: true,
        }
    }
}

impl SimilarityConfig {
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn hash_kind(mut self, kind: HashAlgorithmKind) -> Self {
        self.hash_kind = kind;
        self
    }

    pub fn include_degraded(mut self, include: bool) -> Self {
        self.include_degraded = include;
        self
    }

    pub fn strategy(&self) -> ThresholdStrategy {
        ThresholdStrategy::new(self.threshold)
    }
}

/// Two records whose fingerprints are within the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    pub a: PathBuf,
    pub b: PathBuf,
    pub distance: u32,
    pub match_type: MatchType,
}

/// A transitive group of similar records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityCluster {
    /// Sorted paths
    pub members: Vec<PathBuf>,
    /// Mean distance over the pairs that formed the cluster
    pub average_distance: f64,
    /// Best match among those pairs
    pub match_type: MatchType,
}

/// Bit distance between two hex hashes.
///
/// The shorter hash is left-padded with zeros, so hashes compare as
/// integers. A missing, empty or non-hex hash gives [`MAX_DISTANCE`].
pub fn hamming_distance(a: Option<&str>, b: Option<&str>) -> u32 {
    let (Some(a), Some(b)) = (a.and_then(nibbles), b.and_then(nibbles)) else {
        return MAX_DISTANCE;
    };

    let width = a.len().max(b.len());
    let padded = |v: &[u8]| {
        std::iter::repeat(0u8)
            .take(width - v.len())
            .chain(v.iter().copied())
            .collect::<Vec<_>>()
    };

    padded(&a)
        .iter()
        .zip(padded(&b).iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

fn nibbles(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.is_empty() {
        return None;
    }
    hex.chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect()
}

fn candidates<'r>(
    records: &'r [FileRecord],
    config: &SimilarityConfig,
) -> Vec<(&'r FileRecord, &'r str)> {
    records
        .iter()
        .filter(|r| config.include_degraded || !r.is_degraded())
        .filter_map(|r| {
            let hash = r.fingerprint()?.hash(config.hash_kind)?;
            Some((r, hash))
        })
        .collect()
}

/// Every pair of fingerprinted records within the threshold.
///
/// Pairwise over all candidates; videos take part through their frame.
pub fn find_similar_pairs(records: &[FileRecord], config: &SimilarityConfig) -> Vec<SimilarPair> {
    let strategy = config.strategy();
    let candidates = candidates(records, config);
    let mut pairs = Vec::new();

    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            let (record_a, hash_a) = candidates[i];
            let (record_b, hash_b) = candidates[j];

            let distance = hamming_distance(Some(hash_a), Some(hash_b));
            if strategy.is_similar(distance) {
                pairs.push(SimilarPair {
                    a: record_a.path.clone(),
                    b: record_b.path.clone(),
                    distance,
                    match_type: strategy.classify(distance),
                });
            }
        }
    }

    pairs
}

/// Clusters of two or more visually similar records
pub fn find_visual_clusters(
    records: &[FileRecord],
    config: &SimilarityConfig,
) -> Vec<SimilarityCluster> {
    TransitiveGrouper::new().group(&find_similar_pairs(records, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Fingerprint, ImageMetadata, MediaDetails, VideoMetadata};
    use std::path::Path;

    fn image(path: &str, phash: &str) -> FileRecord {
        let mut record = FileRecord::from_path(Path::new(path));
        record.is_image = true;
        record.details = MediaDetails::Image(ImageMetadata {
            fingerprint: Fingerprint {
                phash: Some(phash.to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        record
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(hamming_distance(Some("deadbeef"), Some("deadbeef")), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Some("f0f0f0f0f0f0f0f0");
        let b = Some("0ff00ff00ff00ff1");
        assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
    }

    #[test]
    fn shorter_hash_is_left_padded() {
        assert_eq!(hamming_distance(Some("1"), Some("0001")), 0);
        assert_eq!(hamming_distance(Some("f"), Some("100f")), 1);
    }

    #[test]
    fn missing_or_invalid_hash_is_max_distance() {
        assert_eq!(hamming_distance(None, Some("ff")), MAX_DISTANCE);
        assert_eq!(hamming_distance(Some("zz"), Some("ff")), MAX_DISTANCE);
        assert_eq!(hamming_distance(Some(""), Some("ff")), MAX_DISTANCE);
    }

    #[test]
    fn counts_bits_not_nibbles() {
        assert_eq!(hamming_distance(Some("0000"), Some("000f")), 4);
        assert_eq!(hamming_distance(Some("ffff"), Some("0000")), 16);
    }

    #[test]
    fn clusters_transitively() {
        let records = vec![
            image("/a.jpg", "0000000000000000"),
            image("/b.jpg", "00000000000000ff"),   // 8 from a
            image("/c.jpg", "000000000000ffff"),   // 8 from b, 16 from a
            image("/far.jpg", "ffffffffffffffff"),
        ];

        let pairs = find_similar_pairs(&records, &SimilarityConfig::default());
        assert_eq!(pairs.len(), 2);

        let clusters = find_visual_clusters(&records, &SimilarityConfig::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
        assert!(!clusters[0].members.contains(&PathBuf::from("/far.jpg")));
    }

    #[test]
    fn videos_compare_through_their_frame() {
        let mut video = FileRecord::from_path(Path::new("/clip.mov"));
        video.is_video = true;
        video.details = MediaDetails::Video(VideoMetadata {
            frame: Some(Fingerprint {
                phash: Some("0000000000000001".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let records = vec![image("/still.jpg", "0000000000000000"), video];

        let pairs = find_similar_pairs(&records, &SimilarityConfig::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].distance, 1);
        assert_eq!(pairs[0].match_type, MatchType::NearExact);
    }

    #[test]
    fn degraded_records_can_be_excluded() {
        let mut degraded = image("/b.jpg", "0000000000000000");
        degraded.corrupted = true;
        let records = vec![image("/a.jpg", "0000000000000000"), degraded];

        let with = find_similar_pairs(&records, &SimilarityConfig::default());
        let without = find_similar_pairs(
            &records,
            &SimilarityConfig::default().include_degraded(false),
        );

        assert_eq!(with.len(), 1);
        assert!(without.is_empty());
    }

    #[test]
    fn other_hash_kinds_can_be_selected() {
        let records = vec![image("/a.jpg", "00"), image("/b.jpg", "00")];
        let config = SimilarityConfig::default().hash_kind(HashAlgorithmKind::Difference);

        assert!(find_similar_pairs(&records, &config).is_empty());
    }
}
