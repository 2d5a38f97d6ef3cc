//! # Core Module
//!
//! The front-end agnostic indexing engine.
//!
//! ## Modules
//! - `scanner` - Walks a directory tree
//! - `inspector` - Reads filesystem attributes
//! - `identity` - Hashes file content
//! - `classifier` - Decides what kind of media a file is
//! - `metadata` - Extracts image and video metadata
//! - `hasher` - Computes perceptual hashes
//! - `corruption` - Grades extraction failures
//! - `record` - The per-file record
//! - `pipeline` - Orchestrates the full scan
//! - `store` - Record sinks and the SQLite index
//! - `comparator` - Exact duplicates and visual similarity
//! - `analytics` - Time, place and live-photo grouping

pub mod analytics;
pub mod classifier;
pub mod comparator;
pub mod corruption;
pub mod hasher;
pub mod identity;
pub mod inspector;
pub mod metadata;
pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use analytics::{analyze, AnalysisConfig, AnalysisReport};
pub use comparator::{MatchType, SimilarityConfig};
pub use corruption::{CorruptionVerdict, Severity};
pub use hasher::HashAlgorithmKind;
pub use pipeline::{CancellationToken, ScanOutcome, ScanStatus, Scanner, WorkerPool};
pub use record::{FileRecord, MediaDetails, MediaKind};
pub use scanner::ScanConfig;
pub use store::{MemorySink, RecordSink, SqliteStore};
