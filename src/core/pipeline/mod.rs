//! # Pipeline Module
//!
//! Orchestrates a scan.
//!
//! ## Per-file Stages
//! 1. **Inspect** - filesystem attributes, on the calling thread
//! 2. **Hash** - SHA-256 of the content, on the pool
//! 3. **Classify + Extract** - image or video metadata, on the pool
//! 4. **Assemble** - one [`FileRecord`](crate::core::record::FileRecord) to the sink
//!
//! ## Parallelism
//! Sub-tasks of a file run on a caller-owned rayon pool ([`WorkerPool`]).

mod cancel;
mod executor;
mod pool;

pub use cancel::CancellationToken;
pub use executor::{
    assemble_record, resolve_created, ExtractedMedia, ScanOutcome, ScanStatus, Scanner,
    ScannerBuilder, WalkIssue,
};
pub use pool::{default_worker_count, WorkerPool, MIN_WORKERS};
