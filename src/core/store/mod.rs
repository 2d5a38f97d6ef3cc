//! # Store Module
//!
//! Where finished records go.
//!
//! ## Sinks
//! - `MemorySink` - in-memory map keyed by path
//! - `ChannelSink` - streams records to a consumer thread
//! - `SqliteStore` - persistent index with aggregate queries
//!
//! Every sink replaces an earlier record for the same path, so rescanning
//! a tree into the same store is safe.

mod channel;
mod memory;
mod queries;
mod sqlite;
mod traits;

pub use channel::{record_channel, ChannelSink};
pub use memory::MemorySink;
pub use queries::{
    BasicStats, BrightnessEntry, CorruptedFile, HashCount, NameCount, ResolutionCount,
    TruncatedVideo, YearMonthCount, BRIGHT_THRESHOLD, DARK_THRESHOLD, MIN_VIDEO_FRAMES,
};
pub use sqlite::SqliteStore;
pub use traits::RecordSink;
