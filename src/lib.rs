//! # Media Atlas
//!
//! Indexes a directory tree of photos and videos and derives relationships
//! across the whole collection.
//!
//! ## Core Philosophy
//! - **Read only** - files are inspected, never moved or deleted
//! - **Degrade, don't fail** - a broken file still yields whatever metadata is usable
//! - **Explain damage** - every record says whether it is corrupted and why
//!
//! ## Architecture
//! - `core` - Scanning, extraction, persistence and analytics
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaAtlasError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects between `debug`
/// and `info` for this crate. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "media_atlas=debug"
    } else {
        "media_atlas=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
