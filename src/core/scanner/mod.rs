//! # Scanner Module
//!
//! Discovers files under a root directory.
//!
//! Every regular file is reported, whatever its extension. Deciding what
//! a file holds is left to the classifier.
//!
//! ## Example
//! ```rust,ignore
//! use media_atlas::core::scanner::{FileSource, FileWalker, ScanConfig};
//!
//! let walker = FileWalker::new(ScanConfig::default());
//! for entry in walker.walk("/Volumes/photos".as_ref())? {
//!     println!("{:?}", entry);
//! }
//! ```

mod walker;

pub use walker::{FileWalker, ScanConfig};

use crate::error::ScanError;
use std::path::{Path, PathBuf};

/// One item produced while walking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A regular file
    File(PathBuf),
    /// A directory or entry that could not be read; the walk continues
    Error { path: PathBuf, message: String },
}

/// Trait for file discovery
///
/// Implement this trait to feed the scanner from somewhere other than
/// the local filesystem (e.g., for testing).
pub trait FileSource: Send + Sync {
    /// Lazily enumerate files below `root`; fails only for an invalid root
    fn walk<'a>(
        &'a self,
        root: &Path,
    ) -> Result<Box<dyn Iterator<Item = WalkEntry> + 'a>, ScanError>;
}
