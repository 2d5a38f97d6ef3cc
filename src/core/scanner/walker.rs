//! Directory walking implementation using walkdir.

use super::{FileSource, WalkEntry};
use crate::core::metadata::ToolConfig;
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for a scan
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Where ffprobe / ffmpeg are looked up
    pub tools: ToolConfig,
}

impl ScanConfig {
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn tools(mut self, tools: ToolConfig) -> Self {
        self.tools = tools;
        self
    }
}

/// [`FileSource`] using the walkdir crate
#[derive(Debug, Clone, Default)]
pub struct FileWalker {
    config: ScanConfig,
}

impl FileWalker {
    /// Create a new walker with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl FileSource for FileWalker {
    fn walk<'a>(
        &'a self,
        root: &Path,
    ) -> Result<Box<dyn Iterator<Item = WalkEntry> + 'a>, ScanError> {
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let entries = walker.into_iter().filter_map(|entry_result| match entry_result {
            Ok(entry) if entry.file_type().is_file() => {
                Some(WalkEntry::File(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                Some(WalkEntry::Error {
                    path,
                    message: e.to_string(),
                })
            }
        });

        Ok(Box::new(entries))
    }
}
