//! # Error Module
//!
//! Error types for the media indexer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, tool names, what went wrong
//! - **Per-file damage is data** - corruption lives on the record, not here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaAtlasError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("External tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),
}

/// Errors that abort a scan as a whole
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to start worker pool: {0}")]
    Pool(String),

    #[error("Record sink rejected a record: {0}")]
    Sink(#[from] StoreError),
}

/// Errors that occur while hashing file content or pixels
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the external probe / decode executables
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} not found")]
    NotFound { tool: &'static str },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{tool} produced unreadable output: {reason}")]
    InvalidOutput { tool: &'static str, reason: String },
}

/// Errors from record sinks and the SQLite store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Failed to serialize record data: {0}")]
    SerializationFailed(String),

    #[error("Record channel closed by the receiver")]
    ChannelClosed,

    #[error("Database connection poisoned: {path}")]
    Poisoned { path: PathBuf },
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        StoreError::QueryFailed(error.to_string())
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaAtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/media/holiday"),
        };
        assert!(error.to_string().contains("/media/holiday"));
    }

    #[test]
    fn missing_tool_message_names_the_tool() {
        let error = ToolError::NotFound { tool: "ffprobe" };
        assert_eq!(error.to_string(), "ffprobe not found");
    }

    #[test]
    fn sink_error_converts_into_scan_error() {
        let error: ScanError = StoreError::ChannelClosed.into();
        assert!(error.to_string().contains("channel closed"));
    }
}
