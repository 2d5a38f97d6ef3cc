//! Scan event definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Events emitted while a directory tree is scanned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The walk of `root` has begun
    Started { root: PathBuf },
    /// A file record was built and handed to the sink
    Progress(ScanProgress),
    /// A directory entry could not be read; the walk continues
    WalkError { path: PathBuf, message: String },
    /// Every file was processed
    Completed(ScanSummary),
    /// The scan stopped early on request
    Cancelled { files_processed: usize },
}

/// Per-file progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Records emitted so far, including this one
    pub files_processed: usize,
    /// File that was just processed
    pub current_path: PathBuf,
    /// Whether any extractor reported damage
    pub corrupted: bool,
    /// Whether the damage left the metadata usable
    pub usable: bool,
}

/// Totals for a finished scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub files_processed: usize,
    pub images: usize,
    pub videos: usize,
    pub corrupted: usize,
    pub unusable: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = ScanEvent::Completed(ScanSummary {
            files_processed: 12,
            images: 10,
            videos: 2,
            corrupted: 1,
            unusable: 0,
            duration_ms: 40,
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: ScanEvent = serde_json::from_str(&json).unwrap();

        match back {
            ScanEvent::Completed(summary) => assert_eq!(summary.files_processed, 12),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
