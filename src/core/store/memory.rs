//! In-memory sink, mainly for tests and one-shot analysis.

use super::RecordSink;
use crate::core::record::FileRecord;
use crate::error::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Keeps records in a map keyed by path
#[derive(Debug, Default)]
pub struct MemorySink {
    records: HashMap<PathBuf, FileRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Drop every record
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// All records, sorted by path
    pub fn into_records(self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = self.records.into_values().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        self.records.insert(record.path.clone(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_replaces() {
        let mut sink = MemorySink::new();
        let mut record = FileRecord::from_path(Path::new("/a.jpg"));
        sink.accept(&record).unwrap();

        record.size = 99;
        sink.accept(&record).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(Path::new("/a.jpg")).unwrap().size, 99);
    }

    #[test]
    fn records_come_back_sorted() {
        let mut sink = MemorySink::new();
        for path in ["/c", "/a", "/b"] {
            sink.accept(&FileRecord::from_path(Path::new(path))).unwrap();
        }

        let paths: Vec<_> = sink.into_records().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
    }
}
