//! Byte-identical files, grouped by content hash.

use crate::core::record::FileRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Files sharing one content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactDuplicateGroup {
    pub content_hash: String,
    /// Sorted paths
    pub paths: Vec<PathBuf>,
    /// Size of one copy in bytes
    pub size: u64,
}

impl ExactDuplicateGroup {
    /// Bytes freed by keeping a single copy
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * self.paths.len().saturating_sub(1) as u64
    }
}

/// Group records by content hash, keeping groups with more than one member.
///
/// Records without a content hash are ignored. Groups are ordered by hash.
pub fn find_exact_duplicates(records: &[FileRecord]) -> Vec<ExactDuplicateGroup> {
    let mut by_hash: HashMap<&str, Vec<&FileRecord>> = HashMap::new();
    for record in records {
        if let Some(hash) = record.content_hash.as_deref() {
            by_hash.entry(hash).or_default().push(record);
        }
    }

    let mut groups: Vec<ExactDuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(hash, members)| {
            let mut paths: Vec<PathBuf> = members.iter().map(|r| r.path.clone()).collect();
            paths.sort();
            ExactDuplicateGroup {
                content_hash: hash.to_string(),
                paths,
                size: members[0].size,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.content_hash.cmp(&b.content_hash));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn record(path: &str, hash: Option<&str>) -> FileRecord {
        let mut record = FileRecord::from_path(Path::new(path));
        record.content_hash = hash.map(String::from);
        record.size = 100;
        record
    }

    #[test]
    fn groups_identical_hashes() {
        let records = vec![
            record("/b/copy.jpg", Some("aa")),
            record("/a/original.jpg", Some("aa")),
            record("/a/other.jpg", Some("bb")),
        ];

        let groups = find_exact_duplicates(&records);

        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].paths,
            vec![PathBuf::from("/a/original.jpg"), PathBuf::from("/b/copy.jpg")]
        );
        assert_eq!(groups[0].reclaimable_bytes(), 100);
    }

    #[test]
    fn three_copies_form_one_group() {
        let records = vec![
            record("/c/third.jpg", Some("cc")),
            record("/a/first.jpg", Some("cc")),
            record("/lonely.jpg", Some("dd")),
            record("/b/second.jpg", Some("cc")),
        ];

        let groups = find_exact_duplicates(&records);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 3);
        assert_eq!(groups[0].content_hash, "cc");
        assert!(!groups[0].paths.contains(&PathBuf::from("/lonely.jpg")));
        assert_eq!(groups[0].reclaimable_bytes(), 200);
    }

    #[test]
    fn missing_hashes_never_match() {
        let records = vec![record("/a.jpg", None), record("/b.jpg", None)];
        assert!(find_exact_duplicates(&records).is_empty());
    }
}
