//! Gap-based segmentation of records by creation time.

use crate::core::record::FileRecord;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum gap inside a group, in seconds
pub const DEFAULT_TIME_GAP_SECS: i64 = 120;

/// Records taken in one uninterrupted stretch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGroup {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Paths in timestamp order
    pub members: Vec<PathBuf>,
}

/// Split records into groups wherever consecutive timestamps are more than
/// `gap` apart.
///
/// Records without a resolved timestamp are left out. A group's span may
/// exceed `gap`; only neighbouring records are compared.
pub fn group_by_time(records: &[FileRecord], gap: TimeDelta) -> Vec<TimeGroup> {
    let mut dated: Vec<(NaiveDateTime, &FileRecord)> = records
        .iter()
        .filter_map(|r| r.created_at.map(|t| (t, r)))
        .collect();
    dated.sort_by(|(ta, ra), (tb, rb)| ta.cmp(tb).then_with(|| ra.path.cmp(&rb.path)));

    let mut groups: Vec<TimeGroup> = Vec::new();

    for (timestamp, record) in dated {
        match groups.last_mut() {
            Some(current) if timestamp - current.end <= gap => {
                current.end = timestamp;
                current.members.push(record.path.clone());
            }
            _ => groups.push(TimeGroup {
                start: timestamp,
                end: timestamp,
                members: vec![record.path.clone()],
            }),
        }
    }

    groups
}
