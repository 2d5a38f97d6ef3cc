//! Live-photo pairing: a still and a short clip sharing a stem.

use crate::core::record::FileRecord;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default pairing window, in seconds (exclusive)
pub const DEFAULT_LIVE_WINDOW_SECS: i64 = 3;

const LIVE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic"];
const LIVE_VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4"];

/// An image and a video captured together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePair {
    pub stem: String,
    pub image: PathBuf,
    pub video: PathBuf,
    /// Absolute difference of the creation times, seconds
    pub delta_seconds: f64,
}

#[derive(Default)]
struct StemBucket<'r> {
    images: Vec<&'r FileRecord>,
    videos: Vec<&'r FileRecord>,
}

/// Pair images and videos with the same stem whose creation times differ
/// by strictly less than `window`.
///
/// Every qualifying combination is returned, so one image may pair with
/// several videos. Records without a creation time never pair.
pub fn find_live_pairs(records: &[FileRecord], window: TimeDelta) -> Vec<LivePair> {
    let mut buckets: BTreeMap<&str, StemBucket> = BTreeMap::new();

    for record in records {
        let extension = record.extension.as_str();
        if LIVE_IMAGE_EXTENSIONS.contains(&extension) {
            buckets.entry(&record.stem).or_default().images.push(record);
        } else if LIVE_VIDEO_EXTENSIONS.contains(&extension) {
            buckets.entry(&record.stem).or_default().videos.push(record);
        }
    }

    let mut pairs = Vec::new();

    for (stem, bucket) in buckets {
        for image in &bucket.images {
            for video in &bucket.videos {
                let (Some(t_image), Some(t_video)) = (image.created_at, video.created_at) else {
                    continue;
                };

                let delta = (t_image - t_video).abs();
                if delta < window {
                    pairs.push(LivePair {
                        stem: stem.to_string(),
                        image: image.path.clone(),
                        video: video.path.clone(),
                        delta_seconds: delta.as_seconds_f64(),
                    });
                }
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::Path;

    fn record(path: &str, offset_secs: Option<i64>) -> FileRecord {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut record = FileRecord::from_path(Path::new(path));
        record.set_created_at(offset_secs.map(|s| base + TimeDelta::seconds(s)));
        record
    }

    fn window() -> TimeDelta {
        TimeDelta::seconds(DEFAULT_LIVE_WINDOW_SECS)
    }

    #[test]
    fn pairs_within_window() {
        let records = vec![
            record("/dcim/IMG_001.HEIC", Some(0)),
            record("/dcim/IMG_001.MOV", Some(2)),
        ];

        let pairs = find_live_pairs(&records, window());

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].stem, "IMG_001");
        assert_eq!(pairs[0].delta_seconds, 2.0);
    }

    #[test]
    fn too_far_apart_does_not_pair() {
        let records = vec![
            record("/IMG_001.jpg", Some(0)),
            record("/IMG_001.mov", Some(4)),
        ];
        assert!(find_live_pairs(&records, window()).is_empty());
    }

    #[test]
    fn window_is_exclusive() {
        let records = vec![
            record("/IMG_001.jpg", Some(3)),
            record("/IMG_001.mp4", Some(0)),
        ];
        assert!(find_live_pairs(&records, window()).is_empty());
    }

    #[test]
    fn pairing_is_not_one_to_one() {
        let records = vec![
            record("/a/IMG_7.jpg", Some(0)),
            record("/b/IMG_7.png", Some(1)),
            record("/a/IMG_7.mov", Some(1)),
        ];
        assert_eq!(find_live_pairs(&records, window()).len(), 2);
    }

    #[test]
    fn undated_and_other_kinds_are_ignored() {
        let records = vec![
            record("/IMG_2.jpg", None),
            record("/IMG_2.mov", Some(0)),
            record("/IMG_3.gif", Some(0)),
            record("/IMG_3.mov", Some(0)),
        ];
        assert!(find_live_pairs(&records, window()).is_empty());
    }
}
