//! # Analytics Module
//!
//! Collection-wide passes over scanned records.
//!
//! - exact duplicates and visual similarity clusters (see `comparator`)
//! - time groups: bursts separated by gaps
//! - location clusters: greedy GPS grouping
//! - live pairs: a still and a clip sharing a stem
//!
//! Every pass is synchronous over a slice of records and does not touch
//! the filesystem.

mod live;
mod spatial;
mod temporal;

pub use live::{find_live_pairs, LivePair, DEFAULT_LIVE_WINDOW_SECS};
pub use spatial::{
    group_by_location, haversine_distance, LocationCluster, DEFAULT_GPS_DISTANCE_M,
    EARTH_RADIUS_M,
};
pub use temporal::{group_by_time, TimeGroup, DEFAULT_TIME_GAP_SECS};

use crate::core::comparator::{
    find_exact_duplicates, find_visual_clusters, ExactDuplicateGroup, SimilarityCluster,
    SimilarityConfig,
};
use crate::core::record::FileRecord;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for [`analyze`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub similarity: SimilarityConfig,
    pub time_gap_secs: i64,
    pub gps_distance_m: f64,
    pub live_window_secs: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig::default(),
            time_gap_secs: DEFAULT_TIME_GAP_SECS,
            gps_distance_m: DEFAULT_GPS_DISTANCE_M,
            live_window_secs: DEFAULT_LIVE_WINDOW_SECS,
        }
    }
}

impl AnalysisConfig {
    pub fn similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn time_gap_secs(mut self, secs: i64) -> Self {
        self.time_gap_secs = secs;
        self
    }

    pub fn gps_distance_m(mut self, metres: f64) -> Self {
        self.gps_distance_m = metres;
        self
    }

    pub fn live_window_secs(mut self, secs: i64) -> Self {
        self.live_window_secs = secs;
        self
    }
}

/// Everything the analytics passes derived from one record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub records: usize,
    pub exact_duplicates: Vec<ExactDuplicateGroup>,
    pub similarity_clusters: Vec<SimilarityCluster>,
    pub time_groups: Vec<TimeGroup>,
    pub location_clusters: Vec<LocationCluster>,
    pub live_pairs: Vec<LivePair>,
}

/// Run every analytics pass
pub fn analyze(records: &[FileRecord], config: &AnalysisConfig) -> AnalysisReport {
    let report = AnalysisReport {
        records: records.len(),
        exact_duplicates: find_exact_duplicates(records),
        similarity_clusters: find_visual_clusters(records, &config.similarity),
        time_groups: group_by_time(records, saturating_seconds(config.time_gap_secs)),
        location_clusters: group_by_location(records, config.gps_distance_m),
        live_pairs: find_live_pairs(records, saturating_seconds(config.live_window_secs)),
    };

    debug!(
        records = report.records,
        exact = report.exact_duplicates.len(),
        similar = report.similarity_clusters.len(),
        time_groups = report.time_groups.len(),
        places = report.location_clusters.len(),
        live_pairs = report.live_pairs.len(),
        "analysis finished"
    );

    report
}

/// Seconds as a [`TimeDelta`], clamped to the representable range
fn saturating_seconds(secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs).unwrap_or(if secs < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.similarity.threshold, 10);
        assert_eq!(config.time_gap_secs, 120);
        assert_eq!(config.gps_distance_m, 50.0);
        assert_eq!(config.live_window_secs, 3);
    }

    #[test]
    fn huge_gap_is_clamped() {
        assert_eq!(saturating_seconds(i64::MAX), TimeDelta::MAX);
        assert_eq!(saturating_seconds(i64::MIN), TimeDelta::MIN);
        assert_eq!(saturating_seconds(90), TimeDelta::minutes(1) + TimeDelta::seconds(30));
    }

    #[test]
    fn huge_gap_puts_every_dated_record_in_one_group() {
        let dated = |path: &str, year: i32| {
            let mut record = FileRecord::from_path(Path::new(path));
            record.set_created_at(
                chrono::NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            );
            record
        };
        let records = vec![dated("/a.jpg", 1990), dated("/b.jpg", 2024)];
        let config = AnalysisConfig::default().time_gap_secs(10_000_000_000_000_000);

        let report = analyze(&records, &config);

        assert_eq!(report.time_groups.len(), 1);
        assert_eq!(report.time_groups[0].members.len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = analyze(&[], &AnalysisConfig::default());
        assert_eq!(report, AnalysisReport::default());
    }
}
