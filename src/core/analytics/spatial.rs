//! Greedy GPS clustering.

use crate::core::record::FileRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mean Earth radius used by the haversine formula, metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default clustering radius, metres
pub const DEFAULT_GPS_DISTANCE_M: f64 = 50.0;

/// Records taken around one seed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCluster {
    pub latitude: f64,
    pub longitude: f64,
    /// Seed first, then absorbed records in input order
    pub members: Vec<PathBuf>,
}

/// Great-circle distance in metres
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Cluster geotagged records around seeds.
///
/// Walking in input order, each unclustered record seeds a cluster that
/// absorbs every later unclustered record within `max_distance_m` of the
/// seed (inclusive). Distance is to the seed only. Records without both
/// coordinates are left out; a lone record is a cluster of one.
pub fn group_by_location(records: &[FileRecord], max_distance_m: f64) -> Vec<LocationCluster> {
    let located: Vec<(&FileRecord, (f64, f64))> = records
        .iter()
        .filter_map(|r| r.gps().map(|position| (r, position)))
        .collect();

    let mut clustered = vec![false; located.len()];
    let mut clusters = Vec::new();

    for i in 0..located.len() {
        if clustered[i] {
            continue;
        }
        clustered[i] = true;

        let (seed, (lat, lon)) = located[i];
        let mut members = vec![seed.path.clone()];

        for j in (i + 1)..located.len() {
            if clustered[j] {
                continue;
            }
            let (other, (other_lat, other_lon)) = located[j];
            if haversine_distance(lat, lon, other_lat, other_lon) <= max_distance_m {
                clustered[j] = true;
                members.push(other.path.clone());
            }
        }

        clusters.push(LocationCluster {
            latitude: lat,
            longitude: lon,
            members,
        });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::ExifData;
    use crate::core::record::{ImageMetadata, MediaDetails};
    use std::path::Path;

    /// Degrees of latitude spanning `metres` along a meridian
    fn lat_offset(metres: f64) -> f64 {
        (metres / EARTH_RADIUS_M).to_degrees()
    }

    fn geotagged(path: &str, lat: Option<f64>, lon: Option<f64>) -> FileRecord {
        let mut record = FileRecord::from_path(Path::new(path));
        record.details = MediaDetails::Image(ImageMetadata {
            exif: ExifData {
                gps_latitude: lat,
                gps_longitude: lon,
                ..Default::default()
            },
            ..Default::default()
        });
        record
    }

    #[test]
    fn haversine_along_meridian() {
        let d = haversine_distance(45.0, 7.0, 45.0 + lat_offset(50.0), 7.0);
        assert!((d - 50.0).abs() < 1e-6, "{d}");
    }

    #[test]
    fn threshold_is_inclusive() {
        let d = haversine_distance(45.0, 7.0, 45.0 + lat_offset(50.0), 7.0);
        let records = vec![
            geotagged("/a.jpg", Some(45.0), Some(7.0)),
            geotagged("/b.jpg", Some(45.0 + lat_offset(50.0)), Some(7.0)),
        ];

        assert_eq!(group_by_location(&records, d).len(), 1);
    }

    #[test]
    fn fifty_metres_merge_and_fifty_one_split() {
        let near = vec![
            geotagged("/a.jpg", Some(45.0), Some(7.0)),
            geotagged("/b.jpg", Some(45.0 + lat_offset(49.9999)), Some(7.0)),
        ];
        let far = vec![
            geotagged("/a.jpg", Some(45.0), Some(7.0)),
            geotagged("/b.jpg", Some(45.0 + lat_offset(51.0)), Some(7.0)),
        ];

        assert_eq!(group_by_location(&near, DEFAULT_GPS_DISTANCE_M).len(), 1);
        assert_eq!(group_by_location(&far, DEFAULT_GPS_DISTANCE_M).len(), 2);
    }

    #[test]
    fn distance_is_measured_to_seed_only() {
        // b is 40 m from a, c is 40 m from b but 80 m from a
        let records = vec![
            geotagged("/a.jpg", Some(45.0), Some(7.0)),
            geotagged("/b.jpg", Some(45.0 + lat_offset(40.0)), Some(7.0)),
            geotagged("/c.jpg", Some(45.0 + lat_offset(80.0)), Some(7.0)),
        ];

        let clusters = group_by_location(&records, DEFAULT_GPS_DISTANCE_M);

        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters[0].members,
            vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")]
        );
        assert_eq!(clusters[1].members, vec![PathBuf::from("/c.jpg")]);
    }

    #[test]
    fn records_missing_a_coordinate_are_excluded() {
        let records = vec![
            geotagged("/a.jpg", Some(45.0), None),
            geotagged("/b.jpg", None, Some(7.0)),
            FileRecord::from_path(Path::new("/c.mov")),
        ];

        assert!(group_by_location(&records, DEFAULT_GPS_DISTANCE_M).is_empty());
    }
}
