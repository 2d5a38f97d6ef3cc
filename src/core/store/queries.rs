//! Aggregate queries over a [`SqliteStore`].

use super::SqliteStore;
use crate::error::StoreError;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cut-off for [`SqliteStore::dark_images`]
pub const DARK_THRESHOLD: f64 = 0.05;
/// Default cut-off for [`SqliteStore::bright_images`]
pub const BRIGHT_THRESHOLD: f64 = 0.95;
/// Videos with fewer frames than this are reported as truncated
pub const MIN_VIDEO_FRAMES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonthCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCount {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub count: usize,
}

/// A camera or lens name with its number of images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrightnessEntry {
    pub path: PathBuf,
    pub brightness_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncatedVideo {
    pub path: PathBuf,
    pub frame_count: Option<u64>,
    pub bitrate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptedFile {
    pub path: PathBuf,
    pub read_error: Option<String>,
    pub usable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total: usize,
    pub images: usize,
    pub videos: usize,
    pub corrupted: usize,
}

/// A content hash shared by more than one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCount {
    pub content_hash: String,
    pub count: usize,
}

impl SqliteStore {
    /// Files per capture year and month, oldest first. Undated files are
    /// not counted.
    pub fn year_month_counts(&self) -> Result<Vec<YearMonthCount>, StoreError> {
        self.collect(
            "SELECT year, month, COUNT(*) FROM files
             WHERE year IS NOT NULL AND month IS NOT NULL
             GROUP BY year, month
             ORDER BY year, month",
            |row| {
                Ok(YearMonthCount {
                    year: row.get(0)?,
                    month: row.get(1)?,
                    count: read_count(row, 2)?,
                })
            },
        )
    }

    /// Image and video resolutions, most common first
    pub fn resolution_stats(&self) -> Result<Vec<ResolutionCount>, StoreError> {
        self.collect(
            "SELECT width, height, COUNT(*) AS n FROM (
                SELECT width, height FROM image_meta
                UNION ALL
                SELECT width, height FROM video_meta
             )
             GROUP BY width, height
             ORDER BY n DESC, width DESC, height DESC",
            |row| {
                Ok(ResolutionCount {
                    width: row.get(0)?,
                    height: row.get(1)?,
                    count: read_count(row, 2)?,
                })
            },
        )
    }

    /// Camera models by number of images
    pub fn camera_ranking(&self) -> Result<Vec<NameCount>, StoreError> {
        self.name_ranking("exif_camera_model")
    }

    /// Lens models by number of images
    pub fn lens_ranking(&self) -> Result<Vec<NameCount>, StoreError> {
        self.name_ranking("exif_lens")
    }

    fn name_ranking(&self, column: &'static str) -> Result<Vec<NameCount>, StoreError> {
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n FROM image_meta
             WHERE {column} IS NOT NULL
             GROUP BY {column}
             ORDER BY n DESC, {column}"
        );
        self.collect(&sql, |row| {
            Ok(NameCount {
                name: row.get(0)?,
                count: read_count(row, 1)?,
            })
        })
    }

    /// Images darker than `threshold`, darkest first
    pub fn dark_images(&self, threshold: f64) -> Result<Vec<BrightnessEntry>, StoreError> {
        self.collect_with(
            "SELECT f.full_path, im.brightness_mean FROM image_meta im
             JOIN files f ON f.id = im.file_id
             WHERE im.brightness_mean < ?1
             ORDER BY im.brightness_mean ASC, f.full_path",
            params![threshold],
            read_brightness,
        )
    }

    /// Images brighter than `threshold`, brightest first
    pub fn bright_images(&self, threshold: f64) -> Result<Vec<BrightnessEntry>, StoreError> {
        self.collect_with(
            "SELECT f.full_path, im.brightness_mean FROM image_meta im
             JOIN files f ON f.id = im.file_id
             WHERE im.brightness_mean > ?1
             ORDER BY im.brightness_mean DESC, f.full_path",
            params![threshold],
            read_brightness,
        )
    }

    /// Videos with almost no frames or no usable bitrate
    pub fn truncated_videos(&self) -> Result<Vec<TruncatedVideo>, StoreError> {
        self.collect_with(
            "SELECT f.full_path, vm.nb_frames, vm.bitrate FROM video_meta vm
             JOIN files f ON f.id = vm.file_id
             WHERE vm.nb_frames < ?1 OR vm.bitrate IS NULL OR vm.bitrate = 0
             ORDER BY f.full_path",
            params![MIN_VIDEO_FRAMES],
            |row| {
                Ok(TruncatedVideo {
                    path: read_path(row, 0)?,
                    frame_count: row.get::<_, Option<i64>>(1)?.map(|n| n as u64),
                    bitrate: row.get::<_, Option<i64>>(2)?.map(|b| b as u64),
                })
            },
        )
    }

    /// Every file flagged as corrupted, with its first error
    pub fn corrupted_files(&self) -> Result<Vec<CorruptedFile>, StoreError> {
        self.collect(
            "SELECT full_path, read_error, is_usable FROM files
             WHERE is_corrupted = 1
             ORDER BY full_path",
            |row| {
                Ok(CorruptedFile {
                    path: read_path(row, 0)?,
                    read_error: row.get(1)?,
                    usable: row.get(2)?,
                })
            },
        )
    }

    pub fn basic_stats(&self) -> Result<BasicStats, StoreError> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_image), 0),
                    COALESCE(SUM(is_video), 0),
                    COALESCE(SUM(is_corrupted), 0)
             FROM files",
            [],
            |row| {
                Ok(BasicStats {
                    total: read_count(row, 0)?,
                    images: read_count(row, 1)?,
                    videos: read_count(row, 2)?,
                    corrupted: read_count(row, 3)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Content hashes seen more than once, most copies first
    pub fn sha_duplicates(&self) -> Result<Vec<HashCount>, StoreError> {
        self.collect(
            "SELECT sha256, COUNT(*) AS n FROM hash_meta
             WHERE sha256 IS NOT NULL
             GROUP BY sha256
             HAVING n > 1
             ORDER BY n DESC, sha256",
            |row| {
                Ok(HashCount {
                    content_hash: row.get(0)?,
                    count: read_count(row, 1)?,
                })
            },
        )
    }

    fn collect<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>, StoreError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.collect_with(sql, [], map)
    }

    fn collect_with<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, StoreError>
    where
        P: rusqlite::Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn read_count(row: &Row<'_>, index: usize) -> rusqlite::Result<usize> {
    Ok(row.get::<_, i64>(index)?.max(0) as usize)
}

fn read_path(row: &Row<'_>, index: usize) -> rusqlite::Result<PathBuf> {
    Ok(PathBuf::from(row.get::<_, String>(index)?))
}

fn read_brightness(row: &Row<'_>) -> rusqlite::Result<BrightnessEntry> {
    Ok(BrightnessEntry {
        path: read_path(row, 0)?,
        brightness_mean: row.get(1)?,
    })
}
