//! SQLite-backed record store.

use super::RecordSink;
use crate::core::metadata::ExifData;
use crate::core::record::{
    FileRecord, Fingerprint, ImageMetadata, MediaDetails, VideoMetadata,
};
use crate::error::StoreError;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_path TEXT NOT NULL UNIQUE,
        filename TEXT NOT NULL,
        basename TEXT NOT NULL,
        extension TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        size INTEGER NOT NULL,
        created_date TEXT,
        modified_date TEXT,
        changed_date TEXT,
        birth_date TEXT,
        year INTEGER,
        month INTEGER,
        inode INTEGER,
        is_image INTEGER NOT NULL,
        is_video INTEGER NOT NULL,
        is_audio INTEGER NOT NULL,
        is_corrupted INTEGER NOT NULL,
        read_error TEXT,
        is_usable INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS image_meta (
        file_id INTEGER PRIMARY KEY REFERENCES files(id) ON DELETE CASCADE,
        width INTEGER,
        height INTEGER,
        brightness_mean REAL,
        hist_16bins TEXT,
        exif_datetime_original TEXT,
        exif_camera_model TEXT,
        exif_lens TEXT,
        exif_orientation INTEGER,
        exif_iso INTEGER,
        exif_fnumber REAL,
        exif_exposure_time REAL,
        exif_focal_length REAL,
        gps_lat REAL,
        gps_lon REAL
    );

    CREATE TABLE IF NOT EXISTS video_meta (
        file_id INTEGER PRIMARY KEY REFERENCES files(id) ON DELETE CASCADE,
        width INTEGER,
        height INTEGER,
        duration REAL,
        fps REAL,
        bitrate INTEGER,
        nb_frames INTEGER,
        rotation INTEGER,
        video_codec TEXT,
        audio_codec TEXT,
        has_frame INTEGER NOT NULL,
        frame_brightness_mean REAL,
        frame_hist_16bins TEXT,
        frame_error TEXT
    );

    CREATE TABLE IF NOT EXISTS hash_meta (
        file_id INTEGER PRIMARY KEY REFERENCES files(id) ON DELETE CASCADE,
        sha256 TEXT,
        phash TEXT,
        ahash TEXT,
        dhash TEXT,
        whash TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_hash_sha256 ON hash_meta(sha256);
    CREATE INDEX IF NOT EXISTS idx_files_year_month ON files(year, month);
";

const LOAD_QUERY: &str = "
    SELECT
        f.full_path, f.filename, f.basename, f.extension, f.mime_type, f.size,
        f.created_date, f.modified_date, f.changed_date, f.birth_date,
        f.year, f.month, f.inode,
        f.is_image, f.is_video, f.is_audio, f.is_corrupted, f.read_error, f.is_usable,
        im.file_id AS image_id,
        im.width AS image_width, im.height AS image_height,
        im.brightness_mean AS image_brightness, im.hist_16bins AS image_hist,
        im.exif_datetime_original, im.exif_camera_model, im.exif_lens,
        im.exif_orientation, im.exif_iso, im.exif_fnumber,
        im.exif_exposure_time, im.exif_focal_length, im.gps_lat, im.gps_lon,
        vm.file_id AS video_id,
        vm.width AS video_width, vm.height AS video_height,
        vm.duration, vm.fps, vm.bitrate, vm.nb_frames, vm.rotation,
        vm.video_codec, vm.audio_codec, vm.has_frame,
        vm.frame_brightness_mean, vm.frame_hist_16bins, vm.frame_error,
        h.sha256, h.phash, h.ahash, h.dhash, h.whash
    FROM files f
    LEFT JOIN image_meta im ON im.file_id = f.id
    LEFT JOIN video_meta vm ON vm.file_id = f.id
    LEFT JOIN hash_meta h ON h.file_id = f.id
    ORDER BY f.full_path
";

/// Persistent store for scan records
///
/// One row per file in `files`, keyed by its full path, plus one row per
/// file in whichever of `image_meta` / `video_meta` applies and in
/// `hash_meta`. Uses WAL so readers are not blocked by a running scan.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::initialize(conn, path.to_path_buf())
    }

    /// A throwaway store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;

        Self::initialize(conn, PathBuf::from(":memory:"))
    }

    fn initialize(conn: Connection, db_path: PathBuf) -> Result<Self, StoreError> {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;

        debug!(path = %db_path.display(), "store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned {
            path: self.db_path.clone(),
        })
    }

    /// Insert a record, replacing any earlier record for the same path
    pub fn upsert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let file_id = write_file_row(&tx, record)?;

        tx.execute("DELETE FROM image_meta WHERE file_id = ?1", [file_id])?;
        tx.execute("DELETE FROM video_meta WHERE file_id = ?1", [file_id])?;
        tx.execute("DELETE FROM hash_meta WHERE file_id = ?1", [file_id])?;

        match &record.details {
            MediaDetails::Image(image) => write_image_row(&tx, file_id, image)?,
            MediaDetails::Video(video) => write_video_row(&tx, file_id, video)?,
            MediaDetails::None => {}
        }
        write_hash_row(&tx, file_id, record)?;

        tx.commit()?;
        Ok(())
    }

    /// Remove every stored record
    pub fn reset(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "BEGIN;
             DELETE FROM hash_meta;
             DELETE FROM video_meta;
             DELETE FROM image_meta;
             DELETE FROM files;
             COMMIT;",
        )?;
        Ok(())
    }

    /// Number of stored files
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Rebuild every stored record, sorted by path
    pub fn load_records(&self) -> Result<Vec<FileRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(LOAD_QUERY)?;
        let records = stmt
            .query_map([], read_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl RecordSink for SqliteStore {
    fn accept(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        self.upsert(record)
    }
}

fn write_file_row(tx: &Transaction<'_>, record: &FileRecord) -> Result<i64, StoreError> {
    let full_path = record.path.to_string_lossy().into_owned();

    tx.execute(
        "INSERT INTO files (
            full_path, filename, basename, extension, mime_type, size,
            created_date, modified_date, changed_date, birth_date, year, month, inode,
            is_image, is_video, is_audio, is_corrupted, read_error, is_usable
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
        ON CONFLICT(full_path) DO UPDATE SET
            filename = excluded.filename,
            basename = excluded.basename,
            extension = excluded.extension,
            mime_type = excluded.mime_type,
            size = excluded.size,
            created_date = excluded.created_date,
            modified_date = excluded.modified_date,
            changed_date = excluded.changed_date,
            birth_date = excluded.birth_date,
            year = excluded.year,
            month = excluded.month,
            inode = excluded.inode,
            is_image = excluded.is_image,
            is_video = excluded.is_video,
            is_audio = excluded.is_audio,
            is_corrupted = excluded.is_corrupted,
            read_error = excluded.read_error,
            is_usable = excluded.is_usable",
        params![
            full_path,
            record.filename,
            record.stem,
            record.extension,
            record.mime_type,
            record.size as i64,
            format_timestamp(record.created_at),
            format_timestamp(record.modified_at),
            format_timestamp(record.changed_at),
            format_timestamp(record.birth_at),
            record.year,
            record.month,
            record.inode.map(|inode| inode as i64),
            record.is_image,
            record.is_video,
            record.is_audio,
            record.corrupted,
            record.read_error,
            record.usable,
        ],
    )?;

    let file_id = tx.query_row(
        "SELECT id FROM files WHERE full_path = ?1",
        [&full_path],
        |row| row.get(0),
    )?;
    Ok(file_id)
}

fn write_image_row(
    tx: &Transaction<'_>,
    file_id: i64,
    image: &ImageMetadata,
) -> Result<(), StoreError> {
    let exif = &image.exif;
    tx.execute(
        "INSERT INTO image_meta (
            file_id, width, height, brightness_mean, hist_16bins,
            exif_datetime_original, exif_camera_model, exif_lens, exif_orientation,
            exif_iso, exif_fnumber, exif_exposure_time, exif_focal_length,
            gps_lat, gps_lon
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            file_id,
            image.width,
            image.height,
            image.fingerprint.brightness_mean,
            histogram_json(image.fingerprint.histogram.as_ref())?,
            format_timestamp(exif.captured_at),
            exif.camera_model,
            exif.lens_model,
            exif.orientation,
            exif.iso,
            exif.f_number,
            exif.exposure_time,
            exif.focal_length,
            exif.gps_latitude,
            exif.gps_longitude,
        ],
    )?;
    Ok(())
}

fn write_video_row(
    tx: &Transaction<'_>,
    file_id: i64,
    video: &VideoMetadata,
) -> Result<(), StoreError> {
    let frame = video.frame.as_ref();
    tx.execute(
        "INSERT INTO video_meta (
            file_id, width, height, duration, fps, bitrate, nb_frames, rotation,
            video_codec, audio_codec, has_frame, frame_brightness_mean,
            frame_hist_16bins, frame_error
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            file_id,
            video.width,
            video.height,
            video.duration,
            video.fps,
            video.bitrate.map(|b| b as i64),
            video.frame_count.map(|n| n as i64),
            video.rotation,
            video.video_codec,
            video.audio_codec,
            frame.is_some(),
            frame.and_then(|f| f.brightness_mean),
            histogram_json(frame.and_then(|f| f.histogram.as_ref()))?,
            video.frame_error,
        ],
    )?;
    Ok(())
}

fn write_hash_row(
    tx: &Transaction<'_>,
    file_id: i64,
    record: &FileRecord,
) -> Result<(), StoreError> {
    let fingerprint = record.fingerprint();
    tx.execute(
        "INSERT INTO hash_meta (file_id, sha256, phash, ahash, dhash, whash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            file_id,
            record.content_hash,
            fingerprint.and_then(|f| f.phash.as_deref()),
            fingerprint.and_then(|f| f.ahash.as_deref()),
            fingerprint.and_then(|f| f.dhash.as_deref()),
            fingerprint.and_then(|f| f.whash.as_deref()),
        ],
    )?;
    Ok(())
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let sha256: Option<String> = row.get("sha256")?;
    let hashes = Fingerprint {
        phash: row.get("phash")?,
        ahash: row.get("ahash")?,
        dhash: row.get("dhash")?,
        whash: row.get("whash")?,
        brightness_mean: None,
        histogram: None,
    };

    let image_id: Option<i64> = row.get("image_id")?;
    let video_id: Option<i64> = row.get("video_id")?;

    let details = if image_id.is_some() {
        MediaDetails::Image(read_image(row, hashes)?)
    } else if video_id.is_some() {
        MediaDetails::Video(read_video(row, hashes)?)
    } else {
        MediaDetails::None
    };

    let full_path: String = row.get("full_path")?;
    Ok(FileRecord {
        path: PathBuf::from(full_path),
        filename: row.get("filename")?,
        stem: row.get("basename")?,
        extension: row.get("extension")?,
        size: row.get::<_, i64>("size")? as u64,
        mime_type: row.get("mime_type")?,
        content_hash: sha256,
        is_image: row.get("is_image")?,
        is_video: row.get("is_video")?,
        is_audio: row.get("is_audio")?,
        corrupted: row.get("is_corrupted")?,
        usable: row.get("is_usable")?,
        read_error: row.get("read_error")?,
        modified_at: read_timestamp(row, "modified_date")?,
        changed_at: read_timestamp(row, "changed_date")?,
        birth_at: read_timestamp(row, "birth_date")?,
        inode: row.get::<_, Option<i64>>("inode")?.map(|inode| inode as u64),
        created_at: read_timestamp(row, "created_date")?,
        year: row.get("year")?,
        month: row.get("month")?,
        details,
    })
}

fn read_image(row: &Row<'_>, hashes: Fingerprint) -> rusqlite::Result<ImageMetadata> {
    Ok(ImageMetadata {
        width: row.get("image_width")?,
        height: row.get("image_height")?,
        fingerprint: Fingerprint {
            brightness_mean: row.get("image_brightness")?,
            histogram: read_histogram(row, "image_hist")?,
            ..hashes
        },
        exif: ExifData {
            captured_at: read_timestamp(row, "exif_datetime_original")?,
            camera_model: row.get("exif_camera_model")?,
            lens_model: row.get("exif_lens")?,
            orientation: row.get("exif_orientation")?,
            iso: row.get("exif_iso")?,
            f_number: row.get("exif_fnumber")?,
            exposure_time: row.get("exif_exposure_time")?,
            focal_length: row.get("exif_focal_length")?,
            gps_latitude: row.get("gps_lat")?,
            gps_longitude: row.get("gps_lon")?,
        },
    })
}

fn read_video(row: &Row<'_>, hashes: Fingerprint) -> rusqlite::Result<VideoMetadata> {
    let has_frame: bool = row.get("has_frame")?;
    let frame = if has_frame {
        Some(Fingerprint {
            brightness_mean: row.get("frame_brightness_mean")?,
            histogram: read_histogram(row, "frame_hist_16bins")?,
            ..hashes
        })
    } else {
        None
    };

    Ok(VideoMetadata {
        duration: row.get("duration")?,
        fps: row.get("fps")?,
        bitrate: row.get::<_, Option<i64>>("bitrate")?.map(|b| b as u64),
        frame_count: row.get::<_, Option<i64>>("nb_frames")?.map(|n| n as u64),
        rotation: row.get("rotation")?,
        video_codec: row.get("video_codec")?,
        audio_codec: row.get("audio_codec")?,
        width: row.get("video_width")?,
        height: row.get("video_height")?,
        frame,
        frame_error: row.get("frame_error")?,
    })
}

fn format_timestamp(time: Option<NaiveDateTime>) -> Option<String> {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

fn read_timestamp(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let Some(text) = row.get::<_, Option<String>>(column)? else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map(Some)
        .map_err(|e| conversion_error(row, column, e))
}

fn histogram_json(histogram: Option<&[u64; 16]>) -> Result<Option<String>, StoreError> {
    histogram
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::SerializationFailed(e.to_string()))
}

fn read_histogram(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<[u64; 16]>> {
    let Some(text) = row.get::<_, Option<String>>(column)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| conversion_error(row, column, e))
}

fn conversion_error<E>(row: &Row<'_>, column: &str, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_nano_opt(h, m, s, 250_000_000)
            .unwrap()
    }

    fn image_record(path: &str) -> FileRecord {
        let mut record = FileRecord::from_path(Path::new(path));
        record.size = 2048;
        record.mime_type = "image/jpeg".to_string();
        record.is_image = true;
        record.content_hash = Some("ab".repeat(32));
        record.modified_at = Some(at(10, 0, 0));
        record.inode = Some(42);
        record.set_created_at(Some(at(9, 30, 5)));
        record.details = MediaDetails::Image(ImageMetadata {
            width: Some(640),
            height: Some(480),
            fingerprint: Fingerprint {
                phash: Some("f0f0f0f0f0f0f0f0".to_string()),
                ahash: Some("0f0f0f0f0f0f0f0f".to_string()),
                dhash: None,
                whash: Some("ffff0000ffff0000".to_string()),
                brightness_mean: Some(0.5),
                histogram: Some([1; 16]),
            },
            exif: ExifData {
                captured_at: Some(at(9, 30, 5)),
                camera_model: Some("X100V".to_string()),
                orientation: Some(1),
                iso: Some(200),
                f_number: Some(2.0),
                gps_latitude: Some(38.7),
                gps_longitude: Some(-9.14),
                ..Default::default()
            },
        });
        record
    }

    fn video_record(path: &str) -> FileRecord {
        let mut record = FileRecord::from_path(Path::new(path));
        record.mime_type = "video/quicktime".to_string();
        record.is_video = true;
        record.corrupted = true;
        record.read_error = Some("incomplete video stream".to_string());
        record.details = MediaDetails::Video(VideoMetadata {
            duration: Some(3.5),
            fps: Some(29.97),
            bitrate: Some(8_000_000),
            frame_count: None,
            rotation: Some(90),
            video_codec: Some("h264".to_string()),
            width: Some(1920),
            height: Some(1080),
            frame: Some(Fingerprint {
                phash: Some("00ff00ff00ff00ff".to_string()),
                brightness_mean: Some(0.2),
                ..Default::default()
            }),
            ..Default::default()
        });
        record
    }

    #[test]
    fn records_survive_a_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let image = image_record("/media/a.jpg");
        let video = video_record("/media/b.mov");
        let mut other = FileRecord::from_path(Path::new("/media/notes.txt"));
        other.mime_type = "text/plain".to_string();

        store.upsert(&video).unwrap();
        store.upsert(&image).unwrap();
        store.upsert(&other).unwrap();

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded, vec![image, video, other]);
    }

    #[test]
    fn upsert_replaces_kind_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&image_record("/media/a.jpg")).unwrap();

        let mut replacement = image_record("/media/a.jpg");
        replacement.details = MediaDetails::None;
        replacement.usable = false;
        store.upsert(&replacement).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let loaded = store.load_records().unwrap();
        assert_eq!(loaded[0].details, MediaDetails::None);
        assert!(!loaded[0].usable);
    }

    #[test]
    fn reset_clears_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&image_record("/media/a.jpg")).unwrap();
        store.upsert(&video_record("/media/b.mov")).unwrap();

        store.reset().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert!(store.load_records().unwrap().is_empty());
    }

    #[test]
    fn video_without_frame_reloads_as_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut record = video_record("/media/c.mp4");
        if let MediaDetails::Video(video) = &mut record.details {
            video.frame = None;
            video.frame_error = Some("ffmpeg not found".to_string());
        }
        store.upsert(&record).unwrap();

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn works_as_a_sink() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.accept(&image_record("/media/a.jpg")).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.db");

        let store = SqliteStore::open(&path).unwrap();
        store.upsert(&image_record("/media/a.jpg")).unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
