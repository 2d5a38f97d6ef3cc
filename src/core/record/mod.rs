//! # Record Module
//!
//! The per-file record produced by a scan and the kind-specific metadata
//! it carries.

use crate::core::hasher::HashAlgorithmKind;
use crate::core::metadata::ExifData;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Broad media category of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    #[default]
    Other,
}

impl MediaKind {
    /// Category from the top-level type of a MIME string
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next().unwrap_or_default() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }
}

/// Perceptual fingerprint of some pixel content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// DCT-based hash, hex
    pub phash: Option<String>,
    /// Mean-intensity hash, hex
    pub ahash: Option<String>,
    /// Horizontal gradient hash, hex
    pub dhash: Option<String>,
    /// Haar wavelet hash, hex
    pub whash: Option<String>,
    /// Mean grayscale intensity in 0..=1
    pub brightness_mean: Option<f64>,
    /// Grayscale histogram folded into 16 buckets
    pub histogram: Option<[u64; 16]>,
}

impl Fingerprint {
    /// The hex hash produced by `kind`, if it was computed
    pub fn hash(&self, kind: HashAlgorithmKind) -> Option<&str> {
        match kind {
            HashAlgorithmKind::Perceptual => self.phash.as_deref(),
            HashAlgorithmKind::Average => self.ahash.as_deref(),
            HashAlgorithmKind::Difference => self.dhash.as_deref(),
            HashAlgorithmKind::Wavelet => self.whash.as_deref(),
        }
    }
}

/// Image-specific metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fingerprint: Fingerprint,
    pub exif: ExifData,
}

/// Video-specific metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Seconds
    pub duration: Option<f64>,
    pub fps: Option<f64>,
    /// Bits per second
    pub bitrate: Option<u64>,
    pub frame_count: Option<u64>,
    /// Degrees, from the stream's rotate tag
    pub rotation: Option<i32>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Fingerprint of the first decoded frame
    pub frame: Option<Fingerprint>,
    /// Why the representative frame could not be fully fingerprinted
    pub frame_error: Option<String>,
}

/// Kind-specific part of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum MediaDetails {
    Image(ImageMetadata),
    Video(VideoMetadata),
    #[default]
    None,
}

/// Everything known about one file after a scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub filename: String,
    /// File name without its extension
    pub stem: String,
    /// Lower-case extension without the dot, empty when absent
    pub extension: String,
    pub size: u64,
    pub mime_type: String,
    /// Hex SHA-256 of the file bytes; absent if the file could not be read
    pub content_hash: Option<String>,
    pub is_image: bool,
    pub is_video: bool,
    pub is_audio: bool,
    pub corrupted: bool,
    pub usable: bool,
    pub read_error: Option<String>,
    pub modified_at: Option<NaiveDateTime>,
    /// Inode change time on Unix, creation time elsewhere
    pub changed_at: Option<NaiveDateTime>,
    pub birth_at: Option<NaiveDateTime>,
    pub inode: Option<u64>,
    /// Best known capture/creation time
    pub created_at: Option<NaiveDateTime>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub details: MediaDetails,
}

impl FileRecord {
    /// A record with only the path-derived fields filled in
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            filename,
            stem,
            extension,
            usable: true,
            ..Default::default()
        }
    }

    /// Set the resolved creation time and the year/month derived from it
    pub fn set_created_at(&mut self, created_at: Option<NaiveDateTime>) {
        self.created_at = created_at;
        self.year = created_at.map(|t| t.year());
        self.month = created_at.map(|t| t.month());
    }

    pub fn image(&self) -> Option<&ImageMetadata> {
        match &self.details {
            MediaDetails::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&VideoMetadata> {
        match &self.details {
            MediaDetails::Video(video) => Some(video),
            _ => None,
        }
    }

    /// Image pixels for images, the representative frame for videos
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match &self.details {
            MediaDetails::Image(image) => Some(&image.fingerprint),
            MediaDetails::Video(video) => video.frame.as_ref(),
            MediaDetails::None => None,
        }
    }

    /// Latitude and longitude, only when both are known
    pub fn gps(&self) -> Option<(f64, f64)> {
        let exif = &self.image()?.exif;
        Some((exif.gps_latitude?, exif.gps_longitude?))
    }

    /// Corrupted but still usable
    pub fn is_degraded(&self) -> bool {
        self.corrupted && self.usable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn from_path_splits_name_parts() {
        let record = FileRecord::from_path(Path::new("/media/trip/IMG_0001.HEIC"));
        assert_eq!(record.filename, "IMG_0001.HEIC");
        assert_eq!(record.stem, "IMG_0001");
        assert_eq!(record.extension, "heic");
        assert!(record.usable);
    }

    #[test]
    fn from_path_without_extension() {
        let record = FileRecord::from_path(Path::new("/media/README"));
        assert_eq!(record.stem, "README");
        assert_eq!(record.extension, "");
    }

    #[test]
    fn created_at_drives_year_and_month() {
        let mut record = FileRecord::from_path(Path::new("/a.jpg"));
        let when = NaiveDate::from_ymd_opt(2021, 7, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        record.set_created_at(Some(when));
        assert_eq!(record.year, Some(2021));
        assert_eq!(record.month, Some(7));

        record.set_created_at(None);
        assert_eq!(record.year, None);
        assert_eq!(record.month, None);
    }

    #[test]
    fn mime_kinds() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/quicktime"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("audio/mpeg"), MediaKind::Audio);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Other);
    }

    #[test]
    fn video_fingerprint_comes_from_frame() {
        let mut record = FileRecord::from_path(Path::new("/clip.mov"));
        record.details = MediaDetails::Video(VideoMetadata {
            frame: Some(Fingerprint {
                phash: Some("ff00".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });

        let hash = record
            .fingerprint()
            .and_then(|f| f.hash(HashAlgorithmKind::Perceptual));
        assert_eq!(hash, Some("ff00"));
    }

    #[test]
    fn gps_requires_both_coordinates() {
        let mut record = FileRecord::from_path(Path::new("/a.jpg"));
        let mut image = ImageMetadata::default();
        image.exif.gps_latitude = Some(38.7);
        record.details = MediaDetails::Image(image.clone());
        assert!(record.gps().is_none());

        image.exif.gps_longitude = Some(-9.1);
        record.details = MediaDetails::Image(image);
        assert_eq!(record.gps(), Some((38.7, -9.1)));
    }
}
