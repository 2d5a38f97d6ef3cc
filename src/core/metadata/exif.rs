//! EXIF extraction.
//!
//! ## Extracted Fields
//! - Capture date/time (DateTimeOriginal, falling back to DateTime)
//! - Camera and lens model
//! - Orientation, ISO, f-number, exposure time, focal length
//! - GPS position, converted from degrees/minutes/seconds
//!
//! EXIF is read from JPEG, TIFF, PNG and WebP containers.

use chrono::NaiveDateTime;
use exif::{Field, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// EXIF fields of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    /// Capture time, camera local time
    pub captured_at: Option<NaiveDateTime>,
    pub camera_model: Option<String>,
    pub lens_model: Option<String>,
    /// 1-8, where 1 is normal
    pub orientation: Option<u16>,
    pub iso: Option<u32>,
    pub f_number: Option<f64>,
    /// Seconds
    pub exposure_time: Option<f64>,
    /// Millimetres
    pub focal_length: Option<f64>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

impl ExifData {
    /// Check if any field was extracted
    pub fn has_data(&self) -> bool {
        *self != ExifData::default()
    }
}

/// Fields read plus the first problem met while reading them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifReport {
    pub data: ExifData,
    /// A malformed container or an unparseable field
    pub warning: Option<String>,
}

/// Read EXIF from a file.
///
/// A file without EXIF yields empty data and no warning.
pub fn read_exif(path: &Path) -> ExifReport {
    let mut report = ExifReport::default();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            report.warning = Some(format!("exif: {}", e));
            return report;
        }
    };

    let mut bufreader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(r) => r,
        Err(exif::Error::NotFound(_)) => return report,
        Err(e) => {
            report.warning = Some(format!("exif: {}", e));
            return report;
        }
    };

    let field = |tag| exif.get_field(tag, In::PRIMARY);
    let data = &mut report.data;

    let raw_date = field(Tag::DateTimeOriginal)
        .and_then(|f| get_string_value(&f.value))
        .or_else(|| field(Tag::DateTime).and_then(|f| get_string_value(&f.value)));
    if let Some(raw) = raw_date {
        match parse_exif_datetime(&raw) {
            Some(when) => data.captured_at = Some(when),
            None => report.warning = Some(format!("exif: unparseable capture date '{}'", raw)),
        }
    }

    data.camera_model = field(Tag::Model).and_then(|f| get_string_value(&f.value));
    data.lens_model = field(Tag::LensModel).and_then(|f| get_string_value(&f.value));
    data.orientation = field(Tag::Orientation).and_then(|f| match f.value {
        Value::Short(ref vec) => vec.first().copied(),
        _ => None,
    });
    data.iso = field(Tag::PhotographicSensitivity).and_then(|f| get_u32_value(&f.value));
    data.f_number = field(Tag::FNumber).and_then(|f| get_f64_value(&f.value));
    data.exposure_time = field(Tag::ExposureTime).and_then(|f| get_f64_value(&f.value));
    data.focal_length = field(Tag::FocalLength).and_then(|f| get_f64_value(&f.value));

    let position = gps_position(
        (field(Tag::GPSLatitude), field(Tag::GPSLatitudeRef)),
        (field(Tag::GPSLongitude), field(Tag::GPSLongitudeRef)),
    );
    match position {
        Ok(Some((lat, lon))) => {
            data.gps_latitude = Some(lat);
            data.gps_longitude = Some(lon);
        }
        Ok(None) => {}
        Err(message) => {
            report.warning.get_or_insert(message);
        }
    }

    report
}

/// Parse "YYYY:MM:DD HH:MM:SS", tolerating trailing NULs and spaces
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATE_FORMAT).ok()
}

/// Degrees/minutes/seconds to signed decimal degrees.
///
/// References `S` and `W` make the result negative.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: &str) -> f64 {
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    if hemisphere_is_negative(reference) {
        -value
    } else {
        value
    }
}

fn hemisphere_is_negative(reference: &str) -> bool {
    matches!(reference.trim().chars().next(), Some('S' | 's' | 'W' | 'w'))
}

type GpsFields<'a> = (Option<&'a Field>, Option<&'a Field>);

/// Signed latitude and longitude.
///
/// Both axes need a value and a hemisphere reference, otherwise there is no
/// position. A value or reference of the wrong shape is an error.
fn gps_position(
    latitude: GpsFields<'_>,
    longitude: GpsFields<'_>,
) -> Result<Option<(f64, f64)>, String> {
    let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) =
        (latitude.0, latitude.1, longitude.0, longitude.1)
    else {
        return Ok(None);
    };

    let lat = gps_coordinate(lat, lat_ref)?;
    let lon = gps_coordinate(lon, lon_ref)?;
    Ok(Some((lat, lon)))
}

fn gps_coordinate(value: &Field, reference: &Field) -> Result<f64, String> {
    let parts = match value.value {
        Value::Rational(ref vec) if vec.len() >= 3 => {
            [vec[0].to_f64(), vec[1].to_f64(), vec[2].to_f64()]
        }
        _ => return Err(format!("exif: malformed {}", value.tag)),
    };

    if parts.iter().any(|p| !p.is_finite()) {
        return Err(format!("exif: malformed {}", value.tag));
    }

    let reference = get_string_value(&reference.value)
        .filter(|r| {
            matches!(
                r.chars().next(),
                Some('N' | 'n' | 'S' | 's' | 'E' | 'e' | 'W' | 'w')
            )
        })
        .ok_or_else(|| format!("exif: malformed {}", reference.tag))?;

    Ok(dms_to_decimal(parts[0], parts[1], parts[2], &reference))
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

fn get_f64_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Rational(vec) => vec.first().map(|r| r.to_f64()),
        Value::SRational(vec) => vec.first().map(|r| r.to_f64()),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
