//! # Metadata Module
//!
//! Per-kind extractors. Each returns metadata together with a
//! [`CorruptionVerdict`](crate::core::corruption::CorruptionVerdict).
//!
//! - [`ImageExtractor`] - verify, decode, perceptual hashes, tone, EXIF
//! - [`VideoExtractor`] - stream facts from a [`StreamProber`]
//! - [`FrameExtractor`] - first-frame fingerprint from a [`FrameDecoder`]
//!
//! The probe and frame capabilities default to `ffprobe` and `ffmpeg`,
//! located through [`ToolConfig`].

mod exif;
mod fingerprint;
mod frame;
mod raster;
mod tone;
mod tools;
mod video;

pub use self::exif::{dms_to_decimal, parse_exif_datetime, read_exif, ExifData, ExifReport};
pub use fingerprint::{fingerprint_image, FingerprintReport};
pub use frame::{FfmpegFrameDecoder, FrameDecoder, FrameExtractor};
pub use raster::ImageExtractor;
pub use tone::{measure_tone, Tone, HISTOGRAM_BUCKETS};
pub use tools::ToolConfig;
pub use video::{
    interpret_probe, parse_frame_rate, FfprobeProber, ProbeFormat, ProbeReport, ProbeSideData,
    ProbeStream, StreamProber, VideoExtractor,
};
