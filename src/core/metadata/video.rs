//! Video stream metadata via a probe capability.
//!
//! The default prober runs `ffprobe` and parses its JSON report. Any
//! other [`StreamProber`] can be plugged in, which is how tests run
//! without ffmpeg installed.

use super::tools::ToolConfig;
use crate::core::corruption::{CorruptionVerdict, Extraction, Severity};
use crate::core::record::VideoMetadata;
use crate::error::ToolError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

const FFPROBE: &str = "ffprobe";

/// Container-level section of a probe report
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeFormat {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeSideData {
    pub rotation: Option<f64>,
}

/// One stream of a probe report
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r_frame_rate: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub nb_frames: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub side_data_list: Vec<ProbeSideData>,
}

/// Parsed output of a stream probe, shaped like `ffprobe -print_format json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

impl ProbeReport {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }
}

/// Capability that reports the streams of a media file
pub trait StreamProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ToolError>;
}

/// [`StreamProber`] backed by the `ffprobe` executable
#[derive(Debug, Clone, Default)]
pub struct FfprobeProber {
    tools: ToolConfig,
}

impl FfprobeProber {
    pub fn new(tools: ToolConfig) -> Self {
        Self { tools }
    }
}

impl StreamProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ToolError> {
        let executable = self.tools.locate(FFPROBE)?;

        let output = Command::new(executable)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: FFPROBE,
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: FFPROBE,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        ProbeReport::from_json(&output.stdout).map_err(|e| ToolError::InvalidOutput {
            tool: FFPROBE,
            reason: e.to_string(),
        })
    }
}

/// Extracts [`VideoMetadata`] through a [`StreamProber`]
#[derive(Clone, Default)]
pub struct VideoExtractor {
    prober: Option<Arc<dyn StreamProber>>,
}

impl VideoExtractor {
    pub fn new(prober: Option<Arc<dyn StreamProber>>) -> Self {
        Self { prober }
    }

    pub fn extract(&self, path: &Path) -> Extraction<VideoMetadata> {
        let Some(prober) = &self.prober else {
            return Extraction::failed(ToolError::NotFound { tool: FFPROBE }.to_string());
        };

        match prober.probe(path) {
            Ok(report) => interpret_probe(&report),
            Err(e) => Extraction::failed(e.to_string()),
        }
    }
}

/// Turn a probe report into metadata and a verdict.
///
/// A report without a video stream is hard but keeps whatever the
/// container and audio stream revealed.
pub fn interpret_probe(report: &ProbeReport) -> Extraction<VideoMetadata> {
    let mut verdict = CorruptionVerdict::clean();
    let mut metadata = VideoMetadata {
        duration: report.format.duration.as_deref().and_then(parse_number),
        bitrate: report.format.bit_rate.as_deref().and_then(parse_integer),
        audio_codec: report
            .first_stream("audio")
            .and_then(|s| s.codec_name.clone()),
        ..Default::default()
    };

    let Some(stream) = report.first_stream("video") else {
        verdict.record(Severity::Hard, "no video stream");
        return Extraction::new(Some(metadata), verdict);
    };

    metadata.video_codec = stream.codec_name.clone();
    metadata.width = stream.width;
    metadata.height = stream.height;
    metadata.fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_frame_rate));
    metadata.frame_count = stream.nb_frames.as_deref().and_then(parse_integer);
    metadata.rotation = stream
        .tags
        .get("rotate")
        .and_then(|r| r.trim().parse::<i32>().ok())
        .or_else(|| {
            stream
                .side_data_list
                .iter()
                .find_map(|s| s.rotation)
                .map(|r| r.round() as i32)
        });

    if metadata.frame_count.unwrap_or(0) == 0 {
        verdict.record(Severity::Soft, "incomplete video stream");
    }

    Extraction::new(Some(metadata), verdict)
}

/// "num/den" to frames per second; undefined when the denominator is zero
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;

    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_integer(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}
