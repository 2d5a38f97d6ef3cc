//! Representative-frame fingerprints for videos.

use super::fingerprint::fingerprint_image;
use super::tools::ToolConfig;
use crate::core::corruption::{classify_decode_error, CorruptionVerdict, Extraction, Severity};
use crate::core::hasher::HasherSet;
use crate::core::record::Fingerprint;
use crate::error::ToolError;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

const FFMPEG: &str = "ffmpeg";

/// Capability that returns the first frame of a video as encoded image bytes
pub trait FrameDecoder: Send + Sync {
    fn first_frame(&self, path: &Path) -> Result<Vec<u8>, ToolError>;
}

/// [`FrameDecoder`] that asks `ffmpeg` for one MJPEG frame on stdout
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameDecoder {
    tools: ToolConfig,
}

impl FfmpegFrameDecoder {
    pub fn new(tools: ToolConfig) -> Self {
        Self { tools }
    }
}

impl FrameDecoder for FfmpegFrameDecoder {
    fn first_frame(&self, path: &Path) -> Result<Vec<u8>, ToolError> {
        let executable = self.tools.locate(FFMPEG)?;

        let output = Command::new(executable)
            .args(["-v", "error", "-ss", "0", "-i"])
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2", "-vcodec", "mjpeg", "pipe:1"])
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: FFMPEG,
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: FFMPEG,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

/// Fingerprints the first frame of a video through a [`FrameDecoder`]
#[derive(Clone, Default)]
pub struct FrameExtractor {
    decoder: Option<Arc<dyn FrameDecoder>>,
    hashers: Arc<HasherSet>,
}

impl FrameExtractor {
    pub fn new(decoder: Option<Arc<dyn FrameDecoder>>, hashers: Arc<HasherSet>) -> Self {
        Self { decoder, hashers }
    }

    pub fn extract(&self, path: &Path) -> Extraction<Fingerprint> {
        let Some(decoder) = &self.decoder else {
            return Extraction::failed(ToolError::NotFound { tool: FFMPEG }.to_string());
        };

        let bytes = match decoder.first_frame(path) {
            Ok(bytes) if bytes.is_empty() => return Extraction::failed("could not extract frame"),
            Ok(bytes) => bytes,
            Err(e) => return Extraction::failed(e.to_string()),
        };

        let mut verdict = CorruptionVerdict::clean();
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => {
                let message = format!("frame decode: {}", e);
                verdict.record(classify_decode_error(&message), message);
                return Extraction::new(None, verdict);
            }
        };

        let report = fingerprint_image(&image, &self.hashers);
        for warning in report.warnings {
            verdict.record(Severity::Soft, warning);
        }

        Extraction::new(Some(report.fingerprint), verdict)
    }
}
