//! Scan execution: walk, fan out per-file work, assemble, emit.

use super::cancel::CancellationToken;
use super::pool::WorkerPool;
use crate::core::classifier::{classify, has_image_extension, Classification};
use crate::core::corruption::Extraction;
use crate::core::hasher::{HasherSet, DEFAULT_HASH_SIZE};
use crate::core::identity::content_hash;
use crate::core::inspector::{inspect, FsAttributes};
use crate::core::metadata::{
    FfmpegFrameDecoder, FfprobeProber, FrameDecoder, FrameExtractor, ImageExtractor,
    StreamProber, VideoExtractor,
};
use crate::core::record::{FileRecord, Fingerprint, ImageMetadata, MediaDetails, MediaKind, VideoMetadata};
use crate::core::scanner::{FileSource, FileWalker, ScanConfig, WalkEntry};
use crate::core::store::RecordSink;
use crate::error::{HashError, ScanError};
use crate::events::{null_sender, EventSender, ScanEvent, ScanProgress, ScanSummary};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Completed,
    Cancelled,
}

/// A directory entry the walk could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    /// Counts of records handed to the sink
    pub summary: ScanSummary,
    pub walk_errors: Vec<WalkIssue>,
}

impl ScanOutcome {
    pub fn files_processed(&self) -> usize {
        self.summary.files_processed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ScanStatus::Cancelled
    }
}

/// What the kind-specific sub-tasks produced for one file
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedMedia {
    Image(Extraction<ImageMetadata>),
    Video {
        stream: Extraction<VideoMetadata>,
        frame: Extraction<Fingerprint>,
    },
    None,
}

/// Builder for [`Scanner`]
pub struct ScannerBuilder<'a> {
    pool: &'a WorkerPool,
    config: ScanConfig,
    source: Option<Box<dyn FileSource>>,
    prober: Option<Option<Arc<dyn StreamProber>>>,
    decoder: Option<Option<Arc<dyn FrameDecoder>>>,
    hash_size: u32,
}

impl<'a> ScannerBuilder<'a> {
    fn new(pool: &'a WorkerPool) -> Self {
        Self {
            pool,
            config: ScanConfig::default(),
            source: None,
            prober: None,
            decoder: None,
            hash_size: DEFAULT_HASH_SIZE,
        }
    }

    /// Set scanner configuration
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Discover files from somewhere other than a [`FileWalker`]
    pub fn source(mut self, source: Box<dyn FileSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the default `ffprobe` stream prober
    pub fn prober(mut self, prober: Arc<dyn StreamProber>) -> Self {
        self.prober = Some(Some(prober));
        self
    }

    /// Scan without any stream prober; videos then come out unusable
    pub fn without_prober(mut self) -> Self {
        self.prober = Some(None);
        self
    }

    /// Replace the default `ffmpeg` frame decoder
    pub fn frame_decoder(mut self, decoder: Arc<dyn FrameDecoder>) -> Self {
        self.decoder = Some(Some(decoder));
        self
    }

    /// Scan without a frame decoder; videos then carry no frame fingerprint
    pub fn without_frame_decoder(mut self) -> Self {
        self.decoder = Some(None);
        self
    }

    /// Perceptual hash grid size
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    pub fn build(self) -> Scanner<'a> {
        let tools = self.config.tools.clone();
        let hashers = Arc::new(HasherSet::new(self.hash_size));

        let prober = self
            .prober
            .unwrap_or_else(|| Some(Arc::new(FfprobeProber::new(tools.clone()))));
        let decoder = self
            .decoder
            .unwrap_or_else(|| Some(Arc::new(FfmpegFrameDecoder::new(tools))));
        let source = self
            .source
            .unwrap_or_else(|| Box::new(FileWalker::new(self.config.clone())));

        Scanner {
            pool: self.pool,
            source,
            images: ImageExtractor::new(Arc::clone(&hashers)),
            videos: VideoExtractor::new(prober),
            frames: FrameExtractor::new(decoder, hashers),
        }
    }
}

/// Walks a tree and turns every file into a [`FileRecord`]
pub struct Scanner<'a> {
    pool: &'a WorkerPool,
    source: Box<dyn FileSource>,
    images: ImageExtractor,
    videos: VideoExtractor,
    frames: FrameExtractor,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner builder over a caller-owned pool
    pub fn builder(pool: &'a WorkerPool) -> ScannerBuilder<'a> {
        ScannerBuilder::new(pool)
    }

    /// Scan without events
    pub fn scan(
        &self,
        root: &Path,
        sink: &mut dyn RecordSink,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        self.scan_with_events(root, sink, cancel, &null_sender())
    }

    /// Scan with event reporting.
    ///
    /// Per-file problems end up on the records. Only an invalid root or a
    /// failing sink stops the scan with an error.
    pub fn scan_with_events(
        &self,
        root: &Path,
        sink: &mut dyn RecordSink,
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> Result<ScanOutcome, ScanError> {
        let start_time = Instant::now();
        let entries = self.source.walk(root)?;

        info!(root = %root.display(), workers = self.pool.workers(), "scan started");
        events.send(ScanEvent::Started {
            root: root.to_path_buf(),
        });

        let mut summary = ScanSummary::default();
        let mut walk_errors = Vec::new();
        let mut status = ScanStatus::Completed;

        for entry in entries {
            if cancel.is_cancelled() {
                status = ScanStatus::Cancelled;
                break;
            }

            let path = match entry {
                WalkEntry::File(path) => path,
                WalkEntry::Error { path, message } => {
                    warn!(path = %path.display(), %message, "skipping unreadable entry");
                    events.send(ScanEvent::WalkError {
                        path: path.clone(),
                        message: message.clone(),
                    });
                    walk_errors.push(WalkIssue { path, message });
                    continue;
                }
            };

            let record = self.process_file(&path);
            sink.accept(&record)?;

            summary.files_processed += 1;
            summary.images += record.is_image as usize;
            summary.videos += record.is_video as usize;
            summary.corrupted += record.corrupted as usize;
            summary.unusable += !record.usable as usize;

            events.send(ScanEvent::Progress(ScanProgress {
                files_processed: summary.files_processed,
                current_path: path,
                corrupted: record.corrupted,
                usable: record.usable,
            }));
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        match status {
            ScanStatus::Completed => {
                info!(
                    files = summary.files_processed,
                    corrupted = summary.corrupted,
                    duration_ms = summary.duration_ms,
                    "scan completed"
                );
                events.send(ScanEvent::Completed(summary.clone()));
            }
            ScanStatus::Cancelled => {
                info!(files = summary.files_processed, "scan cancelled");
                events.send(ScanEvent::Cancelled {
                    files_processed: summary.files_processed,
                });
            }
        }

        Ok(ScanOutcome {
            status,
            summary,
            walk_errors,
        })
    }

    /// Build the record for one file.
    ///
    /// The content hash runs alongside classification and extraction; a
    /// video's stream probe runs alongside its frame fingerprint.
    pub fn process_file(&self, path: &Path) -> FileRecord {
        let attributes = inspect(path);

        let (hash, (classification, media)) = self.pool.join(
            || content_hash(path),
            || {
                let classification = classify(path);
                let media = self.extract(path, &classification);
                (classification, media)
            },
        );

        let record = assemble_record(path, attributes, hash, &classification, media);
        debug!(
            path = %path.display(),
            mime = %record.mime_type,
            corrupted = record.corrupted,
            usable = record.usable,
            "file processed"
        );
        record
    }

    fn extract(&self, path: &Path, classification: &Classification) -> ExtractedMedia {
        if classification.kind == MediaKind::Image || has_image_extension(path) {
            ExtractedMedia::Image(self.images.extract(path))
        } else if classification.kind == MediaKind::Video {
            let (stream, frame) =
                rayon::join(|| self.videos.extract(path), || self.frames.extract(path));
            ExtractedMedia::Video { stream, frame }
        } else {
            ExtractedMedia::None
        }
    }
}

/// Combine sub-task results into a record
pub fn assemble_record(
    path: &Path,
    attributes: io::Result<FsAttributes>,
    hash: Result<String, HashError>,
    classification: &Classification,
    media: ExtractedMedia,
) -> FileRecord {
    let mut record = FileRecord::from_path(path);
    record.mime_type = classification.mime_type.clone();
    record.is_video = classification.kind == MediaKind::Video;
    record.is_audio = classification.kind == MediaKind::Audio;

    let mut fallback_error = None;

    match attributes {
        Ok(attributes) => {
            record.size = attributes.size;
            record.modified_at = attributes.modified;
            record.changed_at = attributes.changed;
            record.birth_at = attributes.birth;
            record.inode = attributes.inode;
        }
        Err(e) => fallback_error = Some(format!("stat: {}", e)),
    }

    match hash {
        Ok(hash) => record.content_hash = Some(hash),
        Err(e) => {
            fallback_error.get_or_insert_with(|| e.to_string());
        }
    }

    let mut captured_at = None;
    let verdict = match media {
        ExtractedMedia::Image(extraction) => {
            record.is_image = true;
            if let Some(image) = extraction.metadata {
                captured_at = image.exif.captured_at;
                record.details = MediaDetails::Image(image);
            }
            Some(extraction.verdict)
        }
        ExtractedMedia::Video { stream, frame } => {
            let mut video = stream.metadata.unwrap_or_default();
            video.frame = frame.metadata;
            video.frame_error = frame.verdict.error;
            record.details = MediaDetails::Video(video);
            Some(stream.verdict)
        }
        ExtractedMedia::None => None,
    };

    if let Some(verdict) = verdict {
        record.corrupted = verdict.corrupted;
        record.usable = verdict.usable;
        record.read_error = verdict.error;
    }
    if record.read_error.is_none() {
        record.read_error = fallback_error;
    }

    record.set_created_at(resolve_created(
        captured_at,
        record.birth_at,
        record.changed_at,
    ));
    record
}

/// Capture time first, then birth time, then change time
pub fn resolve_created(
    captured: Option<NaiveDateTime>,
    birth: Option<NaiveDateTime>,
    changed: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    captured.or(birth).or(changed)
}
