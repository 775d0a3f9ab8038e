//! File-backed virtual camera
//!
//! Serves a still image as the live frame and "records" by replaying a
//! pre-recorded WebM file in fixed-size chunks. Lets the capture session run
//! headless, from the CLI or from tests, without a physical device.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use lotmedia_core::models::mime_from_extension;
use lotmedia_core::CaptureError;
use tracing::{debug, info};

use crate::device::{
    LiveStream, MediaDevices, RecorderOptions, StreamConstraints, StreamRecorder, VideoFrame,
};
use crate::recording::BASELINE_RECORDING_MIME;

/// Size of each chunk handed over by the file recorder.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Virtual [`MediaDevices`] backed by files on disk.
#[derive(Debug, Clone)]
pub struct FileSourceDevices {
    image_path: Option<PathBuf>,
    video_path: Option<PathBuf>,
    chunk_size: usize,
}

impl Default for FileSourceDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSourceDevices {
    pub fn new() -> Self {
        Self {
            image_path: None,
            video_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Image decoded once at acquisition and served as every frame.
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// WebM file replayed when a recording is started.
    pub fn with_video(mut self, path: impl Into<PathBuf>) -> Self {
        self.video_path = Some(path.into());
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn load_frame(
        &self,
        path: &Path,
        constraints: &StreamConstraints,
    ) -> Result<VideoFrame, CaptureError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| source_error(path, e))?;
        let mut img = image::load_from_memory(&bytes).map_err(|e| {
            CaptureError::DeviceUnavailable(format!(
                "Failed to decode image '{}': {}",
                path.display(),
                e
            ))
        })?;

        if img.width() > constraints.ideal_width || img.height() > constraints.ideal_height {
            img = img.resize(
                constraints.ideal_width,
                constraints.ideal_height,
                FilterType::Triangle,
            );
        }

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        info!(path = %path.display(), width, height, "Image source loaded");

        Ok(VideoFrame::new(width, height, rgba.into_raw()))
    }

    async fn load_video(&self, path: &Path) -> Result<Bytes, CaptureError> {
        let mime_type = mime_from_extension(path);
        if mime_type != Some(BASELINE_RECORDING_MIME) {
            return Err(CaptureError::DeviceUnavailable(format!(
                "Unsupported video source '{}': only WebM can be replayed",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| source_error(path, e))?;
        info!(path = %path.display(), size = bytes.len(), "Video source loaded");

        Ok(Bytes::from(bytes))
    }
}

fn source_error(path: &Path, err: io::Error) -> CaptureError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied(format!(
            "Cannot read '{}': {}",
            path.display(),
            err
        )),
        _ => CaptureError::DeviceUnavailable(format!(
            "Cannot read '{}': {}",
            path.display(),
            err
        )),
    }
}

#[async_trait]
impl MediaDevices for FileSourceDevices {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn LiveStream>, CaptureError> {
        if self.image_path.is_none() && self.video_path.is_none() {
            return Err(CaptureError::DeviceUnavailable(
                "No image or video source configured".to_string(),
            ));
        }
        if constraints.audio {
            debug!("Audio requested; file sources carry no separate audio track");
        }

        let frame = match &self.image_path {
            Some(path) => Some(self.load_frame(path, constraints).await?),
            None => None,
        };
        let video = match &self.video_path {
            Some(path) => Some(self.load_video(path).await?),
            None => None,
        };

        Ok(Box::new(FileStream {
            frame,
            video,
            chunk_size: self.chunk_size,
            stopped: false,
        }))
    }
}

struct FileStream {
    frame: Option<VideoFrame>,
    video: Option<Bytes>,
    chunk_size: usize,
    stopped: bool,
}

impl LiveStream for FileStream {
    fn is_ready(&self) -> bool {
        !self.stopped
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if self.stopped {
            return None;
        }
        self.frame.clone()
    }

    fn supports_recording_format(&self, mime_type: &str) -> bool {
        self.video.is_some() && mime_type == BASELINE_RECORDING_MIME
    }

    fn start_recorder(
        &mut self,
        options: &RecorderOptions,
    ) -> Result<Box<dyn StreamRecorder>, CaptureError> {
        if self.stopped {
            return Err(CaptureError::DeviceUnavailable(
                "Stream already stopped".to_string(),
            ));
        }
        let video = match &self.video {
            Some(video) if options.mime_type == BASELINE_RECORDING_MIME => video.clone(),
            Some(_) => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "Recording format {} not supported by file source",
                    options.mime_type
                )))
            }
            None => {
                return Err(CaptureError::DeviceUnavailable(
                    "No video source configured".to_string(),
                ))
            }
        };

        debug!(
            size = video.len(),
            chunk_size = self.chunk_size,
            "Replaying video source"
        );
        Ok(Box::new(FileRecorder {
            remaining: video,
            chunk_size: self.chunk_size,
        }))
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.frame = None;
    }
}

/// Hands out one chunk per pull; the remainder is flushed on stop.
struct FileRecorder {
    remaining: Bytes,
    chunk_size: usize,
}

impl StreamRecorder for FileRecorder {
    fn take_chunks(&mut self) -> Vec<Bytes> {
        if self.remaining.is_empty() {
            return Vec::new();
        }
        let at = self.chunk_size.min(self.remaining.len());
        vec![self.remaining.split_to(at)]
    }

    fn stop(mut self: Box<Self>) -> Vec<Bytes> {
        let mut chunks = Vec::new();
        while !self.remaining.is_empty() {
            let at = self.chunk_size.min(self.remaining.len());
            chunks.push(self.remaining.split_to(at));
        }
        chunks
    }
}
