//! Device capability seam
//!
//! Everything the capture session needs from the platform: acquiring a live
//! stream, reading its current frame, and running an encoder over it. A backend
//! implements these three traits; the session never touches a device directly.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lotmedia_core::CaptureError;

/// Which camera to prefer when a device has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera
    Environment,
    /// Front camera
    User,
}

/// What the session asks the device for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

/// Encoder settings passed to [`LiveStream::start_recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderOptions {
    /// Full MIME type including codec parameters, e.g. `video/webm;codecs=vp9`
    pub mime_type: String,
    pub video_bits_per_second: u32,
    /// Interval at which the recorder hands over encoded chunks
    pub timeslice_ms: u64,
}

/// One decoded frame, RGBA8, tightly packed.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
        }
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Platform capability that hands out live streams.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Acquire a stream matching `constraints` as closely as the device allows.
    ///
    /// Fails with [`CaptureError::PermissionDenied`] when the user refused access
    /// and [`CaptureError::DeviceUnavailable`] for every other device problem.
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn LiveStream>, CaptureError>;
}

/// An acquired audio/video stream. Owned by exactly one capture session.
pub trait LiveStream: Send {
    /// Whether a frame can be read right now
    fn is_ready(&self) -> bool;

    fn current_frame(&self) -> Option<VideoFrame>;

    /// Whether the device can record into the given MIME type
    fn supports_recording_format(&self, mime_type: &str) -> bool;

    fn start_recorder(
        &mut self,
        options: &RecorderOptions,
    ) -> Result<Box<dyn StreamRecorder>, CaptureError>;

    /// Release every track held by the stream. Must tolerate repeated calls.
    fn stop(&mut self);
}

/// An encoder running over a live stream.
///
/// Chunks are pulled by the session instead of pushed through callbacks, so the
/// session owns the buffer they land in.
pub trait StreamRecorder: Send {
    /// Chunks produced since the previous call, oldest first.
    fn take_chunks(&mut self) -> Vec<Bytes>;

    /// Stop encoding and return whatever was still buffered by the encoder.
    fn stop(self: Box<Self>) -> Vec<Bytes>;
}
