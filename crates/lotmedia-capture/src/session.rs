//! Capture session state machine
//!
//! ```text
//! Closed -> Opening -> Ready | Error
//! Ready  -> capture_photo   -> Closed   (photo emitted)
//! Ready  -> start_recording -> Recording
//! Recording -> stop_recording -> Closed (video emitted)
//! ```
//!
//! Actions whose preconditions do not hold are silent no-ops: they log at debug
//! level and report nothing was done (`None` / `false`). `Error` is terminal for
//! the current open; `close()` followed by `open()` starts over.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use lotmedia_core::{CaptureConfig, CaptureError, ErrorMetadata, MediaFile};
use tracing::{debug, info, warn};

use crate::device::{
    FacingMode, LiveStream, MediaDevices, RecorderOptions, StreamConstraints, StreamRecorder,
};
use crate::recording::{RecordingBuffer, RecordingFormat};
use crate::still::encode_jpeg;

/// What a session may produce. Fixed when the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    PhotoOnly,
    VideoOnly,
    #[default]
    Both,
}

impl CaptureMode {
    pub fn allows_photo(&self) -> bool {
        matches!(self, CaptureMode::PhotoOnly | CaptureMode::Both)
    }

    pub fn allows_video(&self) -> bool {
        matches!(self, CaptureMode::VideoOnly | CaptureMode::Both)
    }

    /// Audio is requested unless the session can only take stills.
    pub fn wants_audio(&self) -> bool {
        !matches!(self, CaptureMode::PhotoOnly)
    }
}

impl Display for CaptureMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CaptureMode::PhotoOnly => write!(f, "photo"),
            CaptureMode::VideoOnly => write!(f, "video"),
            CaptureMode::Both => write!(f, "both"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    /// Stream acquisition in flight. Observable only if an `open()` future was dropped.
    Opening,
    Ready,
    Recording,
    Error(CaptureError),
}

struct ActiveRecording {
    recorder: Box<dyn StreamRecorder>,
    buffer: RecordingBuffer,
}

/// Owns at most one live stream and emits at most one file per open.
pub struct CaptureSession {
    devices: Arc<dyn MediaDevices>,
    mode: CaptureMode,
    config: CaptureConfig,
    state: SessionState,
    stream: Option<Box<dyn LiveStream>>,
    recording: Option<ActiveRecording>,
}

impl CaptureSession {
    pub fn new(devices: Arc<dyn MediaDevices>, mode: CaptureMode) -> Self {
        Self::with_config(devices, mode, CaptureConfig::default())
    }

    pub fn with_config(
        devices: Arc<dyn MediaDevices>,
        mode: CaptureMode,
        config: CaptureConfig,
    ) -> Self {
        Self {
            devices,
            mode,
            config,
            state: SessionState::Closed,
            stream: None,
            recording: None,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match &self.state {
            SessionState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Message to show in place of the live preview.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.user_message())
    }

    /// Whether the "take photo" action is currently enabled.
    pub fn can_capture_photo(&self) -> bool {
        self.mode.allows_photo() && self.state == SessionState::Ready && self.stream_ready()
    }

    /// Whether the "record" action is currently enabled.
    pub fn can_start_recording(&self) -> bool {
        self.mode.allows_video() && self.state == SessionState::Ready && self.stream_ready()
    }

    /// Bytes buffered by the current recording, if one is running.
    pub fn buffered_bytes(&self) -> usize {
        self.recording.as_ref().map_or(0, |r| r.buffer.len())
    }

    fn stream_ready(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_ready())
    }

    fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            facing: FacingMode::Environment,
            ideal_width: self.config.ideal_width,
            ideal_height: self.config.ideal_height,
            audio: self.mode.wants_audio(),
        }
    }

    /// Acquire the camera stream.
    ///
    /// Any stream already held is released first. On failure the session moves to
    /// `Error` and the error is also returned.
    pub async fn open(&mut self) -> Result<(), CaptureError> {
        if let Some(file) = self.close() {
            warn!(
                file_name = %file.name,
                size = file.size(),
                "Recording finalized by reopen was discarded"
            );
        }

        self.state = SessionState::Opening;
        let constraints = self.constraints();
        debug!(
            mode = %self.mode,
            width = constraints.ideal_width,
            height = constraints.ideal_height,
            audio = constraints.audio,
            "Requesting camera stream"
        );

        match self.devices.acquire(&constraints).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Ready;
                info!(mode = %self.mode, "Camera stream ready");
                Ok(())
            }
            Err(err) => {
                warn!(
                    error = %err,
                    code = err.error_code(),
                    "Camera stream unavailable"
                );
                self.state = SessionState::Error(err.clone());
                Err(err)
            }
        }
    }

    /// Release the stream and every device handle.
    ///
    /// A recording in progress is finalized first and returned. Safe to call any
    /// number of times.
    pub fn close(&mut self) -> Option<MediaFile> {
        let finalized = self.finish_recording();

        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
        self.state = SessionState::Closed;

        finalized
    }

    /// Snapshot the current frame as a JPEG and close the session.
    pub fn capture_photo(&mut self) -> Option<MediaFile> {
        if !self.mode.allows_photo() {
            debug!(mode = %self.mode, "Photo capture not available in this mode");
            return None;
        }
        if self.state != SessionState::Ready {
            debug!(state = ?self.state, "Photo capture ignored");
            return None;
        }

        let frame = match self.stream.as_ref() {
            Some(stream) if stream.is_ready() => stream.current_frame()?,
            _ => {
                debug!("Photo capture ignored, stream not ready");
                return None;
            }
        };

        let jpeg = match encode_jpeg(&frame, self.config.jpeg_quality) {
            Ok(jpeg) => jpeg,
            Err(err) => {
                warn!(error = %err, "Photo capture produced no image");
                return None;
            }
        };

        let file = MediaFile::new(format!("{}.jpg", capture_stem()), "image/jpeg", jpeg);
        info!(
            file_name = %file.name,
            size = file.size(),
            width = frame.width,
            height = frame.height,
            "Photo captured"
        );

        self.close();
        Some(file)
    }

    /// Start buffering encoded media. Returns whether recording started.
    pub fn start_recording(&mut self) -> bool {
        if !self.mode.allows_video() {
            debug!(mode = %self.mode, "Recording not available in this mode");
            return false;
        }
        if self.state != SessionState::Ready {
            debug!(state = ?self.state, "Recording start ignored");
            return false;
        }

        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        if !stream.is_ready() {
            debug!("Recording start ignored, stream not ready");
            return false;
        }

        let format = RecordingFormat::select(&**stream);
        let options = RecorderOptions {
            mime_type: format.recorder_mime().to_string(),
            video_bits_per_second: self.config.video_bits_per_second,
            timeslice_ms: self.config.timeslice_ms,
        };

        match stream.start_recorder(&options) {
            Ok(recorder) => {
                info!(mime_type = %options.mime_type, "Recording started");
                self.recording = Some(ActiveRecording {
                    recorder,
                    buffer: RecordingBuffer::new(format),
                });
                self.state = SessionState::Recording;
                true
            }
            Err(err) => {
                warn!(error = %err, mime_type = %options.mime_type, "Recorder failed to start");
                false
            }
        }
    }

    /// Move chunks delivered by the recorder into the session buffer.
    ///
    /// Returns the number of buffered bytes afterwards.
    pub fn pump(&mut self) -> usize {
        match self.recording.as_mut() {
            Some(active) => {
                let chunks = active.recorder.take_chunks();
                active.buffer.extend(chunks);
                active.buffer.len()
            }
            None => 0,
        }
    }

    /// Finalize the recording into one video file and close the session.
    pub fn stop_recording(&mut self) -> Option<MediaFile> {
        if self.state != SessionState::Recording {
            debug!(state = ?self.state, "Recording stop ignored");
            return None;
        }
        self.close()
    }

    fn finish_recording(&mut self) -> Option<MediaFile> {
        let ActiveRecording {
            mut recorder,
            mut buffer,
        } = self.recording.take()?;

        buffer.extend(recorder.take_chunks());
        buffer.extend(recorder.stop());

        let chunks = buffer.chunk_count();
        let file = buffer.finalize(&capture_stem());
        info!(
            file_name = %file.name,
            size = file.size(),
            chunks,
            "Recording finalized"
        );
        Some(file)
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(active) = self.recording.take() {
            warn!(
                buffered = active.buffer.len(),
                "Capture session dropped while recording, recording discarded"
            );
            drop(active.recorder.stop());
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

/// Unique file stem for a capture: `capture-<unix millis>`.
fn capture_stem() -> String {
    format!("capture-{}", chrono::Utc::now().timestamp_millis())
}
