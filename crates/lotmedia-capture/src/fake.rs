//! In-memory device double for tests
//!
//! Scripts acquisition failures, stream readiness, supported recording formats and
//! recorder output, and counts acquisitions and releases so tests can assert the
//! session never leaks a stream.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use lotmedia_core::CaptureError;

use crate::device::{
    LiveStream, MediaDevices, RecorderOptions, StreamConstraints, StreamRecorder, VideoFrame,
};
use crate::recording::{BASELINE_RECORDING_MIME, PREFERRED_RECORDING_MIME};

#[derive(Default)]
struct FakeState {
    failure: Option<CaptureError>,
    recorder_failure: Option<CaptureError>,
    not_ready: bool,
    frame: Option<VideoFrame>,
    supported_formats: Vec<String>,
    chunks: Vec<Bytes>,
    final_chunks: Vec<Bytes>,
    acquisitions: usize,
    active_streams: usize,
    stop_calls: usize,
    last_constraints: Option<StreamConstraints>,
    last_recorder_options: Option<RecorderOptions>,
}

/// Fake [`MediaDevices`]. Clones share state.
#[derive(Clone)]
pub struct FakeDevices {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDevices {
    /// A working camera: ready stream, 4x4 grey frame, VP9 and WebM recording.
    pub fn new() -> Self {
        let state = FakeState {
            frame: Some(VideoFrame::new(4, 4, vec![0x80u8; 4 * 4 * 4])),
            supported_formats: vec![
                PREFERRED_RECORDING_MIME.to_string(),
                BASELINE_RECORDING_MIME.to_string(),
            ],
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn deny_permission(self) -> Self {
        self.set_failure(Some(CaptureError::PermissionDenied(
            "Permission denied by user".to_string(),
        )));
        self
    }

    pub fn unavailable(self) -> Self {
        self.set_failure(Some(CaptureError::DeviceUnavailable(
            "Requested device not found".to_string(),
        )));
        self
    }

    pub fn not_ready(self) -> Self {
        self.state.lock().unwrap().not_ready = true;
        self
    }

    pub fn without_frame(self) -> Self {
        self.state.lock().unwrap().frame = None;
        self
    }

    pub fn with_frame(self, frame: VideoFrame) -> Self {
        self.state.lock().unwrap().frame = Some(frame);
        self
    }

    pub fn supporting(self, formats: &[&str]) -> Self {
        self.state.lock().unwrap().supported_formats =
            formats.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Chunks handed over on the first `take_chunks` call.
    pub fn with_chunks(self, chunks: Vec<Bytes>) -> Self {
        self.state.lock().unwrap().chunks = chunks;
        self
    }

    /// Chunks flushed when the recorder stops.
    pub fn with_final_chunks(self, chunks: Vec<Bytes>) -> Self {
        self.state.lock().unwrap().final_chunks = chunks;
        self
    }

    pub fn failing_recorder(self) -> Self {
        self.state.lock().unwrap().recorder_failure = Some(CaptureError::DeviceUnavailable(
            "MediaRecorder unsupported".to_string(),
        ));
        self
    }

    pub fn set_failure(&self, failure: Option<CaptureError>) {
        self.state.lock().unwrap().failure = failure;
    }

    pub fn acquisitions(&self) -> usize {
        self.state.lock().unwrap().acquisitions
    }

    /// Streams acquired and not yet stopped.
    pub fn active_streams(&self) -> usize {
        self.state.lock().unwrap().active_streams
    }

    pub fn stop_calls(&self) -> usize {
        self.state.lock().unwrap().stop_calls
    }

    pub fn last_constraints(&self) -> Option<StreamConstraints> {
        self.state.lock().unwrap().last_constraints.clone()
    }

    pub fn last_recorder_options(&self) -> Option<RecorderOptions> {
        self.state.lock().unwrap().last_recorder_options.clone()
    }
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn LiveStream>, CaptureError> {
        let mut state = self.state.lock().unwrap();
        state.last_constraints = Some(constraints.clone());
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        state.acquisitions += 1;
        state.active_streams += 1;

        Ok(Box::new(FakeStream {
            state: Arc::clone(&self.state),
            stopped: false,
        }))
    }
}

struct FakeStream {
    state: Arc<Mutex<FakeState>>,
    stopped: bool,
}

impl LiveStream for FakeStream {
    fn is_ready(&self) -> bool {
        !self.stopped && !self.state.lock().unwrap().not_ready
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if self.stopped {
            return None;
        }
        self.state.lock().unwrap().frame.clone()
    }

    fn supports_recording_format(&self, mime_type: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .supported_formats
            .iter()
            .any(|f| f == mime_type)
    }

    fn start_recorder(
        &mut self,
        options: &RecorderOptions,
    ) -> Result<Box<dyn StreamRecorder>, CaptureError> {
        let mut state = self.state.lock().unwrap();
        state.last_recorder_options = Some(options.clone());
        if let Some(err) = state.recorder_failure.clone() {
            return Err(err);
        }

        Ok(Box::new(FakeRecorder {
            pending: std::mem::take(&mut state.chunks),
            tail: std::mem::take(&mut state.final_chunks),
        }))
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.stop_calls += 1;
        if !self.stopped {
            self.stopped = true;
            state.active_streams -= 1;
        }
    }
}

struct FakeRecorder {
    pending: Vec<Bytes>,
    tail: Vec<Bytes>,
}

impl StreamRecorder for FakeRecorder {
    fn take_chunks(&mut self) -> Vec<Bytes> {
        std::mem::take(&mut self.pending)
    }

    fn stop(self: Box<Self>) -> Vec<Bytes> {
        let FakeRecorder { pending, tail } = *self;
        pending.into_iter().chain(tail).collect()
    }
}
