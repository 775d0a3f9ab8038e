//! lotmedia Capture Library
//!
//! A [`CaptureSession`] mediates between one live camera/microphone stream and a
//! single emitted [`MediaFile`](lotmedia_core::MediaFile): either a JPEG still or
//! a recorded clip.
//!
//! The device is injected through the [`MediaDevices`] trait, so the session runs
//! the same against a real backend, the file-backed [`FileSourceDevices`], or the
//! in-memory double in [`fake`] (enabled with the `test-helpers` feature).

pub mod device;
#[cfg(any(test, feature = "test-helpers"))]
pub mod fake;
pub mod file_source;
pub mod recording;
pub mod session;
pub mod still;

// Re-export commonly used types
pub use device::{
    FacingMode, LiveStream, MediaDevices, RecorderOptions, StreamConstraints, StreamRecorder,
    VideoFrame,
};
pub use file_source::FileSourceDevices;
pub use recording::{RecordingBuffer, RecordingFormat};
pub use session::{CaptureMode, CaptureSession, SessionState};
pub use still::encode_jpeg;
