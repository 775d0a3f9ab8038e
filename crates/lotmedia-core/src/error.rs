//! Error types module
//!
//! Each pipeline stage has its own error enum:
//!
//! - [`CaptureError`]: device acquisition and still encoding. Terminal for the
//!   capture session that produced it; the caller must reopen.
//! - [`TransferError`]: a single upload call failed. Recorded on the queue entry
//!   and never propagated to other entries.
//! - [`QueueError`]: a pending-state mutation was rejected.
//! - [`ValidationError`]: a selected file is not acceptable for upload.

use std::io;

use crate::models::{EntryId, UploadStatus};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected mutations
    Debug,
    /// Warning level - for per-file failures that do not stop a batch
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PERMISSION_DENIED")
    fn error_code(&self) -> &'static str;

    /// Whether trying again could plausibly succeed
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from the internal error message)
    fn user_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl ErrorMetadata for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            CaptureError::PermissionDenied(_) => "PERMISSION_DENIED",
            CaptureError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            CaptureError::Encoding(_) => "ENCODING_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Both device failures need the session closed and reopened.
        matches!(self, CaptureError::Encoding(_))
    }

    fn user_message(&self) -> String {
        match self {
            CaptureError::PermissionDenied(_) => "Camera permission denied.".to_string(),
            CaptureError::DeviceUnavailable(_) => "Could not access camera.".to_string(),
            CaptureError::Encoding(_) => "Could not save the capture.".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            CaptureError::PermissionDenied(_) => LogLevel::Warn,
            CaptureError::DeviceUnavailable(_) => LogLevel::Warn,
            CaptureError::Encoding(_) => LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<io::Error> for TransferError {
    fn from(err: io::Error) -> Self {
        TransferError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        TransferError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}

impl ErrorMetadata for TransferError {
    fn error_code(&self) -> &'static str {
        match self {
            TransferError::Network(_) => "NETWORK_ERROR",
            TransferError::Rejected { .. } => "UPLOAD_REJECTED",
            TransferError::InvalidResponse(_) => "INVALID_RESPONSE",
            TransferError::Io(_) => "IO_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            TransferError::Network(_) => true,
            TransferError::Rejected { status, .. } => *status >= 500 || *status == 429,
            TransferError::InvalidResponse(_) => false,
            TransferError::Io(_) => false,
        }
    }

    fn user_message(&self) -> String {
        "Upload failed".to_string()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue entry not found: {0}")]
    NotFound(EntryId),

    #[error("Queue entry {id} is {status}, only pending entries can be changed")]
    NotPending { id: EntryId, status: UploadStatus },
}

impl ErrorMetadata for QueueError {
    fn error_code(&self) -> &'static str {
        match self {
            QueueError::NotFound(_) => "ENTRY_NOT_FOUND",
            QueueError::NotPending { .. } => "ENTRY_NOT_PENDING",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn user_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("File is empty: {0}")]
    Empty(String),
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            ValidationError::TooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ValidationError::Empty(_) => "EMPTY_FILE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn user_message(&self) -> String {
        match self {
            ValidationError::UnsupportedType(_) => {
                "Supports: JPG, PNG, WEBP, GIF, MP4, WEBM, MOV".to_string()
            }
            ValidationError::TooLarge { limit, .. } => {
                format!("File exceeds the {} MB limit", limit / (1024 * 1024))
            }
            ValidationError::Empty(name) => format!("{} is empty", name),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}
