//! lotmedia Core Library
//!
//! This crate provides the domain models, error types, configuration, and selection
//! validation shared by the capture, upload, API client, and CLI crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{CaptureConfig, ClientConfig};
pub use error::{CaptureError, ErrorMetadata, QueueError, TransferError, ValidationError};
pub use models::{
    EntryId, MediaCategory, MediaFile, MediaKind, MediaRecord, MediaRecordStatus, MediaRecordType,
    PaginatedResponse, Pagination, UploadStatus, UploadUrlRequest, UploadUrlResponse,
};
pub use validation::{validate_selection, SelectionPolicy};
