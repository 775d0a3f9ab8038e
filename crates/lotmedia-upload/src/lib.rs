//! lotmedia Upload Library
//!
//! An [`UploadQueue`] holds the files selected or captured for one car and drains
//! them one at a time through a [`MediaUploader`], recording a terminal status per
//! entry and an [`UploadSummary`] for the batch.

pub mod preview;
pub mod queue;
pub mod summary;
pub mod uploader;

// Re-export commonly used types
pub use preview::{PreviewHandle, PreviewStore};
pub use queue::{PendingUpload, UploadEntryView, UploadEvent, UploadEventSender, UploadQueue};
pub use summary::{UploadOutcome, UploadSummary};
pub use uploader::MediaUploader;
