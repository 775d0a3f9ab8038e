//! Upload transport seam

use async_trait::async_trait;
use lotmedia_core::{MediaCategory, MediaFile, MediaKind, MediaRecord, TransferError};

/// Transfers one file to the backend and returns the stored record.
///
/// Implemented by the HTTP client; tests substitute scripted uploaders.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(
        &self,
        file: &MediaFile,
        owner_id: &str,
        kind: MediaKind,
        category: MediaCategory,
    ) -> Result<MediaRecord, TransferError>;
}
