//! Selection validation
//!
//! Files picked from disk are checked before they are queued. Captured files are
//! produced by the capture session in a known format and skip this check.

use crate::error::ValidationError;
use crate::models::MediaFile;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
pub const DEFAULT_MAX_SELECTION_BYTES: u64 = 100 * 1024 * 1024;

/// Which files may be selected for upload.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub max_bytes: u64,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::with_max_bytes(DEFAULT_MAX_SELECTION_BYTES)
    }
}

impl SelectionPolicy {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            image_extensions: IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Accepts `image/*` files with an image extension and `video/*` files with a
/// video extension, no larger than the policy limit.
pub fn validate_selection(
    file: &MediaFile,
    policy: &SelectionPolicy,
) -> Result<(), ValidationError> {
    if file.data.is_empty() {
        return Err(ValidationError::Empty(file.name.clone()));
    }

    let size = file.size();
    if size > policy.max_bytes {
        return Err(ValidationError::TooLarge {
            size,
            limit: policy.max_bytes,
        });
    }

    let mime = file.mime_type.to_ascii_lowercase();
    let extension = file.extension().unwrap_or_default();
    let allowed = if mime.starts_with("image/") {
        &policy.image_extensions
    } else if mime.starts_with("video/") {
        &policy.video_extensions
    } else {
        return Err(ValidationError::UnsupportedType(file.mime_type.clone()));
    };

    if !allowed.iter().any(|e| *e == extension) {
        return Err(ValidationError::UnsupportedType(format!(
            "{} ({})",
            file.name, file.mime_type
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, len: usize) -> MediaFile {
        MediaFile::new(name, mime, vec![1u8; len])
    }

    #[test]
    fn test_accepts_supported_images_and_videos() {
        let policy = SelectionPolicy::default();
        assert!(validate_selection(&file("a.jpg", "image/jpeg", 4), &policy).is_ok());
        assert!(validate_selection(&file("b.WEBP", "image/webp", 4), &policy).is_ok());
        assert!(validate_selection(&file("c.mov", "video/quicktime", 4), &policy).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_types() {
        let policy = SelectionPolicy::default();
        let err = validate_selection(&file("doc.pdf", "application/pdf", 4), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType(_)));

        // Right family, wrong extension.
        let err = validate_selection(&file("raw.tiff", "image/tiff", 4), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType(_)));
    }

    #[test]
    fn test_rejects_oversized_and_empty() {
        let policy = SelectionPolicy::with_max_bytes(8);
        let err = validate_selection(&file("big.jpg", "image/jpeg", 9), &policy).unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { size: 9, limit: 8 });

        let err = validate_selection(&file("empty.jpg", "image/jpeg", 0), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::Empty(_)));
    }
}
