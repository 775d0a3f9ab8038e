use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media carried by a queued file.
///
/// Derived once from the MIME type: `image/*` is an image, everything else is
/// treated as video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.trim().to_ascii_lowercase().starts_with("image") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }

    /// Wire value sent as the `type` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Category tag attached to an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    #[default]
    General,
    Exterior,
    Interior,
    Engine,
    Damage,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 5] = [
        MediaCategory::General,
        MediaCategory::Exterior,
        MediaCategory::Interior,
        MediaCategory::Engine,
        MediaCategory::Damage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::General => "general",
            MediaCategory::Exterior => "exterior",
            MediaCategory::Interior => "interior",
            MediaCategory::Engine => "engine",
            MediaCategory::Damage => "damage",
        }
    }
}

impl FromStr for MediaCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(MediaCategory::General),
            "exterior" => Ok(MediaCategory::Exterior),
            "interior" => Ok(MediaCategory::Interior),
            "engine" => Ok(MediaCategory::Engine),
            "damage" => Ok(MediaCategory::Damage),
            _ => Err(anyhow::anyhow!("Invalid media category: {}", s)),
        }
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Media type as stored by the backend (documents are never produced by this client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaRecordType {
    Image,
    Video,
    Document,
}

impl MediaRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaRecordType::Image => "IMAGE",
            MediaRecordType::Video => "VIDEO",
            MediaRecordType::Document => "DOCUMENT",
        }
    }
}

/// Backend processing status of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaRecordStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// A stored media file as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,
    pub car_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaRecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub status: MediaRecordStatus,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

/// Pagination block of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Paginated list response (`{ data, pagination }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Request body for `POST /media/upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub car_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MediaCategory>,
}

/// Presigned upload target returned by `POST /media/upload-url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub media_id: String,
    pub upload_url: String,
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("IMAGE/PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/webm"), MediaKind::Video);
        // Anything that is not an image is uploaded as video.
        assert_eq!(MediaKind::from_mime(""), MediaKind::Video);
        assert_eq!(
            MediaKind::from_mime("application/octet-stream"),
            MediaKind::Video
        );
    }

    #[test]
    fn test_media_category_parse() {
        assert_eq!(
            "Exterior".parse::<MediaCategory>().unwrap(),
            MediaCategory::Exterior
        );
        assert_eq!(
            " damage ".parse::<MediaCategory>().unwrap(),
            MediaCategory::Damage
        );
        assert!("trunk".parse::<MediaCategory>().is_err());
        assert_eq!(MediaCategory::default(), MediaCategory::General);
    }

    #[test]
    fn test_media_record_deserialize() {
        let json = serde_json::json!({
            "id": "m-1",
            "carId": "car-9",
            "type": "IMAGE",
            "category": "engine",
            "url": "https://cdn.example.com/m-1.jpg",
            "fileName": "capture-1700000000000.jpg",
            "fileSize": 2048,
            "mimeType": "image/jpeg",
            "status": "READY",
            "uploadedAt": "2024-01-02T03:04:05Z",
            "uploadedBy": "user-1"
        });

        let record: MediaRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.car_id, "car-9");
        assert_eq!(record.media_type, MediaRecordType::Image);
        assert_eq!(record.category.as_deref(), Some("engine"));
        assert_eq!(record.status, MediaRecordStatus::Ready);
        assert!(record.thumbnail_url.is_none());
    }

    #[test]
    fn test_upload_url_request_serialize() {
        let request = UploadUrlRequest {
            car_id: "car-1".to_string(),
            media_type: MediaKind::Video,
            file_name: "walkaround.mp4".to_string(),
            category: Some(MediaCategory::Interior),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["carId"], "car-1");
        assert_eq!(value["type"], "VIDEO");
        assert_eq!(value["fileName"], "walkaround.mp4");
        assert_eq!(value["category"], "interior");
    }
}
