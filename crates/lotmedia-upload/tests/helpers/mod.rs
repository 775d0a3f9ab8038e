//! Scripted uploaders for queue integration tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use lotmedia_core::{
    MediaCategory, MediaFile, MediaKind, MediaRecord, MediaRecordStatus, MediaRecordType,
    TransferError,
};
use lotmedia_upload::MediaUploader;

/// One recorded `upload` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub file_name: String,
    pub owner_id: String,
    pub kind: MediaKind,
    pub category: MediaCategory,
}

#[derive(Default)]
struct ScriptState {
    calls: Vec<UploadCall>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Succeeds for every file except the ones named in `fail`.
#[derive(Clone, Default)]
pub struct ScriptedUploader {
    fail: Arc<HashSet<String>>,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            fail: Arc::new(names.iter().map(|n| n.to_string()).collect()),
            state: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl MediaUploader for ScriptedUploader {
    async fn upload(
        &self,
        file: &MediaFile,
        owner_id: &str,
        kind: MediaKind,
        category: MediaCategory,
    ) -> Result<MediaRecord, TransferError> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(UploadCall {
                file_name: file.name.clone(),
                owner_id: owner_id.to_string(),
                kind,
                category,
            });
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        // Give an overlapping upload the chance to start, if the queue allowed one.
        tokio::task::yield_now().await;

        self.state.lock().unwrap().in_flight -= 1;

        if self.fail.contains(&file.name) {
            return Err(TransferError::Rejected {
                status: 500,
                body: "storage unavailable".to_string(),
            });
        }
        Ok(record_for(file, owner_id, kind, category))
    }
}

/// Never completes; stands in for a request still on the wire.
pub struct StalledUploader;

#[async_trait]
impl MediaUploader for StalledUploader {
    async fn upload(
        &self,
        _file: &MediaFile,
        _owner_id: &str,
        _kind: MediaKind,
        _category: MediaCategory,
    ) -> Result<MediaRecord, TransferError> {
        std::future::pending().await
    }
}

pub fn record_for(
    file: &MediaFile,
    owner_id: &str,
    kind: MediaKind,
    category: MediaCategory,
) -> MediaRecord {
    MediaRecord {
        id: format!("media-{}", file.name),
        car_id: owner_id.to_string(),
        media_type: match kind {
            MediaKind::Image => MediaRecordType::Image,
            MediaKind::Video => MediaRecordType::Video,
        },
        category: Some(category.to_string()),
        url: format!("https://cdn.example.com/{}", file.name),
        thumbnail_url: None,
        file_name: file.name.clone(),
        file_size: file.size(),
        mime_type: file.mime_type.clone(),
        duration: None,
        resolution: None,
        status: MediaRecordStatus::Ready,
        uploaded_at: Utc::now(),
        uploaded_by: "tester".to_string(),
    }
}

pub fn jpeg(name: &str) -> MediaFile {
    MediaFile::new(name, "image/jpeg", vec![0xFFu8, 0xD8, 0xFF, 0xE0])
}

pub fn webm(name: &str) -> MediaFile {
    MediaFile::new(name, "video/webm", vec![0x1Au8, 0x45, 0xDF, 0xA3])
}
