//! Upload queue
//!
//! Entries are kept in insertion order, which is also upload order, and are
//! addressed by [`EntryId`] so removals never shift the identity of other
//! entries. Category, file and kind are frozen once an entry leaves `pending`.
//!
//! [`UploadQueue::run_upload`] drains pending entries strictly one at a time. It
//! borrows the queue mutably for the whole pass, so no add/remove/edit can
//! interleave with it. If the pass future is dropped, the entry that was in
//! flight stays `uploading` and is retried by the next pass.

use lotmedia_core::{
    EntryId, ErrorMetadata, MediaCategory, MediaFile, MediaKind, MediaRecord, QueueError,
    UploadStatus,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::preview::{PreviewHandle, PreviewStore};
use crate::summary::UploadSummary;
use crate::uploader::MediaUploader;

/// Progress notifications emitted during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started {
        id: EntryId,
        file_name: String,
    },
    Finished {
        id: EntryId,
        status: UploadStatus,
    },
}

/// Optional listener for [`UploadEvent`]s. Send failures are ignored.
pub type UploadEventSender = mpsc::UnboundedSender<UploadEvent>;

/// One queued file.
#[derive(Debug)]
pub struct PendingUpload {
    id: EntryId,
    file: MediaFile,
    preview: PreviewHandle,
    kind: MediaKind,
    category: MediaCategory,
    status: UploadStatus,
    progress: u8,
    record: Option<MediaRecord>,
    error: Option<String>,
}

impl PendingUpload {
    fn new(file: MediaFile, preview: PreviewHandle) -> Self {
        Self {
            id: EntryId::new(),
            kind: file.kind(),
            file,
            preview,
            category: MediaCategory::default(),
            status: UploadStatus::Pending,
            progress: 0,
            record: None,
            error: None,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn file(&self) -> &MediaFile {
        &self.file
    }

    pub fn preview_url(&self) -> String {
        self.preview.url()
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// 0 until the upload succeeds, then 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Backend record, present once the upload succeeded.
    pub fn record(&self) -> Option<&MediaRecord> {
        self.record.as_ref()
    }

    /// Failure reason of the last attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_file(self) -> MediaFile {
        self.file
    }

    fn ensure_pending(&self) -> Result<(), QueueError> {
        if self.status == UploadStatus::Pending {
            Ok(())
        } else {
            Err(QueueError::NotPending {
                id: self.id,
                status: self.status,
            })
        }
    }

    fn view(&self) -> UploadEntryView {
        UploadEntryView {
            id: self.id,
            file_name: self.file.name.clone(),
            file_size: self.file.size(),
            media_kind: self.kind,
            category: self.category,
            status: self.status,
            progress: self.progress,
            preview_url: self.preview.url(),
        }
    }
}

/// Read-only snapshot of an entry for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEntryView {
    pub id: EntryId,
    pub file_name: String,
    pub file_size: u64,
    pub media_kind: MediaKind,
    pub category: MediaCategory,
    pub status: UploadStatus,
    pub progress: u8,
    pub preview_url: String,
}

#[derive(Debug, Default)]
pub struct UploadQueue {
    entries: Vec<PendingUpload>,
    previews: PreviewStore,
    events: Option<UploadEventSender>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: UploadEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    /// Append a file as a new pending entry in the `general` category.
    pub fn add(&mut self, file: MediaFile) -> EntryId {
        let preview = self.previews.register(&file);
        let entry = PendingUpload::new(file, preview);
        let id = entry.id;
        debug!(
            entry_id = %id,
            file_name = %entry.file.name,
            kind = %entry.kind,
            size = entry.file.size(),
            "File queued"
        );
        self.entries.push(entry);
        id
    }

    /// Remove a pending entry and revoke its preview.
    pub fn remove(&mut self, id: EntryId) -> Result<PendingUpload, QueueError> {
        let index = self.position(id)?;
        self.entries[index].ensure_pending()?;

        let mut entry = self.entries.remove(index);
        entry.preview.revoke();
        debug!(entry_id = %id, file_name = %entry.file.name, "File removed from queue");
        Ok(entry)
    }

    pub fn set_category(
        &mut self,
        id: EntryId,
        category: MediaCategory,
    ) -> Result<(), QueueError> {
        let index = self.position(id)?;
        let entry = &mut self.entries[index];
        entry.ensure_pending()?;
        entry.category = category;
        debug!(entry_id = %id, category = %category, "Category updated");
        Ok(())
    }

    pub fn entries(&self) -> &[PendingUpload] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&PendingUpload> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn views(&self) -> Vec<UploadEntryView> {
        self.entries.iter().map(PendingUpload::view).collect()
    }

    /// Current tally over every entry.
    pub fn summary(&self) -> UploadSummary {
        UploadSummary::from_statuses(self.entries.iter().map(|e| e.status))
    }

    /// Drop entries that uploaded successfully. Returns how many were removed.
    pub fn clear_finished(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.status != UploadStatus::Success);
        let cleared = before - self.entries.len();
        if cleared > 0 {
            debug!(cleared, remaining = self.entries.len(), "Cleared uploaded entries");
        }
        cleared
    }

    /// Upload every non-terminal entry in order, one at a time.
    ///
    /// A failed upload marks its entry `error` and the pass continues with the
    /// next entry. Entries already terminal from an earlier pass are skipped but
    /// still counted in the returned summary.
    pub async fn run_upload(
        &mut self,
        owner_id: &str,
        uploader: &dyn MediaUploader,
    ) -> UploadSummary {
        info!(owner_id, total = self.entries.len(), "Starting upload pass");

        for entry in self.entries.iter_mut() {
            match entry.status {
                UploadStatus::Success | UploadStatus::Error => continue,
                UploadStatus::Uploading => {
                    warn!(entry_id = %entry.id, "Retrying upload abandoned by an earlier pass");
                }
                UploadStatus::Pending => {}
            }

            entry.status = UploadStatus::Uploading;
            emit(
                self.events.as_ref(),
                UploadEvent::Started {
                    id: entry.id,
                    file_name: entry.file.name.clone(),
                },
            );
            debug!(
                entry_id = %entry.id,
                file_name = %entry.file.name,
                category = %entry.category,
                "Uploading file"
            );

            match uploader
                .upload(&entry.file, owner_id, entry.kind, entry.category)
                .await
            {
                Ok(record) => {
                    info!(
                        entry_id = %entry.id,
                        file_name = %entry.file.name,
                        media_id = %record.id,
                        "File uploaded"
                    );
                    entry.status = UploadStatus::Success;
                    entry.progress = 100;
                    entry.record = Some(record);
                    entry.error = None;
                }
                Err(err) => {
                    warn!(
                        entry_id = %entry.id,
                        file_name = %entry.file.name,
                        error = %err,
                        code = err.error_code(),
                        "File upload failed"
                    );
                    entry.status = UploadStatus::Error;
                    entry.error = Some(err.to_string());
                }
            }

            emit(
                self.events.as_ref(),
                UploadEvent::Finished {
                    id: entry.id,
                    status: entry.status,
                },
            );
        }

        let summary = self.summary();
        info!(
            owner_id,
            success = summary.success_count,
            errors = summary.error_count,
            total = summary.total,
            "Upload pass finished"
        );
        summary
    }

    fn position(&self, id: EntryId) -> Result<usize, QueueError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(QueueError::NotFound(id))
    }
}

fn emit(events: Option<&UploadEventSender>, event: UploadEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
