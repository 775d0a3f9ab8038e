//! Batch upload summary

use lotmedia_core::UploadStatus;
use serde::Serialize;

/// How a batch ended. Any success counts as a successful batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOutcome {
    /// Every file uploaded
    Complete,
    /// At least one file uploaded, at least one failed
    Partial,
    /// Nothing uploaded, including the empty batch
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub total: usize,
}

impl UploadSummary {
    /// Tally terminal statuses. Non-terminal entries only count toward `total`.
    pub fn from_statuses(statuses: impl IntoIterator<Item = UploadStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut summary, status| {
                match status {
                    UploadStatus::Success => summary.success_count += 1,
                    UploadStatus::Error => summary.error_count += 1,
                    UploadStatus::Pending | UploadStatus::Uploading => {}
                }
                summary.total += 1;
                summary
            })
    }

    pub fn outcome(&self) -> UploadOutcome {
        match (self.success_count, self.error_count) {
            (0, _) => UploadOutcome::Failed,
            (_, 0) => UploadOutcome::Complete,
            _ => UploadOutcome::Partial,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }

    pub fn title(&self) -> &'static str {
        if self.is_success() {
            "Upload Complete!"
        } else {
            "Upload Failed"
        }
    }

    pub fn message(&self) -> String {
        match self.outcome() {
            UploadOutcome::Complete => {
                format!("{} file(s) uploaded successfully", self.success_count)
            }
            UploadOutcome::Partial => format!(
                "{} file(s) uploaded successfully, {} failed",
                self.success_count, self.error_count
            ),
            UploadOutcome::Failed => "No files were uploaded successfully.".to_string(),
        }
    }
}
