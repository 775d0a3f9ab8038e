//! Media endpoints.
//!
//! Paths are relative to the client's base URL (`http://localhost:3001/api` by
//! default). Record shapes live in `lotmedia_core::models`.

use async_trait::async_trait;
use lotmedia_core::{
    MediaCategory, MediaFile, MediaKind, MediaRecord, PaginatedResponse, TransferError,
    UploadUrlRequest, UploadUrlResponse,
};
use lotmedia_upload::MediaUploader;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::ApiClient;

impl ApiClient {
    /// Upload one file for a car as multipart form data
    /// (`file`, `carId`, `type`, `category`).
    pub async fn upload_media(
        &self,
        file: &MediaFile,
        car_id: &str,
        kind: MediaKind,
        category: Option<MediaCategory>,
    ) -> Result<MediaRecord, TransferError> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                TransferError::Io(format!("Invalid MIME type {}: {}", file.mime_type, e))
            })?;

        let mut form = Form::new()
            .part("file", part)
            .text("carId", car_id.to_string())
            .text("type", kind.as_str().to_string());
        if let Some(category) = category {
            form = form.text("category", category.as_str().to_string());
        }

        debug!(
            car_id,
            file_name = %file.name,
            size = file.size(),
            kind = %kind,
            "Uploading media"
        );
        let record: MediaRecord = self.post_multipart("/media/upload", form).await?;
        info!(car_id, media_id = %record.id, file_name = %record.file_name, "Media uploaded");
        Ok(record)
    }

    /// All media attached to one car.
    pub async fn list_media_for_car(
        &self,
        car_id: &str,
    ) -> Result<Vec<MediaRecord>, TransferError> {
        self.get(&format!("/media/car/{}", urlencoding::encode(car_id)), &[])
            .await
    }

    /// Paginated list of all media.
    pub async fn list_media(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<MediaRecord>, TransferError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(p) = page {
            query.push(("page", p.to_string()));
        }
        if let Some(l) = limit {
            query.push(("limit", l.to_string()));
        }

        self.get("/media", &query).await
    }

    /// Ask the backend for a presigned upload target.
    pub async fn generate_upload_url(
        &self,
        request: &UploadUrlRequest,
    ) -> Result<UploadUrlResponse, TransferError> {
        self.post_json("/media/upload-url", request).await
    }

    pub async fn delete_media(&self, id: &str) -> Result<(), TransferError> {
        self.delete(&format!("/media/{}", urlencoding::encode(id))).await?;
        info!(media_id = id, "Media deleted");
        Ok(())
    }
}

#[async_trait]
impl MediaUploader for ApiClient {
    async fn upload(
        &self,
        file: &MediaFile,
        owner_id: &str,
        kind: MediaKind,
        category: MediaCategory,
    ) -> Result<MediaRecord, TransferError> {
        self.upload_media(file, owner_id, kind, Some(category)).await
    }
}
