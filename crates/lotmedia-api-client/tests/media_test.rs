//! Media endpoint tests against a mock HTTP server.
//!
//! Run with: `cargo test -p lotmedia-api-client --test media_test`

use std::time::Duration;

use lotmedia_api_client::{ApiClient, Auth};
use lotmedia_core::{
    MediaCategory, MediaFile, MediaKind, MediaRecordStatus, MediaRecordType, TransferError,
    UploadStatus, UploadUrlRequest,
};
use lotmedia_upload::UploadQueue;
use mockito::Matcher;
use serde_json::json;

fn record_json(id: &str, file_name: &str, media_type: &str) -> serde_json::Value {
    json!({
        "id": id,
        "carId": "car-42",
        "type": media_type,
        "category": "exterior",
        "url": format!("https://cdn.example.com/{}", file_name),
        "fileName": file_name,
        "fileSize": 4,
        "mimeType": "image/jpeg",
        "status": "READY",
        "uploadedAt": "2026-10-15T08:30:00Z",
        "uploadedBy": "user-1"
    })
}

fn client(server: &mockito::Server, auth: Auth) -> ApiClient {
    ApiClient::new(&server.url(), auth, Duration::from_secs(5)).unwrap()
}

fn jpeg(name: &str) -> MediaFile {
    MediaFile::new(name, "image/jpeg", b"jpeg".to_vec())
}

#[tokio::test]
async fn test_upload_media_sends_multipart_fields() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/media/upload")
        .match_header("authorization", "Bearer token-1")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="front.jpg""#.to_string()),
            Matcher::Regex(r#"name="carId"\r\n\r\ncar-42"#.to_string()),
            Matcher::Regex(r#"name="type"\r\n\r\nIMAGE"#.to_string()),
            Matcher::Regex(r#"name="category"\r\n\r\nexterior"#.to_string()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(record_json("m-1", "front.jpg", "IMAGE").to_string())
        .create_async()
        .await;

    let api = client(&server, Auth::Bearer("token-1".to_string()));
    let record = api
        .upload_media(
            &jpeg("front.jpg"),
            "car-42",
            MediaKind::Image,
            Some(MediaCategory::Exterior),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(record.id, "m-1");
    assert_eq!(record.media_type, MediaRecordType::Image);
    assert_eq!(record.status, MediaRecordStatus::Ready);
    assert_eq!(record.category.as_deref(), Some("exterior"));
}

#[tokio::test]
async fn test_upload_rejection_maps_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/media/upload")
        .with_status(413)
        .with_body("File too large")
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let err = api
        .upload_media(&jpeg("big.jpg"), "car-42", MediaKind::Image, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransferError::Rejected {
            status: 413,
            body: "File too large".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_response_is_invalid() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/media/car/car-42")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let err = api.list_media_for_car("car-42").await.unwrap_err();

    assert!(matches!(err, TransferError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_list_media_for_car() {
    let mut server = mockito::Server::new_async().await;
    let body = json!([
        record_json("m-1", "front.jpg", "IMAGE"),
        record_json("m-2", "walk.webm", "VIDEO"),
    ]);
    let mock = server
        .mock("GET", "/media/car/car-42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let records = api.list_media_for_car("car-42").await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].media_type, MediaRecordType::Video);
}

#[tokio::test]
async fn test_list_media_paginated() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "data": [record_json("m-1", "front.jpg", "IMAGE")],
        "pagination": { "page": 2, "limit": 10, "total": 11, "totalPages": 2 }
    });
    let mock = server
        .mock("GET", "/media")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".to_string(), "2".to_string()),
            Matcher::UrlEncoded("limit".to_string(), "10".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let page = api.list_media(Some(2), Some(10)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.total, 11);
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn test_generate_upload_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/media/upload-url")
        .match_body(Matcher::PartialJson(json!({
            "carId": "car-42",
            "type": "VIDEO",
            "fileName": "walk.webm",
            "category": "damage"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "mediaId": "m-9",
                "uploadUrl": "https://storage.example.com/put/m-9",
                "fileUrl": "https://cdn.example.com/m-9.webm"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let target = api
        .generate_upload_url(&UploadUrlRequest {
            car_id: "car-42".to_string(),
            media_type: MediaKind::Video,
            file_name: "walk.webm".to_string(),
            category: Some(MediaCategory::Damage),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(target.media_id, "m-9");
    assert_eq!(target.upload_url, "https://storage.example.com/put/m-9");
}

#[tokio::test]
async fn test_delete_media() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/media/m-1")
        .match_header("authorization", "Bearer token-1")
        .with_status(204)
        .create_async()
        .await;

    let api = client(&server, Auth::Bearer("token-1".to_string()));
    api.delete_media("m-1").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_queue_drains_into_api() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/media/upload")
        .match_body(Matcher::Regex(r#"filename="ok.jpg""#.to_string()))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(record_json("m-1", "ok.jpg", "IMAGE").to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/media/upload")
        .match_body(Matcher::Regex(r#"filename="bad.jpg""#.to_string()))
        .with_status(500)
        .with_body("storage unavailable")
        .create_async()
        .await;

    let api = client(&server, Auth::None);
    let mut queue = UploadQueue::new();
    let ok = queue.add(jpeg("ok.jpg"));
    let bad = queue.add(jpeg("bad.jpg"));

    let summary = queue.run_upload("car-42", &api).await;

    assert_eq!(queue.get(ok).unwrap().status(), UploadStatus::Success);
    assert_eq!(queue.get(bad).unwrap().status(), UploadStatus::Error);
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.error_count, 1);
}
