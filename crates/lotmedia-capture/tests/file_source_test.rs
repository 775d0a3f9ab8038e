//! File-backed camera integration tests.
//!
//! Run with: `cargo test -p lotmedia-capture --test file_source_test`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use lotmedia_capture::{CaptureMode, CaptureSession, FileSourceDevices, SessionState};
use lotmedia_core::CaptureError;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
        .save(&path)
        .unwrap();
    path
}

fn session(devices: FileSourceDevices, mode: CaptureMode) -> CaptureSession {
    CaptureSession::new(Arc::new(devices), mode)
}

#[tokio::test]
async fn test_photo_from_image_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "lot.png", 64, 48);
    let mut session = session(
        FileSourceDevices::new().with_image(&source),
        CaptureMode::PhotoOnly,
    );

    session.open().await.unwrap();
    let file = session.capture_photo().unwrap();

    assert_eq!(file.mime_type, "image/jpeg");
    let decoded = image::load_from_memory(&file.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
    assert_eq!(session.state(), &SessionState::Closed);
}

#[tokio::test]
async fn test_large_image_is_scaled_to_fit() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "wide.png", 1600, 800);
    let mut session = session(
        FileSourceDevices::new().with_image(&source),
        CaptureMode::PhotoOnly,
    );

    session.open().await.unwrap();
    let file = session.capture_photo().unwrap();

    let decoded = image::load_from_memory(&file.data).unwrap();
    assert!(decoded.width() <= 1280);
    assert!(decoded.height() <= 720);
    assert_eq!(decoded.width(), 1280);
}

#[tokio::test]
async fn test_recording_replays_video_source() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("walkaround.webm");
    let payload: Vec<u8> = (0u8..10).collect();
    std::fs::write(&video, &payload).unwrap();

    let mut session = session(
        FileSourceDevices::new().with_video(&video).with_chunk_size(4),
        CaptureMode::VideoOnly,
    );
    session.open().await.unwrap();
    assert!(session.start_recording());

    assert_eq!(session.pump(), 4);
    let file = session.stop_recording().unwrap();

    assert!(file.name.ends_with(".webm"));
    assert_eq!(file.mime_type, "video/webm");
    assert_eq!(&file.data[..], &payload[..]);
}

#[tokio::test]
async fn test_missing_source_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(
        FileSourceDevices::new().with_image(dir.path().join("nope.png")),
        CaptureMode::Both,
    );

    let err = session.open().await.unwrap_err();

    assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    assert_eq!(
        session.error_message().as_deref(),
        Some("Could not access camera.")
    );
}

#[tokio::test]
async fn test_no_source_is_unavailable() {
    let mut session = session(FileSourceDevices::new(), CaptureMode::Both);
    assert!(matches!(
        session.open().await,
        Err(CaptureError::DeviceUnavailable(_))
    ));
}

#[tokio::test]
async fn test_non_webm_video_source_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"mp4 bytes").unwrap();

    let mut session = session(
        FileSourceDevices::new().with_video(&video),
        CaptureMode::VideoOnly,
    );

    assert!(session.open().await.is_err());
    assert!(!session.is_open());
}

#[tokio::test]
async fn test_image_only_source_cannot_record() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "lot.png", 8, 8);
    let mut session = session(
        FileSourceDevices::new().with_image(&source),
        CaptureMode::Both,
    );

    session.open().await.unwrap();

    assert!(!session.start_recording());
    assert_eq!(session.state(), &SessionState::Ready);
    assert!(session.capture_photo().is_some());
}
