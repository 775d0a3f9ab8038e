//! Still-image encoding

use image::{ExtendedColorType, RgbaImage};
use lotmedia_core::CaptureError;

use crate::device::VideoFrame;

/// Encode an RGBA frame as JPEG at the given quality (0-100).
///
/// JPEG has no alpha channel, so the frame is flattened to RGB first.
pub fn encode_jpeg(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::Encoding("frame has no pixels".to_string()));
    }
    if frame.data.len() != frame.expected_len() {
        return Err(CaptureError::Encoding(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.data.len(),
            frame.expected_len(),
            frame.width,
            frame.height
        )));
    }

    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .ok_or_else(|| CaptureError::Encoding("frame buffer does not match size".to_string()))?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.min(100));

    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Encoding(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}
