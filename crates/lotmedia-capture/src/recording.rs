//! Recording format selection and the chunk buffer behind a recording

use bytes::{Bytes, BytesMut};
use lotmedia_core::MediaFile;

use crate::device::LiveStream;

/// Modern codec, used whenever the device supports it.
pub const PREFERRED_RECORDING_MIME: &str = "video/webm;codecs=vp9";
/// Baseline every recorder is expected to handle.
pub const BASELINE_RECORDING_MIME: &str = "video/webm";

/// Output format of a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFormat {
    mime_type: String,
}

impl RecordingFormat {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
        }
    }

    /// Prefer VP9, fall back to the baseline WebM recorder.
    pub fn select(stream: &dyn LiveStream) -> Self {
        if stream.supports_recording_format(PREFERRED_RECORDING_MIME) {
            Self::new(PREFERRED_RECORDING_MIME)
        } else {
            Self::new(BASELINE_RECORDING_MIME)
        }
    }

    /// MIME type handed to the recorder, codec parameters included.
    pub fn recorder_mime(&self) -> &str {
        &self.mime_type
    }

    /// MIME type of the finished file (codec parameters stripped).
    pub fn container_mime(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or(&self.mime_type)
            .trim()
    }

    pub fn extension(&self) -> &'static str {
        if self.mime_type.contains("webm") {
            "webm"
        } else {
            "mp4"
        }
    }
}

/// Encoded chunks collected while recording, finalized into one file on stop.
#[derive(Debug)]
pub struct RecordingBuffer {
    format: RecordingFormat,
    chunks: Vec<Bytes>,
    len: usize,
}

impl RecordingBuffer {
    pub fn new(format: RecordingFormat) -> Self {
        Self {
            format,
            chunks: Vec::new(),
            len: 0,
        }
    }

    pub fn format(&self) -> &RecordingFormat {
        &self.format
    }

    /// Append chunks in delivery order; empty chunks are dropped.
    pub fn extend(&mut self, chunks: impl IntoIterator<Item = Bytes>) {
        for chunk in chunks {
            if chunk.is_empty() {
                continue;
            }
            self.len += chunk.len();
            self.chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Concatenate every chunk into a single file named `<stem>.<ext>`.
    pub fn finalize(self, stem: &str) -> MediaFile {
        let mut data = BytesMut::with_capacity(self.len);
        for chunk in &self.chunks {
            data.extend_from_slice(chunk);
        }

        MediaFile::new(
            format!("{}.{}", stem, self.format.extension()),
            self.format.container_mime(),
            data.freeze(),
        )
    }
}
