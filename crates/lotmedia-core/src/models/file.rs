use std::io;
use std::path::{Component, Path};

use bytes::Bytes;

use super::MediaKind;

/// A binary payload with the metadata needed to upload it.
///
/// Produced either from a file picked on disk or emitted by a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid input: {}", path.display()),
            ));
        }

        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let mime_type = mime_from_extension(path)
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self::new(name, mime_type, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }

    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// MIME type for the extensions the upload page accepts.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_path_infers_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.JPG");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"jpeg bytes").unwrap();

        let media = MediaFile::from_path(&path).unwrap();
        assert_eq!(media.name, "front.JPG");
        assert_eq!(media.mime_type, "image/jpeg");
        assert_eq!(media.size(), 10);
        assert_eq!(media.kind(), MediaKind::Image);
        assert_eq!(media.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn test_from_path_rejects_parent_dir() {
        let err = MediaFile::from_path(Path::new("../secrets.jpg")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let media = MediaFile::from_path(&path).unwrap();
        assert_eq!(media.mime_type, "application/octet-stream");
        assert_eq!(media.kind(), MediaKind::Video);
    }
}
