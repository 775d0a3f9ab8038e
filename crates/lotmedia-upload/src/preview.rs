//! Transient preview references
//!
//! Every queued file gets a `preview://<uuid>` reference that a UI can resolve to
//! the file's bytes. The reference stays live exactly as long as its
//! [`PreviewHandle`]; dropping or revoking the handle unregisters it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lotmedia_core::MediaFile;
use tracing::debug;
use uuid::Uuid;

const PREVIEW_SCHEME: &str = "preview://";

#[derive(Debug, Clone)]
struct PreviewSource {
    file_name: String,
    mime_type: String,
}

type Registry = Arc<Mutex<HashMap<Uuid, PreviewSource>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<Uuid, PreviewSource>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of live preview references. Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    registry: Registry,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, file: &MediaFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        lock(&self.registry).insert(
            id,
            PreviewSource {
                file_name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            },
        );
        debug!(preview_id = %id, file_name = %file.name, "Preview registered");

        PreviewHandle {
            id,
            registry: Arc::clone(&self.registry),
            revoked: false,
        }
    }

    /// Whether `url` refers to a preview that has not been revoked.
    pub fn is_live(&self, url: &str) -> bool {
        parse_url(url).is_some_and(|id| lock(&self.registry).contains_key(&id))
    }

    /// MIME type of a live preview, for serving its bytes.
    pub fn mime_type(&self, url: &str) -> Option<String> {
        let id = parse_url(url)?;
        lock(&self.registry).get(&id).map(|s| s.mime_type.clone())
    }

    pub fn file_name(&self, url: &str) -> Option<String> {
        let id = parse_url(url)?;
        lock(&self.registry).get(&id).map(|s| s.file_name.clone())
    }

    /// Number of live previews.
    pub fn len(&self) -> usize {
        lock(&self.registry).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_url(url: &str) -> Option<Uuid> {
    url.strip_prefix(PREVIEW_SCHEME)
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Owner of one preview reference. Revoked on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: Registry,
    revoked: bool,
}

impl PreviewHandle {
    pub fn url(&self) -> String {
        format!("{}{}", PREVIEW_SCHEME, self.id)
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Unregister the reference. Later calls are no-ops.
    pub fn revoke(&mut self) {
        if self.revoked {
            return;
        }
        self.revoked = true;
        lock(&self.registry).remove(&self.id);
        debug!(preview_id = %self.id, "Preview revoked");
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> MediaFile {
        MediaFile::new(name, "image/png", vec![1u8, 2, 3])
    }

    #[test]
    fn test_register_and_drop() {
        let store = PreviewStore::new();
        let handle = store.register(&file("front.png"));
        let url = handle.url();

        assert!(url.starts_with("preview://"));
        assert!(store.is_live(&url));
        assert_eq!(store.mime_type(&url).as_deref(), Some("image/png"));
        assert_eq!(store.file_name(&url).as_deref(), Some("front.png"));
        assert_eq!(store.len(), 1);

        drop(handle);
        assert!(!store.is_live(&url));
        assert!(store.is_empty());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let store = PreviewStore::new();
        let mut handle = store.register(&file("a.png"));
        let _other = store.register(&file("b.png"));

        handle.revoke();
        handle.revoke();
        assert!(handle.is_revoked());
        assert_eq!(store.len(), 1);

        drop(handle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_urls_are_not_live() {
        let store = PreviewStore::new();
        assert!(!store.is_live("preview://not-a-uuid"));
        assert!(!store.is_live("blob:http://localhost/abc"));
        assert!(store.mime_type(&format!("preview://{}", Uuid::new_v4())).is_none());
    }
}
