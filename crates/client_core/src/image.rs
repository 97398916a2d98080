//! Cover image staging.
//!
//! A staged image gets a `blob:` style preview URI from a [`PreviewRegistry`].
//! The URI stays resolvable exactly as long as its [`PreviewHandle`] lives:
//! replacing, clearing or resetting the staged image drops the handle, which
//! revokes the URI.

use std::{
    collections::HashMap,
    fmt,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

const PREVIEW_URI_PREFIX: &str = "blob:event-preview/";

#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// The mime type is guessed from the file name.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(filename, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }

    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("application/octet-stream")
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Resolves preview URIs back to the blob they were issued for.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<String, Arc<ImageFile>>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, file: Arc<ImageFile>) -> PreviewHandle {
        let uri = format!("{PREVIEW_URI_PREFIX}{}", Uuid::new_v4());
        self.entries().insert(uri.clone(), file);
        PreviewHandle {
            uri,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, uri: &str) -> Option<Arc<ImageFile>> {
        self.entries().get(uri).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn revoke(&self, uri: &str) {
        if self.entries().remove(uri).is_some() {
            debug!(%uri, "revoked image preview");
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ImageFile>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owns one preview URI; revokes it on drop.
pub struct PreviewHandle {
    uri: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.uri);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.uri).finish()
    }
}

/// The blob currently attached to a form, paired with its preview.
#[derive(Debug)]
pub struct StagedImage {
    file: Arc<ImageFile>,
    preview: PreviewHandle,
}

impl StagedImage {
    pub(crate) fn new(file: ImageFile, registry: &PreviewRegistry) -> Self {
        let file = Arc::new(file);
        let preview = registry.register(Arc::clone(&file));
        Self { file, preview }
    }

    pub fn file(&self) -> &Arc<ImageFile> {
        &self.file
    }

    pub fn preview_uri(&self) -> &str {
        self.preview.uri()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_type_from_file_name() {
        let file = ImageFile::new("cover.png", vec![1, 2, 3]);
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
        assert!(file.is_image());

        let unknown = ImageFile::new("cover", vec![1]);
        assert_eq!(unknown.mime_type_or_default(), "application/octet-stream");
        assert!(!unknown.is_image());
    }

    #[test]
    fn dropping_handle_revokes_preview() {
        let registry = PreviewRegistry::new();
        let handle = registry.register(Arc::new(ImageFile::new("a.jpg", vec![7])));
        let uri = handle.uri().to_string();
        assert!(uri.starts_with(PREVIEW_URI_PREFIX));
        assert_eq!(registry.resolve(&uri).expect("live").bytes, vec![7]);

        drop(handle);
        assert!(registry.resolve(&uri).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn loads_image_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("banner.jpg");
        std::fs::write(&path, b"jpeg-bytes").expect("write");

        let file = ImageFile::load(&path).await.expect("load");
        assert_eq!(file.filename, "banner.jpg");
        assert_eq!(file.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(file.bytes, b"jpeg-bytes");
    }
}
