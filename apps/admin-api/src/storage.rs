//! # Media Storage
//!
//! Local directory holding uploaded product media. Rows in `product_media`
//! keep a path relative to [`MediaStorage::root`].
//!
//! Uploads are written to `products/{product_id}/{uuid}.{ext}`; the
//! client's file name only contributes its extension.
//!
//! Removal is best effort: a file that is already gone, or cannot be
//! deleted, is logged as a warning and the caller carries on deleting the
//! database rows.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Media path escapes the media root: {0}")]
    OutsideRoot(String),

    #[error("Failed to write media file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        MediaStorage {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        MediaStorage::new(&config.root, &config.public_base_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a stored file.
    pub fn url_for(&self, file_path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            file_path.trim_start_matches('/')
        )
    }

    /// Absolute path of a stored file, or `None` when `file_path` would
    /// escape the root.
    pub fn resolve(&self, file_path: &str) -> Option<PathBuf> {
        let relative = Path::new(file_path);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        inside.then(|| self.root.join(relative))
    }

    /// Writes an upload for `product_id` and returns its relative path.
    pub async fn save(
        &self,
        product_id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let file_path = format!(
            "products/{product_id}/{}.{}",
            Uuid::new_v4().simple(),
            extension_of(original_name)
        );
        let path = self
            .resolve(&file_path)
            .ok_or_else(|| StorageError::OutsideRoot(file_path.clone()))?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        info!(path = %path.display(), size = bytes.len(), "Media file stored");
        Ok(file_path)
    }

    /// Deletes a stored file. Returns whether a file was removed.
    pub async fn remove(&self, file_path: &str) -> bool {
        let Some(path) = self.resolve(file_path) else {
            warn!(file_path, "Refusing to delete media outside the media root");
            return false;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Media file removed");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Media file already missing");
                false
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove media file");
                false
            }
        }
    }
}

/// Lower-cased alphanumeric extension of `name`, `bin` when there is none.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= MAX_EXTENSION_LEN)
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_cleanly() {
        let storage = MediaStorage::new("/tmp", "/media/");
        assert_eq!(storage.url_for("/products/a.jpg"), "/media/products/a.jpg");
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let storage = MediaStorage::new("/srv/media", "/media");
        assert_eq!(
            storage.resolve("products/a.jpg"),
            Some(PathBuf::from("/srv/media/products/a.jpg"))
        );
        assert!(storage.resolve("../etc/passwd").is_none());
        assert!(storage.resolve("/etc/passwd").is_none());
    }

    #[tokio::test]
    async fn test_remove_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
        let storage = MediaStorage::new(dir.path(), "/media");

        assert!(storage.remove("a.jpg").await);
        assert!(!dir.path().join("a.jpg").exists());
        assert!(!storage.remove("a.jpg").await);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Photo.JPG"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "bin");
        assert_eq!(extension_of("evil.p/hp"), "bin");
    }

    #[tokio::test]
    async fn test_save_writes_under_product_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media");

        let path = storage.save("p1", "../../etc/passwd.png", b"png").await.unwrap();
        assert!(path.starts_with("products/p1/"));
        assert!(path.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"png");

        let err = storage.save("../x", "a.png", b"png").await.unwrap_err();
        assert!(matches!(err, StorageError::OutsideRoot(_)));
    }
}
