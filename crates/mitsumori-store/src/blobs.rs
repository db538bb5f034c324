//! Binary objects (images, logos) keyed by relative path

use std::fs;
use std::path::{Component, Path, PathBuf};

use mitsumori_types::{Result, StoreError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata of a stored blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

/// File-backed blob store
#[derive(Debug, Clone)]
pub struct BlobStore {
    blobs_dir: PathBuf,
}

impl BlobStore {
    /// Create or open a blob store under `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        let blobs_dir = store_dir.join("blobs");
        fs::create_dir_all(&blobs_dir)?;
        Ok(Self { blobs_dir })
    }

    /// Compute the SHA256 of some bytes
    pub fn hash_bytes(bytes: &[u8]) -> String {
        format!("{:x}", Sha256::digest(bytes))
    }

    /// Map a blob path onto the filesystem, refusing anything that could
    /// escape the blob directory.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let invalid = || StoreError::InvalidPath(path.to_string());
        if path.trim().is_empty() || path.contains('\\') {
            return Err(invalid().into());
        }
        let relative = Path::new(path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(invalid().into());
        }
        Ok(self.blobs_dir.join(relative))
    }

    pub fn upload(&self, path: &str, bytes: &[u8]) -> Result<BlobInfo> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        tracing::debug!(path, size = bytes.len(), "blob uploaded");
        Ok(BlobInfo {
            path: path.to_string(),
            size: bytes.len() as u64,
            sha256: Self::hash_bytes(bytes),
        })
    }

    pub fn download(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Err(StoreError::BlobNotFound(path.to_string()).into());
        }
        Ok(fs::read(target)?)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Remove a blob; returns false if nothing was stored there
    pub fn delete(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Ok(false);
        }
        fs::remove_file(&target)?;
        tracing::debug!(path, "blob deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitsumori_types::Error;
    use tempfile::tempdir;

    #[test]
    fn test_upload_download_delete() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().to_path_buf()).unwrap();

        let info = store.upload("products/p1.jpg", b"jpeg-bytes").unwrap();
        assert_eq!(info.size, 10);
        assert_eq!(info.sha256, BlobStore::hash_bytes(b"jpeg-bytes"));
        assert!(store.exists("products/p1.jpg"));
        assert_eq!(store.download("products/p1.jpg").unwrap(), b"jpeg-bytes");

        assert!(store.delete("products/p1.jpg").unwrap());
        assert!(!store.delete("products/p1.jpg").unwrap());
        assert!(!store.exists("products/p1.jpg"));
    }

    #[test]
    fn test_download_missing() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().to_path_buf()).unwrap();
        let err = store.download("logo.png").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::BlobNotFound(_))));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let store = BlobStore::open(dir.path().to_path_buf()).unwrap();
        for path in ["", "../x.png", "/etc/passwd", "a/../../b", "a\\b", "./x"] {
            assert!(store.upload(path, b"x").is_err(), "accepted {:?}", path);
        }
    }
}
