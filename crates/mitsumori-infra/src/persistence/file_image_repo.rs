//! Blob-store-backed ImageRepository

use mitsumori_domain::repository::ImageRepository;
use mitsumori_store::BlobStore;
use mitsumori_types::Result;

pub struct FileImageRepository {
    blobs: BlobStore,
}

impl FileImageRepository {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }
}

impl ImageRepository for FileImageRepository {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let info = self.blobs.upload(path, bytes)?;
        tracing::debug!(path = %info.path, size = info.size, "image stored");
        Ok(())
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.blobs.download(path)
    }

    fn delete(&self, path: &str) -> Result<bool> {
        self.blobs.delete(path)
    }
}
