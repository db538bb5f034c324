//! Repository adapters for the persistence layer

use std::path::PathBuf;

use mitsumori_infra::persistence::{
    FileCategoryRepository, FileCompanyInfoRepository, FileImageRepository,
    FileItemMasterRepository, FileProductRepository, FileQuotationDocumentRepository,
    FileQuotationTemplateRepository,
};
use mitsumori_store::{BlobStore, DocumentStore};
use mitsumori_types::Result;

use crate::config::Config;

/// All store-backed repositories opened on one store directory
pub struct Repositories {
    pub categories: FileCategoryRepository,
    pub products: FileProductRepository,
    pub templates: FileQuotationTemplateRepository,
    pub item_masters: FileItemMasterRepository,
    pub company: FileCompanyInfoRepository,
    pub quotations: FileQuotationDocumentRepository,
    pub images: FileImageRepository,
}

impl Repositories {
    /// Open repositories under the configured store directory
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(config.store_dir()?)
    }

    /// Open repositories under a custom directory
    pub fn open_at(store_dir: PathBuf) -> Result<Self> {
        tracing::debug!(store_dir = %store_dir.display(), "opening store");
        let documents = DocumentStore::open(store_dir.clone())?;
        let blobs = BlobStore::open(store_dir)?;
        Ok(Self {
            categories: FileCategoryRepository::new(documents.clone()),
            products: FileProductRepository::new(documents.clone()),
            templates: FileQuotationTemplateRepository::new(documents.clone()),
            item_masters: FileItemMasterRepository::new(documents.clone()),
            company: FileCompanyInfoRepository::new(documents.clone()),
            quotations: FileQuotationDocumentRepository::new(documents),
            images: FileImageRepository::new(blobs),
        })
    }
}
