//! Store-backed CompanyInfoRepository (single record)

use mitsumori_domain::repository::CompanyInfoRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{CompanyInfo, Result};

const COMPANY_RECORD_ID: &str = "default";

pub struct FileCompanyInfoRepository {
    store: DocumentStore,
}

impl FileCompanyInfoRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl CompanyInfoRepository for FileCompanyInfoRepository {
    fn load(&self) -> Result<Option<CompanyInfo>> {
        self.store.get(collections::COMPANY_INFO, COMPANY_RECORD_ID)
    }

    fn save(&self, info: &CompanyInfo) -> Result<()> {
        self.store.put(collections::COMPANY_INFO, COMPANY_RECORD_ID, info)
    }
}
