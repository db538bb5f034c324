//! Store-backed QuotationDocumentRepository

use mitsumori_domain::repository::QuotationDocumentRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{QuotationDocument, Result};

pub struct FileQuotationDocumentRepository {
    store: DocumentStore,
}

impl FileQuotationDocumentRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl QuotationDocumentRepository for FileQuotationDocumentRepository {
    fn save(&self, document: &QuotationDocument) -> Result<()> {
        self.store.put(collections::QUOTATIONS, &document.id, document)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<QuotationDocument>> {
        self.store.get(collections::QUOTATIONS, id)
    }

    fn find_all(&self) -> Result<Vec<QuotationDocument>> {
        let mut documents: Vec<QuotationDocument> = self
            .store
            .list(collections::QUOTATIONS)?
            .into_iter()
            .map(|(_, d)| d)
            .collect();
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(documents)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(collections::QUOTATIONS, id)
    }
}
