//! Store-backed QuotationTemplateRepository

use mitsumori_domain::repository::QuotationTemplateRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{QuotationTemplate, Result};

pub struct FileQuotationTemplateRepository {
    store: DocumentStore,
}

impl FileQuotationTemplateRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl QuotationTemplateRepository for FileQuotationTemplateRepository {
    fn save(&self, template: &QuotationTemplate) -> Result<()> {
        self.store.put(collections::QUOTATION_TEMPLATES, &template.id, template)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<QuotationTemplate>> {
        self.store.get(collections::QUOTATION_TEMPLATES, id)
    }

    fn find_all(&self) -> Result<Vec<QuotationTemplate>> {
        let mut templates: Vec<QuotationTemplate> = self
            .store
            .list(collections::QUOTATION_TEMPLATES)?
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(collections::QUOTATION_TEMPLATES, id)
    }
}
