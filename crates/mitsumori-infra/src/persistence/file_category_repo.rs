//! Store-backed CategoryRepository

use mitsumori_domain::repository::CategoryRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{Category, Result};

pub struct FileCategoryRepository {
    store: DocumentStore,
}

impl FileCategoryRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl CategoryRepository for FileCategoryRepository {
    fn save(&self, category: &Category) -> Result<()> {
        self.store.put(collections::CATEGORIES, &category.id, category)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        self.store.get(collections::CATEGORIES, id)
    }

    fn find_all(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .store
            .list(collections::CATEGORIES)?
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(collections::CATEGORIES, id)
    }
}
