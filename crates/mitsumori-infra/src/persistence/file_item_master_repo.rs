//! Store-backed ItemMasterRepository

use mitsumori_domain::repository::ItemMasterRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{ItemMaster, Result};

pub struct FileItemMasterRepository {
    store: DocumentStore,
}

impl FileItemMasterRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl ItemMasterRepository for FileItemMasterRepository {
    fn save(&self, item: &ItemMaster) -> Result<()> {
        self.store.put(collections::ITEM_MASTERS, &item.id, item)
    }

    fn find_all(&self) -> Result<Vec<ItemMaster>> {
        let mut items: Vec<ItemMaster> = self
            .store
            .list(collections::ITEM_MASTERS)?
            .into_iter()
            .map(|(_, i)| i)
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<ItemMaster>> {
        Ok(self.find_all()?.into_iter().find(|i| i.name == name))
    }
}
