//! Store-backed ProductRepository

use mitsumori_domain::repository::ProductRepository;
use mitsumori_store::{collections, DocumentStore};
use mitsumori_types::{Product, Result};

pub struct FileProductRepository {
    store: DocumentStore,
}

impl FileProductRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Look up a product by its model number (品番), ignoring ASCII case
    pub fn find_by_model_number(&self, model_number: &str) -> Result<Option<Product>> {
        Ok(self
            .find_all()?
            .into_iter()
            .find(|p| !p.model_number.is_empty() && p.model_number.eq_ignore_ascii_case(model_number)))
    }
}

impl ProductRepository for FileProductRepository {
    fn save(&self, product: &Product) -> Result<()> {
        self.store.put(collections::PRODUCTS, &product.id, product)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.store.get(collections::PRODUCTS, id)
    }

    fn find_all(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .store
            .list(collections::PRODUCTS)?
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|p| p.category_id == category_id)
            .collect())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(collections::PRODUCTS, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_by_category_and_model_number() {
        let dir = TempDir::new().unwrap();
        let repo = FileProductRepository::new(DocumentStore::open(dir.path().to_path_buf()).unwrap());

        let mut cross = Product::new("cat-a", "量産クロス");
        cross.model_number = "SP-2801".to_string();
        let sofa = Product::new("cat-b", "2人掛けソファ");
        repo.save(&cross).unwrap();
        repo.save(&sofa).unwrap();

        let in_a = repo.find_by_category("cat-a").unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].id, cross.id);
        assert_eq!(repo.find_by_model_number("sp-2801").unwrap().map(|p| p.id), Some(cross.id));
        assert!(repo.find_by_model_number("").unwrap().is_none());
    }
}
