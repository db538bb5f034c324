//! Repositories opened on the same store directory share their data

use mitsumori_domain::repository::{
    CategoryRepository, ImageRepository, ProductRepository, QuotationTemplateRepository,
};
use mitsumori_infra::{
    FileCategoryRepository, FileImageRepository, FileProductRepository,
    FileQuotationTemplateRepository,
};
use mitsumori_store::{BlobStore, DocumentStore};
use mitsumori_types::{Category, CategoryKind, LineItem, Product, QuotationTemplate};
use tempfile::TempDir;

#[test]
fn test_reopened_store_sees_saved_records() {
    let dir = TempDir::new().unwrap();
    let category = Category::new("家具", CategoryKind::Furniture);
    let product = Product::new(&category.id, "ダイニングテーブル");

    {
        let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
        FileCategoryRepository::new(store.clone()).save(&category).unwrap();
        FileProductRepository::new(store).save(&product).unwrap();
    }

    let store = DocumentStore::open(dir.path().to_path_buf()).unwrap();
    let categories = FileCategoryRepository::new(store.clone()).find_all().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].kind, CategoryKind::Furniture);

    let products = FileProductRepository::new(store).find_by_category(&category.id).unwrap();
    assert_eq!(products[0].name, "ダイニングテーブル");
}

#[test]
fn test_template_round_trip() {
    let dir = TempDir::new().unwrap();
    let repo = FileQuotationTemplateRepository::new(DocumentStore::open(dir.path().to_path_buf()).unwrap());

    let template = QuotationTemplate::new(
        "6畳洋室 標準",
        vec![
            LineItem::new("クロス張替え", "5万円〜8万円"),
            LineItem::new("床材工事", "12万円"),
        ],
    );
    repo.save(&template).unwrap();

    let loaded = repo.find_by_id(&template.id).unwrap().unwrap();
    assert_eq!(loaded.items, template.items);
    assert!(repo.delete(&template.id).unwrap());
    assert!(!repo.delete(&template.id).unwrap());
}

#[test]
fn test_image_repository_delete() {
    let dir = TempDir::new().unwrap();
    let repo = FileImageRepository::new(BlobStore::open(dir.path().to_path_buf()).unwrap());

    repo.upload("products/p1.jpg", b"jpeg").unwrap();
    assert_eq!(repo.download("products/p1.jpg").unwrap(), b"jpeg");
    assert!(repo.delete("products/p1.jpg").unwrap());
    assert!(repo.download("products/p1.jpg").is_err());
    assert!(repo.upload("../outside.jpg", b"x").is_err());
}
