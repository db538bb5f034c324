//! Catalog Service - categories, products and product images
//!
//! Deleting a category deletes its products (and their images) first; the
//! category record goes last, and only when every member deletion succeeded.
//! Bulk operations are best-effort and report per-item failures.

use std::path::Path;

use mitsumori_domain::repository::{CategoryRepository, ImageRepository, ProductRepository};
use mitsumori_infra::catalog_csv::load_products_csv;
use mitsumori_types::{BatchReport, Category, CategoryKind, Error, Product};
use thiserror::Error;

use crate::scanner::{scan_directory, validate_image};

/// Errors specific to the catalog service
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Category {category} was not deleted: product {product} failed: {reason}")]
    CascadeAborted {
        category: String,
        product: String,
        reason: String,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<Error> for CatalogServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::FileNotFound(msg) | Error::InvalidImageFormat(msg) => {
                CatalogServiceError::InvalidImage(msg)
            }
            Error::Image(e) => CatalogServiceError::InvalidImage(e.to_string()),
            Error::CsvImport(msg) => CatalogServiceError::ImportFailed(msg),
            _ => CatalogServiceError::StoreError(err.to_string()),
        }
    }
}

type ServiceResult<T> = std::result::Result<T, CatalogServiceError>;

/// Blob path of a product image
fn product_image_path(product_id: &str, extension: &str) -> String {
    format!("products/{}.{}", product_id, extension.to_lowercase())
}

pub struct CatalogService<'a> {
    categories: &'a dyn CategoryRepository,
    products: &'a dyn ProductRepository,
    images: &'a dyn ImageRepository,
}

impl<'a> CatalogService<'a> {
    pub fn new(
        categories: &'a dyn CategoryRepository,
        products: &'a dyn ProductRepository,
        images: &'a dyn ImageRepository,
    ) -> Self {
        Self {
            categories,
            products,
            images,
        }
    }

    pub fn add_category(&self, name: &str, kind: CategoryKind) -> ServiceResult<Category> {
        let mut category = Category::new(name.trim(), kind);
        category.sort_order = self.categories.find_all()?.len() as u32;
        self.categories.save(&category)?;
        tracing::info!(id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.find_all()?)
    }

    fn require_category(&self, id: &str) -> ServiceResult<Category> {
        self.categories
            .find_by_id(id)?
            .ok_or_else(|| CatalogServiceError::CategoryNotFound(id.to_string()))
    }

    /// Delete a category and all of its products.
    ///
    /// Returns the number of products deleted.
    pub fn delete_category(&self, id: &str) -> ServiceResult<usize> {
        let category = self.require_category(id)?;
        let members = self.products.find_by_category(id)?;

        for product in &members {
            self.remove_product(product)
                .map_err(|e| CatalogServiceError::CascadeAborted {
                    category: category.name.clone(),
                    product: product.name.clone(),
                    reason: e.to_string(),
                })?;
        }

        self.categories.delete(id)?;
        tracing::info!(name = %category.name, products = members.len(), "category deleted");
        Ok(members.len())
    }

    /// Add a product to an existing category
    pub fn add_product(&self, product: Product) -> ServiceResult<Product> {
        self.require_category(&product.category_id)?;
        self.products.save(&product)?;
        tracing::info!(id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    /// Products of one category, or all products
    pub fn list_products(&self, category_id: Option<&str>) -> ServiceResult<Vec<Product>> {
        Ok(match category_id {
            Some(id) => self.products.find_by_category(id)?,
            None => self.products.find_all()?,
        })
    }

    /// Image first, then the record
    fn remove_product(&self, product: &Product) -> mitsumori_types::Result<()> {
        if let Some(ref path) = product.image_path {
            if !self.images.delete(path)? {
                tracing::debug!(path = %path, "product image already gone");
            }
        }
        self.products.delete(&product.id)?;
        Ok(())
    }

    pub fn delete_product(&self, id: &str) -> ServiceResult<()> {
        let product = self
            .products
            .find_by_id(id)?
            .ok_or_else(|| CatalogServiceError::ProductNotFound(id.to_string()))?;
        self.remove_product(&product)?;
        Ok(())
    }

    /// Delete several products, continuing past failures
    pub fn delete_products(&self, ids: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for id in ids {
            match self.delete_product(id) {
                Ok(()) => report.record_success(id.as_str()),
                Err(e) => {
                    tracing::warn!(id = %id, "product delete failed: {}", e);
                    report.record_failure(id.as_str(), e);
                }
            }
        }
        report
    }

    /// Upload images found under `dir` to the products whose model number
    /// (品番) equals the file stem. `on_progress` is called after each file
    /// with (done, total).
    pub fn upload_product_images(
        &self,
        dir: &Path,
        mut on_progress: impl FnMut(usize, usize),
    ) -> ServiceResult<BatchReport> {
        let images = scan_directory(dir)?;
        let products = self.products.find_all()?;
        let mut report = BatchReport::default();

        for (index, path) in images.iter().enumerate() {
            let item = path.display().to_string();
            match self.upload_one(path, &products) {
                Ok(product_name) => {
                    tracing::debug!(file = %item, product = %product_name, "image uploaded");
                    report.record_success(item);
                }
                Err(e) => {
                    tracing::warn!(file = %item, "image upload failed: {}", e);
                    report.record_failure(item, e);
                }
            }
            on_progress(index + 1, images.len());
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "bulk image upload finished"
        );
        Ok(report)
    }

    fn upload_one(&self, path: &Path, products: &[Product]) -> ServiceResult<String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let product = products
            .iter()
            .find(|p| !p.model_number.is_empty() && p.model_number.eq_ignore_ascii_case(stem))
            .ok_or_else(|| CatalogServiceError::ProductNotFound(format!("品番 {}", stem)))?;

        validate_image(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let bytes = std::fs::read(path).map_err(Error::from)?;
        let blob_path = product_image_path(&product.id, extension);
        self.images.upload(&blob_path, &bytes)?;

        if let Some(ref old) = product.image_path {
            if *old != blob_path {
                self.images.delete(old)?;
            }
        }
        let mut updated = product.clone();
        updated.image_path = Some(blob_path);
        self.products.save(&updated)?;
        Ok(updated.name)
    }

    /// Import products from a catalog CSV into a category
    pub fn import_products_csv(&self, path: &Path, category_id: &str) -> ServiceResult<Vec<Product>> {
        self.require_category(category_id)?;
        let rows = load_products_csv(path).map_err(Error::from)?;

        let mut imported = Vec::with_capacity(rows.len());
        for row in rows {
            let mut product = Product::new(category_id, row.name);
            product.maker = row.maker;
            product.model_number = row.model_number;
            product.unit_price = row.unit_price;
            product.unit = row.unit;
            self.products.save(&product)?;
            imported.push(product);
        }
        tracing::info!(count = imported.len(), file = %path.display(), "products imported");
        Ok(imported)
    }
}
