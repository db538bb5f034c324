//! Repository trait definitions for data persistence

use mitsumori_types::Result;
use mitsumori_types::{
    Category, CompanyInfo, ItemMaster, Product, QuotationDocument, QuotationTemplate,
};

/// Repository for catalog categories
pub trait CategoryRepository {
    /// Insert or replace a category
    fn save(&self, category: &Category) -> Result<()>;

    fn find_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// All categories ordered by sort order, then name
    fn find_all(&self) -> Result<Vec<Category>>;

    /// Delete a category record; returns false if it did not exist
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Repository for catalog products
pub trait ProductRepository {
    fn save(&self, product: &Product) -> Result<()>;

    fn find_by_id(&self, id: &str) -> Result<Option<Product>>;

    fn find_all(&self) -> Result<Vec<Product>>;

    /// Products that belong to a category
    fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>>;

    fn delete(&self, id: &str) -> Result<bool>;
}

/// Repository for quotation templates
pub trait QuotationTemplateRepository {
    fn save(&self, template: &QuotationTemplate) -> Result<()>;

    fn find_by_id(&self, id: &str) -> Result<Option<QuotationTemplate>>;

    fn find_all(&self) -> Result<Vec<QuotationTemplate>>;

    fn delete(&self, id: &str) -> Result<bool>;
}

/// Repository for construction item masters (工事項目マスタ)
pub trait ItemMasterRepository {
    fn save(&self, item: &ItemMaster) -> Result<()>;

    fn find_all(&self) -> Result<Vec<ItemMaster>>;

    /// Find by exact item name
    fn find_by_name(&self, name: &str) -> Result<Option<ItemMaster>>;
}

/// Single-record repository for company information
pub trait CompanyInfoRepository {
    fn load(&self) -> Result<Option<CompanyInfo>>;

    fn save(&self, info: &CompanyInfo) -> Result<()>;
}

/// Repository for saved quotation documents
pub trait QuotationDocumentRepository {
    fn save(&self, document: &QuotationDocument) -> Result<()>;

    fn find_by_id(&self, id: &str) -> Result<Option<QuotationDocument>>;

    /// All documents, newest first
    fn find_all(&self) -> Result<Vec<QuotationDocument>>;

    fn delete(&self, id: &str) -> Result<bool>;
}

/// Repository for binary objects (product images, logos, renderings)
pub trait ImageRepository {
    /// Store bytes at `path`, replacing any previous object
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<()>;

    fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Returns false if nothing was stored at `path`
    fn delete(&self, path: &str) -> Result<bool>;
}
