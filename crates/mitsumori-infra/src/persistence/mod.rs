//! Persistence implementations
//!
//! Store-backed implementations of the domain repository traits.

mod file_category_repo;
mod file_company_info_repo;
mod file_image_repo;
mod file_item_master_repo;
mod file_product_repo;
mod file_quotation_document_repo;
mod file_quotation_template_repo;

pub use file_category_repo::FileCategoryRepository;
pub use file_company_info_repo::FileCompanyInfoRepository;
pub use file_image_repo::FileImageRepository;
pub use file_item_master_repo::FileItemMasterRepository;
pub use file_product_repo::FileProductRepository;
pub use file_quotation_document_repo::FileQuotationDocumentRepository;
pub use file_quotation_template_repo::FileQuotationTemplateRepository;
