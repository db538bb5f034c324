//! Persistent stores: JSON document collections and binary blobs
//!
//! Layout under the store directory:
//! - `documents/<collection>.json` - map of record id to record
//! - `blobs/<path>` - raw bytes keyed by a relative path

mod blobs;
mod documents;

pub use blobs::{BlobInfo, BlobStore};
pub use documents::DocumentStore;

/// Collection names used by the application
pub mod collections {
    pub const CATEGORIES: &str = "categories";
    pub const PRODUCTS: &str = "products";
    pub const QUOTATION_TEMPLATES: &str = "quotation_templates";
    pub const ITEM_MASTERS: &str = "item_masters";
    pub const COMPANY_INFO: &str = "company_info";
    pub const QUOTATIONS: &str = "quotations";
}
