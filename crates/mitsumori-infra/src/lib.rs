//! Infrastructure layer - persistence implementations and import loaders

pub mod catalog_csv;
pub mod item_master_loader;
pub mod persistence;

pub use catalog_csv::{load_products_csv, ProductRow};
pub use item_master_loader::ItemMasterLoader;
pub use persistence::*;
