//! Use cases

pub mod catalog_service;
pub mod chat_service;
pub mod quotation_service;
pub mod visualization_service;

pub use catalog_service::{CatalogService, CatalogServiceError};
pub use chat_service::ChatAssistant;
pub use quotation_service::{EditOp, QuotationService, QuotationServiceError};
pub use visualization_service::{RenderedImage, VisualizationService};
