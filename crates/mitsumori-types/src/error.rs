//! Error types for mitsumori

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing setting: {0}")]
    Missing(String),
}

/// Document/blob store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    #[error("Store data corrupted: {0}")]
    Corrupted(String),
}

/// Failures reported by (or while talking to) the AI inference endpoint
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Request was blocked: {0}")]
    Blocked(String),

    #[error("Response contained no candidates")]
    NoCandidates,

    #[error("Generation stopped early: {0}")]
    UnexpectedFinish(String),

    #[error("Response contained no {0} part")]
    MissingPart(&'static str),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend command failed: {0}")]
    Command(String),

    #[error("Chat stream failed: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("CSV import error: {0}")]
    CsvImport(String),

    #[error("Item master import error: {0}")]
    MasterImport(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Catalog operation failed: {0}")]
    CatalogFailed(String),

    #[error("Quotation operation failed: {0}")]
    QuotationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
