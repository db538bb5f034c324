//! Product catalog CSV loader
//!
//! Accepts UTF-8 (with or without BOM) and CP932 (Shift-JIS) files, the latter
//! being what Excel on Japanese Windows writes by default.
//!
//! Expected header: 商品名,メーカー,品番,単価,単位

use std::fs;
use std::path::Path;

use encoding_rs::SHIFT_JIS;
use mitsumori_domain::service::normalize_width;
use mitsumori_types::Error;
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 5] = ["商品名", "メーカー", "品番", "単価", "単位"];

#[derive(Error, Debug)]
pub enum CatalogCsvError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid price in row {row}: {value}")]
    InvalidPrice { row: usize, value: String },

    #[error("Empty product name in row {0}")]
    EmptyName(usize),
}

impl From<CatalogCsvError> for Error {
    fn from(e: CatalogCsvError) -> Self {
        Error::CsvImport(e.to_string())
    }
}

/// One product row of the import file
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub name: String,
    pub maker: String,
    pub model_number: String,
    pub unit_price: u64,
    pub unit: String,
}

/// Load product rows from a catalog CSV file
pub fn load_products_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ProductRow>, CatalogCsvError> {
    let bytes = fs::read(path)?;
    parse_products_csv(&decode(&bytes))
}

/// UTF-8 when valid, CP932 otherwise
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let (decoded, _, had_errors) = SHIFT_JIS.decode(bytes);
    if had_errors {
        tracing::warn!("some characters could not be decoded from CP932");
    }
    decoded.into_owned()
}

pub fn parse_products_csv(content: &str) -> Result<Vec<ProductRow>, CatalogCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CatalogCsvError::MissingColumn(name.to_string()))?;
    }
    let [name_col, maker_col, model_col, price_col, unit_col] = columns;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_num = row_idx + 2; // header is row 1
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let field = |col: usize| record.get(col).unwrap_or("").to_string();
        let name = field(name_col);
        if name.is_empty() {
            return Err(CatalogCsvError::EmptyName(row_num));
        }
        let unit_price = parse_price(&field(price_col)).ok_or_else(|| CatalogCsvError::InvalidPrice {
            row: row_num,
            value: field(price_col),
        })?;

        rows.push(ProductRow {
            name,
            maker: field(maker_col),
            model_number: field(model_col),
            unit_price,
            unit: field(unit_col),
        });
    }

    tracing::debug!(rows = rows.len(), "catalog CSV parsed");
    Ok(rows)
}

/// "12,800", "￥12,800", "12800円" and "" (= 0) are accepted
fn parse_price(s: &str) -> Option<u64> {
    let cleaned: String = normalize_width(s)
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | '\\' | '円' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    cleaned.parse().ok()
}
