//! Shared records for quotations, catalog and company data

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generator output may carry `null` where text is expected
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numeric price band in yen (not man-yen)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl CostRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A single amount, not a range
    pub fn single(amount: f64) -> Self {
        Self { min: amount, max: amount }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    pub fn is_single(&self) -> bool {
        self.min == self.max
    }
}

/// One work/material entry as exchanged with the generator and persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 工事項目名
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// 概算金額 (free text, e.g. "5万円〜8万円")
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cost_range: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, cost_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost_range: cost_range.into(),
        }
    }
}

/// Canonical string-based quotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationResult {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub total_cost_range: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

/// Interior or exterior renovation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenovationScope {
    #[default]
    Interior,
    Exterior,
}

impl RenovationScope {
    pub fn label(&self) -> &'static str {
        match self {
            RenovationScope::Interior => "内装",
            RenovationScope::Exterior => "外装",
        }
    }
}

/// Catalog category kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Paint,
    Wallpaper,
    Furniture,
    #[default]
    Other,
}

impl CategoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Paint => "塗料",
            CategoryKind::Wallpaper => "壁紙",
            CategoryKind::Furniture => "家具",
            CategoryKind::Other => "その他",
        }
    }
}

/// Product catalog category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: CategoryKind,
    #[serde(default)]
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }
}

/// Catalog product (paint, wallpaper, furniture, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub category_id: String,
    /// 商品名
    pub name: String,
    /// メーカー
    #[serde(default)]
    pub maker: String,
    /// 品番
    #[serde(default)]
    pub model_number: String,
    /// 単価 (yen)
    #[serde(default)]
    pub unit_price: u64,
    /// 単位 (㎡, 缶, 台, ...)
    #[serde(default)]
    pub unit: String,
    /// Blob store path of the product image
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(category_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            category_id: category_id.into(),
            name: name.into(),
            maker: String::new(),
            model_number: String::new(),
            unit_price: 0,
            unit: String::new(),
            image_path: None,
            description: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Reusable quotation starting point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: String,
}

impl QuotationTemplate {
    pub fn new(name: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            items,
            notes: String::new(),
        }
    }
}

/// Standard construction item with a unit price band (工事項目マスタ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMaster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub unit_price_min: u64,
    pub unit_price_max: u64,
}

impl ItemMaster {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, min: u64, max: u64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            unit: unit.into(),
            unit_price_min: min.min(max),
            unit_price_max: min.max(max),
        }
    }
}

/// Company information printed on quotation documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub representative: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// A saved quotation (見積書)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub customer_name: String,
    pub result: QuotationResult,
    /// Blob store path of the "before" photo
    #[serde(default)]
    pub before_image: Option<String>,
    /// Blob store path of the rendered "after" image
    #[serde(default)]
    pub after_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuotationDocument {
    pub fn new(title: impl Into<String>, customer_name: impl Into<String>, result: QuotationResult) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            customer_name: customer_name.into(),
            result,
            before_image: None,
            after_image: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of a best-effort batch operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

/// One failed item of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub item: String,
    pub reason: String,
}

impl BatchReport {
    pub fn record_success(&mut self, item: impl Into<String>) {
        self.succeeded.push(item.into());
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl ToString) {
        self.failed.push(BatchFailure {
            item: item.into(),
            reason: reason.to_string(),
        });
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotation_result_missing_fields_default() {
        let json = r#"{"items":[{"name":"クロス張替え"}]}"#;
        let result: QuotationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].cost_range, "");
        assert_eq!(result.total_cost_range, "");
        assert_eq!(result.notes, "");
    }

    #[test]
    fn test_quotation_result_null_fields_are_empty() {
        let json = r#"{"items":[{"name":"照明交換","cost_range":null}],"total_cost_range":null,"notes":null}"#;
        let result: QuotationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.items[0].cost_range, "");
        assert_eq!(result.total_cost_range, "");
        assert_eq!(result.notes, "");
    }

    #[test]
    fn test_item_master_orders_band() {
        let item = ItemMaster::new("外壁塗装", "㎡", 4000, 2500);
        assert_eq!(item.unit_price_min, 2500);
        assert_eq!(item.unit_price_max, 4000);
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.record_success("a.jpg");
        report.record_failure("b.jpg", "unsupported");
        assert_eq!(report.total(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.failed[0].reason, "unsupported");
    }

    #[test]
    fn test_scope_serializes_lowercase() {
        let json = serde_json::to_string(&RenovationScope::Exterior).unwrap();
        assert_eq!(json, "\"exterior\"");
    }
}
