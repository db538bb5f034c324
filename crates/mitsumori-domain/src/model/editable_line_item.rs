//! Editable projection of a quotation line item (man-yen units)

use mitsumori_types::{CostRange, LineItem};
use serde::{Deserialize, Serialize};

use crate::service::cost_parser::resolve_line_item;
use crate::service::man_yen::{format_cost_range, man_to_yen, yen_to_man};

/// Name given to a freshly added line item
pub const NEW_ITEM_NAME: &str = "新規項目";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableLineItem {
    pub name: String,
    /// 最小金額 (万円)
    pub cost_min: f64,
    /// 最大金額 (万円)
    pub cost_max: f64,
}

impl EditableLineItem {
    pub fn new(name: impl Into<String>, cost_min: f64, cost_max: f64) -> Self {
        Self {
            name: name.into(),
            cost_min,
            cost_max,
        }
    }

    pub fn placeholder() -> Self {
        Self::new(NEW_ITEM_NAME, 0.0, 0.0)
    }

    /// Derive from a committed line item, recovering prices put in the name.
    pub fn from_line_item(item: &LineItem) -> Self {
        let resolved = resolve_line_item(&item.name, &item.cost_range);
        Self {
            name: resolved.name,
            cost_min: yen_to_man(resolved.range.min),
            cost_max: yen_to_man(resolved.range.max),
        }
    }

    pub fn cost_range_yen(&self) -> CostRange {
        CostRange::new(man_to_yen(self.cost_min), man_to_yen(self.cost_max))
    }

    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(self.name.clone(), format_cost_range(self.cost_range_yen()))
    }
}

/// Sum over an edit session, in man-yen
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EditTotal {
    pub min: f64,
    pub max: f64,
}

impl EditTotal {
    pub fn of(items: &[EditableLineItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            min: acc.min + item.cost_min,
            max: acc.max + item.cost_max,
        })
    }

    pub fn cost_range_yen(&self) -> CostRange {
        CostRange::new(man_to_yen(self.min), man_to_yen(self.max))
    }
}
