//! Construction item master loader from TOML
//!
//! ```toml
//! [[items]]
//! name = "クロス張替え"
//! unit = "㎡"
//! unit_price_min = 1000
//! unit_price_max = 1500
//! ```

use std::fs;
use std::path::Path;

use mitsumori_types::{Error, ItemMaster, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ItemMasterFile {
    #[serde(default)]
    items: Vec<ItemMasterEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemMasterEntry {
    name: String,
    #[serde(default)]
    unit: String,
    unit_price_min: u64,
    unit_price_max: u64,
}

/// Item masters parsed from a TOML file
#[derive(Debug)]
pub struct ItemMasterLoader {
    items: Vec<ItemMaster>,
}

impl ItemMasterLoader {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::MasterImport(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let file: ItemMasterFile = toml::from_str(toml_content)
            .map_err(|e| Error::MasterImport(format!("Failed to parse item master TOML: {}", e)))?;

        let mut items = Vec::with_capacity(file.items.len());
        for entry in file.items {
            if entry.name.trim().is_empty() {
                return Err(Error::MasterImport("item with empty name".to_string()));
            }
            items.push(ItemMaster::new(
                entry.name.trim(),
                entry.unit,
                entry.unit_price_min,
                entry.unit_price_max,
            ));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[ItemMaster] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ItemMaster> {
        self.items
    }
}
