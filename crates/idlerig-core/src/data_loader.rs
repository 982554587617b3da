//! Data-driven catalog loading from JSON.
//!
//! Feature-gated behind `data-loader`. The shop content ships as a data
//! file; this module deserializes it into a [`CatalogBuilder`] so builds
//! never hardcode the item list.

use crate::catalog::{CatalogBuilder, CatalogItemDef, CatalogError, ItemKind, Tier};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("item {name}: negative price {price}")]
    NegativePrice { name: String, price: f64 },
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level catalog data file.
#[derive(Debug, serde::Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub items: Vec<ItemData>,
}

/// One shop item as it appears in the data file. Optional fields default
/// to the common case so entries stay terse.
#[derive(Debug, serde::Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub tier: Tier,
    pub price: f64,
    #[serde(default = "default_slots")]
    pub slots: u32,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub daily: f64,
    #[serde(default)]
    pub rent: f64,
    #[serde(default)]
    pub special: bool,
    #[serde(default)]
    pub hidden: bool,
}

fn default_slots() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a catalog builder from a JSON string.
pub fn load_catalog_json(json: &str) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    build_catalog(data)
}

/// Load a catalog builder from JSON bytes.
pub fn load_catalog_json_bytes(bytes: &[u8]) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_slice(bytes)?;
    build_catalog(data)
}

fn build_catalog(data: CatalogData) -> Result<CatalogBuilder, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for item in &data.items {
        if item.price < 0.0 {
            return Err(DataLoadError::NegativePrice {
                name: item.name.clone(),
                price: item.price,
            });
        }
        let mut def = CatalogItemDef::new(&item.name, item.kind, item.tier, item.price)
            .with_slots(item.slots)
            .with_power(item.power)
            .with_daily(item.daily)
            .with_rent(item.rent);
        if item.special {
            def = def.special();
        }
        if item.hidden {
            def = def.hidden();
        }
        builder.register(def);
    }
    Ok(builder)
}

// ===========================================================================
// Tests
// ===========================================================================
