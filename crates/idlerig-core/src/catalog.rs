//! Static reference data: item definitions and the tier table.
//!
//! The catalog is built once through [`CatalogBuilder`] and frozen; the
//! simulation only ever reads it. Per-item `price`/`power`/`daily`/`rent`
//! fields are purchase and display metadata. At simulation time the tier
//! table ([`TierSpec`]) is the single source of truth for a miner's daily
//! production and a room's rent, so the two numeric sources cannot drift.

use crate::fixed::{Money, f64_to_money};
use crate::id::CatalogId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Kinds and tiers
// ---------------------------------------------------------------------------

/// The three entity categories. Shelves hold miners; rooms hold shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Miner,
    Shelf,
    Room,
}

/// Rarity rank. The ranked tiers drive production, rent and box odds;
/// `Box` and `Special` are catalog/display categories with no rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Common,
    Rare,
    Epic,
    Legendary,
    Box,
    Special,
}

impl Tier {
    /// All ranked tiers, lowest to highest.
    pub const RANKED: [Tier; 5] = [
        Tier::Basic,
        Tier::Common,
        Tier::Rare,
        Tier::Epic,
        Tier::Legendary,
    ];

    /// Whether this tier participates in the ordered rarity ladder.
    pub fn is_ranked(self) -> bool {
        !matches!(self, Tier::Box | Tier::Special)
    }

    /// Auto-pay on rooms is restricted to the upper tiers.
    pub fn auto_pay_eligible(self) -> bool {
        matches!(self, Tier::Rare | Tier::Epic | Tier::Legendary)
    }
}

// ---------------------------------------------------------------------------
// Tier table
// ---------------------------------------------------------------------------

/// Simulation-time stats fixed per tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSpec {
    /// Coin produced per 24h by a miner of this tier at full health.
    pub daily_production: Money,
    /// Coin cost to refresh a room's power window.
    pub rent: Money,
}

/// Look up the tier table entry. `None` for non-ranked tiers.
pub fn tier_spec(tier: Tier) -> Option<TierSpec> {
    let (daily, rent) = match tier {
        Tier::Basic => (6.25, 0.60),
        Tier::Common => (7.81, 1.50),
        Tier::Rare => (10.31, 3.50),
        Tier::Epic => (13.43, 8.00),
        Tier::Legendary => (18.75, 20.00),
        Tier::Box | Tier::Special => return None,
    };
    Some(TierSpec {
        daily_production: f64_to_money(daily),
        rent: f64_to_money(rent),
    })
}

// ---------------------------------------------------------------------------
// Item definitions
// ---------------------------------------------------------------------------

/// An item definition in the catalog.
#[derive(Debug, Clone)]
pub struct CatalogItemDef {
    pub name: String,
    pub kind: ItemKind,
    pub tier: Tier,
    /// Cost in coin to purchase.
    pub price: Money,
    /// Capacity for children (shelves hold miners, rooms hold shelves).
    pub slots: u32,
    /// Wattage drawn. Miners only; zero elsewhere.
    pub power_watts: u32,
    /// Raw per-item daily production. Display metadata; the tier table
    /// overrides this at simulation time.
    pub daily_production: Money,
    /// Raw per-item rent. Display metadata, same caveat.
    pub rent: Money,
    /// Shop display flags. Irrelevant to the simulation.
    pub is_special: bool,
    pub hidden: bool,
}

impl CatalogItemDef {
    /// A definition with the defaults most entries share: one slot, no
    /// power draw, no production, no rent, no display flags.
    pub fn new(name: &str, kind: ItemKind, tier: Tier, price: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            tier,
            price: f64_to_money(price),
            slots: 1,
            power_watts: 0,
            daily_production: Money::ZERO,
            rent: Money::ZERO,
            is_special: false,
            hidden: false,
        }
    }

    pub fn with_slots(mut self, slots: u32) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_power(mut self, watts: u32) -> Self {
        self.power_watts = watts;
        self
    }

    pub fn with_daily(mut self, daily: f64) -> Self {
        self.daily_production = f64_to_money(daily);
        self
    }

    pub fn with_rent(mut self, rent: f64) -> Self {
        self.rent = f64_to_money(rent);
        self
    }

    pub fn special(mut self) -> Self {
        self.is_special = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Errors raised while assembling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate catalog name: {0}")]
    DuplicateName(String),
    #[error("catalog item {0} has zero slots")]
    ZeroSlots(String),
}

/// Builder for constructing an immutable [`Catalog`].
/// Register everything, then `build()`; the result has no `&mut` methods.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<CatalogItemDef>,
    name_to_id: HashMap<String, CatalogId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Returns its ID.
    pub fn register(&mut self, def: CatalogItemDef) -> CatalogId {
        let id = CatalogId(self.items.len() as u32);
        self.name_to_id.insert(def.name.clone(), id);
        self.items.push(def);
        id
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut seen = HashMap::new();
        for (idx, item) in self.items.iter().enumerate() {
            if seen.insert(item.name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateName(item.name.clone()));
            }
            if item.slots == 0 {
                return Err(CatalogError::ZeroSlots(item.name.clone()));
            }
        }
        Ok(Catalog {
            items: self.items,
            name_to_id: self.name_to_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build; thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<CatalogItemDef>,
    name_to_id: HashMap<String, CatalogId>,
}

impl Catalog {
    pub fn get(&self, id: CatalogId) -> Option<&CatalogItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<CatalogId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All entries of a kind, in registration order.
    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = (CatalogId, &CatalogItemDef)> {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.kind == kind)
            .map(|(i, d)| (CatalogId(i as u32), d))
    }

    /// Entries a box of the given kind can award: matching ranked tier,
    /// not a box entry itself, not a special.
    pub fn drawable(&self, kind: ItemKind, tier: Tier) -> Vec<CatalogId> {
        self.of_kind(kind)
            .filter(|(_, d)| d.tier == tier && !d.is_special)
            .map(|(id, _)| id)
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
