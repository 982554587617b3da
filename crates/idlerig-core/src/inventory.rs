//! The inventory arena: every owned entity instance in one indexed
//! collection, parent/child edges resolved by lookup.
//!
//! The tree (room -> shelf -> miner) is emulated with a flat slotmap plus
//! `parent` links; `children_of` is the derived accessor. Structural
//! constraints (capacity, empty-before-detach) are enforced by the
//! placement operations in [`crate::engine`], not here.

use crate::catalog::{ItemKind, Tier};
use crate::fixed::{Health, Millis, f64_to_money};
use crate::id::{CatalogId, ItemUid};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Health assigned to a freshly bought or repaired miner.
pub const FULL_HEALTH: f64 = 100.0;

// ---------------------------------------------------------------------------
// Per-kind mutable state
// ---------------------------------------------------------------------------

/// Mutable fields of a miner instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinerState {
    /// Clamped to [0, 100]. Zero means non-productive until repaired.
    pub health: Health,
    pub last_health_update_at: Millis,
}

impl MinerState {
    pub fn fresh(now: Millis) -> Self {
        Self {
            health: f64_to_money(FULL_HEALTH),
            last_health_update_at: now,
        }
    }
}

/// Mutable fields of a room instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomState {
    pub last_power_paid_at: Millis,
    /// Sticky flag maintained by the rent sweep; the authoritative check
    /// also requires the window not to have expired (`power::is_powered`).
    pub powered: bool,
    pub auto_pay: bool,
}

impl RoomState {
    /// Rooms start "just paid, powered, auto-pay off".
    pub fn fresh(now: Millis) -> Self {
        Self {
            last_power_paid_at: now,
            powered: true,
            auto_pay: false,
        }
    }
}

/// Kind-specific state of an owned item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemState {
    Miner(MinerState),
    Shelf,
    Room(RoomState),
}

// ---------------------------------------------------------------------------
// Owned item
// ---------------------------------------------------------------------------

/// One owned entity instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedItem {
    pub catalog_id: CatalogId,
    pub kind: ItemKind,
    pub tier: Tier,
    /// Ownership edge: a miner's parent is a shelf, a shelf's parent is a
    /// room, a room has none. `None` = unattached, "in storage".
    pub parent: Option<ItemUid>,
    pub acquired_at: Millis,
    pub state: ItemState,
}

impl OwnedItem {
    /// Build a new instance with kind-appropriate fresh state.
    pub fn fresh(catalog_id: CatalogId, kind: ItemKind, tier: Tier, now: Millis) -> Self {
        let state = match kind {
            ItemKind::Miner => ItemState::Miner(MinerState::fresh(now)),
            ItemKind::Shelf => ItemState::Shelf,
            ItemKind::Room => ItemState::Room(RoomState::fresh(now)),
        };
        Self {
            catalog_id,
            kind,
            tier,
            parent: None,
            acquired_at: now,
            state,
        }
    }

    pub fn miner_state(&self) -> Option<&MinerState> {
        match &self.state {
            ItemState::Miner(m) => Some(m),
            _ => None,
        }
    }

    pub fn miner_state_mut(&mut self) -> Option<&mut MinerState> {
        match &mut self.state {
            ItemState::Miner(m) => Some(m),
            _ => None,
        }
    }

    pub fn room_state(&self) -> Option<&RoomState> {
        match &self.state {
            ItemState::Room(r) => Some(r),
            _ => None,
        }
    }

    pub fn room_state_mut(&mut self) -> Option<&mut RoomState> {
        match &mut self.state {
            ItemState::Room(r) => Some(r),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Arena of all owned items. Owns the entity lifecycle; uids stay unique
/// across removals (slotmap generational keys).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryStore {
    items: SlotMap<ItemUid, OwnedItem>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: OwnedItem) -> ItemUid {
        self.items.insert(item)
    }

    pub fn remove(&mut self, uid: ItemUid) -> Option<OwnedItem> {
        self.items.remove(uid)
    }

    pub fn get(&self, uid: ItemUid) -> Option<&OwnedItem> {
        self.items.get(uid)
    }

    pub fn get_mut(&mut self, uid: ItemUid) -> Option<&mut OwnedItem> {
        self.items.get_mut(uid)
    }

    pub fn contains(&self, uid: ItemUid) -> bool {
        self.items.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemUid, &OwnedItem)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ItemUid, &mut OwnedItem)> {
        self.items.iter_mut()
    }

    /// Uids of all direct children of `parent`.
    pub fn children_of(&self, parent: ItemUid) -> Vec<ItemUid> {
        self.items
            .iter()
            .filter(|(_, item)| item.parent == Some(parent))
            .map(|(uid, _)| uid)
            .collect()
    }

    pub fn child_count(&self, parent: ItemUid) -> u32 {
        self.items
            .values()
            .filter(|item| item.parent == Some(parent))
            .count() as u32
    }

    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = (ItemUid, &OwnedItem)> {
        self.items.iter().filter(move |(_, item)| item.kind == kind)
    }

    /// Repair a store loaded from foreign or older data: clamp miner
    /// health into [0, 100] and detach parent links that do not form a
    /// valid miner -> shelf or shelf -> room edge (dangling uids included).
    /// Detached items land in storage rather than poisoning the chain walk.
    pub fn normalize(&mut self) {
        for item in self.items.values_mut() {
            if let ItemState::Miner(m) = &mut item.state {
                m.health = crate::decay::clamp_health(m.health);
            }
        }

        let detach: Vec<ItemUid> = self
            .items
            .iter()
            .filter(|(_, item)| {
                let Some(parent) = item.parent else {
                    return false;
                };
                match self.items.get(parent) {
                    None => true,
                    Some(holder) => !matches!(
                        (item.kind, holder.kind),
                        (ItemKind::Miner, ItemKind::Shelf) | (ItemKind::Shelf, ItemKind::Room)
                    ),
                }
            })
            .map(|(uid, _)| uid)
            .collect();
        for uid in detach {
            if let Some(item) = self.items.get_mut(uid) {
                item.parent = None;
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
