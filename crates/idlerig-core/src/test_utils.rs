//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available in unit tests, integration tests, and benchmarks
//! (via the `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder, CatalogItemDef, ItemKind, Tier};
use crate::engine::Engine;
use crate::fixed::{Millis, Money};
use crate::id::ItemUid;
use crate::inventory::OwnedItem;
use crate::wallet::CurrencyKind;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn money(v: f64) -> Money {
    Money::from_num(v)
}

// ===========================================================================
// Catalog
// ===========================================================================

/// The default shop: a miner, shelf and room per ranked tier, plus the
/// miner lootbox. Names follow `kind_tier`.
pub fn default_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    let tiers: [(Tier, &str, f64, u32, f64); 5] = [
        (Tier::Basic, "basic", 100.0, 120, 6.25),
        (Tier::Common, "common", 250.0, 160, 7.81),
        (Tier::Rare, "rare", 600.0, 220, 10.31),
        (Tier::Epic, "epic", 1_500.0, 300, 13.43),
        (Tier::Legendary, "legendary", 4_000.0, 450, 18.75),
    ];
    for (tier, suffix, price, watts, daily) in tiers {
        b.register(
            CatalogItemDef::new(&format!("miner_{suffix}"), ItemKind::Miner, tier, price)
                .with_power(watts)
                .with_daily(daily),
        );
        b.register(
            CatalogItemDef::new(&format!("shelf_{suffix}"), ItemKind::Shelf, tier, price * 0.4)
                .with_slots(4),
        );
        b.register(
            CatalogItemDef::new(&format!("room_{suffix}"), ItemKind::Room, tier, price * 0.8)
                .with_slots(2),
        );
    }
    b.register(CatalogItemDef::new("miner_box", ItemKind::Miner, Tier::Box, 150.0));
    b.build().expect("default catalog is valid")
}

// ===========================================================================
// Engine fixtures
// ===========================================================================

/// Fresh engine over the default catalog with a funded coin balance.
pub fn funded_engine(coins: f64) -> Engine {
    let mut engine = Engine::new(default_catalog(), "CEO", "USER-TEST", 42, 0);
    engine.state.wallet.credit(CurrencyKind::Coin, money(coins));
    engine
}

/// A full production chain: powered room, attached shelf, installed miner
/// of the given tier, created at `now`.
pub struct Rig {
    pub room: ItemUid,
    pub shelf: ItemUid,
    pub miner: ItemUid,
}

pub fn install_rig(engine: &mut Engine, tier: Tier, now: Millis) -> Rig {
    let suffix = match tier {
        Tier::Basic => "basic",
        Tier::Common => "common",
        Tier::Rare => "rare",
        Tier::Epic => "epic",
        Tier::Legendary => "legendary",
        Tier::Box | Tier::Special => panic!("rig tiers must be ranked"),
    };
    let room_id = engine.catalog.id_of(&format!("room_{suffix}")).expect("room in catalog");
    let shelf_id = engine.catalog.id_of(&format!("shelf_{suffix}")).expect("shelf in catalog");
    let miner_id = engine.catalog.id_of(&format!("miner_{suffix}")).expect("miner in catalog");

    let room = engine
        .state
        .inventory
        .insert(OwnedItem::fresh(room_id, ItemKind::Room, tier, now));
    let shelf = engine
        .state
        .inventory
        .insert(OwnedItem::fresh(shelf_id, ItemKind::Shelf, tier, now));
    let miner = engine
        .state
        .inventory
        .insert(OwnedItem::fresh(miner_id, ItemKind::Miner, tier, now));
    if let Some(item) = engine.state.inventory.get_mut(shelf) {
        item.parent = Some(room);
    }
    if let Some(item) = engine.state.inventory.get_mut(miner) {
        item.parent = Some(shelf);
    }
    Rig { room, shelf, miner }
}
