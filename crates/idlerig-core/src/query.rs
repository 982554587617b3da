//! Read-only query surface: aggregates and display values derived from
//! engine state. Nothing here mutates; hosts poll these between ticks.
//!
//! Display values leave fixed-point here (`f64` at the boundary), matching
//! the convention in [`crate::fixed`].

use crate::catalog::{Catalog, ItemKind, tier_spec};
use crate::engine::Engine;
use crate::fixed::{Health, Millis, Money, money_to_f64};
use crate::id::ItemUid;
use crate::inventory::InventoryStore;
use crate::ledger::LedgerEntry;
use crate::power;
use crate::production;

/// Fraction of nominal wattage actually drawn (PSU efficiency display).
pub const EFFECTIVE_POWER_FACTOR: f64 = 0.8;

/// Health at or below which a miner is surfaced in the repair prompt.
pub const REPAIR_PROMPT_HEALTH: f64 = 20.0;

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

/// Nominal wattage drawn by all currently producing miners.
pub fn active_power_watts(catalog: &Catalog, store: &InventoryStore, now: Millis) -> u32 {
    let mut watts = 0;
    for (_, item) in store.of_kind(ItemKind::Miner) {
        let Some(miner) = item.miner_state() else {
            continue;
        };
        if miner.health <= Money::ZERO || !production::chain_powered(store, item, now) {
            continue;
        }
        if let Some(def) = catalog.get(item.catalog_id) {
            watts += def.power_watts;
        }
    }
    watts
}

/// Effective draw after the efficiency factor, floored to whole watts.
pub fn effective_power_watts(nominal: u32) -> u32 {
    (nominal as f64 * EFFECTIVE_POWER_FACTOR) as u32
}

// ---------------------------------------------------------------------------
// Rent
// ---------------------------------------------------------------------------

/// Coin cost to refresh every owned room's window once.
pub fn total_rent_per_window(store: &InventoryStore) -> Money {
    store
        .of_kind(ItemKind::Room)
        .filter_map(|(_, item)| tier_spec(item.tier))
        .map(|spec| spec.rent)
        .sum()
}

/// Rooms with a running or expired window and the milliseconds left on
/// each, soonest expiry first. Freshly-created rooms appear with a full
/// window; expired rooms report zero.
pub fn rent_schedule(store: &InventoryStore, now: Millis) -> Vec<(ItemUid, Millis)> {
    let mut schedule: Vec<(ItemUid, Millis)> = store
        .of_kind(ItemKind::Room)
        .filter_map(|(uid, item)| {
            item.room_state()
                .map(|r| (uid, power::time_to_expiry(r, now)))
        })
        .collect();
    schedule.sort_by_key(|&(_, left)| left);
    schedule
}

// ---------------------------------------------------------------------------
// Health display
// ---------------------------------------------------------------------------

/// Display temperature in degrees Celsius: hotter as health drops, pinned
/// to 95 once the miner has failed.
pub fn temperature_c(health: Health) -> f64 {
    if health <= Money::ZERO {
        95.0
    } else {
        90.0 - money_to_f64(health) * 0.5
    }
}

/// Miners at or below the repair-prompt threshold, broken ones included.
pub fn miners_needing_repair(store: &InventoryStore) -> Vec<ItemUid> {
    store
        .of_kind(ItemKind::Miner)
        .filter(|(_, item)| {
            item.miner_state()
                .is_some_and(|m| money_to_f64(m.health) <= REPAIR_PROMPT_HEALTH)
        })
        .map(|(uid, _)| uid)
        .collect()
}

// ---------------------------------------------------------------------------
// Worth
// ---------------------------------------------------------------------------

/// Net worth in cash terms: cash balance, coin balance at the fixed
/// exchange rate, and the catalog value of every owned item at the same
/// rate. The pending pool is excluded until collected.
pub fn net_worth(engine: &Engine) -> Money {
    let mut inventory_coin = Money::ZERO;
    for (_, item) in engine.state.inventory.iter() {
        if let Some(def) = engine.catalog.get(item.catalog_id) {
            inventory_coin += def.price;
        }
    }
    engine.state.wallet.cash
        + crate::economy::coin_cash_value(engine.state.wallet.coins + inventory_coin)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// One-call aggregate of the headline display numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub daily_production: f64,
    pub power_watts: u32,
    pub effective_watts: u32,
    pub rent_per_window: f64,
    pub net_worth: f64,
    pub pool: f64,
    pub coins: f64,
    pub cash: f64,
}

pub fn dashboard(engine: &Engine, now: Millis) -> Dashboard {
    let watts = active_power_watts(&engine.catalog, &engine.state.inventory, now);
    Dashboard {
        daily_production: money_to_f64(production::active_daily_production(
            &engine.state.inventory,
            now,
        )),
        power_watts: watts,
        effective_watts: effective_power_watts(watts),
        rent_per_window: money_to_f64(total_rent_per_window(&engine.state.inventory)),
        net_worth: money_to_f64(net_worth(engine)),
        pool: money_to_f64(engine.state.pool),
        coins: money_to_f64(engine.state.wallet.coins),
        cash: money_to_f64(engine.state.wallet.cash),
    }
}

/// The most recent `n` ledger entries, oldest first.
pub fn ledger_tail(engine: &Engine, n: usize) -> &[LedgerEntry] {
    engine.state.ledger.tail(n)
}

// ===========================================================================
// Tests
// ===========================================================================
