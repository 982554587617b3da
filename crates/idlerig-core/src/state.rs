//! The authoritative game state and its deterministic hash.

use crate::fixed::{Millis, Money};
use crate::inventory::{InventoryStore, ItemState};
use crate::ledger::Ledger;
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};

/// Maximum username length, enforced on rename.
pub const MAX_USERNAME_LEN: usize = 12;

/// Referral program sub-record. Carried through snapshots; the engine
/// itself never mutates it (the referral service is external).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub code: String,
    pub lvl1: u32,
    pub lvl2: u32,
    pub lvl3: u32,
    pub balance: Money,
    pub total_earned: Money,
}

impl Referral {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            lvl1: 0,
            lvl2: 0,
            lvl3: 0,
            balance: Money::ZERO,
            total_earned: Money::ZERO,
        }
    }
}

/// Everything the simulation owns. Mutated only through
/// [`crate::engine::Engine::tick`] and [`crate::engine::Engine::apply`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub wallet: Wallet,
    /// Accrued-but-uncollected production. Not spendable.
    pub pool: Money,
    pub inventory: InventoryStore,
    pub ledger: Ledger,
    pub username: String,
    pub created_at: Millis,
    pub referral: Referral,
    /// Wall-clock stamp of the last production accrual.
    pub last_accrual_at: Millis,
    /// Ticks executed since creation.
    pub tick: u64,
}

impl GameState {
    pub fn new(username: impl Into<String>, referral_code: impl Into<String>, now: Millis) -> Self {
        Self {
            wallet: Wallet::default(),
            pool: Money::ZERO,
            inventory: InventoryStore::new(),
            ledger: Ledger::new(),
            username: username.into(),
            created_at: now,
            referral: Referral::new(referral_code),
            last_accrual_at: now,
            tick: 0,
        }
    }

    /// FNV-1a hash of the authoritative state. Cheap enough to run every
    /// tick; used for persistence sanity checks and divergence debugging.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.tick);
        h.write_u64(self.wallet.cash.to_bits() as u64);
        h.write_u64(self.wallet.coins.to_bits() as u64);
        h.write_u64(self.pool.to_bits() as u64);
        h.write_u64(self.created_at);
        h.write(self.username.as_bytes());
        h.write_u64(self.ledger.len() as u64);
        h.write_u64(self.inventory.len() as u64);
        for (_, item) in self.inventory.iter() {
            h.write_u64(item.catalog_id.0 as u64);
            h.write_u64(item.parent.is_some() as u64);
            match &item.state {
                ItemState::Miner(m) => {
                    h.write_u64(m.health.to_bits() as u64);
                    h.write_u64(m.last_health_update_at);
                }
                ItemState::Room(r) => {
                    h.write_u64(r.last_power_paid_at);
                    h.write_u64(r.powered as u64);
                    h.write_u64(r.auto_pay as u64);
                }
                ItemState::Shelf => h.write_u64(0),
            }
        }
        h.finish()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// FNV-1a (64-bit). Fast and deterministic; not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemKind, Tier};
    use crate::fixed::f64_to_money;
    use crate::id::CatalogId;
    use crate::inventory::OwnedItem;

    #[test]
    fn fresh_state_is_empty() {
        let state = GameState::new("CEO", "USER-12345", 1_000);
        assert_eq!(state.wallet.coins, Money::ZERO);
        assert_eq!(state.pool, Money::ZERO);
        assert!(state.inventory.is_empty());
        assert_eq!(state.created_at, 1_000);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn state_hash_deterministic() {
        let a = GameState::new("CEO", "USER-1", 0);
        let b = GameState::new("CEO", "USER-1", 0);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn state_hash_sensitive_to_balances() {
        let a = GameState::new("CEO", "USER-1", 0);
        let mut b = a.clone();
        b.wallet.coins = f64_to_money(0.0001);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn state_hash_sensitive_to_inventory() {
        let a = GameState::new("CEO", "USER-1", 0);
        let mut b = a.clone();
        b.inventory
            .insert(OwnedItem::fresh(CatalogId(0), ItemKind::Miner, Tier::Basic, 0));
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn fnv_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u64(1);
        h1.write_u64(2);
        let mut h2 = StateHash::new();
        h2.write_u64(2);
        h2.write_u64(1);
        assert_ne!(h1.finish(), h2.finish());
    }
}
