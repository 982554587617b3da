//! IdleRig Core -- the simulation engine for an idle crypto-mining game.
//!
//! This crate owns the full economy loop: the item catalog, the inventory
//! arena (rooms holding shelves holding miners), the power & rent
//! lifecycle, health decay, the production accumulator, the two-currency
//! wallet with exchange and withdrawal fees, an append-only ledger, and
//! versioned snapshot persistence. All simulation math is Q32.32
//! fixed-point for cross-platform determinism.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::tick`] advances the simulation to a
//! host-supplied wall-clock time through the following phases:
//!
//! 1. **Commands** -- Drain the queue and apply each command atomically.
//! 2. **Settlement** -- Charge decay and credit production for the
//!    elapsed interval, capped per miner at its chain's paid-through time.
//! 3. **Rent sweep** -- Expire power windows and run auto-pay.
//! 4. **Delivery** -- Deliver buffered events to listeners.
//! 5. **Bookkeeping** -- Advance the tick counter and hash the state.
//!
//! The engine never reads a clock; `now` arrives with every tick and
//! command, so tests and replays control time completely.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Simulation engine and command dispatcher.
//! - [`catalog::Catalog`] -- Immutable shop catalog and tier table
//!   (frozen at startup).
//! - [`inventory::InventoryStore`] -- Slotmap arena of owned items with
//!   parent links forming the room/shelf/miner tree.
//! - [`fixed::Money`] -- Q32.32 fixed-point type for deterministic math.
//! - [`event::EventBus`] -- Buffered, suppressible event delivery.
//! - [`snapshot`] -- Versioned bitcode persistence with a history ring.

pub mod catalog;
pub mod command;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod decay;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod fixed;
pub mod id;
pub mod inventory;
pub mod ledger;
pub mod migration;
pub mod power;
pub mod production;
pub mod query;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod wallet;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
