//! The command surface and the input queue.
//!
//! Commands are the only way the host mutates the engine besides the tick.
//! They can be applied immediately through [`crate::engine::Engine::apply`]
//! or queued here and drained at the next tick boundary, which keeps
//! command application serialized against the tick pipeline.

use crate::catalog::{ItemKind, Tier};
use crate::fixed::Money;
use crate::id::{CatalogId, ItemUid};
use serde::{Deserialize, Serialize};

/// Direction of a wallet exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeDirection {
    CoinToCash,
    CashToCoin,
}

/// A single command submitted by the host (UI layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Purchase a catalog entry. Box-tier entries roll a random item.
    Buy { catalog_id: CatalogId },
    /// Purchase and open the box entry for the given category.
    OpenBox { kind: ItemKind },
    Install { item: ItemUid, parent: ItemUid },
    Uninstall { item: ItemUid },
    PayRent { room: ItemUid },
    PayAllForTier { tier: Tier },
    ToggleAutoPay { room: ItemUid },
    DemolishRoom { room: ItemUid },
    Recycle { uids: Vec<ItemUid> },
    Repair { uids: Vec<ItemUid> },
    CollectPool,
    Exchange { direction: ExchangeDirection, amount: Money },
    Withdraw { amount: Money },
    Deposit { amount: Money },
    RenameUser { name: String },
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next tick boundary, with optional history
/// retention for debugging.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    history: Vec<(u64, Command)>,
    max_history: usize,
}

impl CommandQueue {
    /// An empty queue with no history tracking.
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue retaining up to `max_history` executed commands.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Drain all pending commands in submission order, moving them into
    /// history tagged with `tick`.
    pub fn drain(&mut self, tick: u64) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();
        if self.max_history > 0 {
            for cmd in &commands {
                self.history.push((tick, cmd.clone()));
            }
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }
        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
