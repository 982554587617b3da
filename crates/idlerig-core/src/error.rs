//! Error taxonomy for engine commands.
//!
//! Every variant is recoverable and local: a failed command leaves the
//! engine state exactly as it was. The host surfaces these to the player;
//! the engine only guarantees a stable, inspectable signal.

use crate::fixed::Money;
use crate::id::{CatalogId, ItemUid};

/// Errors produced by engine commands. None are fatal to the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Money, available: Money },

    #[error("capacity exceeded: parent {parent:?} has only {slots} slots")]
    CapacityExceeded { parent: ItemUid, slots: u32 },

    #[error("item {0:?} is disabled (health depleted) and must be repaired first")]
    ItemDisabled(ItemUid),

    #[error("item {0:?} still has attached children")]
    NotEmpty(ItemUid),

    #[error("item {0:?} is in use (attached to a parent)")]
    InUse(ItemUid),

    #[error("invalid amount: {0}")]
    InvalidAmount(Money),

    #[error("invalid name")]
    InvalidName,

    #[error("unknown inventory item {0:?}")]
    UnknownItem(ItemUid),

    #[error("unknown catalog id {0:?}")]
    UnknownCatalogId(CatalogId),

    #[error("item kind does not fit this operation or parent")]
    KindMismatch,

    #[error("auto-pay is only available for rare and higher room tiers")]
    AutoPayUnavailable,

    #[error("catalog has no drawable item of the rolled tier")]
    EmptyTierPool,

    #[error("catalog has no box entry for this category")]
    MissingBoxEntry,
}
