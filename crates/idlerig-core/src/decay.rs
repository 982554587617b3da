//! Health decay for installed, powered miners.
//!
//! Decay is a pure function of elapsed wall-clock time, so irregular tick
//! intervals cannot change the total amount lost. The tick detects the
//! >0 -> <=0 crossing by comparing health before and after and pushes the
//! failure notification through the event bus exactly once.

use crate::fixed::{Health, Millis, Money, elapsed_secs, f64_to_money, per_second};
use crate::inventory::FULL_HEALTH;

/// Health points lost per 24 hours of powered operation.
pub const DECAY_PER_DAY: f64 = 3.33;

/// Health lost over `elapsed_ms` of eligible operation.
pub fn decay_amount(elapsed_ms: Millis) -> Health {
    per_second(f64_to_money(DECAY_PER_DAY)) * elapsed_secs(elapsed_ms)
}

/// Apply decay to a health value, clamping at zero.
pub fn apply_decay(health: Health, elapsed_ms: Millis) -> Health {
    let decayed = health - decay_amount(elapsed_ms);
    decayed.max(Money::ZERO)
}

/// Whether this update crossed the failure boundary (edge trigger).
pub fn crossed_failure(before: Health, after: Health) -> bool {
    before > Money::ZERO && after <= Money::ZERO
}

/// Clamp a health value into [0, 100]. Used when loading foreign data.
pub fn clamp_health(health: Health) -> Health {
    health.clamp(Money::ZERO, f64_to_money(FULL_HEALTH))
}
