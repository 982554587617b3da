//! Power & rent lifecycle helpers.
//!
//! A room is powered iff its rent window has not expired. The stored
//! `powered` flag is maintained by the engine's rent sweep for
//! edge-triggered events; eligibility always uses the derived check here,
//! so power cuts take effect at the exact expiry instant regardless of
//! tick cadence.

use crate::fixed::Millis;
use crate::inventory::RoomState;

/// Length of one paid power window: 12 hours.
pub const RENT_WINDOW_MS: Millis = 12 * 60 * 60 * 1_000;

/// Derived powered state: paid-through time not yet reached, and the room
/// was not already swept unpowered.
pub fn is_powered(room: &RoomState, now: Millis) -> bool {
    room.powered && room.last_power_paid_at + RENT_WINDOW_MS > now
}

/// Whether the paid window has elapsed.
pub fn window_expired(room: &RoomState, now: Millis) -> bool {
    now >= room.last_power_paid_at + RENT_WINDOW_MS
}

/// Milliseconds until the window expires; zero if already expired.
pub fn time_to_expiry(room: &RoomState, now: Millis) -> Millis {
    (room.last_power_paid_at + RENT_WINDOW_MS).saturating_sub(now)
}

/// Whether a batch rent payment should include this room: expired, or
/// inside a partially elapsed window (anything short of freshly paid).
pub fn needs_top_up(room: &RoomState, now: Millis) -> bool {
    time_to_expiry(room, now) < RENT_WINDOW_MS
}
