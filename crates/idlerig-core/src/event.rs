//! Typed engine events with buffered delivery.
//!
//! Subsystems emit events during a tick or command; the bus records them in
//! per-kind ring buffers and delivers them to passive listeners at the end
//! of the tick. Listeners are read-only (UI toasts, audio, stats); nothing
//! they do can mutate the engine. Kinds can be suppressed, which makes
//! recording them free.

use crate::catalog::Tier;
use crate::fixed::{Millis, Money};
use crate::id::ItemUid;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// An engine event. All events carry the wall-clock time they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Lifecycle --
    /// A miner's health crossed from above zero to zero. Edge-triggered:
    /// emitted once per failure, not on every tick the miner stays broken.
    MinerFailed { miner: ItemUid, room: Option<ItemUid>, at: Millis },
    /// A room's rent window expired and no auto-pay covered it.
    RoomPowerExpired { room: ItemUid, at: Millis },
    /// Auto-pay refreshed a room's window.
    AutoRentPaid { room: ItemUid, amount: Money, at: Millis },
    /// Auto-pay was force-disabled because the balance could not cover rent.
    AutoPayDisabled { room: ItemUid, at: Millis },
    /// Explicit rent payment.
    RentPaid { room: ItemUid, amount: Money, at: Millis },

    // -- Economy --
    PoolCollected { amount: Money, at: Millis },
    ItemAcquired { uid: ItemUid, at: Millis },
    BoxOpened { uid: ItemUid, tier: Tier, at: Millis },
    ItemRecycled { count: u32, scrap: Money, at: Millis },
    ItemRepaired { count: u32, cost: Money, at: Millis },
    RoomDemolished { scrap: Money, at: Millis },
    Exchanged { spent: Money, received: Money, fee: Money, at: Millis },
    Withdrawn { gross: Money, net: Money, at: Millis },
    Deposited { amount: Money, at: Millis },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MinerFailed,
    RoomPowerExpired,
    AutoRentPaid,
    AutoPayDisabled,
    RentPaid,
    PoolCollected,
    ItemAcquired,
    BoxOpened,
    ItemRecycled,
    ItemRepaired,
    RoomDemolished,
    Exchanged,
    Withdrawn,
    Deposited,
}

const EVENT_KIND_COUNT: usize = 14;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MinerFailed { .. } => EventKind::MinerFailed,
            Event::RoomPowerExpired { .. } => EventKind::RoomPowerExpired,
            Event::AutoRentPaid { .. } => EventKind::AutoRentPaid,
            Event::AutoPayDisabled { .. } => EventKind::AutoPayDisabled,
            Event::RentPaid { .. } => EventKind::RentPaid,
            Event::PoolCollected { .. } => EventKind::PoolCollected,
            Event::ItemAcquired { .. } => EventKind::ItemAcquired,
            Event::BoxOpened { .. } => EventKind::BoxOpened,
            Event::ItemRecycled { .. } => EventKind::ItemRecycled,
            Event::ItemRepaired { .. } => EventKind::ItemRepaired,
            Event::RoomDemolished { .. } => EventKind::RoomDemolished,
            Event::Exchanged { .. } => EventKind::Exchanged,
            Event::Withdrawn { .. } => EventKind::Withdrawn,
            Event::Deposited { .. } => EventKind::Deposited,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// Bounded buffer for one event kind. When full, the oldest event is
/// dropped; the drop count is tracked for diagnostics.
#[derive(Debug)]
struct EventBuffer {
    events: Vec<Event>,
    capacity: usize,
    dropped: u64,
}

impl EventBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    fn push(&mut self, event: Event) {
        if self.events.len() == self.capacity {
            self.events.remove(0);
            self.dropped += 1;
        }
        self.events.push(event);
    }

    fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener: called once per delivered event, read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Per-kind buffered event bus.
pub struct EventBus {
    buffers: Vec<EventBuffer>,
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: Vec<Listener>,
}

/// Default per-kind buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending_count())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with the given per-kind buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: (0..EVENT_KIND_COUNT).map(|_| EventBuffer::new(capacity)).collect(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Vec::new(),
        }
    }

    /// Record an event for delivery at the end of the tick.
    pub fn emit(&mut self, event: Event) {
        let kind = event.kind();
        if self.suppressed[kind.index()] {
            return;
        }
        self.buffers[kind.index()].push(event);
    }

    /// Suppress a kind: emitting it becomes a no-op.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    /// Register a passive listener.
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Number of events waiting for delivery.
    pub fn pending_count(&self) -> usize {
        self.buffers.iter().map(|b| b.events.len()).sum()
    }

    /// Total events dropped due to full buffers.
    pub fn dropped_count(&self) -> u64 {
        self.buffers.iter().map(|b| b.dropped).sum()
    }

    /// Deliver all buffered events to listeners and return them.
    /// Delivery order follows the kind table, then emission order.
    pub fn deliver(&mut self) -> Vec<Event> {
        let mut delivered = Vec::new();
        for buffer in &mut self.buffers {
            delivered.extend(buffer.drain());
        }
        for event in &delivered {
            for listener in &mut self.listeners {
                listener(event);
            }
        }
        delivered
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn failed_event(at: Millis) -> Event {
        let mut sm = slotmap::SlotMap::<ItemUid, ()>::with_key();
        let uid = sm.insert(());
        Event::MinerFailed { miner: uid, room: None, at }
    }

    #[test]
    fn emit_then_deliver() {
        let mut bus = EventBus::default();
        bus.emit(failed_event(1));
        bus.emit(Event::PoolCollected { amount: Money::from_num(12), at: 2 });
        assert_eq!(bus.pending_count(), 2);

        let delivered = bus.deliver();
        assert_eq!(delivered.len(), 2);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn suppressed_kind_records_nothing() {
        let mut bus = EventBus::default();
        bus.suppress(EventKind::MinerFailed);
        bus.emit(failed_event(1));
        assert_eq!(bus.pending_count(), 0);

        bus.unsuppress(EventKind::MinerFailed);
        bus.emit(failed_event(2));
        assert_eq!(bus.pending_count(), 1);
    }

    #[test]
    fn listeners_see_each_event_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::default();
        bus.subscribe(Box::new(move |e| sink.borrow_mut().push(e.kind())));

        bus.emit(failed_event(1));
        bus.emit(failed_event(2));
        bus.deliver();

        assert_eq!(&*seen.borrow(), &[EventKind::MinerFailed, EventKind::MinerFailed]);
    }

    #[test]
    fn full_buffer_drops_oldest() {
        let mut bus = EventBus::with_capacity(2);
        bus.emit(failed_event(1));
        bus.emit(failed_event(2));
        bus.emit(failed_event(3));
        assert_eq!(bus.dropped_count(), 1);

        let delivered = bus.deliver();
        assert_eq!(delivered.len(), 2);
        assert!(matches!(delivered[0], Event::MinerFailed { at: 2, .. }));
    }

    #[test]
    fn deliver_on_empty_bus_is_empty() {
        let mut bus = EventBus::default();
        assert!(bus.deliver().is_empty());
    }
}
