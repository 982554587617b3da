//! Economy statistics module for the IdleRig engine.
//!
//! Tracks per-room and global money flows over configurable tick windows.
//! Listens to core events (`RentPaid`, `AutoRentPaid`, `RoomPowerExpired`,
//! `MinerFailed`, `PoolCollected`, `Exchanged`, `Withdrawn`, and friends)
//! and aggregates them into rolling metrics using [`Money`] arithmetic.
//!
//! # Usage
//!
//! ```ignore
//! let mut stats = EconomyStats::new(StatsConfig::default());
//! // Feed the events from each tick report:
//! for event in &report.events {
//!     stats.process_event(event);
//! }
//! // Advance the tick counter:
//! stats.end_tick(engine.state.tick);
//! // Query metrics:
//! let rent = stats.rent_rate(room);
//! let net = stats.net_flow_rate();
//! ```

use std::collections::HashMap;

use idlerig_core::event::Event;
use idlerig_core::fixed::Money;
use idlerig_core::id::ItemUid;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the statistics module.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Window size in ticks for rolling averages (e.g., 60 ticks).
    pub window_size: u64,
    /// Maximum number of historical snapshots to retain per metric.
    pub history_capacity: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            history_capacity: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// RingBuffer — generic ring buffer for historical data
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer storing [`Money`] values for trend analysis.
///
/// When full, the oldest entry is overwritten. Iterates oldest-to-newest.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<Money>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            data: vec![Money::ZERO; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Push a value, overwriting the oldest entry if at capacity.
    pub fn push(&mut self, value: Money) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get the most recently pushed value, if any.
    pub fn latest(&self) -> Option<Money> {
        if self.len == 0 {
            return None;
        }
        let idx = if self.head == 0 {
            self.capacity() - 1
        } else {
            self.head - 1
        };
        Some(self.data[idx])
    }

    /// Iterate values from oldest to newest.
    pub fn iter(&self) -> RingBufferIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            self.head
        };
        RingBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Collect all stored values into a Vec (oldest to newest).
    pub fn to_vec(&self) -> Vec<Money> {
        self.iter().collect()
    }

    /// Clear all stored values without changing capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = Money::ZERO;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over [`RingBuffer`] values, oldest to newest.
pub struct RingBufferIter<'a> {
    buffer: &'a RingBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for RingBufferIter<'a> {
    type Item = Money;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.buffer.data[self.index];
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RingBufferIter<'_> {}

// ---------------------------------------------------------------------------
// Rolling window
// ---------------------------------------------------------------------------

/// A rolling window that tracks a [`Money`] sum over the most recent N ticks.
///
/// Stores per-tick amounts in a ring buffer. The `committed_total` field is
/// the sum of all committed ticks in the window. The `current` field
/// accumulates the amount for the in-progress tick (not yet committed).
///
/// # Tick lifecycle
///
/// 1. Call [`add`](Self::add) zero or more times during the tick.
/// 2. Call [`commit`](Self::commit) exactly once at end-of-tick to write the
///    current tick into the ring buffer and prepare for the next tick.
///
/// [`rate`](Self::rate) and [`total`](Self::total) include the committed
/// ticks **plus** any in-progress current tick data, so queries are accurate
/// at any point during the tick.
#[derive(Debug, Clone)]
struct RollingWindow {
    /// Committed per-tick amounts in a ring buffer.
    amounts: Vec<Money>,
    /// Write position for the next commit.
    write_pos: usize,
    /// Running total of committed amounts in the window.
    committed_total: Money,
    /// Accumulator for the current (uncommitted) tick.
    current: Money,
    /// Window size (capacity of amounts).
    window_size: usize,
    /// Number of committed ticks stored (capped at window_size).
    committed_count: usize,
}

impl RollingWindow {
    fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "RollingWindow size must be > 0");
        Self {
            amounts: vec![Money::ZERO; window_size],
            write_pos: 0,
            committed_total: Money::ZERO,
            current: Money::ZERO,
            window_size,
            committed_count: 0,
        }
    }

    /// Accumulate an amount for the current (in-progress) tick.
    fn add(&mut self, amount: Money) {
        self.current += amount;
    }

    /// Commit the current tick into the ring buffer and prepare for the next.
    ///
    /// If the ring buffer is full, the oldest tick is evicted.
    fn commit(&mut self) {
        // Evict the oldest entry if at capacity.
        if self.committed_count == self.window_size {
            self.committed_total -= self.amounts[self.write_pos];
        }

        // Write the current tick's amount into the ring buffer.
        self.amounts[self.write_pos] = self.current;
        self.committed_total += self.current;
        self.current = Money::ZERO;

        // Advance write position.
        self.write_pos = (self.write_pos + 1) % self.window_size;

        if self.committed_count < self.window_size {
            self.committed_count += 1;
        }
    }

    /// Running total over the window (committed ticks + current in-progress tick).
    fn total(&self) -> Money {
        self.committed_total + self.current
    }

    /// Compute the rolling average as amount per tick.
    ///
    /// Includes both committed ticks and the current in-progress tick.
    /// Divides by the number of contributing ticks.
    fn rate(&self) -> Money {
        let effective_count = if self.current > Money::ZERO {
            self.committed_count + 1
        } else {
            self.committed_count
        };
        if effective_count == 0 {
            return Money::ZERO;
        }
        self.total() / Money::from_num(effective_count)
    }
}

// ---------------------------------------------------------------------------
// Per-room statistics
// ---------------------------------------------------------------------------

/// Per-room statistics tracking rent flow and reliability.
#[derive(Debug, Clone)]
struct RoomStats {
    /// Rolling rent spend, manual and auto-pay combined.
    rent: RollingWindow,
    /// Rolling count of power expiries (1 per outage event).
    outages: RollingWindow,
    /// Historical rent-rate snapshots.
    rent_history: RingBuffer,
    /// Lifetime miner failures inside this room.
    failures: u64,
    /// Lifetime auto-pay refreshes.
    auto_payments: u64,
    /// Lifetime forced auto-pay disables (insufficient balance).
    auto_pay_disables: u64,
}

impl RoomStats {
    fn new(window_size: usize, history_capacity: usize) -> Self {
        Self {
            rent: RollingWindow::new(window_size),
            outages: RollingWindow::new(window_size),
            rent_history: RingBuffer::new(history_capacity),
            failures: 0,
            auto_payments: 0,
            auto_pay_disables: 0,
        }
    }

    fn record_rent(&mut self, amount: Money) {
        self.rent.add(amount);
    }

    fn record_outage(&mut self) {
        self.outages.add(Money::ONE);
    }

    /// End-of-tick accounting: snapshot history, advance windows.
    fn end_tick(&mut self) {
        self.rent_history.push(self.rent.rate());
        self.rent.commit();
        self.outages.commit();
    }
}

// ---------------------------------------------------------------------------
// Global money flows
// ---------------------------------------------------------------------------

/// Global rolling money flows, summed across all rooms and commands.
#[derive(Debug, Clone)]
struct GlobalFlows {
    /// Pool collections credited to the coin balance.
    collected: RollingWindow,
    /// Scrap credited from recycling and demolition.
    scrap: RollingWindow,
    /// Rent debited, manual and auto-pay combined.
    rent: RollingWindow,
    /// Repair bills debited.
    repairs: RollingWindow,
    /// Fees paid on exchanges and withdrawals.
    fees: RollingWindow,
    /// Fee-free cash deposits converted to coin.
    deposits: RollingWindow,
    /// Historical net-flow snapshots (income minus spend, per tick).
    net_history: RingBuffer,
}

impl GlobalFlows {
    fn new(window_size: usize, history_capacity: usize) -> Self {
        Self {
            collected: RollingWindow::new(window_size),
            scrap: RollingWindow::new(window_size),
            rent: RollingWindow::new(window_size),
            repairs: RollingWindow::new(window_size),
            fees: RollingWindow::new(window_size),
            deposits: RollingWindow::new(window_size),
            net_history: RingBuffer::new(history_capacity),
        }
    }

    fn net_rate(&self) -> Money {
        self.collected.rate() + self.scrap.rate()
            - self.rent.rate()
            - self.repairs.rate()
            - self.fees.rate()
    }

    fn end_tick(&mut self) {
        self.net_history.push(self.net_rate());
        self.collected.commit();
        self.scrap.commit();
        self.rent.commit();
        self.repairs.commit();
        self.fees.commit();
        self.deposits.commit();
    }
}

// ---------------------------------------------------------------------------
// Lifetime totals
// ---------------------------------------------------------------------------

/// Lifetime counters, never windowed. Survives until [`EconomyStats::clear`].
#[derive(Debug, Clone, Default)]
pub struct LifetimeTotals {
    /// Total coin collected from the pool.
    pub collected: Money,
    /// Total coin credited from recycling and demolition scrap.
    pub scrap: Money,
    /// Total rent paid, manual and auto-pay combined.
    pub rent: Money,
    /// Total repair bills.
    pub repairs: Money,
    /// Total fees paid on exchanges and withdrawals.
    pub fees: Money,
    /// Total cash deposited.
    pub deposited: Money,
    /// Total cash withdrawn, net of fees.
    pub withdrawn_net: Money,
    /// Total miner failures observed.
    pub failures: u64,
    /// Total room power expiries observed.
    pub outages: u64,
    /// Total items acquired (purchases and box draws).
    pub items_acquired: u64,
    /// Total boxes opened.
    pub boxes_opened: u64,
}

// ---------------------------------------------------------------------------
// EconomyStats — main module struct
// ---------------------------------------------------------------------------

/// Main economy statistics aggregator.
///
/// Accepts events via [`process_event`](EconomyStats::process_event),
/// advances time via [`end_tick`](EconomyStats::end_tick), and exposes
/// per-room and global metrics through getter methods.
///
/// All rate values use [`Money`] arithmetic for determinism.
#[derive(Debug)]
pub struct EconomyStats {
    config: StatsConfig,
    rooms: HashMap<ItemUid, RoomStats>,
    flows: GlobalFlows,
    totals: LifetimeTotals,
    /// Current tick (set by end_tick).
    current_tick: u64,
}

impl EconomyStats {
    /// Create a new economy stats tracker with the given configuration.
    pub fn new(config: StatsConfig) -> Self {
        let flows = GlobalFlows::new(config.window_size as usize, config.history_capacity);
        Self {
            config,
            rooms: HashMap::new(),
            flows,
            totals: LifetimeTotals::default(),
            current_tick: 0,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Get the current tick.
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    // -- Event processing ---------------------------------------------------

    /// Process a single event, updating internal counters.
    ///
    /// Call this for each event in a tick report, then call
    /// [`end_tick`](Self::end_tick) to finalize the tick and advance the
    /// rolling windows.
    pub fn process_event(&mut self, event: &Event) {
        match event {
            Event::RentPaid { room, amount, .. } => {
                self.get_or_create_room(*room).record_rent(*amount);
                self.flows.rent.add(*amount);
                self.totals.rent += *amount;
            }

            Event::AutoRentPaid { room, amount, .. } => {
                let stats = self.get_or_create_room(*room);
                stats.record_rent(*amount);
                stats.auto_payments += 1;
                self.flows.rent.add(*amount);
                self.totals.rent += *amount;
            }

            Event::RoomPowerExpired { room, .. } => {
                self.get_or_create_room(*room).record_outage();
                self.totals.outages += 1;
            }

            Event::AutoPayDisabled { room, .. } => {
                self.get_or_create_room(*room).auto_pay_disables += 1;
            }

            Event::MinerFailed { room, .. } => {
                if let Some(room) = room {
                    self.get_or_create_room(*room).failures += 1;
                }
                self.totals.failures += 1;
            }

            Event::PoolCollected { amount, .. } => {
                self.flows.collected.add(*amount);
                self.totals.collected += *amount;
            }

            Event::ItemRecycled { scrap, .. } | Event::RoomDemolished { scrap, .. } => {
                self.flows.scrap.add(*scrap);
                self.totals.scrap += *scrap;
            }

            Event::ItemRepaired { cost, .. } => {
                self.flows.repairs.add(*cost);
                self.totals.repairs += *cost;
            }

            Event::Exchanged { fee, .. } => {
                self.flows.fees.add(*fee);
                self.totals.fees += *fee;
            }

            Event::Withdrawn { gross, net, .. } => {
                let fee = *gross - *net;
                self.flows.fees.add(fee);
                self.totals.fees += fee;
                self.totals.withdrawn_net += *net;
            }

            Event::Deposited { amount, .. } => {
                self.flows.deposits.add(*amount);
                self.totals.deposited += *amount;
            }

            Event::ItemAcquired { .. } => {
                self.totals.items_acquired += 1;
            }

            Event::BoxOpened { .. } => {
                self.totals.items_acquired += 1;
                self.totals.boxes_opened += 1;
            }
        }
    }

    /// Finalize the current tick and advance all rolling windows.
    ///
    /// Must be called once per tick after all events have been processed.
    pub fn end_tick(&mut self, tick: u64) {
        self.current_tick = tick;

        for room in self.rooms.values_mut() {
            room.end_tick();
        }
        self.flows.end_tick();
    }

    // -- Per-room queries ---------------------------------------------------

    /// Get the rent spend rate (coin/tick) for a room.
    ///
    /// Returns the rolling average over the configured window, with manual
    /// and auto-pay payments combined.
    pub fn rent_rate(&self, room: ItemUid) -> Money {
        self.rooms
            .get(&room)
            .map(|r| r.rent.rate())
            .unwrap_or(Money::ZERO)
    }

    /// Get the power-outage rate (expiries/tick) for a room.
    pub fn outage_rate(&self, room: ItemUid) -> Money {
        self.rooms
            .get(&room)
            .map(|r| r.outages.rate())
            .unwrap_or(Money::ZERO)
    }

    /// Get the lifetime miner-failure count for a room.
    pub fn room_failures(&self, room: ItemUid) -> u64 {
        self.rooms.get(&room).map(|r| r.failures).unwrap_or(0)
    }

    /// Get the lifetime auto-pay refresh count for a room.
    pub fn room_auto_payments(&self, room: ItemUid) -> u64 {
        self.rooms.get(&room).map(|r| r.auto_payments).unwrap_or(0)
    }

    /// Get the lifetime forced auto-pay disable count for a room.
    pub fn room_auto_pay_disables(&self, room: ItemUid) -> u64 {
        self.rooms
            .get(&room)
            .map(|r| r.auto_pay_disables)
            .unwrap_or(0)
    }

    // -- Global queries -----------------------------------------------------

    /// Get the pool collection rate (coin/tick) across the whole account.
    pub fn collected_rate(&self) -> Money {
        self.flows.collected.rate()
    }

    /// Get the scrap income rate (coin/tick) from recycling and demolition.
    pub fn scrap_rate(&self) -> Money {
        self.flows.scrap.rate()
    }

    /// Get the total rent spend rate (coin/tick) across all rooms.
    pub fn rent_spend_rate(&self) -> Money {
        self.flows.rent.rate()
    }

    /// Get the repair spend rate (coin/tick).
    pub fn repair_rate(&self) -> Money {
        self.flows.repairs.rate()
    }

    /// Get the fee rate (per tick) across exchanges and withdrawals.
    pub fn fee_rate(&self) -> Money {
        self.flows.fees.rate()
    }

    /// Get the deposit rate (cash/tick).
    pub fn deposit_rate(&self) -> Money {
        self.flows.deposits.rate()
    }

    /// Get the net money flow rate per tick.
    ///
    /// Income (collections and scrap) minus spend (rent, repairs, and fees).
    /// Deposits are internal transfers and are excluded.
    pub fn net_flow_rate(&self) -> Money {
        self.flows.net_rate()
    }

    /// Get the lifetime totals.
    pub fn totals(&self) -> &LifetimeTotals {
        &self.totals
    }

    // -- Historical data ----------------------------------------------------

    /// Get the historical rent-rate data for a room.
    ///
    /// Returns a Vec of [`Money`] values from oldest to newest, representing
    /// the rent spend rate at each past tick.
    pub fn rent_history(&self, room: ItemUid) -> Vec<Money> {
        self.rooms
            .get(&room)
            .map(|r| r.rent_history.to_vec())
            .unwrap_or_default()
    }

    /// Get the net-flow history, oldest to newest.
    pub fn net_flow_history(&self) -> Vec<Money> {
        self.flows.net_history.to_vec()
    }

    // -- Utility ------------------------------------------------------------

    /// Remove all statistics for a room (e.g., after demolition).
    pub fn remove_room(&mut self, room: ItemUid) {
        self.rooms.remove(&room);
    }

    /// Clear all statistics, resetting to a fresh state.
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.flows =
            GlobalFlows::new(self.config.window_size as usize, self.config.history_capacity);
        self.totals = LifetimeTotals::default();
        self.current_tick = 0;
    }

    /// Number of tracked rooms.
    pub fn tracked_room_count(&self) -> usize {
        self.rooms.len()
    }

    // -- Internal helpers ---------------------------------------------------

    fn get_or_create_room(&mut self, room: ItemUid) -> &mut RoomStats {
        let ws = self.config.window_size as usize;
        let hc = self.config.history_capacity;
        self.rooms
            .entry(room)
            .or_insert_with(|| RoomStats::new(ws, hc))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
