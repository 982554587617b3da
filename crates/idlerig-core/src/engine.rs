//! The simulation engine: owns the authoritative state and orchestrates
//! the tick pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - The frozen [`Catalog`]
//! - The [`GameState`] (wallet, pool, inventory arena, ledger, identity)
//! - A [`SimRng`] for box draws
//! - An [`EventBus`] for typed engine events
//! - A [`CommandQueue`] for deferred command submission
//!
//! # Tick pipeline
//!
//! Each `tick(now)` runs:
//! 1. **Commands** -- drain the queue and apply each atomically
//! 2. **Settlement** -- charge decay and credit production for the
//!    elapsed interval, capped per miner at the chain's paid-through
//!    time; detect failures
//! 3. **Rent sweep** -- expire windows, run auto-pay, flip power flags
//! 4. **Delivery** -- deliver buffered events to listeners
//! 5. **Bookkeeping** -- advance the tick counter, hash the state
//!
//! Settlement runs before the sweep (and before any command restamps a
//! rent window) so time a room spent dark is never charged as decay or
//! credited as production once the room is re-powered.
//!
//! All mutation flows through `tick` and [`Engine::apply`]; both treat the
//! state as a single serialized timeline, so there is no partial
//! application for a concurrent observer to see. A failed command leaves
//! the state byte-identical.

use crate::catalog::{Catalog, ItemKind, Tier, tier_spec};
use crate::command::{Command, CommandQueue, ExchangeDirection};
use crate::decay;
use crate::economy;
use crate::error::EngineError;
use crate::event::{Event, EventBus};
use crate::fixed::{Millis, Money, elapsed_secs, f64_to_money, per_second};
use crate::id::{CatalogId, ItemUid};
use crate::inventory::{FULL_HEALTH, OwnedItem};
use crate::ledger::Ledger;
use crate::power;
use crate::production;
use crate::rng::SimRng;
use crate::state::{GameState, MAX_USERNAME_LEN};
use crate::wallet::CurrencyKind;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What a successful command produced, beyond the state mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    None,
    /// A purchase or box draw granted this item.
    Acquired(ItemUid),
    /// A box draw: the item and the tier that was rolled.
    BoxResult { uid: ItemUid, tier: Tier },
    /// Pool collection; zero means the threshold was not met (no-op).
    Collected(Money),
    /// Rent paid for `rooms` rooms at `total` coin.
    RentSettled { rooms: u32, total: Money },
    Exchanged { spent: Money, received: Money, fee: Money },
    Withdrawn { gross: Money, fee: Money, net: Money },
}

/// Result of one `tick` call.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Queued commands applied this tick.
    pub executed_commands: u32,
    /// Queued commands rejected this tick, in submission order.
    pub rejected: Vec<EngineError>,
    /// Events delivered this tick.
    pub events: Vec<Event>,
    /// State hash after the tick.
    pub state_hash: u64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug)]
pub struct Engine {
    pub catalog: Catalog,
    pub state: GameState,
    pub rng: SimRng,
    pub bus: EventBus,
    pub queue: CommandQueue,
}

impl Engine {
    /// A fresh engine with an empty inventory and zero balances.
    pub fn new(
        catalog: Catalog,
        username: impl Into<String>,
        referral_code: impl Into<String>,
        seed: u64,
        now: Millis,
    ) -> Self {
        Self {
            catalog,
            state: GameState::new(username, referral_code, now),
            rng: SimRng::new(seed),
            bus: EventBus::default(),
            queue: CommandQueue::new(),
        }
    }

    /// Reassemble an engine from loaded state (snapshot restore).
    pub fn from_parts(catalog: Catalog, state: GameState, rng: SimRng) -> Self {
        Self {
            catalog,
            state,
            rng,
            bus: EventBus::default(),
            queue: CommandQueue::new(),
        }
    }

    fn ledger(&mut self) -> &mut Ledger {
        &mut self.state.ledger
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance the simulation to wall-clock time `now`.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        let mut report = TickReport::default();

        // Phase 1: queued commands.
        for cmd in self.queue.drain(self.state.tick) {
            match self.apply(cmd, now) {
                Ok(_) => report.executed_commands += 1,
                Err(err) => report.rejected.push(err),
            }
        }

        // Phase 2-3: timed effects. Settlement must precede the sweep so
        // auto-pay re-powering cannot backdate the dark gap.
        self.settle_timed(now);
        self.sweep_rent(now);

        // Phase 4: event delivery.
        report.events = self.bus.deliver();

        // Phase 5: bookkeeping.
        self.state.tick += 1;
        report.state_hash = self.state.state_hash();
        report
    }

    /// Rent expiry sweep. Expired rooms either auto-pay (upper tiers,
    /// opt-in, funds permitting) or go dark; power loss and forced
    /// auto-pay disable are edge-triggered events.
    fn sweep_rent(&mut self, now: Millis) {
        let rooms: Vec<ItemUid> = self
            .state
            .inventory
            .of_kind(ItemKind::Room)
            .map(|(uid, _)| uid)
            .collect();

        for uid in rooms {
            let Some(item) = self.state.inventory.get(uid) else {
                continue;
            };
            let tier = item.tier;
            let Some(room) = item.room_state() else {
                continue;
            };
            if !room.powered || !power::window_expired(room, now) {
                continue;
            }

            let rent = tier_spec(tier).map(|s| s.rent);
            let auto = room.auto_pay && tier.auto_pay_eligible();

            if let (true, Some(rent)) = (auto, rent) {
                if self.state.wallet.debit(CurrencyKind::Coin, rent).is_ok() {
                    let name = self
                        .catalog
                        .get(item.catalog_id)
                        .map(|d| d.name.clone())
                        .unwrap_or_default();
                    if let Some(room) = self
                        .state
                        .inventory
                        .get_mut(uid)
                        .and_then(|i| i.room_state_mut())
                    {
                        room.last_power_paid_at = now;
                        room.powered = true;
                    }
                    self.state
                        .ledger
                        .record(now, format!("Auto rent: {name}"), -rent, CurrencyKind::Coin);
                    self.bus.emit(Event::AutoRentPaid { room: uid, amount: rent, at: now });
                    continue;
                }
            }

            let Some(room) = self
                .state
                .inventory
                .get_mut(uid)
                .and_then(|i| i.room_state_mut())
            else {
                continue;
            };
            room.powered = false;
            if room.auto_pay {
                room.auto_pay = false;
                self.bus.emit(Event::AutoPayDisabled { room: uid, at: now });
            }
            self.bus.emit(Event::RoomPowerExpired { room: uid, at: now });
        }
    }

    /// Settle timed effects up to `now`: health decay and production
    /// accrual, charged per miner for the interval since its last
    /// settlement and capped at the chain's paid-through time. A window
    /// that lapsed mid-interval stops both decay and production at the
    /// expiry boundary; the dark remainder never counts. Every command
    /// that restamps a rent window or rewires a chain settles first, so
    /// the elapsed time is always charged under the state it ran under.
    fn settle_timed(&mut self, now: Millis) {
        self.state.last_accrual_at = now;
        let miners: Vec<ItemUid> = self
            .state
            .inventory
            .of_kind(ItemKind::Miner)
            .map(|(uid, _)| uid)
            .collect();

        let mut accrued = Money::ZERO;
        for uid in miners {
            let Some(item) = self.state.inventory.get(uid) else {
                continue;
            };
            let Some(miner) = item.miner_state() else {
                continue;
            };
            let before = miner.health;
            let stamp = miner.last_health_update_at;
            let end = production::powered_until(&self.state.inventory, item)
                .map_or(stamp, |until| until.min(now));
            let elapsed = end.saturating_sub(stamp);
            let room = production::room_of(&self.state.inventory, item);
            let daily = tier_spec(item.tier).map(|s| s.daily_production);

            let Some(miner) = self
                .state
                .inventory
                .get_mut(uid)
                .and_then(|i| i.miner_state_mut())
            else {
                continue;
            };
            miner.last_health_update_at = now;
            if elapsed == 0 || before <= Money::ZERO {
                continue;
            }
            let after = decay::apply_decay(before, elapsed);
            miner.health = after;
            if decay::crossed_failure(before, after) {
                self.bus.emit(Event::MinerFailed { miner: uid, room, at: now });
            }
            if after > Money::ZERO {
                if let Some(daily) = daily {
                    accrued += per_second(daily) * elapsed_secs(elapsed);
                }
            }
        }
        self.state.pool += accrued;
    }

    // -----------------------------------------------------------------------
    // Command dispatch
    // -----------------------------------------------------------------------

    /// Apply one command immediately. Validation happens before any
    /// mutation; an `Err` means the state is unchanged.
    pub fn apply(&mut self, cmd: Command, now: Millis) -> Result<CommandOutcome, EngineError> {
        match cmd {
            Command::Buy { catalog_id } => self.buy(catalog_id, now),
            Command::OpenBox { kind } => self.open_box(kind, now),
            Command::Install { item, parent } => self.install(item, parent, now),
            Command::Uninstall { item } => self.uninstall(item, now),
            Command::PayRent { room } => self.pay_rent(room, now),
            Command::PayAllForTier { tier } => self.pay_all_for_tier(tier, now),
            Command::ToggleAutoPay { room } => self.toggle_auto_pay(room),
            Command::DemolishRoom { room } => self.demolish_room(room, now),
            Command::Recycle { uids } => self.recycle(&uids, now),
            Command::Repair { uids } => self.repair(&uids, now),
            Command::CollectPool => self.collect_pool(now),
            Command::Exchange { direction, amount } => self.exchange(direction, amount, now),
            Command::Withdraw { amount } => self.withdraw(amount, now),
            Command::Deposit { amount } => self.deposit(amount, now),
            Command::RenameUser { name } => self.rename_user(&name),
        }
    }

    // -----------------------------------------------------------------------
    // Purchases
    // -----------------------------------------------------------------------

    fn buy(&mut self, catalog_id: CatalogId, now: Millis) -> Result<CommandOutcome, EngineError> {
        let def = self
            .catalog
            .get(catalog_id)
            .ok_or(EngineError::UnknownCatalogId(catalog_id))?;
        if def.tier == Tier::Box {
            return self.open_box_from(catalog_id, now);
        }
        let (name, kind, tier, price) = (def.name.clone(), def.kind, def.tier, def.price);

        self.state.wallet.debit(CurrencyKind::Coin, price)?;
        let uid = self
            .state
            .inventory
            .insert(OwnedItem::fresh(catalog_id, kind, tier, now));
        self.ledger()
            .record(now, format!("Bought {name}"), -price, CurrencyKind::Coin);
        self.bus.emit(Event::ItemAcquired { uid, at: now });
        Ok(CommandOutcome::Acquired(uid))
    }

    fn open_box(&mut self, kind: ItemKind, now: Millis) -> Result<CommandOutcome, EngineError> {
        let box_id = self
            .catalog
            .of_kind(kind)
            .find(|(_, d)| d.tier == Tier::Box)
            .map(|(id, _)| id)
            .ok_or(EngineError::MissingBoxEntry)?;
        self.open_box_from(box_id, now)
    }

    /// Draw from a specific box entry, charging that entry's price.
    fn open_box_from(&mut self, box_id: CatalogId, now: Millis) -> Result<CommandOutcome, EngineError> {
        let def = self
            .catalog
            .get(box_id)
            .ok_or(EngineError::UnknownCatalogId(box_id))?;
        if def.tier != Tier::Box {
            return Err(EngineError::MissingBoxEntry);
        }
        let (box_name, kind, price) = (def.name.clone(), def.kind, def.price);

        // Roll on a scratch RNG so a failed draw leaves the sequence (and
        // therefore the state) untouched.
        let mut rng = self.rng.clone();
        let tier = rng.roll_tier();
        let pool = self.catalog.drawable(kind, tier);
        let won = *rng.pick(&pool).ok_or(EngineError::EmptyTierPool)?;

        self.state.wallet.debit(CurrencyKind::Coin, price)?;
        self.rng = rng;
        let uid = self
            .state
            .inventory
            .insert(OwnedItem::fresh(won, kind, tier, now));
        self.ledger()
            .record(now, format!("Opened {box_name}"), -price, CurrencyKind::Coin);
        self.bus.emit(Event::BoxOpened { uid, tier, at: now });
        Ok(CommandOutcome::BoxResult { uid, tier })
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    fn install(
        &mut self,
        item: ItemUid,
        parent: ItemUid,
        now: Millis,
    ) -> Result<CommandOutcome, EngineError> {
        let child = self
            .state
            .inventory
            .get(item)
            .ok_or(EngineError::UnknownItem(item))?;
        let holder = self
            .state
            .inventory
            .get(parent)
            .ok_or(EngineError::UnknownItem(parent))?;

        match (child.kind, holder.kind) {
            (ItemKind::Miner, ItemKind::Shelf) | (ItemKind::Shelf, ItemKind::Room) => {}
            _ => return Err(EngineError::KindMismatch),
        }
        if let Some(miner) = child.miner_state() {
            if miner.health <= Money::ZERO {
                return Err(EngineError::ItemDisabled(item));
            }
        }
        let slots = self
            .catalog
            .get(holder.catalog_id)
            .map(|d| d.slots)
            .unwrap_or(1);
        if self.state.inventory.child_count(parent) >= slots {
            return Err(EngineError::CapacityExceeded { parent, slots });
        }

        // Settle under the old wiring before the chain changes.
        self.settle_timed(now);
        if let Some(child) = self.state.inventory.get_mut(item) {
            child.parent = Some(parent);
        }
        Ok(CommandOutcome::None)
    }

    fn uninstall(&mut self, item: ItemUid, now: Millis) -> Result<CommandOutcome, EngineError> {
        let target = self
            .state
            .inventory
            .get(item)
            .ok_or(EngineError::UnknownItem(item))?;
        if target.kind == ItemKind::Shelf && self.state.inventory.child_count(item) > 0 {
            return Err(EngineError::NotEmpty(item));
        }
        self.settle_timed(now);
        if let Some(target) = self.state.inventory.get_mut(item) {
            target.parent = None;
        }
        Ok(CommandOutcome::None)
    }

    fn demolish_room(&mut self, room: ItemUid, now: Millis) -> Result<CommandOutcome, EngineError> {
        let target = self
            .state
            .inventory
            .get(room)
            .ok_or(EngineError::UnknownItem(room))?;
        if target.kind != ItemKind::Room {
            return Err(EngineError::KindMismatch);
        }
        if self.state.inventory.child_count(room) > 0 {
            return Err(EngineError::NotEmpty(room));
        }
        let scrap = economy::scrap_value(ItemKind::Room);
        self.state.inventory.remove(room);
        self.state.wallet.credit(CurrencyKind::Coin, scrap);
        self.ledger()
            .record(now, "Demolished room", scrap, CurrencyKind::Coin);
        self.bus.emit(Event::RoomDemolished { scrap, at: now });
        Ok(CommandOutcome::None)
    }

    // -----------------------------------------------------------------------
    // Rent
    // -----------------------------------------------------------------------

    fn pay_rent(&mut self, room: ItemUid, now: Millis) -> Result<CommandOutcome, EngineError> {
        let target = self
            .state
            .inventory
            .get(room)
            .ok_or(EngineError::UnknownItem(room))?;
        if target.room_state().is_none() {
            return Err(EngineError::KindMismatch);
        }
        let rent = tier_spec(target.tier)
            .map(|s| s.rent)
            .ok_or(EngineError::KindMismatch)?;
        let name = self
            .catalog
            .get(target.catalog_id)
            .map(|d| d.name.clone())
            .unwrap_or_default();

        self.state.wallet.debit(CurrencyKind::Coin, rent)?;
        // Settle against the old window before restamping it, so a lapsed
        // gap is never retroactively covered.
        self.settle_timed(now);
        if let Some(state) = self
            .state
            .inventory
            .get_mut(room)
            .and_then(|i| i.room_state_mut())
        {
            state.last_power_paid_at = now;
            state.powered = true;
        }
        self.ledger()
            .record(now, format!("Rent: {name}"), -rent, CurrencyKind::Coin);
        self.bus.emit(Event::RentPaid { room, amount: rent, at: now });
        Ok(CommandOutcome::RentSettled { rooms: 1, total: rent })
    }

    /// Pay rent for every room of the tier that is expired or mid-window.
    /// All-or-nothing: the total is computed up front and either the whole
    /// batch settles or nothing does.
    fn pay_all_for_tier(&mut self, tier: Tier, now: Millis) -> Result<CommandOutcome, EngineError> {
        let rent = tier_spec(tier).map(|s| s.rent).ok_or(EngineError::KindMismatch)?;
        let due: Vec<ItemUid> = self
            .state
            .inventory
            .of_kind(ItemKind::Room)
            .filter(|(_, item)| item.tier == tier)
            .filter(|(_, item)| item.room_state().is_some_and(|r| power::needs_top_up(r, now)))
            .map(|(uid, _)| uid)
            .collect();

        if due.is_empty() {
            return Ok(CommandOutcome::RentSettled { rooms: 0, total: Money::ZERO });
        }

        let total = rent * Money::from_num(due.len() as u32);
        self.state.wallet.debit(CurrencyKind::Coin, total)?;
        self.settle_timed(now);
        let count = due.len() as u32;
        for uid in due {
            if let Some(state) = self
                .state
                .inventory
                .get_mut(uid)
                .and_then(|i| i.room_state_mut())
            {
                state.last_power_paid_at = now;
                state.powered = true;
            }
            self.bus.emit(Event::RentPaid { room: uid, amount: rent, at: now });
        }
        self.ledger().record(
            now,
            format!("Rent batch: {count} rooms"),
            -total,
            CurrencyKind::Coin,
        );
        Ok(CommandOutcome::RentSettled { rooms: count, total })
    }

    fn toggle_auto_pay(&mut self, room: ItemUid) -> Result<CommandOutcome, EngineError> {
        let target = self
            .state
            .inventory
            .get_mut(room)
            .ok_or(EngineError::UnknownItem(room))?;
        let eligible = target.tier.auto_pay_eligible();
        let state = target.room_state_mut().ok_or(EngineError::KindMismatch)?;
        if !eligible {
            return Err(EngineError::AutoPayUnavailable);
        }
        state.auto_pay = !state.auto_pay;
        Ok(CommandOutcome::None)
    }

    // -----------------------------------------------------------------------
    // Recycle / repair
    // -----------------------------------------------------------------------

    fn recycle(&mut self, uids: &[ItemUid], now: Millis) -> Result<CommandOutcome, EngineError> {
        if uids.is_empty() {
            return Err(EngineError::InvalidAmount(Money::ZERO));
        }
        let mut total = Money::ZERO;
        for &uid in uids {
            let item = self
                .state
                .inventory
                .get(uid)
                .ok_or(EngineError::UnknownItem(uid))?;
            if item.parent.is_some() {
                return Err(EngineError::InUse(uid));
            }
            if self.state.inventory.child_count(uid) > 0 {
                return Err(EngineError::NotEmpty(uid));
            }
            total += economy::scrap_value(item.kind);
        }

        for &uid in uids {
            self.state.inventory.remove(uid);
        }
        self.state.wallet.credit(CurrencyKind::Coin, total);
        let count = uids.len() as u32;
        self.ledger().record(
            now,
            format!("Recycled {count} items"),
            total,
            CurrencyKind::Coin,
        );
        self.bus.emit(Event::ItemRecycled { count, scrap: total, at: now });
        Ok(CommandOutcome::None)
    }

    fn repair(&mut self, uids: &[ItemUid], now: Millis) -> Result<CommandOutcome, EngineError> {
        if uids.is_empty() {
            return Err(EngineError::InvalidAmount(Money::ZERO));
        }
        for &uid in uids {
            let item = self
                .state
                .inventory
                .get(uid)
                .ok_or(EngineError::UnknownItem(uid))?;
            if item.miner_state().is_none() {
                return Err(EngineError::KindMismatch);
            }
        }

        let count = uids.len() as u32;
        let cost = f64_to_money(economy::REPAIR_COST_PER_MINER) * Money::from_num(count);
        self.state.wallet.debit(CurrencyKind::Coin, cost)?;
        // Credit any production the batch earned before the reset.
        self.settle_timed(now);
        for &uid in uids {
            if let Some(miner) = self
                .state
                .inventory
                .get_mut(uid)
                .and_then(|i| i.miner_state_mut())
            {
                miner.health = f64_to_money(FULL_HEALTH);
                miner.last_health_update_at = now;
            }
        }
        self.ledger().record(
            now,
            format!("Repaired {count} miners"),
            -cost,
            CurrencyKind::Coin,
        );
        self.bus.emit(Event::ItemRepaired { count, cost, at: now });
        Ok(CommandOutcome::None)
    }

    // -----------------------------------------------------------------------
    // Pool & exchange
    // -----------------------------------------------------------------------

    /// Move the pending pool into the coin balance. Silent no-op below
    /// the collection threshold.
    fn collect_pool(&mut self, now: Millis) -> Result<CommandOutcome, EngineError> {
        let pool = self.state.pool;
        if pool < f64_to_money(production::COLLECT_THRESHOLD) {
            return Ok(CommandOutcome::Collected(Money::ZERO));
        }
        self.state.pool = Money::ZERO;
        self.state.wallet.credit(CurrencyKind::Coin, pool);
        self.ledger()
            .record(now, "Pool collection", pool, CurrencyKind::Coin);
        self.bus.emit(Event::PoolCollected { amount: pool, at: now });
        Ok(CommandOutcome::Collected(pool))
    }

    fn exchange(
        &mut self,
        direction: ExchangeDirection,
        amount: Money,
        now: Millis,
    ) -> Result<CommandOutcome, EngineError> {
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount(amount));
        }
        match direction {
            ExchangeDirection::CoinToCash => {
                self.state.wallet.debit(CurrencyKind::Coin, amount)?;
                let conv = economy::coin_to_cash(amount);
                self.state.wallet.credit(CurrencyKind::Cash, conv.net);
                self.ledger()
                    .record(now, "Exchange: coin out", -amount, CurrencyKind::Coin);
                self.ledger()
                    .record(now, "Exchange: cash in", conv.net, CurrencyKind::Cash);
                self.bus.emit(Event::Exchanged {
                    spent: amount,
                    received: conv.net,
                    fee: conv.fee,
                    at: now,
                });
                Ok(CommandOutcome::Exchanged {
                    spent: amount,
                    received: conv.net,
                    fee: conv.fee,
                })
            }
            ExchangeDirection::CashToCoin => {
                self.state.wallet.debit(CurrencyKind::Cash, amount)?;
                let conv = economy::cash_to_coin(amount);
                self.state.wallet.credit(CurrencyKind::Coin, conv.net);
                self.ledger()
                    .record(now, "Exchange: cash out", -amount, CurrencyKind::Cash);
                self.ledger()
                    .record(now, "Exchange: coin in", conv.net, CurrencyKind::Coin);
                self.bus.emit(Event::Exchanged {
                    spent: amount,
                    received: conv.net,
                    fee: conv.fee,
                    at: now,
                });
                Ok(CommandOutcome::Exchanged {
                    spent: amount,
                    received: conv.net,
                    fee: conv.fee,
                })
            }
        }
    }

    fn withdraw(&mut self, amount: Money, now: Millis) -> Result<CommandOutcome, EngineError> {
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount(amount));
        }
        self.state.wallet.debit(CurrencyKind::Cash, amount)?;
        let conv = economy::withdraw_split(amount, self.state.created_at, now);
        self.ledger()
            .record(now, "Withdrawal", -amount, CurrencyKind::Cash);
        self.bus.emit(Event::Withdrawn { gross: amount, net: conv.net, at: now });
        Ok(CommandOutcome::Withdrawn {
            gross: amount,
            fee: conv.fee,
            net: conv.net,
        })
    }

    fn deposit(&mut self, amount: Money, now: Millis) -> Result<CommandOutcome, EngineError> {
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount(amount));
        }
        let coins = economy::deposit_coin_value(amount);
        self.state.wallet.credit(CurrencyKind::Coin, coins);
        self.ledger()
            .record(now, "Deposit", coins, CurrencyKind::Coin);
        self.bus.emit(Event::Deposited { amount: coins, at: now });
        Ok(CommandOutcome::None)
    }

    fn rename_user(&mut self, name: &str) -> Result<CommandOutcome, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidName);
        }
        self.state.username = trimmed.chars().take(MAX_USERNAME_LEN).collect();
        Ok(CommandOutcome::None)
    }

    // -----------------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------------

    /// Grant the starter kit (basic room with an attached basic shelf) if
    /// the player owns no room at all. Returns whether anything was granted.
    pub fn ensure_starter_kit(&mut self, now: Millis) -> bool {
        if self.state.inventory.of_kind(ItemKind::Room).next().is_some() {
            return false;
        }
        let room_def = self
            .catalog
            .of_kind(ItemKind::Room)
            .find(|(_, d)| d.tier == Tier::Basic);
        let shelf_def = self
            .catalog
            .of_kind(ItemKind::Shelf)
            .find(|(_, d)| d.tier == Tier::Basic);
        let (Some((room_id, _)), Some((shelf_id, _))) = (room_def, shelf_def) else {
            return false;
        };

        let room = self
            .state
            .inventory
            .insert(OwnedItem::fresh(room_id, ItemKind::Room, Tier::Basic, now));
        let shelf = self
            .state
            .inventory
            .insert(OwnedItem::fresh(shelf_id, ItemKind::Shelf, Tier::Basic, now));
        if let Some(item) = self.state.inventory.get_mut(shelf) {
            item.parent = Some(room);
        }
        self.ledger()
            .record(now, "Starter kit: room + shelf", Money::ZERO, CurrencyKind::Coin);
        true
    }
}

// ===========================================================================
// Tests
// ===========================================================================
