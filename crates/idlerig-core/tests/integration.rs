//! Integration tests for the IdleRig simulation engine.
//!
//! These tests exercise end-to-end behavior across the full pipeline:
//! purchases, placement, power & rent, decay, production accrual, the
//! economy surface, persistence, and determinism.

use idlerig_core::catalog::{ItemKind, Tier};
use idlerig_core::command::{Command, ExchangeDirection};
use idlerig_core::engine::{CommandOutcome, Engine};
use idlerig_core::error::EngineError;
use idlerig_core::event::Event;
use idlerig_core::fixed::{f64_to_money, money_to_f64, Money, MS_PER_DAY};
use idlerig_core::power::RENT_WINDOW_MS;
use idlerig_core::query;
use idlerig_core::snapshot::SnapshotHistory;
use idlerig_core::test_utils::*;
use idlerig_core::wallet::CurrencyKind;

const HOUR_MS: u64 = 3_600_000;

// ===========================================================================
// Production lifecycle
// ===========================================================================

#[test]
fn one_hour_of_basic_mining() {
    let mut engine = funded_engine(0.0);
    install_rig(&mut engine, Tier::Basic, 0);

    engine.tick(HOUR_MS);

    // 6.25 coin/day for one hour: 6.25 / 86400 * 3600.
    let pool = money_to_f64(engine.state.pool);
    assert!((pool - 0.260416).abs() < 1e-4, "pool was {pool}");
}

#[test]
fn accrual_is_tick_cadence_independent() {
    let run = |steps: u64| {
        let mut engine = funded_engine(0.0);
        install_rig(&mut engine, Tier::Legendary, 0);
        let step = HOUR_MS / steps;
        for i in 1..=steps {
            engine.tick(i * step);
        }
        engine.state.pool
    };
    let coarse = run(1);
    let fine = run(60);
    let diff = money_to_f64(coarse - fine).abs();
    assert!(diff < 1e-6, "coarse {coarse} vs fine {fine}");
}

#[test]
fn full_collect_cycle() {
    let mut engine = funded_engine(100.0);
    let rig = install_rig(&mut engine, Tier::Legendary, 0);

    // Keep power topped up while the pool crosses the 10-coin threshold.
    // Legendary mines 18.75/day, so ~13 hours suffices.
    let mut now = 0;
    for _ in 0..2 {
        now += RENT_WINDOW_MS - 1;
        engine.tick(now);
        engine.apply(Command::PayRent { room: rig.room }, now).unwrap();
    }
    assert!(money_to_f64(engine.state.pool) > 10.0);

    let outcome = engine.apply(Command::CollectPool, now).unwrap();
    let CommandOutcome::Collected(amount) = outcome else {
        panic!("expected Collected");
    };
    assert!(amount > Money::ZERO);
    assert_eq!(engine.state.pool, Money::ZERO);
}

#[test]
fn expired_rent_stops_everything() {
    let mut engine = funded_engine(0.0);
    let rig = install_rig(&mut engine, Tier::Basic, 0);

    engine.tick(RENT_WINDOW_MS);
    let pool = engine.state.pool;
    let health = engine
        .state
        .inventory
        .get(rig.miner)
        .unwrap()
        .miner_state()
        .unwrap()
        .health;

    // A further week changes nothing while the room is dark.
    engine.tick(RENT_WINDOW_MS + 7 * MS_PER_DAY);
    assert_eq!(engine.state.pool, pool);
    let later = engine
        .state
        .inventory
        .get(rig.miner)
        .unwrap()
        .miner_state()
        .unwrap()
        .health;
    assert_eq!(later, health);
    assert_eq!(
        query::active_power_watts(&engine.catalog, &engine.state.inventory, RENT_WINDOW_MS + 7 * MS_PER_DAY),
        0
    );
}

#[test]
fn miner_fails_after_thirty_days_powered() {
    let mut engine = funded_engine(100_000.0);
    let rig = install_rig(&mut engine, Tier::Rare, 0);
    engine.apply(Command::ToggleAutoPay { room: rig.room }, 0).unwrap();

    // 100 / 3.33 is just over 30 days; walk 32 days in half-day ticks so
    // auto-pay keeps the room lit the whole way.
    let mut failures = 0;
    for i in 1..=64 {
        let report = engine.tick(i * RENT_WINDOW_MS);
        failures += report
            .events
            .iter()
            .filter(|e| matches!(e, Event::MinerFailed { .. }))
            .count();
    }
    assert_eq!(failures, 1);

    let health = engine
        .state
        .inventory
        .get(rig.miner)
        .unwrap()
        .miner_state()
        .unwrap()
        .health;
    assert_eq!(health, Money::ZERO);
    assert_eq!(query::temperature_c(health), 95.0);
}

#[test]
fn month_long_offline_gap_is_survivable() {
    let mut engine = funded_engine(1_000.0);
    let rig = install_rig(&mut engine, Tier::Rare, 0);
    engine.apply(Command::ToggleAutoPay { room: rig.room }, 0).unwrap();

    engine.tick(1_000);
    engine.tick(26 * MS_PER_DAY);

    // Only the paid window counts, however long the gap: about half a day
    // of decay and of rare-tier production.
    let health = money_to_f64(
        engine.state.inventory.get(rig.miner).unwrap().miner_state().unwrap().health,
    );
    assert!(health > 98.0 && health < 98.4, "health was {health}");
    let pool = money_to_f64(engine.state.pool);
    assert!(pool > 5.0 && pool < 5.2, "pool was {pool}");

    // Auto-pay re-lit the room at the tick itself.
    let room = engine.state.inventory.get(rig.room).unwrap().room_state().unwrap();
    assert!(room.powered);
    assert_eq!(room.last_power_paid_at, 26 * MS_PER_DAY);
}

#[test]
fn auto_pay_repower_skips_dark_gap() {
    let mut engine = funded_engine(1_000.0);
    let rig = install_rig(&mut engine, Tier::Rare, 0);
    engine.apply(Command::ToggleAutoPay { room: rig.room }, 0).unwrap();

    engine.tick(1_000);
    let report = engine.tick(5 * MS_PER_DAY);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, Event::AutoRentPaid { room: r, .. } if *r == rig.room)));

    // The 4.5 dark days are not backdated onto the freshly paid window.
    let health = money_to_f64(
        engine.state.inventory.get(rig.miner).unwrap().miner_state().unwrap().health,
    );
    assert!(health > 98.0 && health < 98.4, "health was {health}");

    // Time resumes normally from the re-power stamp.
    let pool_before = engine.state.pool;
    engine.tick(5 * MS_PER_DAY + HOUR_MS);
    let hour_pool = money_to_f64(engine.state.pool - pool_before);
    assert!((hour_pool - 10.31 / 24.0).abs() < 1e-3, "hour accrued {hour_pool}");
    let later = money_to_f64(
        engine.state.inventory.get(rig.miner).unwrap().miner_state().unwrap().health,
    );
    assert!((health - later - 3.33 / 24.0).abs() < 1e-3, "hour decay was {}", health - later);
}

// ===========================================================================
// Shop and placement
// ===========================================================================

#[test]
fn build_a_rig_through_commands() {
    let mut engine = funded_engine(1_000.0);
    let buy = |engine: &mut Engine, name: &str, now: u64| {
        let id = engine.catalog.id_of(name).unwrap();
        match engine.apply(Command::Buy { catalog_id: id }, now).unwrap() {
            CommandOutcome::Acquired(uid) => uid,
            other => panic!("unexpected outcome {other:?}"),
        }
    };

    let room = buy(&mut engine, "room_basic", 0);
    let shelf = buy(&mut engine, "shelf_basic", 0);
    let miner = buy(&mut engine, "miner_basic", 0);
    engine.apply(Command::Install { item: shelf, parent: room }, 0).unwrap();
    engine.apply(Command::Install { item: miner, parent: shelf }, 0).unwrap();

    // room 80 + shelf 40 + miner 100 = 220 spent.
    assert!((money_to_f64(engine.state.wallet.coins) - 780.0).abs() < 1e-9);

    engine.tick(HOUR_MS);
    assert!(engine.state.pool > Money::ZERO);
    assert_eq!(engine.state.ledger.len(), 3);
}

#[test]
fn shelf_capacity_enforced_through_chain() {
    let mut engine = funded_engine(100_000.0);
    let rig = install_rig(&mut engine, Tier::Basic, 0);
    let miner_id = engine.catalog.id_of("miner_basic").unwrap();

    // Default shelves hold 4; one is already installed.
    let mut installed = 1;
    loop {
        let uid = match engine.apply(Command::Buy { catalog_id: miner_id }, 0).unwrap() {
            CommandOutcome::Acquired(uid) => uid,
            other => panic!("unexpected outcome {other:?}"),
        };
        match engine.apply(Command::Install { item: uid, parent: rig.shelf }, 0) {
            Ok(_) => installed += 1,
            Err(EngineError::CapacityExceeded { slots, .. }) => {
                assert_eq!(slots, 4);
                break;
            }
            Err(other) => panic!("unexpected error {other}"),
        }
    }
    assert_eq!(installed, 4);
}

#[test]
fn recycle_requires_detachment() {
    let mut engine = funded_engine(0.0);
    let rig = install_rig(&mut engine, Tier::Basic, 0);

    let err = engine
        .apply(Command::Recycle { uids: vec![rig.miner] }, 0)
        .unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.apply(Command::Uninstall { item: rig.miner }, 0).unwrap();
    engine.apply(Command::Recycle { uids: vec![rig.miner] }, 0).unwrap();
    assert!(!engine.state.inventory.contains(rig.miner));
    assert_eq!(money_to_f64(engine.state.wallet.coins), 20.0);
}

#[test]
fn teardown_scraps_everything() {
    let mut engine = funded_engine(0.0);
    let rig = install_rig(&mut engine, Tier::Basic, 0);

    engine.apply(Command::Uninstall { item: rig.miner }, 0).unwrap();
    engine.apply(Command::Uninstall { item: rig.shelf }, 0).unwrap();
    engine
        .apply(Command::Recycle { uids: vec![rig.miner, rig.shelf] }, 0)
        .unwrap();
    engine.apply(Command::DemolishRoom { room: rig.room }, 0).unwrap();

    // 20 + 4 + 8 coin of scrap; inventory empty.
    assert_eq!(money_to_f64(engine.state.wallet.coins), 32.0);
    assert!(engine.state.inventory.is_empty());
}

#[test]
fn box_draws_are_seed_deterministic() {
    let draw = |seed: u64| {
        let mut engine = Engine::new(default_catalog(), "CEO", "USER-1", seed, 0);
        engine.state.wallet.credit(CurrencyKind::Coin, money(10_000.0));
        let mut tiers = Vec::new();
        for _ in 0..10 {
            match engine.apply(Command::OpenBox { kind: ItemKind::Miner }, 0).unwrap() {
                CommandOutcome::BoxResult { tier, .. } => tiers.push(tier),
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        tiers
    };
    assert_eq!(draw(7), draw(7));
    assert_ne!(draw(7), draw(8));
}

// ===========================================================================
// Economy
// ===========================================================================

#[test]
fn mine_exchange_withdraw_pipeline() {
    let mut engine = funded_engine(2_000.0);
    let now = 25 * MS_PER_DAY;

    // Coin -> cash at 100:1 minus 5%.
    let outcome = engine
        .apply(
            Command::Exchange {
                direction: ExchangeDirection::CoinToCash,
                amount: money(2_000.0),
            },
            now,
        )
        .unwrap();
    let CommandOutcome::Exchanged { received, .. } = outcome else {
        panic!("expected Exchanged");
    };
    assert!((money_to_f64(received) - 19.0).abs() < 1e-9);

    // Mature account: 5% withdrawal fee.
    let outcome = engine
        .apply(Command::Withdraw { amount: money(19.0) }, now)
        .unwrap();
    let CommandOutcome::Withdrawn { net, .. } = outcome else {
        panic!("expected Withdrawn");
    };
    assert!((money_to_f64(net) - 18.05).abs() < 1e-9);
    assert_eq!(engine.state.wallet.cash, Money::ZERO);
}

#[test]
fn young_account_pays_thirty_percent() {
    let mut engine = funded_engine(0.0);
    engine.state.wallet.credit(CurrencyKind::Cash, money(100.0));

    // Day 10 exactly is still the 30% bracket.
    let outcome = engine
        .apply(Command::Withdraw { amount: money(100.0) }, 10 * MS_PER_DAY)
        .unwrap();
    let CommandOutcome::Withdrawn { net, fee, .. } = outcome else {
        panic!("expected Withdrawn");
    };
    assert!((money_to_f64(fee) - 30.0).abs() < 1e-9);
    assert!((money_to_f64(net) - 70.0).abs() < 1e-9);
}

#[test]
fn repair_bill_scales_with_count() {
    let mut engine = funded_engine(150.0);
    let a = install_rig(&mut engine, Tier::Basic, 0);
    let b = install_rig(&mut engine, Tier::Basic, 0);
    let c = install_rig(&mut engine, Tier::Basic, 0);
    let miners = vec![a.miner, b.miner, c.miner];

    engine.apply(Command::Repair { uids: miners.clone() }, 0).unwrap();
    assert_eq!(engine.state.wallet.coins, Money::ZERO);

    // Second repair cannot be paid for.
    let err = engine.apply(Command::Repair { uids: miners }, 0).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
}

#[test]
fn dashboard_reflects_the_floor() {
    let mut engine = funded_engine(500.0);
    install_rig(&mut engine, Tier::Basic, 0);
    install_rig(&mut engine, Tier::Legendary, 0);

    let d = query::dashboard(&engine, 0);
    assert!((d.daily_production - 25.0).abs() < 1e-9); // 6.25 + 18.75
    assert_eq!(d.power_watts, 570); // 120 + 450
    assert_eq!(d.effective_watts, 456);
    assert!((d.rent_per_window - 20.6).abs() < 1e-9); // 0.6 + 20.0
    assert_eq!(d.coins, 500.0);
}

// ===========================================================================
// Persistence & determinism
// ===========================================================================

#[test]
fn save_load_mid_session() {
    let mut engine = funded_engine(5_000.0);
    let rig = install_rig(&mut engine, Tier::Rare, 0);
    engine.apply(Command::ToggleAutoPay { room: rig.room }, 0).unwrap();
    engine.apply(Command::OpenBox { kind: ItemKind::Miner }, 0).unwrap();
    engine.tick(HOUR_MS);

    let blob = engine.serialize().expect("serialize");
    let mut restored = Engine::deserialize(default_catalog(), &blob).expect("deserialize");
    assert_eq!(restored.state.state_hash(), engine.state.state_hash());

    // Both timelines must continue identically, box draws included.
    engine.apply(Command::OpenBox { kind: ItemKind::Miner }, HOUR_MS).unwrap();
    restored.apply(Command::OpenBox { kind: ItemKind::Miner }, HOUR_MS).unwrap();
    engine.tick(2 * HOUR_MS);
    restored.tick(2 * HOUR_MS);
    assert_eq!(restored.state.state_hash(), engine.state.state_hash());
}

#[test]
fn snapshot_history_rollback() {
    let mut engine = funded_engine(1_000.0);
    install_rig(&mut engine, Tier::Basic, 0);
    let mut history = SnapshotHistory::new(8);

    engine.take_snapshot(&mut history).expect("snapshot");
    let hash_at_zero = engine.state.state_hash();

    engine.tick(HOUR_MS);
    engine.take_snapshot(&mut history).expect("snapshot");
    assert_ne!(engine.state.state_hash(), hash_at_zero);

    let rolled_back = Engine::restore_snapshot(default_catalog(), &history, 0)
        .expect("entry")
        .expect("deserialize");
    assert_eq!(rolled_back.state.state_hash(), hash_at_zero);
}

#[test]
fn identical_sessions_hash_identically() {
    let run = || {
        let mut engine = funded_engine(10_000.0);
        let rig = install_rig(&mut engine, Tier::Epic, 0);
        engine.apply(Command::ToggleAutoPay { room: rig.room }, 0).unwrap();
        engine.queue.push(Command::OpenBox { kind: ItemKind::Miner });
        engine.queue.push(Command::CollectPool);
        let mut hash = 0;
        for day in 1..=5 {
            hash = engine.tick(day * MS_PER_DAY).state_hash;
        }
        hash
    };
    assert_eq!(run(), run());
}

#[test]
fn starter_kit_bootstraps_a_playable_account() {
    let mut engine = funded_engine(100.0);
    assert!(engine.ensure_starter_kit(0));

    // Buy and install a miner; the starter room/shelf must accept it.
    let miner_id = engine.catalog.id_of("miner_basic").unwrap();
    let miner = match engine.apply(Command::Buy { catalog_id: miner_id }, 0).unwrap() {
        CommandOutcome::Acquired(uid) => uid,
        other => panic!("unexpected outcome {other:?}"),
    };
    let shelf = engine
        .state
        .inventory
        .of_kind(ItemKind::Shelf)
        .map(|(uid, _)| uid)
        .next()
        .unwrap();
    engine.apply(Command::Install { item: miner, parent: shelf }, 0).unwrap();

    engine.tick(HOUR_MS);
    assert!(engine.state.pool > Money::ZERO);
}

#[test]
fn ledger_records_the_whole_story() {
    let mut engine = funded_engine(1_000.0);
    let id = engine.catalog.id_of("miner_basic").unwrap();
    engine.apply(Command::Buy { catalog_id: id }, 1).unwrap();
    engine.state.pool = f64_to_money(50.0);
    engine.apply(Command::CollectPool, 2).unwrap();
    engine
        .apply(
            Command::Exchange {
                direction: ExchangeDirection::CoinToCash,
                amount: money(100.0),
            },
            3,
        )
        .unwrap();

    let tail = query::ledger_tail(&engine, 2);
    assert_eq!(tail.len(), 2);
    // The exchange writes one entry per currency side.
    assert_eq!(tail[0].currency, CurrencyKind::Coin);
    assert_eq!(tail[1].currency, CurrencyKind::Cash);
    assert_eq!(engine.state.ledger.len(), 4);
}
