//! Exchange rates, fee schedules, scrap and repair pricing.
//!
//! Fee policy (see DESIGN.md): every wallet exchange pays its fee —
//! 5% converting coin to cash, 2% converting cash to coin. Deposits model
//! external fiat inflow and convert fee-free at the same fixed rate.

use crate::catalog::ItemKind;
use crate::fixed::{MS_PER_DAY, Millis, Money, f64_to_money};

/// Fixed exchange rate: coins per unit of cash.
pub const COINS_PER_CASH: u32 = 100;

/// Fee on coin -> cash conversions.
pub const COIN_TO_CASH_FEE: f64 = 0.05;

/// Service fee on cash -> coin conversions.
pub const CASH_TO_COIN_FEE: f64 = 0.02;

/// Coin cost to repair one miner back to full health.
pub const REPAIR_COST_PER_MINER: f64 = 50.0;

/// Result of a conversion: what the fee took and what remains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Amount credited after the fee.
    pub net: Money,
    /// Fee withheld, denominated in the credited currency.
    pub fee: Money,
}

fn rate() -> Money {
    Money::from_num(COINS_PER_CASH)
}

/// Convert coin to cash, applying the 5% fee on the cash side.
pub fn coin_to_cash(coins: Money) -> Conversion {
    let gross = coins / rate();
    let fee = gross * f64_to_money(COIN_TO_CASH_FEE);
    Conversion { net: gross - fee, fee }
}

/// Convert cash to coin, applying the 2% service fee on the cash side
/// before conversion.
pub fn cash_to_coin(cash: Money) -> Conversion {
    let fee_cash = cash * f64_to_money(CASH_TO_COIN_FEE);
    let net = (cash - fee_cash) * rate();
    Conversion { net, fee: fee_cash * rate() }
}

/// Coin credited for an external deposit of `cash`. Fee-free.
pub fn deposit_coin_value(cash: Money) -> Money {
    cash * rate()
}

/// Cash value of a coin amount at the fixed rate, fee-free. Used for
/// display aggregates (net worth), never for an actual conversion.
pub fn coin_cash_value(coins: Money) -> Money {
    coins / rate()
}

// ---------------------------------------------------------------------------
// Withdrawal fee schedule
// ---------------------------------------------------------------------------

/// Whole days since account creation.
pub fn account_age_days(created_at: Millis, now: Millis) -> u64 {
    now.saturating_sub(created_at) / MS_PER_DAY
}

/// Tenure-based withdrawal fee rate: 30% through day 10, 15% through
/// day 20, 5% after.
pub fn withdraw_fee_rate(created_at: Millis, now: Millis) -> Money {
    let days = account_age_days(created_at, now);
    let rate = if days <= 10 {
        0.30
    } else if days <= 20 {
        0.15
    } else {
        0.05
    };
    f64_to_money(rate)
}

/// Split a gross withdrawal into fee and net payout.
pub fn withdraw_split(gross: Money, created_at: Millis, now: Millis) -> Conversion {
    let fee = gross * withdraw_fee_rate(created_at, now);
    Conversion { net: gross - fee, fee }
}

// ---------------------------------------------------------------------------
// Scrap values
// ---------------------------------------------------------------------------

/// Fixed coin credit when an item of this kind is recycled or demolished.
pub fn scrap_value(kind: ItemKind) -> Money {
    let value = match kind {
        ItemKind::Miner => 20.0,
        ItemKind::Room => 8.0,
        ItemKind::Shelf => 4.0,
    };
    f64_to_money(value)
}
