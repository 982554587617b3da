use fixed::types::I32F32;

/// Q32.32 fixed-point: the only numeric type used on the simulation path.
/// Floats appear solely at the display/persistence boundary.
pub type Money = I32F32;

/// Miner health is stored in the same representation, clamped to [0, 100].
pub type Health = I32F32;

/// Wall-clock timestamps and durations, in milliseconds. The host supplies
/// `now` to every tick and command; the engine never reads a clock itself.
pub type Millis = u64;

/// Milliseconds in one second.
pub const MS_PER_SEC: Millis = 1_000;

/// Seconds in one day. Daily rates are divided by this before accrual.
pub const SECS_PER_DAY: u64 = 86_400;

/// Milliseconds in one day.
pub const MS_PER_DAY: Millis = SECS_PER_DAY * MS_PER_SEC;

/// Convert an f64 to Money. Use only for initialization and data loading,
/// never in the sim loop.
#[inline]
pub fn f64_to_money(v: f64) -> Money {
    Money::from_num(v)
}

/// Convert Money to f64. Use only for display/FFI.
#[inline]
pub fn money_to_f64(v: Money) -> f64 {
    v.to_num::<f64>()
}

/// Elapsed milliseconds as fixed-point seconds.
///
/// Rates are expressed per second, so accruals multiply a per-second rate
/// by this value. Whole seconds convert separately from the millisecond
/// remainder: a raw `from_num(elapsed_ms)` would leave Q32.32 range after
/// ~24.8 days, and offline gaps run far longer than that.
#[inline]
pub fn elapsed_secs(elapsed_ms: Millis) -> Money {
    let whole = Money::from_num(elapsed_ms / MS_PER_SEC);
    let remainder = Money::from_num(elapsed_ms % MS_PER_SEC) / Money::from_num(MS_PER_SEC);
    whole + remainder
}

/// A daily rate reduced to a per-second rate.
#[inline]
pub fn per_second(daily: Money) -> Money {
    daily / Money::from_num(SECS_PER_DAY)
}
