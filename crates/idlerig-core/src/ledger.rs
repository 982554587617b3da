//! Append-only transaction log.
//!
//! Informational only: balances are authoritative in [`crate::wallet`], the
//! ledger exists for auditability. Entries are never mutated or removed.

use crate::fixed::{Millis, Money};
use crate::wallet::CurrencyKind;
use serde::{Deserialize, Serialize};

/// One immutable transaction record. Negative amounts are outflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub at: Millis,
    pub desc: String,
    pub amount: Money,
    pub currency: CurrencyKind,
}

/// The append-only log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at: Millis, desc: impl Into<String>, amount: Money, currency: CurrencyKind) {
        self.entries.push(LedgerEntry {
            at,
            desc: desc.into(),
            amount,
            currency,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[LedgerEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_money;

    #[test]
    fn record_appends_in_order() {
        let mut ledger = Ledger::new();
        ledger.record(1, "buy", f64_to_money(-100.0), CurrencyKind::Coin);
        ledger.record(2, "collect", f64_to_money(12.5), CurrencyKind::Coin);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].desc, "buy");
        assert_eq!(ledger.entries()[1].at, 2);
    }

    #[test]
    fn tail_returns_most_recent() {
        let mut ledger = Ledger::new();
        for i in 0..10 {
            ledger.record(i, format!("e{i}"), Money::ZERO, CurrencyKind::Cash);
        }
        let tail = ledger.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].desc, "e7");
        assert_eq!(tail[2].desc, "e9");
    }

    #[test]
    fn tail_larger_than_log() {
        let mut ledger = Ledger::new();
        ledger.record(0, "only", Money::ZERO, CurrencyKind::Coin);
        assert_eq!(ledger.tail(100).len(), 1);
    }
}
