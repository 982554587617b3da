//! The two currency balances.
//!
//! Every balance change goes through a credit/debit method so a command can
//! never half-apply: debits validate before mutating, and a failed debit
//! leaves the wallet untouched.

use crate::error::EngineError;
use crate::fixed::Money;
use serde::{Deserialize, Serialize};

/// Which balance a transaction touches. Also tags ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyKind {
    /// The fiat-like primary currency.
    Cash,
    /// The mining currency earned via production.
    Coin,
}

/// Two balances. The pending production pool lives in `GameState`, not here;
/// it is not spendable until collected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub cash: Money,
    pub coins: Money,
}

impl Wallet {
    pub fn new(cash: Money, coins: Money) -> Self {
        Self { cash, coins }
    }

    pub fn balance(&self, kind: CurrencyKind) -> Money {
        match kind {
            CurrencyKind::Cash => self.cash,
            CurrencyKind::Coin => self.coins,
        }
    }

    pub fn credit(&mut self, kind: CurrencyKind, amount: Money) {
        match kind {
            CurrencyKind::Cash => self.cash += amount,
            CurrencyKind::Coin => self.coins += amount,
        }
    }

    /// Debit, failing with `InsufficientFunds` if the balance cannot cover
    /// the amount. On failure nothing changes.
    pub fn debit(&mut self, kind: CurrencyKind, amount: Money) -> Result<(), EngineError> {
        let available = self.balance(kind);
        if available < amount {
            return Err(EngineError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        match kind {
            CurrencyKind::Cash => self.cash -= amount,
            CurrencyKind::Coin => self.coins -= amount,
        }
        Ok(())
    }

    /// Whether a debit of `amount` would succeed.
    pub fn can_cover(&self, kind: CurrencyKind, amount: Money) -> bool {
        self.balance(kind) >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_money;

    #[test]
    fn credit_and_debit() {
        let mut w = Wallet::default();
        w.credit(CurrencyKind::Coin, f64_to_money(150.0));
        w.debit(CurrencyKind::Coin, f64_to_money(50.0)).unwrap();
        assert_eq!(w.coins, f64_to_money(100.0));
        assert_eq!(w.cash, Money::ZERO);
    }

    #[test]
    fn overdraft_fails_and_preserves_balance() {
        let mut w = Wallet::new(f64_to_money(10.0), Money::ZERO);
        let err = w.debit(CurrencyKind::Cash, f64_to_money(10.01)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert_eq!(w.cash, f64_to_money(10.0));
    }

    #[test]
    fn exact_debit_succeeds() {
        let mut w = Wallet::new(Money::ZERO, f64_to_money(150.0));
        w.debit(CurrencyKind::Coin, f64_to_money(150.0)).unwrap();
        assert_eq!(w.coins, Money::ZERO);
    }

    #[test]
    fn can_cover_matches_debit() {
        let w = Wallet::new(Money::ZERO, f64_to_money(5.0));
        assert!(w.can_cover(CurrencyKind::Coin, f64_to_money(5.0)));
        assert!(!w.can_cover(CurrencyKind::Coin, f64_to_money(5.5)));
    }
}
