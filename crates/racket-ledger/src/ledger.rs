//! The economy ledger: validated wallet movements plus the audit log.
//!
//! The [`Ledger`] struct owns the append-only log of all balance movements
//! for the current session and is the only component allowed to mutate a
//! [`Wallet`]. Debits check sufficiency before touching anything; credits
//! use checked addition so an overflow is an error, not a wraparound.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Fail-closed**: a rejected movement leaves both wallet and log
//!   untouched.
//! - **Self-auditing**: every entry records the balance after it applied.

use chrono::{DateTime, Utc};
use tracing::debug;

use racket_types::{Currency, EntryDirection, LedgerEntry, LedgerReason, Wallet};

use crate::entry::EntryBuilder;
use crate::LedgerError;

/// The ledger tracking all balance movements in a session.
///
/// Every cash or premium movement — founding costs, upgrade costs,
/// accelerations, crime payouts, income collections, combat loot, and
/// weapon purchases — produces one [`LedgerEntry`] appended here.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Debit `amount` of `currency` from the wallet.
    ///
    /// Checks sufficiency first: an overdraw fails with
    /// [`LedgerError::InsufficientBalance`] and mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the wallet cannot cover the amount or
    /// the entry fails validation.
    pub fn debit(
        &mut self,
        wallet: &mut Wallet,
        currency: Currency,
        amount: u64,
        reason: LedgerReason,
        at: DateTime<Utc>,
    ) -> Result<&LedgerEntry, LedgerError> {
        let available = wallet.balance(currency);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    currency,
                    required: amount,
                    available,
                })?;

        let entry = EntryBuilder::new(at, currency, EntryDirection::Debit, reason)
            .amount(amount)
            .balance_after(remaining)
            .build()?;

        set_balance(wallet, currency, remaining);
        debug!(?currency, amount, ?reason, balance = remaining, "Ledger debit");
        self.entries.push(entry);
        self.entries
            .last()
            .ok_or(LedgerError::InternalError("entry vanished after append"))
    }

    /// Credit `amount` of `currency` to the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOverflow`] if the balance would
    /// exceed `u64::MAX`, or a validation error from the builder.
    pub fn credit(
        &mut self,
        wallet: &mut Wallet,
        currency: Currency,
        amount: u64,
        reason: LedgerReason,
        at: DateTime<Utc>,
    ) -> Result<&LedgerEntry, LedgerError> {
        let available = wallet.balance(currency);
        let raised = available
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { currency, amount })?;

        let entry = EntryBuilder::new(at, currency, EntryDirection::Credit, reason)
            .amount(amount)
            .balance_after(raised)
            .build()?;

        set_balance(wallet, currency, raised);
        debug!(?currency, amount, ?reason, balance = raised, "Ledger credit");
        self.entries.push(entry);
        self.entries
            .last()
            .ok_or(LedgerError::InternalError("entry vanished after append"))
    }

    /// Return all entries, in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Return all entries at or after the given instant.
    pub fn entries_since(&self, at: DateTime<Utc>) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.at >= at).collect()
    }

    /// Net movement of a currency over the whole log.
    ///
    /// Positive means the wallet gained more than it spent.
    pub fn net_flow(&self, currency: Currency) -> i128 {
        let mut net: i128 = 0;
        for entry in &self.entries {
            if entry.currency != currency {
                continue;
            }
            let amount = i128::from(entry.amount);
            net = match entry.direction {
                EntryDirection::Credit => net.saturating_add(amount),
                EntryDirection::Debit => net.saturating_sub(amount),
            };
        }
        net
    }

    /// Total amount moved for a given reason, regardless of direction.
    pub fn total_for_reason(&self, reason: LedgerReason) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.reason == reason)
            .fold(0_u64, |acc, e| acc.saturating_add(e.amount))
    }
}

/// Write a new balance back into the wallet.
const fn set_balance(wallet: &mut Wallet, currency: Currency, value: u64) {
    match currency {
        Currency::Cash => wallet.cash = value,
        Currency::Premium => wallet.premium = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(cash: u64, premium: u64) -> Wallet {
        Wallet { cash, premium }
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn debit_reduces_balance_and_logs() {
        let mut ledger = Ledger::new();
        let mut w = wallet(1000, 0);
        let result = ledger.debit(
            &mut w,
            Currency::Cash,
            300,
            LedgerReason::BuildCost,
            Utc::now(),
        );
        assert!(result.is_ok());
        assert_eq!(w.cash, 700);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn overdraw_fails_closed() {
        let mut ledger = Ledger::new();
        let mut w = wallet(100, 0);
        let result = ledger.debit(
            &mut w,
            Currency::Cash,
            300,
            LedgerReason::BuildCost,
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                currency: Currency::Cash,
                required: 300,
                available: 100,
            })
        ));
        // Neither the wallet nor the log changed.
        assert_eq!(w.cash, 100);
        assert!(ledger.is_empty());
    }

    #[test]
    fn credit_raises_balance_and_logs() {
        let mut ledger = Ledger::new();
        let mut w = wallet(50, 0);
        let result = ledger.credit(
            &mut w,
            Currency::Cash,
            75,
            LedgerReason::CrimePayout,
            Utc::now(),
        );
        assert!(result.is_ok());
        assert_eq!(w.cash, 125);
        if let Ok(entry) = result {
            assert_eq!(entry.balance_after, 125);
        }
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut ledger = Ledger::new();
        let mut w = wallet(u64::MAX, 0);
        let result = ledger.credit(
            &mut w,
            Currency::Cash,
            1,
            LedgerReason::IncomeCollection,
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::BalanceOverflow { .. })));
        assert_eq!(w.cash, u64::MAX);
        assert!(ledger.is_empty());
    }

    #[test]
    fn zero_amount_rejected_via_ledger() {
        let mut ledger = Ledger::new();
        let mut w = wallet(100, 0);
        let result = ledger.debit(
            &mut w,
            Currency::Cash,
            0,
            LedgerReason::BuildCost,
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn currencies_are_independent() {
        let mut ledger = Ledger::new();
        let mut w = wallet(100, 5);
        let result = ledger.debit(
            &mut w,
            Currency::Premium,
            2,
            LedgerReason::Acceleration,
            Utc::now(),
        );
        assert!(result.is_ok());
        assert_eq!(w.premium, 3);
        assert_eq!(w.cash, 100);
    }

    #[test]
    fn net_flow_tracks_direction() {
        let mut ledger = Ledger::new();
        let mut w = wallet(1000, 0);
        let now = Utc::now();
        let _ = ledger.debit(&mut w, Currency::Cash, 400, LedgerReason::BuildCost, now);
        let _ = ledger.credit(&mut w, Currency::Cash, 150, LedgerReason::IncomeCollection, now);
        assert_eq!(ledger.net_flow(Currency::Cash), -250);
        assert_eq!(ledger.net_flow(Currency::Premium), 0);
    }

    #[test]
    fn total_for_reason_sums_amounts() {
        let mut ledger = Ledger::new();
        let mut w = wallet(1000, 0);
        let now = Utc::now();
        let _ = ledger.credit(&mut w, Currency::Cash, 100, LedgerReason::IncomeCollection, now);
        let _ = ledger.credit(&mut w, Currency::Cash, 250, LedgerReason::IncomeCollection, now);
        let _ = ledger.credit(&mut w, Currency::Cash, 60, LedgerReason::CombatLoot, now);
        assert_eq!(ledger.total_for_reason(LedgerReason::IncomeCollection), 350);
        assert_eq!(ledger.total_for_reason(LedgerReason::CombatLoot), 60);
    }

    #[test]
    fn balance_after_chain_is_consistent() {
        let mut ledger = Ledger::new();
        let mut w = wallet(500, 0);
        let now = Utc::now();
        let _ = ledger.debit(&mut w, Currency::Cash, 200, LedgerReason::BuildCost, now);
        let _ = ledger.credit(&mut w, Currency::Cash, 50, LedgerReason::CrimePayout, now);
        let _ = ledger.debit(&mut w, Currency::Cash, 100, LedgerReason::UpgradeCost, now);

        // Replay the chain: each balance_after must match a running wallet.
        let mut replayed = 500_u64;
        for entry in ledger.entries() {
            replayed = match entry.direction {
                EntryDirection::Debit => replayed.saturating_sub(entry.amount),
                EntryDirection::Credit => replayed.saturating_add(entry.amount),
            };
            assert_eq!(entry.balance_after, replayed);
        }
        assert_eq!(w.cash, replayed);
    }
}
