//! Entry builder and validation for the economy ledger.
//!
//! Provides an [`EntryBuilder`] that enforces the audit invariants: every
//! balance movement has a positive amount, a direction, a business-rule
//! reason, and the balance observed after the movement. Builders validate
//! inputs before producing a [`LedgerEntry`].

use chrono::{DateTime, Utc};

use racket_types::{Currency, EntryDirection, LedgerEntry, LedgerEntryId, LedgerReason};

use crate::LedgerError;

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use racket_ledger::EntryBuilder;
/// use racket_types::{Currency, EntryDirection, LedgerReason};
///
/// let entry = EntryBuilder::new(Utc::now(), Currency::Cash, EntryDirection::Debit, LedgerReason::BuildCost)
///     .amount(500)
///     .balance_after(1200)
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct EntryBuilder {
    at: DateTime<Utc>,
    currency: Currency,
    direction: EntryDirection,
    reason: LedgerReason,
    amount: Option<u64>,
    balance_after: Option<u64>,
}

impl EntryBuilder {
    /// Start building an entry for the given instant, currency, direction,
    /// and reason.
    pub const fn new(
        at: DateTime<Utc>,
        currency: Currency,
        direction: EntryDirection,
        reason: LedgerReason,
    ) -> Self {
        Self {
            at,
            currency,
            direction,
            reason,
            amount: None,
            balance_after: None,
        }
    }

    /// Set the amount moved. Must be positive.
    #[must_use]
    pub const fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the balance observed after the movement.
    #[must_use]
    pub const fn balance_after(mut self, balance: u64) -> Self {
        self.balance_after = Some(balance);
        self
    }

    /// Validate and produce the entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] for a zero amount and
    /// [`LedgerError::IncompleteEntry`] for a missing field.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let amount = self
            .amount
            .ok_or(LedgerError::IncompleteEntry { field: "amount" })?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let balance_after = self.balance_after.ok_or(LedgerError::IncompleteEntry {
            field: "balance_after",
        })?;

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            at: self.at,
            currency: self.currency,
            direction: self.direction,
            amount,
            reason: self.reason,
            balance_after,
        })
    }
}
