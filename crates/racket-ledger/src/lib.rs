//! Economy ledger for the Racket progression core.
//!
//! Every cash and premium movement in the simulation goes through this
//! crate. No engine mutates a wallet directly: the ledger validates the
//! movement (sufficiency on debits, overflow on credits), applies it, and
//! appends an audit entry — all before any dependent state changes hands.
//!
//! # Architecture
//!
//! - [`entry`] — The [`EntryBuilder`] for validated entry construction.
//! - [`ledger`] — The [`Ledger`] struct: wallet operations plus the
//!   append-only audit log and its queries.
//!
//! # Invariants
//!
//! 1. All amounts are positive (validated at entry construction).
//! 2. A debit that would overdraw the wallet fails before any mutation.
//! 3. Entries are append-only: never modified, never deleted.
//! 4. Replaying the log's `balance_after` chain reproduces every
//!    intermediate balance.

pub mod entry;
pub mod ledger;

pub use entry::EntryBuilder;
pub use ledger::Ledger;

use racket_types::Currency;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The entry amount was zero; movements must be positive.
    #[error("ledger entry amount must be positive")]
    ZeroAmount,

    /// A debit would overdraw the balance.
    #[error("insufficient {currency:?} balance: wanted {required} but only have {available}")]
    InsufficientBalance {
        /// The currency being debited.
        currency: Currency,
        /// The amount the debit needed.
        required: u64,
        /// The balance actually available.
        available: u64,
    },

    /// A credit would overflow the balance.
    #[error("balance overflow crediting {amount} {currency:?}")]
    BalanceOverflow {
        /// The currency being credited.
        currency: Currency,
        /// The amount that overflowed.
        amount: u64,
    },

    /// The builder was missing a required field.
    #[error("incomplete ledger entry: missing {field}")]
    IncompleteEntry {
        /// The field that was not set.
        field: &'static str,
    },

    /// Internal consistency failure; indicates a programming error.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}
