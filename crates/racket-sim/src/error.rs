//! Error types for the simulation mechanics.
//!
//! Expected business-rule refusals are *not* errors — they travel as
//! [`DeclineReason`](racket_types::DeclineReason) values in ordinary
//! returns. [`SimError`] covers the remaining failure classes: arithmetic
//! faults, invariant breaches (programming errors; the engines fail closed
//! without mutating state), and ledger faults surfacing mid-operation.

use racket_types::WeaponId;

/// Errors that can occur inside the simulation engines.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// An engine was invoked in a state that should be unreachable.
    ///
    /// Indicates a programming error; the engine mutates nothing.
    #[error("invariant breach: {context}")]
    InvariantBreach {
        /// Description of the breached invariant.
        context: String,
    },

    /// A force referenced a weapon missing from the catalog.
    #[error("unknown weapon in force: {0}")]
    UnknownWeapon(WeaponId),

    /// A configured value makes the computation impossible.
    #[error("invalid mechanics configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: &'static str,
    },

    /// A ledger operation failed after validation had passed.
    #[error("ledger fault: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: racket_ledger::LedgerError,
    },
}
