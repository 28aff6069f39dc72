//! Pure simulation mechanics for the Racket progression core.
//!
//! Every engine in this crate follows the same discipline:
//!
//! - **Time is an argument.** Nothing reads a wall clock; every operation
//!   takes `now` and derives progress from elapsed time, so a process
//!   that slept for a week catches up in one call.
//! - **Randomness is an argument.** Probabilistic outcomes take pre-drawn
//!   rolls, keeping resolution pure and testable.
//! - **Refusals are values, faults are errors.** Business-rule declines
//!   travel as [`DeclineReason`](racket_types::DeclineReason); only
//!   arithmetic faults and invariant breaches are [`SimError`]s.
//! - **Declined means untouched.** No engine partially applies an
//!   operation; validation happens before the first mutation.
//!
//! The crate is deliberately free of I/O, async, and interior mutability.
//! `racket-core` supplies the clock, persistence, and command surface.

pub mod combat;
pub mod config;
pub mod crime;
pub mod energy;
pub mod error;
pub mod income;
pub mod progression;
pub mod timed;

pub use combat::{PlayerBattle, TerritoryBattle};
pub use config::{
    AccelerationConfig, CombatConfig, CrimeConfig, EnergyConfig, MechanicsConfig,
    ProgressionConfig,
};
pub use crime::CrimeOutcome;
pub use error::SimError;
pub use income::{CollectionLine, CollectionPlan, IncomeSource};
pub use progression::LevelUpReport;
pub use timed::{
    AccelerateOutcome, CompletionEffect, PollOutcome, StartRequest, TimedEntity,
};
