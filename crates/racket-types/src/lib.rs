//! Shared type definitions for the Racket progression core.
//!
//! This crate is the single source of truth for all types used across the
//! Racket workspace: player state, businesses, territories, combat shapes,
//! the static catalog, and the decline taxonomy.
//!
//! # Modules
//!
//! - [`ids`] — Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] — Enumeration types (currencies, activity states, declines)
//! - [`structs`] — Core entity structs (player, business, territory, ledger)
//! - [`catalog`] — Read-only catalog definition structs

pub mod catalog;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use catalog::{BusinessDefinition, CrimeDefinition, TerritoryDefinition, WeaponDefinition};
pub use enums::{
    ActionKind, Activity, CombatOutcome, Currency, DeclineReason, EntryDirection, LedgerReason,
    TerritoryStatus,
};
pub use ids::{AssetId, BusinessId, CrimeId, LedgerEntryId, PlayerId, TerritoryId, WeaponId};
pub use structs::{
    Attributes, Business, CombatReport, CrimeSession, ForceComposition, LedgerEntry, PlayerState,
    TargetProfile, Territory, Wallet,
};
