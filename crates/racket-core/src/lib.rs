//! Session orchestration for the Racket progression core.
//!
//! This crate wires the pure engines from `racket-sim` to the outside
//! world: a [`Clock`](clock::Clock) supplies time, a
//! [`PersistenceGateway`](gateway::PersistenceGateway) supplies the
//! durable-store boundary, a [`Catalog`](catalog::Catalog) supplies the
//! static game data, and [`PlayerSession`](session::PlayerSession) is the
//! one surface callers command. All state mutation flows through the
//! session's validate / commit / apply ordering, so a gateway failure
//! can never leave the local state half-applied.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod gateway;
pub mod session;

pub use catalog::{Catalog, CatalogError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BusinessSlots, ConfigError, GameConfig, StartingState};
pub use gateway::{CommitAck, GatewayError, InMemoryGateway, PersistenceGateway};
pub use session::{
    AccelerationReceipt, BuildReceipt, CommandError, CrimeReceipt, PlayerSession,
    SessionSnapshot, TickReport, UpgradeReceipt,
};
