//! Static catalog definition structs.
//!
//! The catalog is read-only, versioned game data: what businesses cost and
//! earn, what crimes risk and pay, what weapons add to a force. Definitions
//! are loaded once per session by the catalog provider in `racket-core`
//! and never mutated by the simulation.

use serde::{Deserialize, Serialize};

use crate::ids::{BusinessId, CrimeId, TerritoryId, WeaponId};

/// A business kind: what it costs to found and what it earns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDefinition {
    /// Catalog identity.
    pub id: BusinessId,
    /// Display name.
    pub name: String,
    /// Cash cost to found the business.
    pub cost: u64,
    /// Level-1 income rate, cash per hour.
    pub base_rate_per_hour: u64,
    /// Construction duration after founding, in seconds.
    pub build_duration_secs: u64,
    /// Upgrade cost at level 1; scales linearly with the current level.
    pub upgrade_base_cost: u64,
    /// Upgrade duration, in seconds.
    pub upgrade_duration_secs: u64,
    /// Maximum level.
    pub max_level: u32,
    /// Minimum player level to found this business.
    pub required_level: u32,
}

/// A crime: energy in, a probabilistic payout and experience out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeDefinition {
    /// Catalog identity.
    pub id: CrimeId,
    /// Display name.
    pub name: String,
    /// Energy debited when the crime is committed.
    pub energy_cost: u32,
    /// Seconds from commit to resolvability.
    pub duration_secs: u64,
    /// Success chance, 0..=100.
    pub success_rate: u32,
    /// Cash credited on success, before level scaling.
    pub base_reward: u64,
    /// Experience granted on success, before level scaling.
    pub base_xp: u64,
    /// Minimum player level to attempt the crime.
    pub required_level: u32,
    /// Seconds after resolution before the crime can be attempted again.
    pub cooldown_secs: u64,
}

/// A weapon kind: its power contribution and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Catalog identity.
    pub id: WeaponId,
    /// Display name.
    pub name: String,
    /// Power each unit adds to a force's effective power.
    pub power: u64,
    /// Cash cost per unit.
    pub cost: u64,
}

/// A territory's seed state: its neutral garrison and income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryDefinition {
    /// Catalog identity (shared with the live territory).
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Neutral garrison strength before any player claims it.
    pub defender_force: u32,
    /// Passive income rate for the owner, cash per hour.
    pub income_rate_per_hour: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crime_definition_roundtrip_serde() {
        let def = CrimeDefinition {
            id: CrimeId::new(),
            name: "Pickpocketing".to_owned(),
            energy_cost: 5,
            duration_secs: 60,
            success_rate: 80,
            base_reward: 50,
            base_xp: 10,
            required_level: 1,
            cooldown_secs: 120,
        };
        let json = serde_json::to_string(&def).ok();
        assert!(json.is_some());
        let back: Result<CrimeDefinition, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok().as_ref(), Some(&def));
    }
}
