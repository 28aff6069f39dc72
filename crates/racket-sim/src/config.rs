//! Tuning configuration for the simulation mechanics.
//!
//! Defaults match the design constants: energy regenerates one point per
//! 30 seconds up to a cap of 100, acceleration costs one premium unit per
//! started 10-second block, and player raids share a 3-hour cooldown.
//! All structs deserialize with per-field defaults so a partial config
//! file only overrides what it names.

use serde::Deserialize;

/// Energy regeneration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Maximum energy a player can hold.
    pub cap: u32,
    /// Seconds of elapsed time per regenerated energy point.
    pub regen_interval_secs: u64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            cap: 100,
            regen_interval_secs: 30,
        }
    }
}

/// Timed-action acceleration pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccelerationConfig {
    /// Seconds of remaining duration covered by one premium unit.
    ///
    /// The price is the remaining duration divided by this, rounded up.
    pub block_secs: u64,
}

impl Default for AccelerationConfig {
    fn default() -> Self {
        Self { block_secs: 10 }
    }
}

/// Combat resolution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Effective power contributed by each unarmed soldier.
    pub soldier_power: u64,
    /// Seconds between player-versus-player raids by the same attacker.
    pub player_attack_cooldown_secs: u64,
    /// Percent of the defender's cash looted on a winning raid.
    pub loot_pct: u64,
    /// Percent of committed soldiers the winning side loses.
    pub victor_loss_pct: u32,
    /// Percent of committed soldiers the losing side loses.
    pub vanquished_loss_pct: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            soldier_power: 5,
            player_attack_cooldown_secs: 3 * 60 * 60,
            loot_pct: 10,
            victor_loss_pct: 10,
            vanquished_loss_pct: 25,
        }
    }
}

/// Crime payout scaling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrimeConfig {
    /// Percent added to reward and XP per level above the requirement.
    ///
    /// A crime committed `n` levels above its requirement pays
    /// `100 + n * level_bonus_pct` percent of its base values.
    pub level_bonus_pct: u64,
}

impl Default for CrimeConfig {
    fn default() -> Self {
        Self { level_bonus_pct: 10 }
    }
}

/// Experience curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience required per level: the threshold at level `n` is
    /// `xp_per_level * n`.
    pub xp_per_level: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self { xp_per_level: 100 }
    }
}

/// All mechanics tuning, grouped for the top-level game config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MechanicsConfig {
    /// Energy regeneration parameters.
    pub energy: EnergyConfig,
    /// Acceleration pricing.
    pub acceleration: AccelerationConfig,
    /// Combat resolution parameters.
    pub combat: CombatConfig,
    /// Crime payout scaling.
    pub crime: CrimeConfig,
    /// Experience curve.
    pub progression: ProgressionConfig,
}
