//! Deterministic combat resolution.
//!
//! Combat here has no dice: a territory assault is a strict comparison of
//! force sizes, and a raid on a rival compares weapon-adjusted power.
//! Both resolvers are pure functions over validated non-negative integer
//! forces, so every outcome is reproducible from its inputs. Validation
//! (non-empty force, soldier availability, cooldowns) happens before a
//! resolver is ever called.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use racket_types::{CombatOutcome, ForceComposition, WeaponDefinition, WeaponId};

use crate::config::CombatConfig;
use crate::error::SimError;

/// The outcome of an assault on a territory garrison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerritoryBattle {
    /// Who prevailed.
    pub outcome: CombatOutcome,
    /// Attacking soldiers still standing, returned to the reserve.
    pub surviving_force: u32,
    /// Garrison soldiers captured into the winner's reserve.
    pub captured_force: u32,
    /// Garrison soldiers still holding the territory.
    pub defender_remaining: u32,
}

/// The outcome of a raid on a rival player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerBattle {
    /// Who prevailed.
    pub outcome: CombatOutcome,
    /// Cash taken from the defender. Zero unless the attacker won.
    pub cash_looted: u64,
    /// Soldiers the attacker lost.
    pub attacker_losses: u32,
    /// Soldiers the defender lost.
    pub defender_losses: u32,
}

/// Resolve a territory assault by strict force comparison.
///
/// A larger attacking force wins: the difference survives and the whole
/// garrison is captured. A larger garrison holds: the attacking force is
/// wiped out and the garrison is reduced by the full attacking force,
/// saturating at zero. Equal forces annihilate each other and the
/// defender keeps the territory.
#[must_use]
pub const fn resolve_territory_attack(attacking: u32, defending: u32) -> TerritoryBattle {
    if attacking > defending {
        TerritoryBattle {
            outcome: CombatOutcome::AttackerWins,
            surviving_force: attacking - defending,
            captured_force: defending,
            defender_remaining: 0,
        }
    } else if attacking < defending {
        TerritoryBattle {
            outcome: CombatOutcome::DefenderWins,
            surviving_force: 0,
            captured_force: 0,
            defender_remaining: defending - attacking,
        }
    } else {
        TerritoryBattle {
            outcome: CombatOutcome::Draw,
            surviving_force: 0,
            captured_force: 0,
            defender_remaining: 0,
        }
    }
}

/// Weapon-adjusted power of a force.
///
/// Each soldier contributes the configured base power; each weapon adds
/// its catalog power times the count carried.
///
/// # Errors
///
/// Returns [`SimError::UnknownWeapon`] if the force carries a weapon the
/// arsenal does not define, or [`SimError::ArithmeticOverflow`] if the
/// total exceeds `u64::MAX`.
pub fn effective_power(
    force: &ForceComposition,
    arsenal: &BTreeMap<WeaponId, WeaponDefinition>,
    cfg: &CombatConfig,
) -> Result<u64, SimError> {
    let mut power = u64::from(force.soldiers)
        .checked_mul(cfg.soldier_power)
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("soldier power overflow"),
        })?;

    for (weapon_id, count) in &force.weapons {
        let def = arsenal
            .get(weapon_id)
            .ok_or(SimError::UnknownWeapon(*weapon_id))?;
        let contribution =
            def.power
                .checked_mul(u64::from(*count))
                .ok_or_else(|| SimError::ArithmeticOverflow {
                    context: String::from("weapon power overflow"),
                })?;
        power = power
            .checked_add(contribution)
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("force power overflow"),
            })?;
    }

    Ok(power)
}

/// Resolve a raid on a rival player from pre-computed effective powers.
///
/// Strictly greater attacker power wins and loots a configured fraction
/// of the defender's cash; equal power means the defense held. Both
/// sides lose a configured percentage of their committed soldiers, the
/// winner at the lighter rate.
///
/// # Errors
///
/// Returns [`SimError::ArithmeticOverflow`] if the loot computation
/// overflows.
pub fn resolve_player_attack(
    attacker_power: u64,
    defender_power: u64,
    attacker_soldiers: u32,
    defender_soldiers: u32,
    defender_cash: u64,
    cfg: &CombatConfig,
) -> Result<PlayerBattle, SimError> {
    let attacker_won = attacker_power > defender_power;

    let cash_looted = if attacker_won {
        loot_share(defender_cash, cfg.loot_pct)?
    } else {
        0
    };

    let (attacker_pct, defender_pct) = if attacker_won {
        (cfg.victor_loss_pct, cfg.vanquished_loss_pct)
    } else {
        (cfg.vanquished_loss_pct, cfg.victor_loss_pct)
    };

    Ok(PlayerBattle {
        outcome: if attacker_won {
            CombatOutcome::AttackerWins
        } else {
            CombatOutcome::DefenderWins
        },
        cash_looted,
        attacker_losses: loss_share(attacker_soldiers, attacker_pct),
        defender_losses: loss_share(defender_soldiers, defender_pct),
    })
}

/// Seconds left on the attacker's raid cooldown, or `None` if clear.
#[must_use]
pub fn cooldown_remaining(
    last_attack_at: Option<DateTime<Utc>>,
    cooldown_secs: u64,
    now: DateTime<Utc>,
) -> Option<u64> {
    let last = last_attack_at?;
    let elapsed = now.signed_duration_since(last).num_seconds();
    let elapsed = u64::try_from(elapsed).unwrap_or_default();
    let remaining = cooldown_secs.saturating_sub(elapsed);
    (remaining > 0).then_some(remaining)
}

fn loot_share(cash: u64, pct: u64) -> Result<u64, SimError> {
    let scaled = u128::from(cash)
        .checked_mul(u128::from(pct))
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("loot computation overflow"),
        })?;
    let share = scaled.checked_div(100).unwrap_or_default();
    u64::try_from(share).map_err(|_err| SimError::ArithmeticOverflow {
        context: String::from("loot share exceeds u64 range"),
    })
}

fn loss_share(soldiers: u32, pct: u32) -> u32 {
    let share = u64::from(soldiers)
        .saturating_mul(u64::from(pct))
        .checked_div(100)
        .unwrap_or_default();
    // share <= soldiers whenever pct <= 100; clamp covers damaged config.
    u32::try_from(share.min(u64::from(soldiers))).unwrap_or(soldiers)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn larger_force_takes_the_territory() {
        let battle = resolve_territory_attack(12, 10);
        assert_eq!(
            battle,
            TerritoryBattle {
                outcome: CombatOutcome::AttackerWins,
                surviving_force: 2,
                captured_force: 10,
                defender_remaining: 0,
            }
        );
    }

    #[test]
    fn smaller_force_is_wiped_out() {
        let battle = resolve_territory_attack(8, 10);
        assert_eq!(
            battle,
            TerritoryBattle {
                outcome: CombatOutcome::DefenderWins,
                surviving_force: 0,
                captured_force: 0,
                defender_remaining: 2,
            }
        );
    }

    #[test]
    fn equal_forces_annihilate_and_defense_holds() {
        let battle = resolve_territory_attack(10, 10);
        assert_eq!(
            battle,
            TerritoryBattle {
                outcome: CombatOutcome::Draw,
                surviving_force: 0,
                captured_force: 0,
                defender_remaining: 0,
            }
        );
    }

    #[test]
    fn power_counts_soldiers_and_weapons() {
        let cfg = CombatConfig::default();
        let knife = WeaponId::new();
        let tommy_gun = WeaponId::new();
        let mut arsenal = BTreeMap::new();
        arsenal.insert(
            knife,
            WeaponDefinition {
                id: knife,
                name: "Knife".to_owned(),
                power: 3,
                cost: 50,
            },
        );
        arsenal.insert(
            tommy_gun,
            WeaponDefinition {
                id: tommy_gun,
                name: "Tommy Gun".to_owned(),
                power: 10,
                cost: 500,
            },
        );

        let mut force = ForceComposition::soldiers_only(4);
        force.weapons.insert(knife, 2);
        force.weapons.insert(tommy_gun, 1);

        // 4 * 5 + 2 * 3 + 1 * 10 = 36.
        let power = effective_power(&force, &arsenal, &cfg);
        assert_eq!(power.ok(), Some(36));
    }

    #[test]
    fn unknown_weapon_is_rejected() {
        let cfg = CombatConfig::default();
        let arsenal = BTreeMap::new();
        let mut force = ForceComposition::soldiers_only(1);
        let ghost = WeaponId::new();
        force.weapons.insert(ghost, 1);

        let result = effective_power(&force, &arsenal, &cfg);
        assert!(matches!(result, Err(SimError::UnknownWeapon(id)) if id == ghost));
    }

    #[test]
    fn winning_raid_loots_and_splits_losses() {
        let cfg = CombatConfig::default();
        let battle = resolve_player_attack(60, 40, 20, 12, 5_000, &cfg);
        assert_eq!(
            battle.ok(),
            Some(PlayerBattle {
                outcome: CombatOutcome::AttackerWins,
                // 10% of 5000.
                cash_looted: 500,
                // Victor loses 10% of 20, vanquished 25% of 12.
                attacker_losses: 2,
                defender_losses: 3,
            })
        );
    }

    #[test]
    fn losing_raid_loots_nothing() {
        let cfg = CombatConfig::default();
        let battle = resolve_player_attack(30, 40, 20, 12, 5_000, &cfg);
        assert_eq!(
            battle.ok(),
            Some(PlayerBattle {
                outcome: CombatOutcome::DefenderWins,
                cash_looted: 0,
                attacker_losses: 5,
                defender_losses: 1,
            })
        );
    }

    #[test]
    fn equal_power_means_the_defense_held() {
        let cfg = CombatConfig::default();
        let battle = resolve_player_attack(40, 40, 10, 10, 1_000, &cfg);
        assert!(matches!(
            battle.ok(),
            Some(PlayerBattle {
                outcome: CombatOutcome::DefenderWins,
                cash_looted: 0,
                ..
            })
        ));
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let t0 = Utc::now();
        let cooldown = 10_800;
        assert_eq!(cooldown_remaining(None, cooldown, t0), None);
        assert_eq!(
            cooldown_remaining(Some(t0), cooldown, t0 + Duration::hours(1)),
            Some(7_200)
        );
        assert_eq!(
            cooldown_remaining(Some(t0), cooldown, t0 + Duration::hours(3)),
            None
        );
    }
}
