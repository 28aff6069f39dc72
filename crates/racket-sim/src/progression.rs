//! Experience grants and cascading level-ups.
//!
//! A single credit event can push a player across several thresholds at
//! once (a high-payout crime at low level, for instance). The grant loop
//! carries overflow experience forward across every threshold it crosses,
//! so two thresholds crossed in one event yield exactly two level
//! increments and the correctly reduced leftover.

use racket_types::PlayerState;

use crate::config::ProgressionConfig;
use crate::error::SimError;

/// What a single experience grant did to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpReport {
    /// Levels gained by this grant (0 if no threshold was crossed).
    pub levels_gained: u32,
    /// The player's level after the grant.
    pub new_level: u32,
}

/// The experience required to go from `level` to `level + 1`.
///
/// Linear curve: `xp_per_level * level`.
///
/// # Errors
///
/// Returns [`SimError::ArithmeticOverflow`] if the threshold exceeds
/// `u64::MAX`.
pub fn threshold_for(level: u32, cfg: &ProgressionConfig) -> Result<u64, SimError> {
    cfg.xp_per_level
        .checked_mul(u64::from(level))
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("experience threshold overflow"),
        })
}

/// Credit experience and apply every level-up it pays for.
///
/// # Errors
///
/// Returns [`SimError::ArithmeticOverflow`] if the experience total or a
/// threshold computation overflows.
pub fn grant_xp(
    player: &mut PlayerState,
    amount: u64,
    cfg: &ProgressionConfig,
) -> Result<LevelUpReport, SimError> {
    player.experience = player.experience.checked_add(amount).ok_or_else(|| {
        SimError::ArithmeticOverflow {
            context: String::from("experience credit overflow"),
        }
    })?;

    let mut levels_gained: u32 = 0;
    // A zero threshold would loop forever; treat it as config damage.
    if player.experience_to_next == 0 {
        return Err(SimError::InvalidConfig {
            reason: "experience_to_next must be positive",
        });
    }

    while player.experience >= player.experience_to_next {
        player.experience = player
            .experience
            .checked_sub(player.experience_to_next)
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("experience carry underflow"),
            })?;
        player.level = player.level.checked_add(1).ok_or_else(|| {
            SimError::ArithmeticOverflow {
                context: String::from("level increment overflow"),
            }
        })?;
        levels_gained = levels_gained.saturating_add(1);
        player.experience_to_next = threshold_for(player.level, cfg)?;
    }

    Ok(LevelUpReport {
        levels_gained,
        new_level: player.level,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use racket_types::PlayerId;

    use super::*;

    fn fresh_player() -> PlayerState {
        PlayerState::seeded(PlayerId::new(), 0, 0, 100, 0, 100, Utc::now())
    }

    fn cfg() -> ProgressionConfig {
        ProgressionConfig::default()
    }

    #[test]
    fn grant_below_threshold_accumulates() {
        let mut player = fresh_player();
        let report = grant_xp(&mut player, 60, &cfg());
        assert_eq!(
            report.ok(),
            Some(LevelUpReport {
                levels_gained: 0,
                new_level: 1,
            })
        );
        assert_eq!(player.experience, 60);
        assert_eq!(player.experience_to_next, 100);
    }

    #[test]
    fn single_level_up_carries_overflow() {
        let mut player = fresh_player();
        // Threshold at level 1 is 100; 130 XP leaves 30 toward level 3.
        let report = grant_xp(&mut player, 130, &cfg());
        assert_eq!(
            report.ok(),
            Some(LevelUpReport {
                levels_gained: 1,
                new_level: 2,
            })
        );
        assert_eq!(player.experience, 30);
        assert_eq!(player.experience_to_next, 200);
    }

    #[test]
    fn one_grant_cascades_across_two_thresholds() {
        let mut player = fresh_player();
        // 100 (level 1->2) + 200 (level 2->3) + 50 leftover = 350.
        let report = grant_xp(&mut player, 350, &cfg());
        assert_eq!(
            report.ok(),
            Some(LevelUpReport {
                levels_gained: 2,
                new_level: 3,
            })
        );
        assert_eq!(player.experience, 50);
        assert_eq!(player.experience_to_next, 300);
    }

    #[test]
    fn exact_threshold_levels_up_with_zero_leftover() {
        let mut player = fresh_player();
        let report = grant_xp(&mut player, 100, &cfg());
        assert_eq!(
            report.ok(),
            Some(LevelUpReport {
                levels_gained: 1,
                new_level: 2,
            })
        );
        assert_eq!(player.experience, 0);
    }

    #[test]
    fn zero_threshold_is_invalid_config() {
        let mut player = fresh_player();
        player.experience_to_next = 0;
        let result = grant_xp(&mut player, 10, &cfg());
        assert!(matches!(result, Err(SimError::InvalidConfig { .. })));
    }
}
