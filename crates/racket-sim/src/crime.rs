//! The probabilistic crime state machine.
//!
//! A crime is a timed action whose completion effect depends on a random
//! roll: commit debits energy and opens a session, and the opportunistic
//! poll resolves it once the deadline passes. Resolution takes a
//! pre-drawn roll rather than a generator, so the outcome of a given
//! roll is a pure function and tests can pin either branch exactly.
//!
//! Only one crime runs at a time, and each crime kind carries its own
//! cooldown stamped at resolution — the global one-at-a-time rule and
//! the per-crime cooldown are independent gates.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use racket_ledger::Ledger;
use racket_types::{CrimeDefinition, CrimeSession, Currency, DeclineReason, LedgerReason, PlayerState};

use crate::config::{CrimeConfig, ProgressionConfig};
use crate::energy;
use crate::error::SimError;
use crate::progression;

/// The result of one crime poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrimeOutcome {
    /// No crime is in progress.
    Idle,
    /// The active crime has not reached its deadline yet.
    StillRunning {
        /// Seconds until the crime resolves.
        remaining_secs: u64,
    },
    /// The crime succeeded; the payout was credited and XP granted.
    Succeeded {
        /// Cash credited, after level scaling.
        reward: u64,
        /// Experience granted, after level scaling.
        xp: u64,
        /// Levels gained by the experience grant.
        levels_gained: u32,
    },
    /// The crime failed. The energy stays spent; only the cooldown is
    /// stamped.
    Failed,
}

/// Validate a commit attempt without mutating anything.
///
/// Declines in a fixed order: a crime already active, player level,
/// this crime's cooldown, energy.
#[must_use]
pub fn validate_commit(
    player: &PlayerState,
    def: &CrimeDefinition,
    now: DateTime<Utc>,
) -> Option<DeclineReason> {
    if player.active_crime.is_some() {
        return Some(DeclineReason::CrimeAlreadyActive);
    }
    if player.level < def.required_level {
        return Some(DeclineReason::LevelTooLow {
            required: def.required_level,
            current: player.level,
        });
    }
    if let Some(last_used) = player.crime_last_used.get(&def.id) {
        let elapsed = now.signed_duration_since(*last_used).num_seconds();
        let elapsed = u64::try_from(elapsed).unwrap_or_default();
        let remaining = def.cooldown_secs.saturating_sub(elapsed);
        if remaining > 0 {
            return Some(DeclineReason::CooldownActive {
                remaining_secs: remaining,
            });
        }
    }
    if player.energy < def.energy_cost {
        return Some(DeclineReason::InsufficientEnergy {
            required: def.energy_cost,
            available: player.energy,
        });
    }
    None
}

/// Commit a crime: debit the energy and open the session.
///
/// # Errors
///
/// Returns the first [`DeclineReason`] from [`validate_commit`], or
/// re-checks energy fail-closed if state changed between the two calls.
pub fn commit(
    player: &mut PlayerState,
    def: &CrimeDefinition,
    now: DateTime<Utc>,
) -> Result<(), DeclineReason> {
    if let Some(decline) = validate_commit(player, def, now) {
        return Err(decline);
    }
    energy::spend(player, def.energy_cost)?;

    let duration = i64::try_from(def.duration_secs).unwrap_or(i64::MAX);
    let ends_at = now
        .checked_add_signed(Duration::seconds(duration))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    player.active_crime = Some(CrimeSession {
        crime_id: def.id,
        started_at: now,
        ends_at,
    });
    Ok(())
}

/// Reward or XP after level scaling: `base * (100 + bonus_pct * Δlevel) / 100`
/// where `Δlevel` is how far the player is above the crime's requirement.
fn scaled(base: u64, player_level: u32, required_level: u32, cfg: &CrimeConfig) -> Result<u64, SimError> {
    let delta = u64::from(player_level.saturating_sub(required_level));
    let percent = cfg
        .level_bonus_pct
        .checked_mul(delta)
        .and_then(|bonus| bonus.checked_add(100))
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("crime scaling percent overflow"),
        })?;
    let product = u128::from(base)
        .checked_mul(u128::from(percent))
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("crime payout scaling overflow"),
        })?;
    let amount = product.checked_div(100).unwrap_or_default();
    u64::try_from(amount).map_err(|_err| SimError::ArithmeticOverflow {
        context: String::from("scaled crime payout exceeds u64 range"),
    })
}

/// Poll the active crime: resolve it if its deadline has passed.
///
/// `roll` is a pre-drawn uniform value in `0..100`; the crime succeeds
/// iff `roll < success_rate`. On success the scaled reward is credited
/// through the ledger and the scaled XP granted (cascading level-ups
/// included). Either way the session is cleared and the crime's
/// cooldown stamped at its scheduled end, so repeated polls are no-ops.
///
/// # Errors
///
/// Returns [`SimError`] on arithmetic faults or a ledger fault while
/// crediting the payout.
pub fn poll(
    player: &mut PlayerState,
    def: &CrimeDefinition,
    progression_cfg: &ProgressionConfig,
    crime_cfg: &CrimeConfig,
    ledger: &mut Ledger,
    roll: u32,
    now: DateTime<Utc>,
) -> Result<CrimeOutcome, SimError> {
    let Some(session) = player.active_crime else {
        return Ok(CrimeOutcome::Idle);
    };
    if session.crime_id != def.id {
        return Err(SimError::InvariantBreach {
            context: String::from("crime poll given the wrong definition"),
        });
    }

    if now < session.ends_at {
        let remaining = session.ends_at.signed_duration_since(now).num_seconds();
        return Ok(CrimeOutcome::StillRunning {
            remaining_secs: u64::try_from(remaining).unwrap_or_default(),
        });
    }

    // Cooldown runs from the scheduled resolution, not the observation.
    player.crime_last_used.insert(def.id, session.ends_at);
    player.active_crime = None;

    if roll >= def.success_rate {
        debug!(crime = %def.id, roll, "Crime failed");
        return Ok(CrimeOutcome::Failed);
    }

    let reward = scaled(def.base_reward, player.level, def.required_level, crime_cfg)?;
    let xp = scaled(def.base_xp, player.level, def.required_level, crime_cfg)?;

    if reward > 0 {
        let mut wallet = player.wallet;
        ledger.credit(&mut wallet, Currency::Cash, reward, LedgerReason::CrimePayout, now)?;
        player.wallet = wallet;
    }

    let report = progression::grant_xp(player, xp, progression_cfg)?;
    debug!(crime = %def.id, reward, xp, levels_gained = report.levels_gained, "Crime succeeded");

    Ok(CrimeOutcome::Succeeded {
        reward,
        xp,
        levels_gained: report.levels_gained,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use racket_types::{CrimeId, PlayerId};

    use super::*;

    fn pickpocketing() -> CrimeDefinition {
        CrimeDefinition {
            id: CrimeId::new(),
            name: "Pickpocketing".to_owned(),
            energy_cost: 10,
            duration_secs: 60,
            success_rate: 80,
            base_reward: 100,
            base_xp: 40,
            required_level: 1,
            cooldown_secs: 300,
        }
    }

    fn fresh_player(at: DateTime<Utc>) -> PlayerState {
        PlayerState::seeded(PlayerId::new(), 0, 0, 100, 0, 100, at)
    }

    #[test]
    fn commit_debits_energy_and_opens_session() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);

        assert!(commit(&mut player, &def, t0).is_ok());
        assert_eq!(player.energy, 90);
        let session = player.active_crime;
        assert!(session.is_some());
        if let Some(session) = session {
            assert_eq!(session.crime_id, def.id);
            assert_eq!(session.ends_at, t0 + Duration::seconds(60));
        }
    }

    #[test]
    fn second_commit_declines_while_active() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        let _ = commit(&mut player, &def, t0);

        let result = commit(&mut player, &def, t0 + Duration::seconds(10));
        assert_eq!(result, Err(DeclineReason::CrimeAlreadyActive));
        assert_eq!(player.energy, 90);
    }

    #[test]
    fn commit_declines_below_required_level() {
        let t0 = Utc::now();
        let mut def = pickpocketing();
        def.required_level = 5;
        let mut player = fresh_player(t0);

        let result = commit(&mut player, &def, t0);
        assert_eq!(
            result,
            Err(DeclineReason::LevelTooLow {
                required: 5,
                current: 1,
            })
        );
    }

    #[test]
    fn commit_declines_without_energy() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        player.energy = 3;

        let result = commit(&mut player, &def, t0);
        assert_eq!(
            result,
            Err(DeclineReason::InsufficientEnergy {
                required: 10,
                available: 3,
            })
        );
        assert_eq!(player.energy, 3);
    }

    #[test]
    fn poll_before_deadline_reports_remaining() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &def, t0);

        let outcome = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            0,
            t0 + Duration::seconds(20),
        );
        assert_eq!(outcome.ok(), Some(CrimeOutcome::StillRunning { remaining_secs: 40 }));
        assert!(player.active_crime.is_some());
    }

    #[test]
    fn success_credits_scaled_reward_and_xp() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        player.level = 3;
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &def, t0);

        // Level 3 against requirement 1: 120% of base values.
        let outcome = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            42,
            t0 + Duration::seconds(90),
        );
        assert_eq!(
            outcome.ok(),
            Some(CrimeOutcome::Succeeded {
                reward: 120,
                xp: 48,
                levels_gained: 0,
            })
        );
        assert_eq!(player.wallet.cash, 120);
        assert_eq!(player.experience, 48);
        assert_eq!(ledger.len(), 1);
        assert!(player.active_crime.is_none());
        // Cooldown runs from the scheduled end.
        assert_eq!(
            player.crime_last_used.get(&def.id),
            Some(&(t0 + Duration::seconds(60)))
        );
    }

    #[test]
    fn failure_keeps_energy_spent_and_stamps_cooldown() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &def, t0);

        let outcome = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            95,
            t0 + Duration::seconds(61),
        );
        assert_eq!(outcome.ok(), Some(CrimeOutcome::Failed));
        assert_eq!(player.energy, 90);
        assert_eq!(player.wallet.cash, 0);
        assert!(ledger.is_empty());
        assert!(player.crime_last_used.contains_key(&def.id));
    }

    #[test]
    fn cooldown_blocks_recommit_until_elapsed() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &def, t0);
        let _ = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            95,
            t0 + Duration::seconds(60),
        );

        // 100 s after the scheduled end, 200 s of cooldown remain.
        let result = commit(&mut player, &def, t0 + Duration::seconds(160));
        assert_eq!(
            result,
            Err(DeclineReason::CooldownActive { remaining_secs: 200 })
        );
        // Once elapsed, the crime can run again.
        assert!(commit(&mut player, &def, t0 + Duration::seconds(400)).is_ok());
    }

    #[test]
    fn cooldowns_are_tracked_per_crime() {
        let t0 = Utc::now();
        let first = pickpocketing();
        let mut second = pickpocketing();
        second.id = CrimeId::new();
        let mut player = fresh_player(t0);
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &first, t0);
        let _ = poll(
            &mut player,
            &first,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            95,
            t0 + Duration::seconds(60),
        );

        // The first crime is cooling down, the second is free to start.
        assert!(matches!(
            commit(&mut player, &first, t0 + Duration::seconds(70)),
            Err(DeclineReason::CooldownActive { .. })
        ));
        assert!(commit(&mut player, &second, t0 + Duration::seconds(70)).is_ok());
    }

    #[test]
    fn poll_after_resolution_is_idle() {
        let t0 = Utc::now();
        let def = pickpocketing();
        let mut player = fresh_player(t0);
        let mut ledger = Ledger::new();
        let _ = commit(&mut player, &def, t0);
        let _ = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            0,
            t0 + Duration::seconds(60),
        );

        let again = poll(
            &mut player,
            &def,
            &ProgressionConfig::default(),
            &CrimeConfig::default(),
            &mut ledger,
            0,
            t0 + Duration::seconds(61),
        );
        assert_eq!(again.ok(), Some(CrimeOutcome::Idle));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn success_rate_holds_over_many_seeded_rolls() {
        let t0 = Utc::now();
        let mut def = pickpocketing();
        def.success_rate = 50;
        def.cooldown_secs = 0;
        let mut rng = SmallRng::seed_from_u64(42);

        let mut successes = 0_u32;
        let trials = 10_000_u32;
        for trial in 0..trials {
            let mut player = fresh_player(t0);
            let mut ledger = Ledger::new();
            let _ = commit(&mut player, &def, t0);
            let roll: u32 = rng.random_range(0..100);
            let outcome = poll(
                &mut player,
                &def,
                &ProgressionConfig::default(),
                &CrimeConfig::default(),
                &mut ledger,
                roll,
                t0 + Duration::seconds(60),
            );
            assert!(outcome.is_ok(), "trial {trial} failed");
            if matches!(outcome, Ok(CrimeOutcome::Succeeded { .. })) {
                successes += 1;
            }
        }

        // 10 000 trials at 50%: a ±3% band is ~6 sigma.
        let rate = f64::from(successes) / f64::from(trials);
        assert!((0.47..=0.53).contains(&rate), "observed rate {rate}");
    }
}
