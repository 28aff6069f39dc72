//! Energy regeneration and spending.
//!
//! Energy regenerates from *elapsed time*, never from timers: the engine
//! recomputes the capped balance whenever it observes the player state
//! (each UI tick, each command, each app resume). The catch-up is a single
//! division, so a multi-day gap costs the same as a 30-second one.
//!
//! The observation anchor advances in whole regeneration intervals, not to
//! `now`, so fractional progress between observations is never lost. Once
//! the cap is reached the anchor resets to `now` to avoid accumulating an
//! unbounded backlog that would refill energy instantly after spending.

use chrono::{DateTime, Utc};

use racket_types::{DeclineReason, PlayerState};

use crate::config::EnergyConfig;
use crate::error::SimError;

/// Recompute the player's energy from elapsed time. Returns points gained.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfig`] if the regeneration interval is
/// zero, or [`SimError::ArithmeticOverflow`] if the anchor advance
/// overflows the timestamp range.
pub fn observe(
    player: &mut PlayerState,
    cfg: &EnergyConfig,
    now: DateTime<Utc>,
) -> Result<u32, SimError> {
    if cfg.regen_interval_secs == 0 {
        return Err(SimError::InvalidConfig {
            reason: "energy regen_interval_secs must be at least 1",
        });
    }

    // At (or above, after a cap decrease) the cap: nothing regenerates,
    // and the anchor resets so no backlog accrues while full.
    if player.energy >= cfg.cap {
        player.energy = cfg.cap;
        player.last_energy_observed_at = now;
        return Ok(0);
    }

    let elapsed_secs = now
        .signed_duration_since(player.last_energy_observed_at)
        .num_seconds();
    // Clock went backwards (device clock change): regenerate nothing and
    // keep the anchor where it is.
    let Ok(elapsed) = u64::try_from(elapsed_secs) else {
        return Ok(0);
    };

    let points = elapsed
        .checked_div(cfg.regen_interval_secs)
        .unwrap_or_default();
    if points == 0 {
        return Ok(0);
    }

    let deficit = cfg.cap.saturating_sub(player.energy);
    let gained = u32::try_from(points.min(u64::from(deficit))).map_err(|_err| {
        SimError::ArithmeticOverflow {
            context: String::from("regenerated points exceed u32 range"),
        }
    })?;

    player.energy = player.energy.saturating_add(gained).min(cfg.cap);

    if player.energy >= cfg.cap {
        player.last_energy_observed_at = now;
    } else {
        // Below the cap, every whole interval was consumed by a point
        // (points == gained here); advance the anchor by exactly that
        // much to preserve the fractional remainder.
        let consumed = points
            .checked_mul(cfg.regen_interval_secs)
            .and_then(|secs| i64::try_from(secs).ok())
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("energy anchor advance overflow"),
            })?;
        player.last_energy_observed_at = player
            .last_energy_observed_at
            .checked_add_signed(chrono::Duration::seconds(consumed))
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("energy anchor timestamp overflow"),
            })?;
    }

    Ok(gained)
}

/// Spend energy, declining on insufficiency with no partial debit.
pub fn spend(player: &mut PlayerState, cost: u32) -> Result<(), DeclineReason> {
    match player.energy.checked_sub(cost) {
        Some(remaining) => {
            player.energy = remaining;
            Ok(())
        }
        None => Err(DeclineReason::InsufficientEnergy {
            required: cost,
            available: player.energy,
        }),
    }
}
