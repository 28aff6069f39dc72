//! The generic timed-action engine.
//!
//! Construction, upgrades, and (via its own module) crime all share one
//! state machine: an entity goes in-progress at a start instant with a
//! duration, and completion is detected by *re-evaluating elapsed time*,
//! never by a scheduled callback. [`poll`] is invoked opportunistically —
//! each UI tick, each command, each app resume — and completes the action
//! exactly once no matter how often it is called afterward. This is what
//! lets an action finish correctly after a process restart or a week of
//! suspension.
//!
//! Acceleration is the only way out early: a premium price proportional
//! to the remaining duration, then the same completion effect polling
//! would have applied at expiry.

use chrono::{DateTime, Utc};
use tracing::debug;

use racket_ledger::Ledger;
use racket_types::{ActionKind, Activity, Business, Currency, DeclineReason, LedgerReason, Wallet};

use crate::config::AccelerationConfig;
use crate::error::SimError;
use crate::income;

// ---------------------------------------------------------------------------
// TimedEntity
// ---------------------------------------------------------------------------

/// What completing a timed action did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionEffect {
    /// The kind of action that completed.
    pub kind: ActionKind,
    /// The entity's level after completion.
    pub new_level: u32,
    /// The entity's income rate after completion, cash per hour.
    pub new_rate_per_hour: u64,
}

/// An entity the timed-action engine can drive.
///
/// Implementations own the action window fields and the completion
/// effect; the engine owns validation, timing, idempotence, and pricing.
pub trait TimedEntity {
    /// Current activity state.
    fn activity(&self) -> Activity;

    /// Current level.
    fn level(&self) -> u32;

    /// Level cap.
    fn max_level(&self) -> u32;

    /// Record the start of an action.
    fn begin(&mut self, kind: ActionKind, at: DateTime<Utc>, duration_secs: u64);

    /// The instant the in-progress action completes, if one is running.
    fn action_deadline(&self) -> Option<DateTime<Utc>>;

    /// Apply the completion effect. Must only be called while in
    /// progress; called exactly once per action by the engine.
    fn complete(&mut self, at: DateTime<Utc>) -> Result<CompletionEffect, SimError>;
}

impl TimedEntity for Business {
    fn activity(&self) -> Activity {
        self.activity
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn max_level(&self) -> u32 {
        self.max_level
    }

    fn begin(&mut self, kind: ActionKind, at: DateTime<Utc>, duration_secs: u64) {
        self.activity = match kind {
            ActionKind::Build => Activity::Building,
            ActionKind::Upgrade => Activity::Upgrading,
        };
        self.action_kind = Some(kind);
        self.action_started_at = Some(at);
        self.action_duration_secs = Some(duration_secs);
    }

    fn action_deadline(&self) -> Option<DateTime<Utc>> {
        Self::action_deadline(self)
    }

    fn complete(&mut self, at: DateTime<Utc>) -> Result<CompletionEffect, SimError> {
        let kind = match (self.activity, self.action_kind) {
            (Activity::Building, Some(ActionKind::Build)) => ActionKind::Build,
            (Activity::Upgrading, Some(ActionKind::Upgrade)) => ActionKind::Upgrade,
            _ => {
                return Err(SimError::InvariantBreach {
                    context: String::from("completion invoked on an idle or inconsistent asset"),
                });
            }
        };

        match kind {
            ActionKind::Build => {
                // Construction done: the business starts earning now.
                self.last_collected_at = at;
            }
            ActionKind::Upgrade => {
                // Bank what accrued at the old rate so the new rate only
                // applies from the completion instant forward.
                let banked = income::accrued(self.rate_per_hour, self.last_collected_at, at)?;
                self.carried_earnings =
                    self.carried_earnings
                        .checked_add(banked)
                        .ok_or_else(|| SimError::ArithmeticOverflow {
                            context: String::from("carried earnings overflow on upgrade"),
                        })?;
                self.last_collected_at = at;

                let new_level = self.level.checked_add(1).ok_or_else(|| {
                    SimError::ArithmeticOverflow {
                        context: String::from("business level overflow"),
                    }
                })?;
                if new_level > self.max_level {
                    return Err(SimError::InvariantBreach {
                        context: String::from("upgrade completion beyond level cap"),
                    });
                }
                self.level = new_level;
                // rate = base * (1 + 0.5 * (level - 1)), in integer form.
                self.rate_per_hour = self
                    .base_rate_per_hour
                    .checked_mul(u64::from(new_level).saturating_add(1))
                    .and_then(|scaled| scaled.checked_div(2))
                    .ok_or_else(|| SimError::ArithmeticOverflow {
                        context: String::from("income rate recomputation overflow"),
                    })?;
            }
        }

        self.activity = Activity::Idle;
        self.action_kind = None;
        self.action_started_at = None;
        self.action_duration_secs = None;

        Ok(CompletionEffect {
            kind,
            new_level: self.level,
            new_rate_per_hour: self.rate_per_hour,
        })
    }
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// Everything a start attempt needs to know, assembled by the session
/// from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartRequest {
    /// The action to start.
    pub kind: ActionKind,
    /// How long it runs, in seconds.
    pub duration_secs: u64,
    /// Cash debited on start.
    pub cash_cost: u64,
    /// Premium currency debited on start.
    pub premium_cost: u64,
    /// Minimum player level.
    pub required_level: u32,
}

/// Validate a start attempt without mutating anything.
///
/// Returns the first decline in a fixed order: action already in
/// progress, level cap, player level, cash, premium.
pub fn validate_start<E: TimedEntity>(
    entity: &E,
    request: &StartRequest,
    player_level: u32,
    wallet: &Wallet,
) -> Option<DeclineReason> {
    if entity.activity() != Activity::Idle {
        return Some(DeclineReason::ActionInProgress);
    }
    if request.kind == ActionKind::Upgrade && entity.level() >= entity.max_level() {
        return Some(DeclineReason::MaxLevelReached {
            max_level: entity.max_level(),
        });
    }
    if player_level < request.required_level {
        return Some(DeclineReason::LevelTooLow {
            required: request.required_level,
            current: player_level,
        });
    }
    if wallet.cash < request.cash_cost {
        return Some(DeclineReason::InsufficientCash {
            required: request.cash_cost,
            available: wallet.cash,
        });
    }
    if wallet.premium < request.premium_cost {
        return Some(DeclineReason::InsufficientPremium {
            required: request.premium_cost,
            available: wallet.premium,
        });
    }
    None
}

/// Start a validated action: debit the costs and open the action window.
///
/// Callers must run [`validate_start`] first; a start that fails here
/// indicates a programming error and mutates nothing.
///
/// # Errors
///
/// Returns [`SimError`] on an invariant breach or a ledger fault.
pub fn start<E: TimedEntity>(
    entity: &mut E,
    request: &StartRequest,
    wallet: &mut Wallet,
    ledger: &mut Ledger,
    now: DateTime<Utc>,
) -> Result<(), SimError> {
    if entity.activity() != Activity::Idle {
        return Err(SimError::InvariantBreach {
            context: String::from("start invoked on a busy asset"),
        });
    }
    // Both debits must succeed or neither happens.
    if wallet.cash < request.cash_cost || wallet.premium < request.premium_cost {
        return Err(SimError::InvariantBreach {
            context: String::from("start invoked without sufficient funds"),
        });
    }

    let reason = match request.kind {
        ActionKind::Build => LedgerReason::BuildCost,
        ActionKind::Upgrade => LedgerReason::UpgradeCost,
    };
    if request.cash_cost > 0 {
        ledger.debit(wallet, Currency::Cash, request.cash_cost, reason, now)?;
    }
    if request.premium_cost > 0 {
        ledger.debit(wallet, Currency::Premium, request.premium_cost, reason, now)?;
    }

    entity.begin(request.kind, now, request.duration_secs);
    Ok(())
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// The result of one opportunistic poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The action's deadline had passed; the completion effect was
    /// applied exactly once.
    Completed(CompletionEffect),
    /// The action is still running.
    StillRunning {
        /// Seconds until the deadline.
        remaining_secs: u64,
    },
    /// Nothing is in progress. Polling an idle entity is a no-op, which
    /// is what makes repeated polls after completion safe.
    Idle,
}

/// Poll an entity: complete its action if the deadline has passed.
///
/// Level-triggered and idempotent — a second poll after completion
/// returns [`PollOutcome::Idle`] and changes nothing.
///
/// # Errors
///
/// Returns [`SimError::InvariantBreach`] if the entity is in progress
/// without an action window (state corruption; nothing is mutated).
pub fn poll<E: TimedEntity>(entity: &mut E, now: DateTime<Utc>) -> Result<PollOutcome, SimError> {
    if entity.activity() == Activity::Idle {
        return Ok(PollOutcome::Idle);
    }

    let deadline = entity
        .action_deadline()
        .ok_or_else(|| SimError::InvariantBreach {
            context: String::from("in-progress asset has no action window"),
        })?;

    if now < deadline {
        let remaining = deadline.signed_duration_since(now).num_seconds();
        let remaining_secs = u64::try_from(remaining).unwrap_or_default();
        return Ok(PollOutcome::StillRunning { remaining_secs });
    }

    // Complete at the scheduled deadline, not the observation instant:
    // income earned between expiry and this poll belongs to the new rate.
    let effect = entity.complete(deadline)?;
    debug!(
        kind = ?effect.kind,
        level = effect.new_level,
        rate = effect.new_rate_per_hour,
        "Timed action completed"
    );
    Ok(PollOutcome::Completed(effect))
}

// ---------------------------------------------------------------------------
// Accelerate
// ---------------------------------------------------------------------------

/// The result of an acceleration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccelerateOutcome {
    /// The action was finished immediately.
    Completed {
        /// Premium currency spent.
        premium_spent: u64,
        /// The completion effect, identical to what polling at expiry
        /// would have produced.
        effect: CompletionEffect,
    },
    /// The acceleration was refused.
    Declined(DeclineReason),
}

/// Price of finishing now: one premium unit per started block of
/// remaining duration.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfig`] if the block length is zero.
pub fn acceleration_cost(
    remaining_secs: u64,
    cfg: &AccelerationConfig,
) -> Result<u64, SimError> {
    if cfg.block_secs == 0 {
        return Err(SimError::InvalidConfig {
            reason: "acceleration block_secs must be at least 1",
        });
    }
    Ok(remaining_secs.div_ceil(cfg.block_secs))
}

/// Finish an in-progress action immediately for premium currency.
///
/// An action already past its deadline costs nothing and simply
/// completes. Declines if nothing is in progress or the premium balance
/// cannot cover the price; a decline mutates nothing.
///
/// # Errors
///
/// Returns [`SimError`] on invariant breaches, config damage, or ledger
/// faults.
pub fn accelerate<E: TimedEntity>(
    entity: &mut E,
    wallet: &mut Wallet,
    ledger: &mut Ledger,
    cfg: &AccelerationConfig,
    now: DateTime<Utc>,
) -> Result<AccelerateOutcome, SimError> {
    if entity.activity() == Activity::Idle {
        return Ok(AccelerateOutcome::Declined(
            DeclineReason::NoActionInProgress,
        ));
    }

    let deadline = entity
        .action_deadline()
        .ok_or_else(|| SimError::InvariantBreach {
            context: String::from("in-progress asset has no action window"),
        })?;

    let remaining = deadline.signed_duration_since(now).num_seconds();
    let remaining_secs = u64::try_from(remaining).unwrap_or_default();
    let cost = acceleration_cost(remaining_secs, cfg)?;

    if cost > 0 {
        if wallet.premium < cost {
            return Ok(AccelerateOutcome::Declined(
                DeclineReason::InsufficientPremium {
                    required: cost,
                    available: wallet.premium,
                },
            ));
        }
        ledger.debit(
            wallet,
            Currency::Premium,
            cost,
            LedgerReason::Acceleration,
            now,
        )?;
    }

    let effect = entity.complete(now)?;
    debug!(kind = ?effect.kind, premium_spent = cost, "Timed action accelerated");
    Ok(AccelerateOutcome::Completed {
        premium_spent: cost,
        effect,
    })
}
