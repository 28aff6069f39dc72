//! Core entity structs for the Racket progression core.
//!
//! Everything here is plain data: the engines in `racket-sim` mutate these
//! structs, the ledger audits every balance movement, and `PlayerSession`
//! is the only surface that hands them out (as read-only copies). All
//! durations are whole seconds and all money is integer cash — no floats
//! anywhere near a balance.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{BusinessDefinition, TerritoryDefinition};
use crate::enums::{
    ActionKind, Activity, CombatOutcome, Currency, EntryDirection, LedgerReason, TerritoryStatus,
};
use crate::ids::{AssetId, CrimeId, LedgerEntryId, PlayerId, TerritoryId, WeaponId};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The player's two spendable balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Ordinary cash.
    pub cash: u64,
    /// Premium currency.
    pub premium: u64,
}

impl Wallet {
    /// Return the balance of the given currency.
    pub const fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Cash => self.cash,
            Currency::Premium => self.premium,
        }
    }
}

/// Innate attribute scores, set at character creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Physical force; flavor for combat-leaning builds.
    pub muscle: u32,
    /// Guile; flavor for crime-leaning builds.
    pub cunning: u32,
    /// Sway; flavor for economy-leaning builds.
    pub influence: u32,
}

/// A crime in progress: created on commit, destroyed on resolution.
///
/// Invariant: a player has at most one active session at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeSession {
    /// The crime being committed.
    pub crime_id: CrimeId,
    /// When the crime was committed.
    pub started_at: DateTime<Utc>,
    /// When the crime becomes resolvable.
    pub ends_at: DateTime<Utc>,
}

/// The full mutable state of one player.
///
/// Owned exclusively by `PlayerSession`; mutated only through engine
/// operations, never directly by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// The player's identity.
    pub id: PlayerId,
    /// Current level (starts at 1).
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u64,
    /// Experience required to reach the next level.
    pub experience_to_next: u64,
    /// Cash and premium balances. All movement goes through the ledger.
    pub wallet: Wallet,
    /// Energy, 0 up to the configured cap (100 by default).
    pub energy: u32,
    /// Soldiers in reserve, available to send into battle.
    pub soldiers: u32,
    /// Weapons owned, by catalog id.
    pub weapons: BTreeMap<WeaponId, u32>,
    /// Innate attribute scores.
    pub attributes: Attributes,
    /// The crime in progress, if any.
    pub active_crime: Option<CrimeSession>,
    /// Per-crime resolution timestamps, for cooldown enforcement.
    ///
    /// Tracked independently of [`active_crime`](Self::active_crime): a
    /// crime can be off cooldown while another crime is still running.
    pub crime_last_used: BTreeMap<CrimeId, DateTime<Utc>>,
    /// Anchor of the energy regeneration computation.
    ///
    /// Advances in whole regeneration intervals so fractional progress
    /// between observations is never lost.
    pub last_energy_observed_at: DateTime<Utc>,
    /// When the player last raided another player, for the PvP cooldown.
    pub last_player_attack_at: Option<DateTime<Utc>>,
}

impl PlayerState {
    /// Create a fresh player with the given starting balances.
    ///
    /// Used when the durable store has no snapshot for the player yet.
    /// `experience_to_next` starts at `xp_per_level` for level 1.
    pub fn seeded(
        id: PlayerId,
        cash: u64,
        premium: u64,
        energy: u32,
        soldiers: u32,
        xp_per_level: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            level: 1,
            experience: 0,
            experience_to_next: xp_per_level,
            wallet: Wallet { cash, premium },
            energy,
            soldiers,
            weapons: BTreeMap::new(),
            attributes: Attributes::default(),
            active_crime: None,
            crime_last_used: BTreeMap::new(),
            last_energy_observed_at: at,
            last_player_attack_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Businesses
// ---------------------------------------------------------------------------

/// An owned business instance and its timed-action state.
///
/// Invariants:
/// - `activity != Idle` implies `action_kind`, `action_started_at`, and
///   `action_duration_secs` are all set.
/// - `level <= max_level` always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    /// This instance's identity.
    pub id: AssetId,
    /// The catalog kind this business was founded from.
    pub kind: crate::ids::BusinessId,
    /// Current level (founded at 1).
    pub level: u32,
    /// Level cap, copied from the catalog at founding.
    pub max_level: u32,
    /// Current timed-action state.
    pub activity: Activity,
    /// The kind of action in progress, if any.
    pub action_kind: Option<ActionKind>,
    /// When the in-progress action started.
    pub action_started_at: Option<DateTime<Utc>>,
    /// How long the in-progress action runs, in seconds.
    pub action_duration_secs: Option<u64>,
    /// The level-1 income rate, cash per hour.
    pub base_rate_per_hour: u64,
    /// The current income rate, cash per hour.
    pub rate_per_hour: u64,
    /// Anchor of the income accrual computation.
    pub last_collected_at: DateTime<Utc>,
    /// Income accrued at a superseded rate, still awaiting collection.
    ///
    /// Banked when an upgrade completes so the pre-upgrade accrual is
    /// preserved at the old rate.
    pub carried_earnings: u64,
    /// Lifetime total collected from this business.
    pub accumulated_earnings: u64,
}

impl Business {
    /// Create a level-1 business from its catalog definition.
    ///
    /// The business starts `Idle`; the caller immediately starts the
    /// `Build` action through the timed-action engine, which debits the
    /// founding cost and schedules construction.
    pub fn found(definition: &BusinessDefinition, at: DateTime<Utc>) -> Self {
        Self {
            id: AssetId::new(),
            kind: definition.id,
            level: 1,
            max_level: definition.max_level,
            activity: Activity::Idle,
            action_kind: None,
            action_started_at: None,
            action_duration_secs: None,
            base_rate_per_hour: definition.base_rate_per_hour,
            rate_per_hour: definition.base_rate_per_hour,
            last_collected_at: at,
            carried_earnings: 0,
            accumulated_earnings: 0,
        }
    }

    /// Return the instant the in-progress action completes, if any.
    ///
    /// `None` when idle or when the action window is malformed (which
    /// would be an invariant breach, handled by the engine).
    pub fn action_deadline(&self) -> Option<DateTime<Utc>> {
        let started = self.action_started_at?;
        let duration = self.action_duration_secs?;
        let secs = i64::try_from(duration).ok()?;
        started.checked_add_signed(chrono::Duration::seconds(secs))
    }
}

// ---------------------------------------------------------------------------
// Territories
// ---------------------------------------------------------------------------

/// A contestable map entity with a garrison and passive income.
///
/// Invariant: `status == Owned` if and only if `owner` is the session
/// player (`PlayerSession` maintains this on every mutation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// The territory's identity (shared with its catalog definition).
    pub id: TerritoryId,
    /// The current owner, if any.
    pub owner: Option<PlayerId>,
    /// Soldiers garrisoning the territory.
    pub defender_force: u32,
    /// Passive income rate for the owner, cash per hour.
    pub income_rate_per_hour: u64,
    /// Standing relative to the session player.
    pub status: TerritoryStatus,
    /// Anchor of the income accrual computation (meaningful while owned).
    pub last_collected_at: DateTime<Utc>,
}

impl Territory {
    /// Create a neutral territory from its catalog definition.
    pub fn neutral(definition: &TerritoryDefinition, at: DateTime<Utc>) -> Self {
        Self {
            id: definition.id,
            owner: None,
            defender_force: definition.defender_force,
            income_rate_per_hour: definition.income_rate_per_hour,
            status: TerritoryStatus::Neutral,
            last_collected_at: at,
        }
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// A force sent into battle: soldiers plus the weapons arming them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceComposition {
    /// Soldiers committed.
    pub soldiers: u32,
    /// Weapon counts committed, by catalog id.
    pub weapons: BTreeMap<WeaponId, u32>,
}

impl ForceComposition {
    /// A force of unarmed soldiers.
    pub fn soldiers_only(soldiers: u32) -> Self {
        Self {
            soldiers,
            weapons: BTreeMap::new(),
        }
    }
}

/// A rival's defensive posture, as reported by the backend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    /// The rival player's identity.
    pub player_id: PlayerId,
    /// The rival's defending force.
    pub defense: ForceComposition,
    /// The rival's cash on hand (basis for loot).
    pub cash: u64,
}

/// The outcome of a resolved battle, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Who prevailed.
    pub outcome: CombatOutcome,
    /// Attacking soldiers that returned to the player's reserve.
    pub surviving_force: u32,
    /// Enemy soldiers absorbed into the player's reserve on conquest.
    pub captured_force: u32,
    /// Attacking soldiers lost.
    pub attacker_losses: u32,
    /// Defending soldiers lost.
    pub defender_losses: u32,
    /// Cash taken from the defender.
    pub cash_looted: u64,
}

// ---------------------------------------------------------------------------
// Ledger entries
// ---------------------------------------------------------------------------

/// One audited balance movement.
///
/// Entries are append-only: they are never modified or deleted. The
/// `balance_after` field makes the log self-auditing — replaying the
/// entries must reproduce every intermediate balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// This entry's identity.
    pub id: LedgerEntryId,
    /// When the movement happened (simulation time).
    pub at: DateTime<Utc>,
    /// Which balance moved.
    pub currency: Currency,
    /// Debit or credit.
    pub direction: EntryDirection,
    /// The amount moved. Always positive.
    pub amount: u64,
    /// The business-rule category of the movement.
    pub reason: LedgerReason,
    /// The balance after the movement was applied.
    pub balance_after: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BusinessDefinition;
    use crate::ids::BusinessId;

    fn protection_racket() -> BusinessDefinition {
        BusinessDefinition {
            id: BusinessId::new(),
            name: "Protection Racket".to_owned(),
            cost: 500,
            base_rate_per_hour: 120,
            build_duration_secs: 300,
            upgrade_base_cost: 250,
            upgrade_duration_secs: 600,
            max_level: 10,
            required_level: 1,
        }
    }

    #[test]
    fn seeded_player_starts_at_level_one() {
        let now = Utc::now();
        let player = PlayerState::seeded(PlayerId::new(), 500, 5, 100, 10, 100, now);
        assert_eq!(player.level, 1);
        assert_eq!(player.experience, 0);
        assert_eq!(player.experience_to_next, 100);
        assert_eq!(player.wallet.balance(Currency::Cash), 500);
        assert_eq!(player.wallet.balance(Currency::Premium), 5);
        assert!(player.active_crime.is_none());
    }

    #[test]
    fn founded_business_is_idle_level_one() {
        let now = Utc::now();
        let def = protection_racket();
        let business = Business::found(&def, now);
        assert_eq!(business.level, 1);
        assert_eq!(business.activity, Activity::Idle);
        assert_eq!(business.rate_per_hour, def.base_rate_per_hour);
        assert!(business.action_deadline().is_none());
    }

    #[test]
    fn action_deadline_derives_from_window() {
        let now = Utc::now();
        let def = protection_racket();
        let mut business = Business::found(&def, now);
        business.activity = Activity::Building;
        business.action_kind = Some(ActionKind::Build);
        business.action_started_at = Some(now);
        business.action_duration_secs = Some(300);
        let deadline = business.action_deadline();
        assert_eq!(deadline, now.checked_add_signed(chrono::Duration::seconds(300)));
    }

    #[test]
    fn player_state_roundtrip_serde() {
        let now = Utc::now();
        let player = PlayerState::seeded(PlayerId::new(), 100, 1, 50, 3, 100, now);
        let json = serde_json::to_string(&player).ok();
        assert!(json.is_some());
        let back: Result<PlayerState, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok().as_ref(), Some(&player));
    }
}
