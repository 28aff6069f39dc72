//! Enumeration types shared across the Racket workspace.
//!
//! This module holds the small closed vocabularies of the simulation:
//! currencies, asset activity states, territory standing, combat outcomes,
//! ledger bookkeeping categories, and the decline taxonomy returned for
//! every expected business-rule violation.

use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, TerritoryId, WeaponId};

// ---------------------------------------------------------------------------
// Currencies and ledger vocabulary
// ---------------------------------------------------------------------------

/// The two player balances tracked by the economy ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Ordinary cash, earned from businesses, crimes, and loot.
    Cash,
    /// Premium currency, spent to accelerate timed actions.
    Premium,
}

/// Whether a ledger entry removed from or added to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryDirection {
    /// The balance was reduced.
    Debit,
    /// The balance was increased.
    Credit,
}

/// The business-rule category of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LedgerReason {
    /// Cash spent founding a new business.
    BuildCost,
    /// Cash spent starting a business upgrade.
    UpgradeCost,
    /// Premium currency spent finishing a timed action early.
    Acceleration,
    /// Cash credited from a resolved crime.
    CrimePayout,
    /// Cash credited from collecting passive income.
    IncomeCollection,
    /// Cash looted from a defeated rival.
    CombatLoot,
    /// Cash spent buying weapons from the catalog.
    WeaponPurchase,
}

// ---------------------------------------------------------------------------
// Timed actions
// ---------------------------------------------------------------------------

/// The activity state of an upgradeable asset.
///
/// Anything other than [`Activity::Idle`] implies an action window
/// (start instant and duration) is set on the asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    /// No action in progress; the asset accrues income normally.
    #[default]
    Idle,
    /// Initial construction in progress; the asset earns nothing yet.
    Building,
    /// An upgrade in progress; income keeps accruing at the pre-upgrade rate.
    Upgrading,
}

/// The kind of timed action running on an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Initial construction after founding.
    Build,
    /// Level upgrade of an operating business.
    Upgrade,
}

// ---------------------------------------------------------------------------
// Territories and combat
// ---------------------------------------------------------------------------

/// The standing of a territory relative to the session player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerritoryStatus {
    /// Unclaimed; only the neutral garrison defends it.
    #[default]
    Neutral,
    /// Owned by the session player.
    Owned,
    /// Owned by a rival player.
    EnemyOwned,
    /// A battle for the territory is being resolved.
    UnderAttack,
}

/// The outcome of a resolved battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// The attacking force prevailed.
    AttackerWins,
    /// The defending force prevailed.
    DefenderWins,
    /// The forces were exactly matched.
    Draw,
}

// ---------------------------------------------------------------------------
// Decline taxonomy
// ---------------------------------------------------------------------------

/// Why a command was refused by local validation.
///
/// Declines are expected business-rule outcomes, not errors: they are
/// returned synchronously, never thrown, and every [`Display`] rendering
/// is safe to show directly to the player.
///
/// [`Display`]: core::fmt::Display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    /// Not enough cash for the attempted purchase.
    InsufficientCash {
        /// Cash the command needed.
        required: u64,
        /// Cash the player actually holds.
        available: u64,
    },
    /// Not enough premium currency.
    InsufficientPremium {
        /// Premium the command needed.
        required: u64,
        /// Premium the player actually holds.
        available: u64,
    },
    /// Not enough energy to commit the crime.
    InsufficientEnergy {
        /// Energy the crime costs.
        required: u32,
        /// Energy the player actually has.
        available: u32,
    },
    /// Not enough soldiers in reserve for the requested force.
    InsufficientSoldiers {
        /// Soldiers the command needed.
        required: u32,
        /// Soldiers in the player's reserve.
        available: u32,
    },
    /// The player does not own enough of a weapon to arm the force.
    InsufficientWeapons {
        /// The weapon in question.
        weapon: WeaponId,
        /// Count the force requested.
        required: u32,
        /// Count the player owns.
        available: u32,
    },
    /// The player's level is below the catalog requirement.
    LevelTooLow {
        /// Level the catalog entry requires.
        required: u32,
        /// The player's current level.
        current: u32,
    },
    /// The asset already has a timed action in progress.
    ActionInProgress,
    /// Acceleration was requested but nothing is in progress.
    NoActionInProgress,
    /// The asset is already at its maximum level.
    MaxLevelReached {
        /// The asset's level cap.
        max_level: u32,
    },
    /// The player already operates the maximum number of businesses.
    SlotLimitReached {
        /// The configured business slot limit.
        limit: u32,
    },
    /// A cooldown window is still active.
    CooldownActive {
        /// Seconds until the cooldown expires.
        remaining_secs: u64,
    },
    /// A crime session is already running.
    CrimeAlreadyActive,
    /// A combat command was issued with an empty force.
    EmptyForce,
    /// The territory is already owned by the player.
    TerritoryAlreadyOwned,
    /// A reinforcement was attempted on a territory the player does not own.
    TerritoryNotOwned,
    /// The referenced business instance does not exist in this session.
    UnknownAsset(AssetId),
    /// The referenced territory does not exist in this session.
    UnknownTerritory(TerritoryId),
}

impl core::fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientCash { required, available } => {
                write!(f, "not enough cash: need ${required}, have ${available}")
            }
            Self::InsufficientPremium { required, available } => {
                write!(f, "not enough favors: need {required}, have {available}")
            }
            Self::InsufficientEnergy { required, available } => {
                write!(f, "not enough energy: need {required}, have {available}")
            }
            Self::InsufficientSoldiers { required, available } => {
                write!(f, "not enough soldiers: need {required}, have {available}")
            }
            Self::InsufficientWeapons { weapon, required, available } => {
                write!(f, "not enough of weapon {weapon}: need {required}, have {available}")
            }
            Self::LevelTooLow { required, current } => {
                write!(f, "requires level {required} (you are level {current})")
            }
            Self::ActionInProgress => write!(f, "an operation is already in progress here"),
            Self::NoActionInProgress => write!(f, "nothing is in progress to speed up"),
            Self::MaxLevelReached { max_level } => {
                write!(f, "already at the maximum level ({max_level})")
            }
            Self::SlotLimitReached { limit } => {
                write!(f, "you already run the maximum of {limit} businesses")
            }
            Self::CooldownActive { remaining_secs } => {
                write!(f, "still cooling down: {remaining_secs}s remaining")
            }
            Self::CrimeAlreadyActive => write!(f, "already committing a crime"),
            Self::EmptyForce => write!(f, "you must send at least one soldier"),
            Self::TerritoryAlreadyOwned => write!(f, "you already control this territory"),
            Self::TerritoryNotOwned => write!(f, "you do not control this territory"),
            Self::UnknownAsset(id) => write!(f, "no such business: {id}"),
            Self::UnknownTerritory(id) => write!(f, "no such territory: {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_messages_are_user_safe() {
        let reason = DeclineReason::InsufficientCash {
            required: 500,
            available: 120,
        };
        assert_eq!(reason.to_string(), "not enough cash: need $500, have $120");

        let reason = DeclineReason::CooldownActive { remaining_secs: 42 };
        assert_eq!(reason.to_string(), "still cooling down: 42s remaining");
    }

    #[test]
    fn activity_default_is_idle() {
        assert_eq!(Activity::default(), Activity::Idle);
    }

    #[test]
    fn enums_roundtrip_serde() {
        let json = serde_json::to_string(&CombatOutcome::Draw).ok();
        assert!(json.is_some());
        let back: Result<CombatOutcome, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok(), Some(CombatOutcome::Draw));
    }
}
