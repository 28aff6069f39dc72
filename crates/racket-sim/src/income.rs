//! Passive income accrual and collection.
//!
//! Owed-but-uncollected income is *computed*, never ticked: pending income
//! is the asset's hourly rate times the seconds elapsed since the last
//! collection, integer math throughout. Assets under construction earn
//! nothing; assets mid-upgrade keep earning at their pre-upgrade rate
//! (the timed-action engine banks that accrual into `carried_earnings`
//! when the upgrade completes and the rate changes).
//!
//! Collection is two-phase so collect-all stays atomic across the
//! persistence boundary: [`plan_collection`] computes amounts without
//! mutating anything, the session commits the plan remotely, and only a
//! confirmed plan is applied to the assets.

use chrono::{DateTime, Utc};

use racket_types::{Activity, AssetId, Business, Territory, TerritoryId, TerritoryStatus};

use crate::error::SimError;

/// Seconds per accrual hour.
const SECS_PER_HOUR: u128 = 3600;

/// Income accrued by a rate over a time window, floored to whole cash.
///
/// Returns 0 for an empty or inverted window.
///
/// # Errors
///
/// Returns [`SimError::ArithmeticOverflow`] if the accrual exceeds
/// `u64::MAX`.
pub fn accrued(
    rate_per_hour: u64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<u64, SimError> {
    let elapsed_secs = to.signed_duration_since(from).num_seconds();
    let Ok(elapsed) = u128::try_from(elapsed_secs) else {
        return Ok(0);
    };

    let scaled = u128::from(rate_per_hour)
        .checked_mul(elapsed)
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("income accrual product overflow"),
        })?;
    let amount = scaled.checked_div(SECS_PER_HOUR).unwrap_or_default();
    u64::try_from(amount).map_err(|_err| SimError::ArithmeticOverflow {
        context: String::from("income accrual exceeds u64 range"),
    })
}

/// Pending income for a business: carried earnings plus fresh accrual.
///
/// Zero fresh accrual while the business is still under construction.
pub fn business_pending(business: &Business, now: DateTime<Utc>) -> Result<u64, SimError> {
    let fresh = match business.activity {
        Activity::Building => 0,
        // Upgrading businesses accrue at the (pre-upgrade) current rate.
        Activity::Idle | Activity::Upgrading => {
            accrued(business.rate_per_hour, business.last_collected_at, now)?
        }
    };
    business
        .carried_earnings
        .checked_add(fresh)
        .ok_or_else(|| SimError::ArithmeticOverflow {
            context: String::from("pending income overflow"),
        })
}

/// Pending income for a territory; zero unless the player owns it.
pub fn territory_pending(territory: &Territory, now: DateTime<Utc>) -> Result<u64, SimError> {
    if territory.status != TerritoryStatus::Owned {
        return Ok(0);
    }
    accrued(
        territory.income_rate_per_hour,
        territory.last_collected_at,
        now,
    )
}

/// The source of one collection line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeSource {
    /// An owned business.
    Business(AssetId),
    /// An owned territory.
    Territory(TerritoryId),
}

/// One asset's share of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionLine {
    /// Where the income came from.
    pub source: IncomeSource,
    /// The amount owed, computed at planning time.
    pub amount: u64,
}

/// A computed, not-yet-applied collection across many assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPlan {
    /// Per-asset amounts. Assets with nothing pending are omitted.
    pub lines: Vec<CollectionLine>,
    /// Sum of all lines.
    pub total: u64,
}

/// Compute a collection plan over all eligible assets. Pure.
///
/// # Errors
///
/// Returns [`SimError::ArithmeticOverflow`] if any accrual or the total
/// overflows.
pub fn plan_collection<'a>(
    businesses: impl Iterator<Item = &'a Business>,
    territories: impl Iterator<Item = &'a Territory>,
    now: DateTime<Utc>,
) -> Result<CollectionPlan, SimError> {
    let mut plan = CollectionPlan::default();

    for business in businesses {
        let amount = business_pending(business, now)?;
        if amount == 0 {
            continue;
        }
        plan.lines.push(CollectionLine {
            source: IncomeSource::Business(business.id),
            amount,
        });
        plan.total = plan.total.checked_add(amount).ok_or_else(|| {
            SimError::ArithmeticOverflow {
                context: String::from("collection total overflow"),
            }
        })?;
    }

    for territory in territories {
        let amount = territory_pending(territory, now)?;
        if amount == 0 {
            continue;
        }
        plan.lines.push(CollectionLine {
            source: IncomeSource::Territory(territory.id),
            amount,
        });
        plan.total = plan.total.checked_add(amount).ok_or_else(|| {
            SimError::ArithmeticOverflow {
                context: String::from("collection total overflow"),
            }
        })?;
    }

    Ok(plan)
}

/// Finalize a confirmed collection on one business.
pub fn settle_business(business: &mut Business, amount: u64, now: DateTime<Utc>) {
    business.carried_earnings = 0;
    business.last_collected_at = now;
    business.accumulated_earnings = business.accumulated_earnings.saturating_add(amount);
}

/// Finalize a confirmed collection on one territory.
pub const fn settle_territory(territory: &mut Territory, now: DateTime<Utc>) {
    territory.last_collected_at = now;
}
