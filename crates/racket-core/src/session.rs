//! The player session: the single authority over one player's state.
//!
//! Every command follows the same shape:
//!
//! 1. **Reconcile.** Observe the clock once, regenerate energy, poll every
//!    business, and resolve a due crime. Completions are level-triggered,
//!    so an action that expired while the process was away completes on
//!    the next command, whatever that command is.
//! 2. **Validate locally, mutating nothing.** Business-rule violations
//!    come back as [`CommandError::Declined`] with the state untouched.
//! 3. **Commit through the gateway.** A transport error or a backend
//!    refusal also leaves local state untouched.
//! 4. **Apply and save.** Only a committed command mutates the session,
//!    and the result is persisted before the receipt is returned.
//!
//! The session owns the clock and the RNG, so the engines underneath stay
//! pure: time and randomness enter here and nowhere else.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use racket_ledger::Ledger;
use racket_sim::timed::{self, CompletionEffect, PollOutcome, StartRequest};
use racket_sim::{combat, crime, energy, income, CrimeOutcome, SimError};
use racket_types::{
    ActionKind, AssetId, Business, BusinessId, CombatOutcome, CombatReport, CrimeId, Currency,
    DeclineReason, ForceComposition, LedgerEntry, LedgerReason, PlayerId, PlayerState,
    TargetProfile, Territory, TerritoryId, TerritoryStatus, WeaponId,
};

use crate::catalog::{Catalog, CatalogError};
use crate::clock::Clock;
use crate::config::GameConfig;
use crate::gateway::{CommitAck, GatewayError, PersistenceGateway};

/// Errors returned by session commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command was refused by local validation. State is untouched
    /// and the message is safe to show to the player.
    #[error("{0}")]
    Declined(DeclineReason),

    /// The backend refused the committed command. State is untouched.
    #[error("rejected by the backend: {message}")]
    Refused {
        /// The backend's user-safe explanation.
        message: String,
    },

    /// The persistence transport failed. State is untouched; retryable.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A referenced catalog entry does not exist.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A simulation engine hit an arithmetic fault or invariant breach.
    #[error(transparent)]
    Sim(#[from] SimError),
}

impl From<DeclineReason> for CommandError {
    fn from(reason: DeclineReason) -> Self {
        Self::Declined(reason)
    }
}

impl From<racket_ledger::LedgerError> for CommandError {
    fn from(source: racket_ledger::LedgerError) -> Self {
        Self::Sim(SimError::from(source))
    }
}

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Energy points regenerated.
    pub energy_gained: u32,
    /// Timed actions that completed, in asset-id order.
    pub completed: Vec<(AssetId, CompletionEffect)>,
    /// The crime outcome, if a crime was active.
    pub crime: Option<CrimeOutcome>,
}

/// Receipt for a founded business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReceipt {
    /// The new business instance.
    pub asset_id: AssetId,
    /// When construction completes.
    pub completes_at: DateTime<Utc>,
}

/// Receipt for a started upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeReceipt {
    /// Cash debited for the upgrade.
    pub cost: u64,
    /// When the upgrade completes.
    pub completes_at: DateTime<Utc>,
}

/// Receipt for an accelerated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelerationReceipt {
    /// Premium currency spent.
    pub premium_spent: u64,
    /// The completion effect applied.
    pub effect: CompletionEffect,
}

/// Receipt for a committed crime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrimeReceipt {
    /// When the crime becomes resolvable.
    pub resolves_at: DateTime<Utc>,
}

/// A read-only copy of the session's visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The player's state.
    pub player: PlayerState,
    /// Owned businesses, in id order.
    pub businesses: Vec<Business>,
    /// All territories, in id order.
    pub territories: Vec<Territory>,
    /// The full economy ledger.
    pub ledger: Vec<LedgerEntry>,
}

/// One player's live session.
pub struct PlayerSession<C, G, R> {
    player: PlayerState,
    businesses: BTreeMap<AssetId, Business>,
    territories: BTreeMap<TerritoryId, Territory>,
    catalog: Catalog,
    config: GameConfig,
    ledger: Ledger,
    clock: C,
    gateway: G,
    rng: R,
}

impl<C, G, R> PlayerSession<C, G, R>
where
    C: Clock,
    G: PersistenceGateway,
    R: Rng,
{
    /// Open a session: load the player (or seed a new one) and lay out
    /// the territory map from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Gateway`] if the player cannot be loaded.
    pub fn open(
        player_id: PlayerId,
        catalog: Catalog,
        config: GameConfig,
        clock: C,
        mut gateway: G,
        rng: R,
    ) -> Result<Self, CommandError> {
        let now = clock.now();
        let player = match gateway.load_player(player_id)? {
            Some(player) => player,
            None => {
                info!(player = %player_id, "No saved state; seeding a new player");
                PlayerState::seeded(
                    player_id,
                    config.starting.cash,
                    config.starting.premium,
                    config.starting.energy,
                    config.starting.soldiers,
                    config.mechanics.progression.xp_per_level,
                    now,
                )
            }
        };

        let territories = catalog
            .territories()
            .map(|def| (def.id, Territory::neutral(def, now)))
            .collect();

        Ok(Self {
            player,
            businesses: BTreeMap::new(),
            territories,
            catalog,
            config,
            ledger: Ledger::new(),
            clock,
            gateway,
            rng,
        })
    }

    /// Mutable access to the gateway, mainly for priming test stubs.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// A read-only copy of everything the UI renders.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            player: self.player.clone(),
            businesses: self.businesses.values().cloned().collect(),
            territories: self.territories.values().cloned().collect(),
            ledger: self.ledger.entries().to_vec(),
        }
    }

    /// Reconcile elapsed time and persist the result.
    ///
    /// This is the periodic entry point (the UI calls it every tick),
    /// but every command runs the same reconciliation first, so calling
    /// it is never *required* for correctness.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] on engine faults or a failed save.
    pub fn tick(&mut self) -> Result<TickReport, CommandError> {
        let report = self.reconcile()?;
        self.gateway.save_player(&self.player)?;
        Ok(report)
    }

    /// Found a new business of the given catalog kind.
    ///
    /// Debits the founding cost and starts construction; the business
    /// earns nothing until the build completes.
    ///
    /// # Errors
    ///
    /// Declines on slot limit, player level, or funds; fails on gateway
    /// or engine trouble with state untouched.
    pub fn found_business(&mut self, kind: BusinessId) -> Result<BuildReceipt, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();
        let def = self.catalog.business(kind)?.clone();

        let limit = self.config.business_slots.0;
        if self.businesses.len() >= usize::try_from(limit).unwrap_or(usize::MAX) {
            return Err(DeclineReason::SlotLimitReached { limit }.into());
        }

        let mut business = Business::found(&def, now);
        let request = StartRequest {
            kind: ActionKind::Build,
            duration_secs: def.build_duration_secs,
            cash_cost: def.cost,
            premium_cost: 0,
            required_level: def.required_level,
        };
        if let Some(reason) =
            timed::validate_start(&business, &request, self.player.level, &self.player.wallet)
        {
            return Err(reason.into());
        }

        ensure_accepted(self.gateway.build_asset(self.player.id, kind, def.cost)?)?;

        timed::start(
            &mut business,
            &request,
            &mut self.player.wallet,
            &mut self.ledger,
            now,
        )?;
        let completes_at = business.action_deadline().ok_or_else(|| {
            SimError::InvariantBreach {
                context: String::from("freshly started build has no deadline"),
            }
        })?;
        let asset_id = business.id;
        self.businesses.insert(asset_id, business);
        self.gateway.save_player(&self.player)?;

        info!(asset = %asset_id, kind = %kind, cost = def.cost, "Business founded");
        Ok(BuildReceipt {
            asset_id,
            completes_at,
        })
    }

    /// Start upgrading a business one level.
    ///
    /// The cost scales linearly: `upgrade_base_cost * current_level`.
    /// Income keeps accruing at the current rate until the upgrade
    /// completes.
    ///
    /// # Errors
    ///
    /// Declines on a busy asset, the level cap, or funds.
    pub fn start_upgrade(&mut self, asset: AssetId) -> Result<UpgradeReceipt, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let Some(business) = self.businesses.get(&asset) else {
            return Err(DeclineReason::UnknownAsset(asset).into());
        };
        let def = self.catalog.business(business.kind)?.clone();
        let cost = def
            .upgrade_base_cost
            .checked_mul(u64::from(business.level))
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("upgrade cost overflow"),
            })?;

        let request = StartRequest {
            kind: ActionKind::Upgrade,
            duration_secs: def.upgrade_duration_secs,
            cash_cost: cost,
            premium_cost: 0,
            required_level: def.required_level,
        };
        if let Some(reason) =
            timed::validate_start(business, &request, self.player.level, &self.player.wallet)
        {
            return Err(reason.into());
        }

        ensure_accepted(self.gateway.upgrade_asset(self.player.id, asset, cost)?)?;

        let Some(business) = self.businesses.get_mut(&asset) else {
            return Err(DeclineReason::UnknownAsset(asset).into());
        };
        timed::start(
            business,
            &request,
            &mut self.player.wallet,
            &mut self.ledger,
            now,
        )?;
        let completes_at = business.action_deadline().ok_or_else(|| {
            SimError::InvariantBreach {
                context: String::from("freshly started upgrade has no deadline"),
            }
        })?;
        self.gateway.save_player(&self.player)?;

        info!(asset = %asset, cost, "Upgrade started");
        Ok(UpgradeReceipt { cost, completes_at })
    }

    /// Finish an in-progress build or upgrade immediately for premium
    /// currency, one unit per started block of remaining time.
    ///
    /// # Errors
    ///
    /// Declines if nothing is in progress (including an action that the
    /// opening reconciliation just completed) or if the premium balance
    /// cannot cover the price.
    pub fn accelerate(&mut self, asset: AssetId) -> Result<AccelerationReceipt, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let Some(business) = self.businesses.get_mut(&asset) else {
            return Err(DeclineReason::UnknownAsset(asset).into());
        };
        let outcome = timed::accelerate(
            business,
            &mut self.player.wallet,
            &mut self.ledger,
            &self.config.mechanics.acceleration,
            now,
        )?;
        match outcome {
            timed::AccelerateOutcome::Declined(reason) => Err(reason.into()),
            timed::AccelerateOutcome::Completed {
                premium_spent,
                effect,
            } => {
                self.gateway.save_player(&self.player)?;
                info!(asset = %asset, premium_spent, "Action accelerated");
                Ok(AccelerationReceipt {
                    premium_spent,
                    effect,
                })
            }
        }
    }

    /// Collect the pending income of one business.
    ///
    /// Returns the amount credited, which is the backend's authoritative
    /// figure when it supplies one.
    ///
    /// # Errors
    ///
    /// Fails on gateway trouble with nothing collected.
    pub fn collect(&mut self, asset: AssetId) -> Result<u64, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let Some(business) = self.businesses.get(&asset) else {
            return Err(DeclineReason::UnknownAsset(asset).into());
        };
        let pending = income::business_pending(business, now)?;
        if pending == 0 {
            return Ok(0);
        }

        let ack = ensure_accepted(self.gateway.claim_income(self.player.id, pending)?)?;
        let amount = ack.authoritative_amount.unwrap_or(pending);

        if amount > 0 {
            self.ledger.credit(
                &mut self.player.wallet,
                Currency::Cash,
                amount,
                LedgerReason::IncomeCollection,
                now,
            )?;
        }
        if let Some(business) = self.businesses.get_mut(&asset) {
            income::settle_business(business, amount, now);
        }
        self.gateway.save_player(&self.player)?;

        info!(asset = %asset, amount, "Income collected");
        Ok(amount)
    }

    /// Collect pending income from every business and owned territory in
    /// one atomic claim.
    ///
    /// The whole plan commits or none of it does: a gateway failure or
    /// refusal leaves every accrual anchor untouched, so nothing owed is
    /// lost.
    ///
    /// # Errors
    ///
    /// Fails on gateway trouble with nothing collected.
    pub fn collect_all(&mut self) -> Result<u64, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let plan =
            income::plan_collection(self.businesses.values(), self.territories.values(), now)?;
        if plan.total == 0 {
            return Ok(0);
        }

        let ack = ensure_accepted(self.gateway.claim_income(self.player.id, plan.total)?)?;
        let total = ack.authoritative_amount.unwrap_or(plan.total);

        if total > 0 {
            self.ledger.credit(
                &mut self.player.wallet,
                Currency::Cash,
                total,
                LedgerReason::IncomeCollection,
                now,
            )?;
        }
        for line in &plan.lines {
            match line.source {
                income::IncomeSource::Business(id) => {
                    if let Some(business) = self.businesses.get_mut(&id) {
                        income::settle_business(business, line.amount, now);
                    }
                }
                income::IncomeSource::Territory(id) => {
                    if let Some(territory) = self.territories.get_mut(&id) {
                        income::settle_territory(territory, now);
                    }
                }
            }
        }
        self.gateway.save_player(&self.player)?;

        info!(total, lines = plan.lines.len(), "Collected all pending income");
        Ok(total)
    }

    /// Commit a crime: debit its energy and start its timer.
    ///
    /// The outcome is resolved by a later reconciliation once the timer
    /// expires.
    ///
    /// # Errors
    ///
    /// Declines in order: a crime already active, player level, this
    /// crime's cooldown, energy.
    pub fn commit_crime(&mut self, crime_id: CrimeId) -> Result<CrimeReceipt, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let def = self.catalog.crime(crime_id)?.clone();
        crime::commit(&mut self.player, &def, now).map_err(CommandError::Declined)?;

        let resolves_at = self
            .player
            .active_crime
            .map(|s| s.ends_at)
            .ok_or_else(|| SimError::InvariantBreach {
                context: String::from("committed crime left no session"),
            })?;
        self.gateway.save_player(&self.player)?;

        info!(crime = %crime_id, energy = def.energy_cost, "Crime committed");
        Ok(CrimeReceipt { resolves_at })
    }

    /// Assault a territory with soldiers from the reserve.
    ///
    /// Strict force comparison: win and the garrison is captured into
    /// the reserve along with the survivors; lose and the whole force is
    /// gone. An exact tie destroys both forces and the defense holds.
    ///
    /// # Errors
    ///
    /// Declines on an owned territory, an empty force, or insufficient
    /// soldiers or weapons.
    pub fn attack_territory(
        &mut self,
        territory_id: TerritoryId,
        force: &ForceComposition,
    ) -> Result<CombatReport, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        let Some(territory) = self.territories.get(&territory_id) else {
            return Err(DeclineReason::UnknownTerritory(territory_id).into());
        };
        if territory.status == TerritoryStatus::Owned {
            return Err(DeclineReason::TerritoryAlreadyOwned.into());
        }
        if let Some(reason) = validate_force(&self.player, force) {
            return Err(reason.into());
        }
        let defending = territory.defender_force;

        ensure_accepted(
            self.gateway
                .attack_territory(self.player.id, territory_id, force)?,
        )?;

        let battle = combat::resolve_territory_attack(force.soldiers, defending);
        // The committed force leaves the reserve; survivors and any
        // captured garrison come back.
        self.player.soldiers = self
            .player
            .soldiers
            .saturating_sub(force.soldiers)
            .saturating_add(battle.surviving_force)
            .saturating_add(battle.captured_force);

        if let Some(territory) = self.territories.get_mut(&territory_id) {
            territory.defender_force = battle.defender_remaining;
            if battle.outcome == CombatOutcome::AttackerWins {
                territory.owner = Some(self.player.id);
                territory.status = TerritoryStatus::Owned;
                territory.last_collected_at = now;
            }
        }
        self.gateway.save_player(&self.player)?;

        let report = CombatReport {
            outcome: battle.outcome,
            surviving_force: battle.surviving_force,
            captured_force: battle.captured_force,
            attacker_losses: force.soldiers.saturating_sub(battle.surviving_force),
            defender_losses: defending.saturating_sub(battle.defender_remaining),
            cash_looted: 0,
        };
        info!(territory = %territory_id, outcome = ?report.outcome, "Territory attack resolved");
        Ok(report)
    }

    /// Move soldiers from the reserve into an owned territory's garrison.
    ///
    /// # Errors
    ///
    /// Declines on an unowned territory, an empty transfer, or an
    /// insufficient reserve.
    pub fn reinforce_territory(
        &mut self,
        territory_id: TerritoryId,
        soldiers: u32,
    ) -> Result<(), CommandError> {
        self.reconcile()?;

        let Some(territory) = self.territories.get(&territory_id) else {
            return Err(DeclineReason::UnknownTerritory(territory_id).into());
        };
        if territory.status != TerritoryStatus::Owned {
            return Err(DeclineReason::TerritoryNotOwned.into());
        }
        if soldiers == 0 {
            return Err(DeclineReason::EmptyForce.into());
        }
        if soldiers > self.player.soldiers {
            return Err(DeclineReason::InsufficientSoldiers {
                required: soldiers,
                available: self.player.soldiers,
            }
            .into());
        }

        ensure_accepted(
            self.gateway
                .reinforce_territory(self.player.id, territory_id, soldiers)?,
        )?;

        self.player.soldiers = self.player.soldiers.saturating_sub(soldiers);
        if let Some(territory) = self.territories.get_mut(&territory_id) {
            territory.defender_force = territory.defender_force.saturating_add(soldiers);
        }
        self.gateway.save_player(&self.player)?;

        info!(territory = %territory_id, soldiers, "Territory reinforced");
        Ok(())
    }

    /// Raid a rival player for a share of their cash.
    ///
    /// Weapon-adjusted power comparison; both sides take percentage
    /// soldier losses and a win loots a configured fraction of the
    /// rival's cash. One raid per cooldown window.
    ///
    /// # Errors
    ///
    /// Declines on an active cooldown, an empty force, or insufficient
    /// soldiers or weapons.
    pub fn attack_player(
        &mut self,
        target: &TargetProfile,
        force: &ForceComposition,
    ) -> Result<CombatReport, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();
        let cfg = self.config.mechanics.combat;

        if let Some(remaining_secs) = combat::cooldown_remaining(
            self.player.last_player_attack_at,
            cfg.player_attack_cooldown_secs,
            now,
        ) {
            return Err(DeclineReason::CooldownActive { remaining_secs }.into());
        }
        if let Some(reason) = validate_force(&self.player, force) {
            return Err(reason.into());
        }

        let attacker_power = combat::effective_power(force, self.catalog.arsenal(), &cfg)?;
        let defender_power =
            combat::effective_power(&target.defense, self.catalog.arsenal(), &cfg)?;

        ensure_accepted(
            self.gateway
                .attack_player(self.player.id, target.player_id, force)?,
        )?;

        let battle = combat::resolve_player_attack(
            attacker_power,
            defender_power,
            force.soldiers,
            target.defense.soldiers,
            target.cash,
            &cfg,
        )?;

        self.player.soldiers = self.player.soldiers.saturating_sub(battle.attacker_losses);
        self.player.last_player_attack_at = Some(now);
        if battle.cash_looted > 0 {
            self.ledger.credit(
                &mut self.player.wallet,
                Currency::Cash,
                battle.cash_looted,
                LedgerReason::CombatLoot,
                now,
            )?;
        }
        self.gateway.save_player(&self.player)?;

        let report = CombatReport {
            outcome: battle.outcome,
            surviving_force: force.soldiers.saturating_sub(battle.attacker_losses),
            captured_force: 0,
            attacker_losses: battle.attacker_losses,
            defender_losses: battle.defender_losses,
            cash_looted: battle.cash_looted,
        };
        info!(
            target = %target.player_id,
            outcome = ?report.outcome,
            loot = report.cash_looted,
            "Player raid resolved"
        );
        Ok(report)
    }

    /// Buy weapons from the catalog into the player's armory.
    ///
    /// Returns the cash debited. A zero count is a no-op.
    ///
    /// # Errors
    ///
    /// Declines on insufficient cash.
    pub fn buy_weapon(&mut self, weapon_id: WeaponId, count: u32) -> Result<u64, CommandError> {
        self.reconcile()?;
        let now = self.clock.now();

        if count == 0 {
            return Ok(0);
        }
        let def = self.catalog.weapon(weapon_id)?.clone();
        let cost = def
            .cost
            .checked_mul(u64::from(count))
            .ok_or_else(|| SimError::ArithmeticOverflow {
                context: String::from("weapon purchase cost overflow"),
            })?;
        if self.player.wallet.cash < cost {
            return Err(DeclineReason::InsufficientCash {
                required: cost,
                available: self.player.wallet.cash,
            }
            .into());
        }

        self.ledger.debit(
            &mut self.player.wallet,
            Currency::Cash,
            cost,
            LedgerReason::WeaponPurchase,
            now,
        )?;
        let owned = self.player.weapons.entry(weapon_id).or_insert(0);
        *owned = owned.saturating_add(count);
        self.gateway.save_player(&self.player)?;

        info!(weapon = %weapon_id, count, cost, "Weapons purchased");
        Ok(cost)
    }

    /// Catch the session up to the clock: energy, builds, upgrades, and
    /// a due crime. Called at the top of every command.
    fn reconcile(&mut self) -> Result<TickReport, CommandError> {
        let now = self.clock.now();
        let mut report = TickReport {
            energy_gained: energy::observe(&mut self.player, &self.config.mechanics.energy, now)?,
            ..TickReport::default()
        };

        for (asset_id, business) in &mut self.businesses {
            if let PollOutcome::Completed(effect) = timed::poll(business, now)? {
                report.completed.push((*asset_id, effect));
            }
        }

        if let Some(session) = self.player.active_crime {
            let def = self.catalog.crime(session.crime_id)?.clone();
            let roll = self.rng.random_range(0..100_u32);
            let outcome = crime::poll(
                &mut self.player,
                &def,
                &self.config.mechanics.progression,
                &self.config.mechanics.crime,
                &mut self.ledger,
                roll,
                now,
            )?;
            report.crime = Some(outcome);
        }

        if report.energy_gained > 0 || !report.completed.is_empty() || report.crime.is_some() {
            debug!(
                energy_gained = report.energy_gained,
                completed = report.completed.len(),
                crime = ?report.crime,
                "Reconciled elapsed time"
            );
        }
        Ok(report)
    }
}

/// Check a combat force against the player's reserve and armory.
fn validate_force(player: &PlayerState, force: &ForceComposition) -> Option<DeclineReason> {
    if force.soldiers == 0 {
        return Some(DeclineReason::EmptyForce);
    }
    if force.soldiers > player.soldiers {
        return Some(DeclineReason::InsufficientSoldiers {
            required: force.soldiers,
            available: player.soldiers,
        });
    }
    for (weapon, required) in &force.weapons {
        let available = player.weapons.get(weapon).copied().unwrap_or(0);
        if *required > available {
            return Some(DeclineReason::InsufficientWeapons {
                weapon: *weapon,
                required: *required,
                available,
            });
        }
    }
    None
}

fn ensure_accepted(ack: CommitAck) -> Result<CommitAck, CommandError> {
    if ack.accepted {
        Ok(ack)
    } else {
        warn!(message = %ack.message, "Backend refused the command");
        Err(CommandError::Refused {
            message: ack.message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::clock::ManualClock;
    use crate::gateway::InMemoryGateway;

    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    fn open_session(
    ) -> (PlayerSession<ManualClock, InMemoryGateway, SmallRng>, ManualClock) {
        let clock = ManualClock::new(epoch());
        let session = PlayerSession::open(
            PlayerId::new(),
            Catalog::starter(),
            GameConfig::default(),
            clock.clone(),
            InMemoryGateway::new(),
            SmallRng::seed_from_u64(7),
        )
        .unwrap();
        (session, clock)
    }

    #[test]
    fn fresh_session_seeds_player_and_territories() {
        let (session, _clock) = open_session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.player.level, 1);
        assert_eq!(snapshot.player.wallet.cash, 500);
        assert_eq!(snapshot.territories.len(), 2);
        assert!(snapshot.businesses.is_empty());
        assert!(
            snapshot
                .territories
                .iter()
                .all(|t| t.status == TerritoryStatus::Neutral)
        );
    }

    #[test]
    fn unknown_asset_is_a_decline() {
        let (mut session, _clock) = open_session();
        let result = session.start_upgrade(AssetId::new());
        assert!(matches!(
            result,
            Err(CommandError::Declined(DeclineReason::UnknownAsset(_)))
        ));
    }

    #[test]
    fn empty_force_declines_before_the_gateway() {
        let (mut session, _clock) = open_session();
        let territory_id = session.snapshot().territories.first().unwrap().id;
        let result = session.attack_territory(territory_id, &ForceComposition::default());
        assert!(matches!(
            result,
            Err(CommandError::Declined(DeclineReason::EmptyForce))
        ));
    }

    #[test]
    fn reinforcing_a_neutral_territory_declines() {
        let (mut session, _clock) = open_session();
        let territory_id = session.snapshot().territories.first().unwrap().id;
        let result = session.reinforce_territory(territory_id, 3);
        assert!(matches!(
            result,
            Err(CommandError::Declined(DeclineReason::TerritoryNotOwned))
        ));
    }

    #[test]
    fn buy_weapon_debits_and_arms() {
        let (mut session, _clock) = open_session();
        assert!(session.snapshot().player.weapons.is_empty());

        // Cheapest starter weapon: Brass Knuckles at 50.
        let weapon_id = session
            .catalog
            .weapons()
            .min_by_key(|def| def.cost)
            .map(|def| def.id)
            .unwrap();

        let cost = session.buy_weapon(weapon_id, 2).unwrap();
        assert_eq!(cost, 100);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.player.wallet.cash, 400);
        assert_eq!(snapshot.player.weapons.get(&weapon_id), Some(&2));
        assert_eq!(
            snapshot.ledger.last().map(|e| e.reason),
            Some(LedgerReason::WeaponPurchase)
        );
    }

    #[test]
    fn zero_weapon_purchase_is_a_no_op() {
        let (mut session, _clock) = open_session();
        let weapon_id = session.catalog.weapons().next().map(|d| d.id).unwrap();
        assert_eq!(session.buy_weapon(weapon_id, 0).unwrap(), 0);
        assert!(session.snapshot().ledger.is_empty());
    }
}
