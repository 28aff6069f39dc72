//! The persistence gateway trait and its in-memory stub.
//!
//! The session is the authority on progression math, but every mutating
//! command is committed through a [`PersistenceGateway`] before local
//! state changes. The gateway abstracts whatever sits behind it — a
//! remote backend, a local store, or the [`InMemoryGateway`] stub — and
//! its answers come in two flavors: a [`GatewayError`] is transport
//! trouble (retryable, nothing was committed), while a [`CommitAck`]
//! with `accepted == false` is the backend refusing the command on its
//! own rules.
//!
//! The stub records every call and can be primed to fail, refuse, or
//! override the income figure, so tests can exercise every branch of
//! the commit-then-apply ordering.

use std::collections::{BTreeMap, VecDeque};

use racket_types::{
    AssetId, BusinessId, ForceComposition, PlayerId, PlayerState, TerritoryId,
};

/// Errors from the persistence transport itself.
///
/// These mean the command never reached a decision; the session leaves
/// local state untouched and the caller may retry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The backend could not be reached or timed out.
    #[error("persistence unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure.
        message: String,
    },

    /// The backend answered with something the session cannot interpret.
    #[error("malformed persistence response: {message}")]
    Malformed {
        /// Description of what was wrong with the response.
        message: String,
    },
}

/// The backend's verdict on a committed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAck {
    /// Whether the backend accepted the command.
    pub accepted: bool,
    /// A user-safe explanation, mainly for refusals.
    pub message: String,
    /// The backend's own figure for the amount involved, when it
    /// disagrees with (or simply confirms) the session's optimistic
    /// computation. Present on income claims.
    pub authoritative_amount: Option<u64>,
}

impl CommitAck {
    /// An unconditional acceptance.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            message: String::new(),
            authoritative_amount: None,
        }
    }

    /// A refusal with a user-safe message.
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
            authoritative_amount: None,
        }
    }
}

/// The durable-store boundary for every mutating command.
///
/// One method per command in the session's surface. Implementations
/// must be atomic per call: a returned [`GatewayError`] guarantees the
/// command was not committed.
pub trait PersistenceGateway {
    /// Load the player's saved state, if any exists.
    fn load_player(&mut self, id: PlayerId) -> Result<Option<PlayerState>, GatewayError>;

    /// Persist the player's current state.
    fn save_player(&mut self, player: &PlayerState) -> Result<(), GatewayError>;

    /// Commit founding a new business of the given catalog kind.
    fn build_asset(
        &mut self,
        player: PlayerId,
        kind: BusinessId,
        cost: u64,
    ) -> Result<CommitAck, GatewayError>;

    /// Commit starting an upgrade on an existing business.
    fn upgrade_asset(
        &mut self,
        player: PlayerId,
        asset: AssetId,
        cost: u64,
    ) -> Result<CommitAck, GatewayError>;

    /// Commit an assault on a territory.
    fn attack_territory(
        &mut self,
        player: PlayerId,
        territory: TerritoryId,
        force: &ForceComposition,
    ) -> Result<CommitAck, GatewayError>;

    /// Commit moving reserve soldiers into a territory garrison.
    fn reinforce_territory(
        &mut self,
        player: PlayerId,
        territory: TerritoryId,
        soldiers: u32,
    ) -> Result<CommitAck, GatewayError>;

    /// Commit an income claim for the given optimistic total.
    ///
    /// The returned ack may carry an `authoritative_amount` that
    /// overrides the session's figure.
    fn claim_income(&mut self, player: PlayerId, total: u64) -> Result<CommitAck, GatewayError>;

    /// Commit a raid on a rival player.
    fn attack_player(
        &mut self,
        attacker: PlayerId,
        target: PlayerId,
        force: &ForceComposition,
    ) -> Result<CommitAck, GatewayError>;
}

/// One recorded gateway call, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `load_player` was invoked.
    LoadPlayer(PlayerId),
    /// `save_player` was invoked.
    SavePlayer(PlayerId),
    /// `build_asset` was invoked.
    BuildAsset {
        /// The catalog kind being founded.
        kind: BusinessId,
        /// The committed cost.
        cost: u64,
    },
    /// `upgrade_asset` was invoked.
    UpgradeAsset {
        /// The business being upgraded.
        asset: AssetId,
        /// The committed cost.
        cost: u64,
    },
    /// `attack_territory` was invoked.
    AttackTerritory {
        /// The contested territory.
        territory: TerritoryId,
        /// Soldiers committed.
        soldiers: u32,
    },
    /// `reinforce_territory` was invoked.
    ReinforceTerritory {
        /// The reinforced territory.
        territory: TerritoryId,
        /// Soldiers moved in.
        soldiers: u32,
    },
    /// `claim_income` was invoked.
    ClaimIncome {
        /// The session's optimistic total.
        total: u64,
    },
    /// `attack_player` was invoked.
    AttackPlayer {
        /// The raided rival.
        target: PlayerId,
    },
}

/// An always-accepting in-memory gateway for tests and demos.
///
/// Records every call in order. Primed behaviors apply to the *next*
/// mutating commit only, then clear, so a test can fail one command and
/// watch the following one succeed.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    calls: Vec<GatewayCall>,
    saved: BTreeMap<PlayerId, PlayerState>,
    fail_next: VecDeque<GatewayError>,
    refuse_next: VecDeque<String>,
    income_override: Option<u64>,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mutating commit fail with a transport error.
    pub fn prime_failure(&mut self, error: GatewayError) {
        self.fail_next.push_back(error);
    }

    /// Make the next mutating commit come back refused.
    pub fn prime_refusal(&mut self, message: impl Into<String>) {
        self.refuse_next.push_back(message.into());
    }

    /// Make the next income claim return this authoritative amount.
    pub fn prime_income_override(&mut self, amount: u64) {
        self.income_override = Some(amount);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    /// The last state saved for the player, if any.
    pub fn saved_player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.saved.get(&id)
    }

    fn commit(&mut self, call: GatewayCall) -> Result<CommitAck, GatewayError> {
        if let Some(error) = self.fail_next.pop_front() {
            return Err(error);
        }
        self.calls.push(call);
        if let Some(message) = self.refuse_next.pop_front() {
            return Ok(CommitAck::refused(message));
        }
        Ok(CommitAck::accepted())
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn load_player(&mut self, id: PlayerId) -> Result<Option<PlayerState>, GatewayError> {
        self.calls.push(GatewayCall::LoadPlayer(id));
        Ok(self.saved.get(&id).cloned())
    }

    fn save_player(&mut self, player: &PlayerState) -> Result<(), GatewayError> {
        self.calls.push(GatewayCall::SavePlayer(player.id));
        self.saved.insert(player.id, player.clone());
        Ok(())
    }

    fn build_asset(
        &mut self,
        _player: PlayerId,
        kind: BusinessId,
        cost: u64,
    ) -> Result<CommitAck, GatewayError> {
        self.commit(GatewayCall::BuildAsset { kind, cost })
    }

    fn upgrade_asset(
        &mut self,
        _player: PlayerId,
        asset: AssetId,
        cost: u64,
    ) -> Result<CommitAck, GatewayError> {
        self.commit(GatewayCall::UpgradeAsset { asset, cost })
    }

    fn attack_territory(
        &mut self,
        _player: PlayerId,
        territory: TerritoryId,
        force: &ForceComposition,
    ) -> Result<CommitAck, GatewayError> {
        self.commit(GatewayCall::AttackTerritory {
            territory,
            soldiers: force.soldiers,
        })
    }

    fn reinforce_territory(
        &mut self,
        _player: PlayerId,
        territory: TerritoryId,
        soldiers: u32,
    ) -> Result<CommitAck, GatewayError> {
        self.commit(GatewayCall::ReinforceTerritory { territory, soldiers })
    }

    fn claim_income(&mut self, _player: PlayerId, total: u64) -> Result<CommitAck, GatewayError> {
        let override_amount = self.income_override.take();
        let mut ack = self.commit(GatewayCall::ClaimIncome { total })?;
        if ack.accepted {
            ack.authoritative_amount = override_amount.or(Some(total));
        }
        Ok(ack)
    }

    fn attack_player(
        &mut self,
        _attacker: PlayerId,
        target: PlayerId,
        _force: &ForceComposition,
    ) -> Result<CommitAck, GatewayError> {
        self.commit(GatewayCall::AttackPlayer { target })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut gateway = InMemoryGateway::new();
        let player = PlayerId::new();
        let kind = BusinessId::new();

        let ack = gateway.build_asset(player, kind, 500).unwrap();
        assert!(ack.accepted);
        let ack = gateway.claim_income(player, 120).unwrap();
        assert!(ack.accepted);

        assert_eq!(
            gateway.calls(),
            &[
                GatewayCall::BuildAsset { kind, cost: 500 },
                GatewayCall::ClaimIncome { total: 120 },
            ]
        );
    }

    #[test]
    fn primed_failure_applies_once() {
        let mut gateway = InMemoryGateway::new();
        let player = PlayerId::new();
        gateway.prime_failure(GatewayError::Unavailable {
            message: String::from("connection reset"),
        });

        let first = gateway.claim_income(player, 10);
        assert!(matches!(first, Err(GatewayError::Unavailable { .. })));
        // A failed commit is not recorded.
        assert!(gateway.calls().is_empty());

        let second = gateway.claim_income(player, 10);
        assert!(second.unwrap().accepted);
    }

    #[test]
    fn primed_refusal_carries_the_message() {
        let mut gateway = InMemoryGateway::new();
        let ack = {
            gateway.prime_refusal("territory contested by another attack");
            gateway
                .attack_territory(
                    PlayerId::new(),
                    TerritoryId::new(),
                    &ForceComposition::soldiers_only(5),
                )
                .unwrap()
        };
        assert!(!ack.accepted);
        assert_eq!(ack.message, "territory contested by another attack");
    }

    #[test]
    fn income_override_replaces_the_optimistic_total() {
        let mut gateway = InMemoryGateway::new();
        gateway.prime_income_override(95);
        let ack = gateway.claim_income(PlayerId::new(), 100).unwrap();
        assert_eq!(ack.authoritative_amount, Some(95));
        // Without an override the ack echoes the claimed total.
        let ack = gateway.claim_income(PlayerId::new(), 100).unwrap();
        assert_eq!(ack.authoritative_amount, Some(100));
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut gateway = InMemoryGateway::new();
        let player = PlayerState::seeded(PlayerId::new(), 500, 5, 100, 10, 100, chrono::Utc::now());
        gateway.save_player(&player).unwrap();
        let loaded = gateway.load_player(player.id).unwrap();
        assert_eq!(loaded.as_ref(), Some(&player));
    }
}
