//! Battle state machine.
//!
//! The [`Battle`] owns the roster for one match and drives it through its
//! phases:
//!
//! ```text
//! Setup ──begin──▶ AwaitingIntents ──advance──▶ Resolving ──▶ RoundComplete
//!                        ▲                                         │
//!                        └────────────── in progress ◀─────────────┤
//!                                                                  ▼
//!                                                              Finished
//! ```
//!
//! 1. **Setup**: Roster instantiated, loadouts checked against the catalog
//! 2. **AwaitingIntents**: One intent per required living combatant is queued
//! 3. **Resolving**: Intents are ordered by speed and applied one by one
//! 4. **RoundComplete**: Statuses tick, the outcome is evaluated
//! 5. **Finished**: Terminal; every further intent is rejected
//!
//! `Resolving` and `RoundComplete` only exist inside [`Battle::advance`];
//! callers observe `AwaitingIntents` or `Finished` once it returns.
//!
//! # Determinism
//!
//! Given the same catalog, roster, config and roll source, the same sequence
//! of submissions produces the same event stream. All iteration is in
//! [`CombatantId`] order and every random decision goes through the
//! battle's [`RollSource`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lnh_core::arena::RosterDefinition;
//! use lnh_core::battle::{Advance, Battle, BattleOutcome};
//! use lnh_core::catalog::{ActionCatalog, ActionDefinition, EffectSpec, TargetingRule};
//! use lnh_core::combatant::{CombatantDefinition, CombatantId, Team};
//! use lnh_core::config::BattleConfig;
//! use lnh_core::intent::TurnIntent;
//!
//! let catalog = Arc::new(ActionCatalog::from_definitions([
//!     ActionDefinition::new("strike", "Strike", TargetingRule::SingleEnemy, 10)
//!         .with_effect(EffectSpec::Damage { power: None }),
//! ]).unwrap());
//! let roster = RosterDefinition::new(vec![
//!     CombatantDefinition::new(CombatantId::new(1), "Hero", Team::PLAYER, 20),
//!     CombatantDefinition::new(CombatantId::new(2), "Slime", Team::ENEMY, 5),
//! ]);
//!
//! let mut battle = Battle::new(catalog, &roster, BattleConfig::with_seed(1)).unwrap();
//! battle.begin().unwrap();
//! battle.submit_intent(TurnIntent::single(CombatantId::new(1), "strike", CombatantId::new(2))).unwrap();
//! battle.submit_intent(TurnIntent::single(CombatantId::new(2), "strike", CombatantId::new(1))).unwrap();
//!
//! let Advance::Resolved(report) = battle.advance().unwrap() else { panic!("not ready") };
//! assert_eq!(report.outcome, BattleOutcome::Victory(Team::PLAYER));
//! assert!(battle.outcome().is_finished());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::{Arena, RosterDefinition};
use crate::catalog::ActionCatalog;
use crate::combatant::{Combatant, CombatantId, StatusKind, Team};
use crate::config::BattleConfig;
use crate::error::{ActorError, BattleError, SetupError};
use crate::event::{BattleEvent, EventEnvelope, EventLog};
use crate::intent::TurnIntent;
use crate::resolver::{
    validate_targets, ActionResolver, DamageModel, StandardFormula, TurnOrderResolver,
};
use crate::rng::{RngRolls, RollSource};

// =============================================================================
// Phase & Outcome
// =============================================================================

/// Lifecycle phase of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Roster loaded, not started.
    Setup,
    /// Collecting intents for the next round.
    AwaitingIntents,
    /// Applying queued intents in turn order.
    Resolving,
    /// Ticking statuses and evaluating the outcome.
    RoundComplete,
    /// Terminal.
    Finished,
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "Setup"),
            Self::AwaitingIntents => write!(f, "AwaitingIntents"),
            Self::Resolving => write!(f, "Resolving"),
            Self::RoundComplete => write!(f, "RoundComplete"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// Result of a battle.
///
/// Changes from `InProgress` to a terminal value exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// At least two teams still have living combatants.
    #[default]
    InProgress,
    /// Only this team has living combatants.
    Victory(Team),
    /// No team has living combatants.
    Draw,
}

impl BattleOutcome {
    /// True for `Victory` and `Draw`.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// The winning team, if there is one.
    #[must_use]
    pub const fn winner(self) -> Option<Team> {
        match self {
            Self::Victory(team) => Some(team),
            Self::InProgress | Self::Draw => None,
        }
    }

    /// Outcome for the roster as it stands now.
    fn evaluate(arena: &Arena) -> Self {
        let living = arena.teams_with_living();
        let mut teams = living.iter();
        match (teams.next(), teams.next()) {
            (None, _) => Self::Draw,
            (Some(&team), None) => Self::Victory(team),
            (Some(_), Some(_)) => Self::InProgress,
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Victory(team) => write!(f, "{team} victory"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

// =============================================================================
// Round Results
// =============================================================================

/// Everything that happened in one resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Intents in the order they resolved.
    pub order: Vec<TurnIntent>,
    /// Events in emission order.
    pub events: Vec<EventEnvelope>,
    /// Outcome after the round-end tick.
    pub outcome: BattleOutcome,
}

/// Result of asking the battle to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Some required combatants have not submitted yet.
    NotReady {
        /// Combatants still owing an intent, in ID order.
        pending: Vec<CombatantId>,
    },
    /// The round resolved.
    Resolved(RoundReport),
}

// =============================================================================
// Battle
// =============================================================================

/// One battle from setup to terminal outcome.
///
/// Owns its roster exclusively. The catalog is shared read-only with other
/// battles through an `Arc`.
pub struct Battle {
    catalog: Arc<ActionCatalog>,
    config: BattleConfig,
    arena: Arena,
    phase: BattlePhase,
    outcome: BattleOutcome,
    /// Rounds resolved so far.
    round: u32,
    intents: BTreeMap<CombatantId, TurnIntent>,
    /// Turn order for the queued intents; cleared whenever they change.
    order_cache: Option<Vec<TurnIntent>>,
    rolls: Box<dyn RollSource>,
    damage_model: Box<dyn DamageModel>,
    next_sequence: u64,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .field("round", &self.round)
            .field("arena", &self.arena)
            .field("intents", &self.intents)
            .field("catalog", &format!("[{} actions]", self.catalog.len()))
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// Creates a battle in the `Setup` phase.
    ///
    /// Accuracy rolls come from a ChaCha8 generator seeded with
    /// `config.seed`; use [`with_roll_source`](Self::with_roll_source) to
    /// replace it.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the roster is invalid or a loadout names
    /// an action missing from the catalog.
    pub fn new(
        catalog: Arc<ActionCatalog>,
        roster: &RosterDefinition,
        config: BattleConfig,
    ) -> Result<Self, SetupError> {
        for def in &roster.combatants {
            if let Some(action) = def.actions.iter().find(|a| !catalog.contains(a)) {
                return Err(SetupError::UnknownLoadoutAction {
                    combatant: def.id,
                    action: action.clone(),
                });
            }
        }
        let arena = Arena::from_roster(roster)?;
        let rolls = RngRolls::seeded(config.seed);

        debug!(
            combatants = arena.len(),
            actions = catalog.len(),
            seed = config.seed,
            "battle created"
        );

        Ok(Self {
            catalog,
            config,
            arena,
            phase: BattlePhase::Setup,
            outcome: BattleOutcome::InProgress,
            round: 0,
            intents: BTreeMap::new(),
            order_cache: None,
            rolls: Box::new(rolls),
            damage_model: Box::new(StandardFormula),
            next_sequence: 0,
        })
    }

    /// Replaces the roll source.
    #[must_use]
    pub fn with_roll_source(mut self, rolls: impl RollSource + 'static) -> Self {
        self.rolls = Box::new(rolls);
        self
    }

    /// Replaces the numeric model.
    #[must_use]
    pub fn with_damage_model(mut self, model: impl DamageModel + 'static) -> Self {
        self.damage_model = Box::new(model);
        self
    }

    /// Leaves `Setup` and starts accepting intents.
    ///
    /// # Errors
    ///
    /// - [`SetupError::AlreadyStarted`] outside `Setup`
    /// - [`SetupError::NotEnoughSides`] if fewer than two teams have a living
    ///   combatant
    pub fn begin(&mut self) -> Result<(), SetupError> {
        if self.phase != BattlePhase::Setup {
            return Err(SetupError::AlreadyStarted);
        }
        let living_sides = self.arena.teams_with_living().len();
        if living_sides < 2 {
            return Err(SetupError::NotEnoughSides { living_sides });
        }
        self.set_phase(BattlePhase::AwaitingIntents);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Returns the current outcome.
    #[must_use]
    pub const fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    /// Number of rounds resolved so far.
    #[must_use]
    pub const fn rounds_completed(&self) -> u32 {
        self.round
    }

    /// Returns the roster.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Looks up one combatant.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.arena.get(id)
    }

    /// Returns the shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ActionCatalog> {
        &self.catalog
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Queued intents, in actor ID order.
    pub fn queued_intents(&self) -> impl Iterator<Item = &TurnIntent> + '_ {
        self.intents.values()
    }

    /// True if the actor already queued an intent this round.
    #[must_use]
    pub fn has_intent(&self, actor: CombatantId) -> bool {
        self.intents.contains_key(&actor)
    }

    /// Living combatants whose intent is still required this round, in ID
    /// order. Empty outside `AwaitingIntents`.
    #[must_use]
    pub fn pending_actors(&self) -> Vec<CombatantId> {
        if self.phase != BattlePhase::AwaitingIntents {
            return Vec::new();
        }
        self.arena
            .living()
            .filter(|c| self.config.intent_policy.requires(c.team()))
            .map(Combatant::id)
            .filter(|id| !self.intents.contains_key(id))
            .collect()
    }

    /// True once every required intent is queued.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == BattlePhase::AwaitingIntents && self.pending_actors().is_empty()
    }

    /// Turn order for the intents queued so far.
    ///
    /// Computed once and cached until the queued intents change, so repeated
    /// calls return the identical sequence.
    pub fn turn_order(&mut self) -> &[TurnIntent] {
        let (rules, intents, arena) = (&self.config.rules, &self.intents, &self.arena);
        self.order_cache
            .get_or_insert_with(|| {
                let order = TurnOrderResolver::from_rules(rules).order(intents.values(), arena);
                debug!(
                    order = ?order.iter().map(|i| i.actor).collect::<Vec<_>>(),
                    "turn order computed"
                );
                order
            })
            .as_slice()
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Validates and queues an intent.
    ///
    /// Checks run in this order: battle phase, actor, duplicate, action,
    /// targets. A rejected intent leaves the battle unchanged.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleAlreadyFinished`] once the battle is over
    /// - [`BattleError::NotAcceptingIntents`] before [`begin`](Self::begin)
    /// - [`BattleError::InvalidActor`] for an unknown or defeated actor
    /// - [`BattleError::DuplicateIntent`] if the actor already queued one
    /// - [`BattleError::UnknownAction`] if the action is not in the catalog
    /// - [`BattleError::InvalidTarget`] if the targets don't fit the action
    pub fn submit_intent(&mut self, intent: TurnIntent) -> Result<(), BattleError> {
        if let Err(err) = self.check_intent(&intent) {
            debug!(actor = %intent.actor, action = %intent.action, %err, "intent rejected");
            return Err(err);
        }
        debug!(actor = %intent.actor, action = %intent.action, "intent accepted");
        self.intents.insert(intent.actor, intent);
        self.order_cache = None;
        Ok(())
    }

    fn check_intent(&self, intent: &TurnIntent) -> Result<(), BattleError> {
        self.ensure_accepting()?;
        let actor = self.arena.get(intent.actor).ok_or(BattleError::InvalidActor {
            actor: intent.actor,
            reason: ActorError::Unknown,
        })?;
        if actor.is_defeated() {
            return Err(BattleError::InvalidActor {
                actor: intent.actor,
                reason: ActorError::Defeated,
            });
        }
        if self.intents.contains_key(&intent.actor) {
            return Err(BattleError::DuplicateIntent(intent.actor));
        }
        let definition = self.catalog.lookup(&intent.action)?;
        validate_targets(intent, &definition, &self.arena)
    }

    fn ensure_accepting(&self) -> Result<(), BattleError> {
        match self.phase {
            BattlePhase::AwaitingIntents => Ok(()),
            BattlePhase::Finished => Err(BattleError::BattleAlreadyFinished),
            phase => Err(BattleError::NotAcceptingIntents(phase)),
        }
    }

    /// Removes a queued intent so the actor can choose again.
    ///
    /// Returns the removed intent, or `None` if the actor had none queued or
    /// the battle is not collecting intents.
    pub fn retract_intent(&mut self, actor: CombatantId) -> Option<TurnIntent> {
        if self.phase != BattlePhase::AwaitingIntents {
            return None;
        }
        let removed = self.intents.remove(&actor)?;
        debug!(actor = %actor, "intent retracted");
        self.order_cache = None;
        Some(removed)
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Resolves the round if every required intent is queued.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleAlreadyFinished`] once the battle is over
    /// - [`BattleError::NotAcceptingIntents`] before [`begin`](Self::begin)
    pub fn advance(&mut self) -> Result<Advance, BattleError> {
        self.ensure_accepting()?;
        let pending = self.pending_actors();
        if !pending.is_empty() {
            return Ok(Advance::NotReady { pending });
        }

        let order = self.turn_order().to_vec();
        let round = self.round + 1;

        self.set_phase(BattlePhase::Resolving);
        let mut log = EventLog::new(round, &mut self.next_sequence);
        let resolver = ActionResolver::new(&self.catalog, &*self.damage_model, &self.config.rules);
        for intent in &order {
            match resolver.resolve(intent, &mut self.arena, &mut *self.rolls) {
                Ok(events) => events.into_iter().for_each(|e| log.push(e)),
                Err(err) => warn!(actor = %intent.actor, %err, "queued intent could not resolve"),
            }
        }

        self.phase = BattlePhase::RoundComplete;
        debug!(round, phase = %self.phase, "phase changed");
        tick_statuses(&mut self.arena, &mut log);

        let outcome = BattleOutcome::evaluate(&self.arena);
        log.push(BattleEvent::RoundEnded { round });
        if outcome.is_finished() {
            log.push(BattleEvent::BattleEnded { outcome });
        }
        let events = log.into_events();

        self.round = round;
        self.intents.clear();
        self.order_cache = None;
        self.outcome = outcome;
        if outcome.is_finished() {
            info!(round, %outcome, "battle finished");
            self.set_phase(BattlePhase::Finished);
        } else {
            self.set_phase(BattlePhase::AwaitingIntents);
        }

        Ok(Advance::Resolved(RoundReport {
            round,
            order,
            events,
            outcome,
        }))
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        debug!(from = %self.phase, to = %phase, round = self.round, "phase changed");
        self.phase = phase;
    }
}

/// Round-end tick for every living combatant, in ID order.
///
/// 1. Statuses at zero remaining turns are removed
/// 2. Periodic statuses apply their effect
/// 3. Remaining durations drop by one
fn tick_statuses(arena: &mut Arena, log: &mut EventLog<'_>) {
    let living: Vec<CombatantId> = arena.living().map(Combatant::id).collect();
    for id in living {
        let Some(combatant) = arena.get_mut(id) else {
            continue;
        };

        for expired in combatant.remove_expired_statuses() {
            log.push(BattleEvent::StatusExpired {
                target: id,
                status: expired.effect_id,
            });
        }

        let periodic: Vec<(StatusKind, u32)> = combatant
            .status_effects()
            .iter()
            .filter(|s| matches!(s.kind, StatusKind::DamageOverTime | StatusKind::HealOverTime))
            .map(|s| (s.kind.clone(), u32::try_from(s.magnitude).unwrap_or(0)))
            .collect();
        for (kind, magnitude) in periodic {
            if combatant.is_defeated() {
                break;
            }
            if kind == StatusKind::DamageOverTime {
                let amount = combatant.apply_damage(magnitude);
                log.push(BattleEvent::DamageDealt {
                    source: None,
                    target: id,
                    amount,
                });
                if combatant.is_defeated() {
                    log.push(BattleEvent::CombatantDefeated { combatant: id });
                }
            } else {
                let amount = combatant.apply_heal(magnitude);
                log.push(BattleEvent::HealApplied {
                    source: None,
                    target: id,
                    amount,
                });
            }
        }

        combatant.decrement_statuses();
    }
}

// =============================================================================
// Tests
// =============================================================================
