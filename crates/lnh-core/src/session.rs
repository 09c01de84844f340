//! Battle session: the surface a presentation layer drives.
//!
//! A [`BattleSession`] wraps one [`Battle`] and adds what a front end needs
//! around it:
//! - Event listeners, optionally filtered by [`EventKind`]
//! - AI controllers that fill in intents for computer-driven teams
//!
//! The session never hands out mutable access to combatants. Everything the
//! presentation layer learns about a round comes from the returned
//! [`RoundReport`] and the events pushed to listeners.
//!
//! # Threading
//!
//! A session is `Send` and every mutating call takes `&mut self`, so one
//! session can move between threads but is only ever driven by one at a
//! time. Independent sessions share nothing but the read-only catalog.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use lnh_core::ai::BasicAi;
//! use lnh_core::arena::RosterDefinition;
//! use lnh_core::battle::Advance;
//! use lnh_core::catalog::{ActionCatalog, ActionDefinition, EffectSpec, TargetingRule};
//! use lnh_core::combatant::{CombatantDefinition, CombatantId, Team};
//! use lnh_core::config::BattleConfig;
//! use lnh_core::intent::TurnIntent;
//! use lnh_core::session::BattleSession;
//!
//! let catalog = Arc::new(ActionCatalog::from_definitions([
//!     ActionDefinition::new("strike", "Strike", TargetingRule::SingleEnemy, 4)
//!         .with_effect(EffectSpec::Damage { power: None }),
//! ]).unwrap());
//! let roster = RosterDefinition::new(vec![
//!     CombatantDefinition::new(CombatantId::new(1), "Hero", Team::PLAYER, 20),
//!     CombatantDefinition::new(CombatantId::new(2), "Orc", Team::ENEMY, 20),
//! ]);
//!
//! let mut session = BattleSession::new(catalog, &roster, BattleConfig::with_seed(3)).unwrap();
//! session.set_controller(Team::ENEMY, BasicAi::new());
//!
//! let seen = Arc::new(Mutex::new(0));
//! let counter = Arc::clone(&seen);
//! session.subscribe(move |_event| *counter.lock().unwrap() += 1);
//!
//! session
//!     .submit_intent(TurnIntent::single(CombatantId::new(1), "strike", CombatantId::new(2)))
//!     .unwrap();
//! let Advance::Resolved(report) = session.advance_if_ready().unwrap() else { panic!() };
//!
//! assert_eq!(report.order.len(), 2);
//! assert_eq!(*seen.lock().unwrap(), report.events.len());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::IntentProvider;
use crate::arena::RosterDefinition;
use crate::battle::{Advance, Battle, BattleOutcome, BattlePhase};
use crate::catalog::ActionCatalog;
use crate::combatant::{Combatant, CombatantId, Team};
use crate::config::BattleConfig;
use crate::error::{BattleError, SetupError};
use crate::event::{EventEnvelope, EventKind};
use crate::intent::TurnIntent;

/// Callback receiving every event it subscribed to.
pub type Listener = Box<dyn FnMut(&EventEnvelope) + Send>;

/// Handle returned by [`BattleSession::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` means every kind.
    kinds: Option<BTreeSet<EventKind>>,
    listener: Listener,
}

impl Subscription {
    fn wants(&self, envelope: &EventEnvelope) -> bool {
        self.kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&envelope.event().kind()))
    }
}

/// Facade over one battle.
pub struct BattleSession {
    battle: Battle,
    controllers: BTreeMap<Team, Box<dyn IntentProvider>>,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
}

impl fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleSession")
            .field("battle", &self.battle)
            .field("controlled_teams", &self.controllers.keys().collect::<Vec<_>>())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl BattleSession {
    /// Creates a battle and starts it.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the roster is invalid, a loadout names an
    /// unknown action, or fewer than two sides have a living combatant.
    pub fn new(
        catalog: Arc<ActionCatalog>,
        roster: &RosterDefinition,
        config: BattleConfig,
    ) -> Result<Self, SetupError> {
        Self::from_battle(Battle::new(catalog, roster, config)?)
    }

    /// Wraps an existing battle, starting it if it is still in `Setup`.
    ///
    /// Use this to inject a custom roll source or damage model.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::NotEnoughSides`] if the battle cannot start.
    pub fn from_battle(mut battle: Battle) -> Result<Self, SetupError> {
        if battle.phase() == BattlePhase::Setup {
            battle.begin()?;
        }
        Ok(Self {
            battle,
            controllers: BTreeMap::new(),
            subscriptions: Vec::new(),
            next_subscription: 0,
        })
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Validates and queues an intent. See [`Battle::submit_intent`].
    ///
    /// # Errors
    ///
    /// Any [`BattleError`] from validation; the session is unchanged.
    pub fn submit_intent(&mut self, intent: TurnIntent) -> Result<(), BattleError> {
        self.battle.submit_intent(intent)
    }

    /// Removes a queued intent. See [`Battle::retract_intent`].
    pub fn retract_intent(&mut self, actor: CombatantId) -> Option<TurnIntent> {
        self.battle.retract_intent(actor)
    }

    /// Combatants whose intent is still required.
    ///
    /// Members of AI-controlled teams are filled in by
    /// [`advance_if_ready`](Self::advance_if_ready) and may still show up
    /// here until then.
    #[must_use]
    pub fn pending_actors(&self) -> Vec<CombatantId> {
        self.battle.pending_actors()
    }

    /// Preview of the turn order for the queued intents.
    pub fn turn_order(&mut self) -> &[TurnIntent] {
        self.battle.turn_order()
    }

    // -------------------------------------------------------------------------
    // Controllers
    // -------------------------------------------------------------------------

    /// Lets `provider` choose intents for `team` from now on.
    ///
    /// Replaces any previous controller for the team.
    pub fn set_controller(&mut self, team: Team, provider: impl IntentProvider + 'static) {
        debug!(%team, "controller set");
        self.controllers.insert(team, Box::new(provider));
    }

    /// Hands `team` back to manual input. Returns false if it had no
    /// controller.
    pub fn clear_controller(&mut self, team: Team) -> bool {
        self.controllers.remove(&team).is_some()
    }

    /// Asks each controller for the intents its team still owes.
    ///
    /// A provider returning an intent that fails validation is logged and
    /// skipped; the actor stays pending.
    fn fill_controlled_intents(&mut self) {
        if self.battle.phase() != BattlePhase::AwaitingIntents {
            return;
        }
        for (team, provider) in &mut self.controllers {
            let idle: Vec<CombatantId> = self
                .battle
                .arena()
                .living_on(*team)
                .map(Combatant::id)
                .filter(|id| !self.battle.has_intent(*id))
                .collect();
            for actor in idle {
                let Some(intent) = provider.choose(actor, &self.battle) else {
                    continue;
                };
                if let Err(err) = self.battle.submit_intent(intent) {
                    warn!(%actor, %err, "controller produced an invalid intent");
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Advancing
    // -------------------------------------------------------------------------

    /// Fills AI intents, then resolves the round if nothing is pending.
    ///
    /// Listeners are called for every event of a resolved round, in order,
    /// before this returns.
    ///
    /// # Errors
    ///
    /// [`BattleError::BattleAlreadyFinished`] once the battle is over.
    pub fn advance_if_ready(&mut self) -> Result<Advance, BattleError> {
        self.fill_controlled_intents();
        let advance = self.battle.advance()?;
        if let Advance::Resolved(report) = &advance {
            for envelope in &report.events {
                self.notify(envelope);
            }
        }
        Ok(advance)
    }

    fn notify(&mut self, envelope: &EventEnvelope) {
        for subscription in &mut self.subscriptions {
            if subscription.wants(envelope) {
                (subscription.listener)(envelope);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// Returns the current outcome.
    #[must_use]
    pub fn current_outcome(&self) -> BattleOutcome {
        self.battle.outcome()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        self.battle.phase()
    }

    /// Read-only view of the battle.
    #[must_use]
    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    /// Registers a listener for every event.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&EventEnvelope) + Send + 'static,
    ) -> SubscriptionId {
        self.add_subscription(None, Box::new(listener))
    }

    /// Registers a listener for events of the given kinds only.
    pub fn subscribe_to(
        &mut self,
        kinds: impl IntoIterator<Item = EventKind>,
        listener: impl FnMut(&EventEnvelope) + Send + 'static,
    ) -> SubscriptionId {
        self.add_subscription(Some(kinds.into_iter().collect()), Box::new(listener))
    }

    fn add_subscription(
        &mut self,
        kinds: Option<BTreeSet<EventKind>>,
        listener: Listener,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            kinds,
            listener,
        });
        id
    }

    /// Removes a listener. Returns false if the ID was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }
}
