//! Intent providers for computer-controlled sides.
//!
//! A [`BattleSession`](crate::session::BattleSession) asks the provider
//! registered for a team to fill in intents its living members have not
//! submitted. Providers only see the battle through a shared reference and
//! return plain [`TurnIntent`]s, which then go through the same validation
//! as player input.

use crate::battle::Battle;
use crate::catalog::{ActionDefinition, ActionId, TargetingRule};
use crate::combatant::{Combatant, CombatantId};
use crate::intent::TurnIntent;
use crate::resolver::validate_targets;

/// Chooses an intent for one combatant.
///
/// Must be deterministic for a given battle state so seeded matches replay.
///
/// Closures of the matching shape implement this trait, which is handy for
/// scripted opponents in tests.
///
/// # Example
///
/// ```
/// use lnh_core::ai::IntentProvider;
/// use lnh_core::intent::TurnIntent;
///
/// let mut always_wait = |actor, _battle: &lnh_core::battle::Battle| {
///     Some(TurnIntent::untargeted(actor, "wait"))
/// };
/// fn takes_provider(_p: &mut dyn IntentProvider) {}
/// takes_provider(&mut always_wait);
/// ```
pub trait IntentProvider: Send {
    /// Returns an intent for `actor`, or `None` to skip the round.
    fn choose(&mut self, actor: CombatantId, battle: &Battle) -> Option<TurnIntent>;
}

impl<F> IntentProvider for F
where
    F: FnMut(CombatantId, &Battle) -> Option<TurnIntent> + Send,
{
    fn choose(&mut self, actor: CombatantId, battle: &Battle) -> Option<TurnIntent> {
        self(actor, battle)
    }
}

/// Heal-when-hurt, otherwise hit the weakest enemy.
///
/// Walks the actor's loadout (or the whole catalog in ID order when the
/// loadout is empty) and picks the first action that applies:
///
/// - Healing actions only when an ally is below half health, aimed at the
///   most hurt ally
/// - Damaging actions aimed at the living enemy with the fewest hit points
///
/// If neither applies, the first action with any valid target is used.
/// Ties always go to the lowest [`CombatantId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAi;

impl BasicAi {
    /// Creates the basic AI.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn candidates(actor: &Combatant, battle: &Battle) -> Vec<ActionId> {
        if actor.actions().is_empty() {
            battle.catalog().ids().cloned().collect()
        } else {
            actor.actions().to_vec()
        }
    }

    /// Preferred intent for a heal or attack, if the situation calls for one.
    fn preferred(actor: &Combatant, def: &ActionDefinition, battle: &Battle) -> Option<TurnIntent> {
        let arena = battle.arena();
        if def.is_healing() {
            let hurt = arena
                .living_allies_of(actor.team())
                .filter(|c| c.health_fraction() < 0.5)
                .min_by(|a, b| a.health_fraction().total_cmp(&b.health_fraction()))?;
            return match def.targeting {
                TargetingRule::SingleAlly => {
                    Some(TurnIntent::single(actor.id(), def.id.clone(), hurt.id()))
                }
                TargetingRule::AllAllies => Some(TurnIntent::untargeted(actor.id(), def.id.clone())),
                TargetingRule::SelfOnly if actor.health_fraction() < 0.5 => {
                    Some(TurnIntent::untargeted(actor.id(), def.id.clone()))
                }
                _ => None,
            };
        }
        if def.is_damaging() {
            return Self::fallback(actor, def, battle).filter(|_| def.targeting.is_hostile());
        }
        None
    }

    /// Any valid intent for the action.
    fn fallback(actor: &Combatant, def: &ActionDefinition, battle: &Battle) -> Option<TurnIntent> {
        let arena = battle.arena();
        match def.targeting {
            TargetingRule::SingleEnemy => {
                let weakest = arena
                    .living_enemies_of(actor.team())
                    .min_by_key(|c| c.current_hit_points())?;
                Some(TurnIntent::single(actor.id(), def.id.clone(), weakest.id()))
            }
            TargetingRule::SingleAlly => {
                Some(TurnIntent::single(actor.id(), def.id.clone(), actor.id()))
            }
            TargetingRule::AllEnemies => {
                arena.living_enemies_of(actor.team()).next()?;
                Some(TurnIntent::untargeted(actor.id(), def.id.clone()))
            }
            TargetingRule::AllAllies | TargetingRule::SelfOnly => {
                Some(TurnIntent::untargeted(actor.id(), def.id.clone()))
            }
        }
    }
}

impl IntentProvider for BasicAi {
    fn choose(&mut self, actor_id: CombatantId, battle: &Battle) -> Option<TurnIntent> {
        let actor = battle.combatant(actor_id).filter(|c| c.is_alive())?;
        let definitions: Vec<_> = Self::candidates(actor, battle)
            .iter()
            .filter_map(|id| battle.catalog().lookup(id).ok())
            .collect();
        let valid = |intent: &TurnIntent, def: &ActionDefinition| {
            validate_targets(intent, def, battle.arena()).is_ok()
        };

        definitions
            .iter()
            .find_map(|def| Self::preferred(actor, def, battle).filter(|i| valid(i, def)))
            .or_else(|| {
                definitions
                    .iter()
                    .filter(|def| !def.is_healing())
                    .find_map(|def| Self::fallback(actor, def, battle).filter(|i| valid(i, def)))
            })
    }
}
