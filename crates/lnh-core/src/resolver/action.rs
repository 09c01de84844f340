//! Action resolver: applies one intent to the roster.
//!
//! # Processing Order
//!
//! 1. Skip the intent if its actor was defeated earlier in the round
//! 2. Expand targets against the roster as it is *now*: area rules take every
//!    living member of the side, single rules drop the intent if the target
//!    died earlier in the round
//! 3. For each target, roll accuracy; a miss skips every effect on that target
//! 4. On a hit, apply effects in definition order, stopping once the target
//!    is defeated
//!
//! Submission-time checks live in [`validate_targets`]; by the time an
//! intent reaches [`ActionResolver::resolve`] it is known to be well formed.

use crate::arena::Arena;
use crate::catalog::{ActionCatalog, ActionDefinition, EffectSpec, TargetingRule};
use crate::combatant::{Combatant, CombatantId, StatusEffectInstance, Team};
use crate::config::RulesConfig;
use crate::error::{ActorError, BattleError, TargetError};
use crate::event::{BattleEvent, DropReason};
use crate::intent::TurnIntent;
use crate::rng::{hit_check, RollSource};

use super::DamageModel;

// =============================================================================
// Submission Validation
// =============================================================================

/// Checks an intent's target list against its action's targeting rule.
///
/// - `SelfOnly`: empty, or exactly the actor
/// - `SingleEnemy` / `SingleAlly`: exactly one known, living target on the
///   correct side
/// - `AllEnemies` / `AllAllies`: any supplied ID must be a known member of
///   the correct side; the list is otherwise ignored
///
/// # Errors
///
/// Returns [`BattleError::InvalidActor`] if the actor is unknown, or
/// [`BattleError::InvalidTarget`] with the first problem found.
pub fn validate_targets(
    intent: &TurnIntent,
    definition: &ActionDefinition,
    arena: &Arena,
) -> Result<(), BattleError> {
    let actor = arena.get(intent.actor).ok_or(BattleError::InvalidActor {
        actor: intent.actor,
        reason: ActorError::Unknown,
    })?;
    let invalid = |reason| BattleError::InvalidTarget {
        actor: intent.actor,
        reason,
    };

    match definition.targeting {
        TargetingRule::SelfOnly => match intent.targets.as_slice() {
            [] => Ok(()),
            [only] if *only == intent.actor => Ok(()),
            [other] => Err(invalid(TargetError::NotSelf(*other))),
            _ => Err(invalid(TargetError::TooMany)),
        },
        TargetingRule::SingleEnemy | TargetingRule::SingleAlly => {
            let target = match intent.targets.as_slice() {
                [] => return Err(invalid(TargetError::Missing)),
                [target] => *target,
                _ => return Err(invalid(TargetError::TooMany)),
            };
            let combatant = arena
                .get(target)
                .ok_or(invalid(TargetError::Unknown(target)))?;
            if !on_expected_side(definition.targeting, actor.team(), combatant) {
                return Err(invalid(TargetError::WrongSide(target)));
            }
            if combatant.is_defeated() {
                return Err(invalid(TargetError::Defeated(target)));
            }
            Ok(())
        }
        TargetingRule::AllEnemies | TargetingRule::AllAllies => {
            for &target in &intent.targets {
                let combatant = arena
                    .get(target)
                    .ok_or(invalid(TargetError::Unknown(target)))?;
                if !on_expected_side(definition.targeting, actor.team(), combatant) {
                    return Err(invalid(TargetError::WrongSide(target)));
                }
            }
            Ok(())
        }
    }
}

fn on_expected_side(rule: TargetingRule, actor_team: Team, target: &Combatant) -> bool {
    if rule.is_hostile() {
        target.team() != actor_team
    } else {
        target.team() == actor_team
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Applies intents to an arena, producing effect events.
///
/// Borrowed for the length of one round; it holds no state of its own.
pub struct ActionResolver<'a> {
    catalog: &'a ActionCatalog,
    model: &'a dyn DamageModel,
    rules: &'a RulesConfig,
}

impl<'a> ActionResolver<'a> {
    /// Creates a resolver over the given catalog, numeric model and rules.
    #[must_use]
    pub fn new(
        catalog: &'a ActionCatalog,
        model: &'a dyn DamageModel,
        rules: &'a RulesConfig,
    ) -> Self {
        Self {
            catalog,
            model,
            rules,
        }
    }

    /// Resolves one intent, mutating `arena`.
    ///
    /// A skipped intent is not an error: it yields a single
    /// [`BattleEvent::IntentDropped`].
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownAction`] if the action is not in the
    /// catalog, or [`BattleError::InvalidActor`] if the actor is not in the
    /// arena. The arena is untouched in both cases.
    pub fn resolve(
        &self,
        intent: &TurnIntent,
        arena: &mut Arena,
        rolls: &mut dyn RollSource,
    ) -> Result<Vec<BattleEvent>, BattleError> {
        let definition = self.catalog.lookup(&intent.action)?;
        let actor = arena.get(intent.actor).ok_or(BattleError::InvalidActor {
            actor: intent.actor,
            reason: ActorError::Unknown,
        })?;

        if actor.is_defeated() {
            return Ok(vec![dropped(intent.actor, DropReason::ActorDefeated)]);
        }

        let targets = match expand_targets(intent, definition.targeting, actor.team(), arena) {
            Ok(targets) => targets,
            Err(reason) => return Ok(vec![dropped(intent.actor, reason)]),
        };

        let mut events = vec![BattleEvent::ActionUsed {
            actor: intent.actor,
            action: definition.id.clone(),
            targets: targets.clone(),
        }];

        for target in targets {
            if !hit_check(rolls, definition.accuracy) {
                events.push(BattleEvent::ActionMissed {
                    actor: intent.actor,
                    target,
                });
                continue;
            }
            for effect in &definition.effects {
                let standing =
                    self.apply_effect(effect, &definition, intent.actor, target, arena, &mut events);
                if !standing {
                    break;
                }
            }
        }

        Ok(events)
    }

    /// Applies one effect to one target.
    ///
    /// Returns false once the target is defeated.
    fn apply_effect(
        &self,
        effect: &EffectSpec,
        definition: &ActionDefinition,
        actor_id: CombatantId,
        target_id: CombatantId,
        arena: &mut Arena,
        events: &mut Vec<BattleEvent>,
    ) -> bool {
        let (Some(actor), Some(target)) = (arena.get(actor_id), arena.get(target_id)) else {
            return false;
        };
        if target.is_defeated() {
            return false;
        }

        match effect {
            EffectSpec::Damage { power } => {
                let power = power.unwrap_or(definition.base_power);
                let amount = self.model.damage(power, actor, target, self.rules);
                let Some(target) = arena.get_mut(target_id) else {
                    return false;
                };
                let applied = target.apply_damage(amount);
                events.push(BattleEvent::DamageDealt {
                    source: Some(actor_id),
                    target: target_id,
                    amount: applied,
                });
                if target.is_defeated() {
                    events.push(BattleEvent::CombatantDefeated {
                        combatant: target_id,
                    });
                    return false;
                }
            }
            EffectSpec::Heal { power } => {
                let power = power.unwrap_or(definition.base_power);
                let amount = self.model.heal(power, actor, target, self.rules);
                let Some(target) = arena.get_mut(target_id) else {
                    return false;
                };
                let applied = target.apply_heal(amount);
                events.push(BattleEvent::HealApplied {
                    source: Some(actor_id),
                    target: target_id,
                    amount: applied,
                });
            }
            EffectSpec::ApplyStatus {
                status,
                duration,
                magnitude,
                kind,
            } => {
                let Some(target) = arena.get_mut(target_id) else {
                    return false;
                };
                target.add_status(
                    StatusEffectInstance::new(status.clone(), *duration, *magnitude)
                        .with_kind(kind.clone()),
                );
                events.push(BattleEvent::StatusApplied {
                    target: target_id,
                    status: status.clone(),
                });
            }
            EffectSpec::RemoveStatus { status } => {
                let Some(target) = arena.get_mut(target_id) else {
                    return false;
                };
                if target.remove_status(status) > 0 {
                    events.push(BattleEvent::StatusRemoved {
                        target: target_id,
                        status: status.clone(),
                    });
                }
            }
        }
        true
    }
}

fn dropped(actor: CombatantId, reason: DropReason) -> BattleEvent {
    BattleEvent::IntentDropped { actor, reason }
}

/// Expands an intent's targets against the current roster.
fn expand_targets(
    intent: &TurnIntent,
    rule: TargetingRule,
    actor_team: Team,
    arena: &Arena,
) -> Result<Vec<CombatantId>, DropReason> {
    let targets: Vec<CombatantId> = match rule {
        TargetingRule::SelfOnly => vec![intent.actor],
        TargetingRule::SingleEnemy | TargetingRule::SingleAlly => {
            let target = intent
                .targets
                .first()
                .and_then(|&id| arena.get(id))
                .ok_or(DropReason::TargetDefeated)?;
            if target.is_defeated() {
                return Err(DropReason::TargetDefeated);
            }
            vec![target.id()]
        }
        TargetingRule::AllEnemies => arena
            .living_enemies_of(actor_team)
            .map(Combatant::id)
            .collect(),
        TargetingRule::AllAllies => arena
            .living_allies_of(actor_team)
            .map(Combatant::id)
            .collect(),
    };
    if targets.is_empty() {
        return Err(DropReason::NoLivingTargets);
    }
    Ok(targets)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::RosterDefinition;
    use crate::catalog::ActionId;
    use crate::combatant::{CombatantDefinition, StatusId};
    use crate::resolver::StandardFormula;
    use crate::rng::ScriptedRolls;

    fn catalog() -> ActionCatalog {
        ActionCatalog::from_definitions([
            ActionDefinition::new("strike", "Strike", TargetingRule::SingleEnemy, 8)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("double", "Double Hit", TargetingRule::SingleEnemy, 30)
                .with_effect(EffectSpec::Damage { power: None })
                .with_effect(EffectSpec::ApplyStatus {
                    status: StatusId::new("bleed"),
                    duration: 2,
                    magnitude: 1,
                    kind: crate::combatant::StatusKind::DamageOverTime,
                }),
            ActionDefinition::new("sweep", "Sweep", TargetingRule::AllEnemies, 3)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("wild", "Wild Swing", TargetingRule::SingleEnemy, 5)
                .with_accuracy(0.5)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("mend", "Mend", TargetingRule::SingleAlly, 6)
                .with_effect(EffectSpec::Heal { power: None })
                .with_effect(EffectSpec::RemoveStatus {
                    status: StatusId::new("poison"),
                }),
            ActionDefinition::new("guard", "Guard", TargetingRule::SelfOnly, 0).with_effect(
                EffectSpec::ApplyStatus {
                    status: StatusId::new("guard"),
                    duration: 1,
                    magnitude: 3,
                    kind: crate::combatant::StatusKind::Modifier {
                        attribute: "defense".to_string(),
                    },
                },
            ),
            ActionDefinition::new("rally", "Rally", TargetingRule::AllAllies, 2)
                .with_effect(EffectSpec::Heal { power: None }),
        ])
        .unwrap()
    }

    /// Hero (1) and Cleric (2) against Orc (3), Goblin (4) and a dead Wolf (5).
    fn arena() -> Arena {
        Arena::from_roster(&RosterDefinition::new(vec![
            CombatantDefinition::new(CombatantId::new(1), "Hero", Team::PLAYER, 20),
            CombatantDefinition::new(CombatantId::new(2), "Cleric", Team::PLAYER, 15)
                .with_starting_hit_points(5),
            CombatantDefinition::new(CombatantId::new(3), "Orc", Team::ENEMY, 15),
            CombatantDefinition::new(CombatantId::new(4), "Goblin", Team::ENEMY, 10),
            CombatantDefinition::new(CombatantId::new(5), "Wolf", Team::ENEMY, 10)
                .with_starting_hit_points(0),
        ]))
        .unwrap()
    }

    fn id(raw: u64) -> CombatantId {
        CombatantId::new(raw)
    }

    fn run(intent: &TurnIntent, arena: &mut Arena, rolls: &mut dyn RollSource) -> Vec<BattleEvent> {
        let catalog = catalog();
        let rules = RulesConfig::default();
        ActionResolver::new(&catalog, &StandardFormula, &rules)
            .resolve(intent, arena, rolls)
            .unwrap()
    }

    mod validation_tests {
        use super::*;

        fn check(intent: &TurnIntent) -> Result<(), BattleError> {
            let catalog = catalog();
            let def = catalog.lookup(&intent.action).unwrap();
            validate_targets(intent, &def, &arena())
        }

        fn target_error(intent: &TurnIntent) -> TargetError {
            match check(intent) {
                Err(BattleError::InvalidTarget { reason, .. }) => reason,
                other => panic!("expected InvalidTarget, got {other:?}"),
            }
        }

        #[test]
        fn single_enemy_accepts_living_enemy() {
            assert!(check(&TurnIntent::single(id(1), "strike", id(3))).is_ok());
        }

        #[test]
        fn single_target_requires_exactly_one() {
            assert_eq!(
                target_error(&TurnIntent::untargeted(id(1), "strike")),
                TargetError::Missing
            );
            assert_eq!(
                target_error(&TurnIntent::new(id(1), "strike", vec![id(3), id(4)])),
                TargetError::TooMany
            );
        }

        #[test]
        fn single_target_rejects_defeated_unknown_and_wrong_side() {
            assert_eq!(
                target_error(&TurnIntent::single(id(1), "strike", id(5))),
                TargetError::Defeated(id(5))
            );
            assert_eq!(
                target_error(&TurnIntent::single(id(1), "strike", id(42))),
                TargetError::Unknown(id(42))
            );
            assert_eq!(
                target_error(&TurnIntent::single(id(1), "strike", id(2))),
                TargetError::WrongSide(id(2))
            );
            assert_eq!(
                target_error(&TurnIntent::single(id(1), "mend", id(3))),
                TargetError::WrongSide(id(3))
            );
        }

        #[test]
        fn single_ally_accepts_self() {
            assert!(check(&TurnIntent::single(id(1), "mend", id(1))).is_ok());
        }

        #[test]
        fn self_action_rejects_foreign_target() {
            assert!(check(&TurnIntent::untargeted(id(1), "guard")).is_ok());
            assert!(check(&TurnIntent::single(id(1), "guard", id(1))).is_ok());
            assert_eq!(
                target_error(&TurnIntent::single(id(1), "guard", id(3))),
                TargetError::NotSelf(id(3))
            );
        }

        #[test]
        fn area_action_checks_supplied_ids_only() {
            assert!(check(&TurnIntent::untargeted(id(1), "sweep")).is_ok());
            assert!(check(&TurnIntent::new(id(1), "sweep", vec![id(3), id(5)])).is_ok());
            assert_eq!(
                target_error(&TurnIntent::new(id(1), "sweep", vec![id(2)])),
                TargetError::WrongSide(id(2))
            );
        }

        #[test]
        fn unknown_actor_is_invalid_actor() {
            assert!(matches!(
                check(&TurnIntent::single(id(99), "strike", id(3))),
                Err(BattleError::InvalidActor {
                    reason: ActorError::Unknown,
                    ..
                })
            ));
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn strike_deals_formula_damage() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::single(id(1), "strike", id(3)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert_eq!(arena.get(id(3)).unwrap().current_hit_points(), 7);
            assert_eq!(
                events,
                vec![
                    BattleEvent::ActionUsed {
                        actor: id(1),
                        action: ActionId::new("strike"),
                        targets: vec![id(3)],
                    },
                    BattleEvent::DamageDealt {
                        source: Some(id(1)),
                        target: id(3),
                        amount: 8,
                    },
                ]
            );
        }

        #[test]
        fn lethal_hit_skips_remaining_effects() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::single(id(1), "double", id(4)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            let goblin = arena.get(id(4)).unwrap();
            assert!(goblin.is_defeated());
            assert!(goblin.status_effects().is_empty());
            assert_eq!(
                events.last(),
                Some(&BattleEvent::CombatantDefeated { combatant: id(4) })
            );
            assert!(events.contains(&BattleEvent::DamageDealt {
                source: Some(id(1)),
                target: id(4),
                amount: 10,
            }));
        }

        #[test]
        fn area_action_skips_defeated_enemies() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::untargeted(id(1), "sweep"),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert_eq!(
                events[0],
                BattleEvent::ActionUsed {
                    actor: id(1),
                    action: ActionId::new("sweep"),
                    targets: vec![id(3), id(4)],
                }
            );
            let damaged: Vec<_> = events
                .iter()
                .filter_map(|e| match e {
                    BattleEvent::DamageDealt { target, .. } => Some(*target),
                    _ => None,
                })
                .collect();
            assert_eq!(damaged, vec![id(3), id(4)]);
            assert_eq!(arena.get(id(5)).unwrap().current_hit_points(), 0);
        }
    }

    mod accuracy_tests {
        use super::*;

        #[test]
        fn failed_roll_misses_without_effects() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::single(id(1), "wild", id(3)),
                &mut arena,
                &mut ScriptedRolls::new(vec![0.75]),
            );
            assert_eq!(
                events[1],
                BattleEvent::ActionMissed {
                    actor: id(1),
                    target: id(3),
                }
            );
            assert_eq!(events.len(), 2);
            assert_eq!(arena.get(id(3)).unwrap().current_hit_points(), 15);
        }

        #[test]
        fn successful_roll_hits() {
            let mut arena = arena();
            run(
                &TurnIntent::single(id(1), "wild", id(3)),
                &mut arena,
                &mut ScriptedRolls::new(vec![0.25]),
            );
            assert_eq!(arena.get(id(3)).unwrap().current_hit_points(), 10);
        }
    }

    mod support_tests {
        use super::*;

        #[test]
        fn heal_reports_clamped_amount_and_removes_status() {
            let mut arena = arena();
            arena
                .get_mut(id(2))
                .unwrap()
                .add_status(StatusEffectInstance::new("poison", 3, 2));
            let events = run(
                &TurnIntent::single(id(1), "mend", id(2)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert!(events.contains(&BattleEvent::HealApplied {
                source: Some(id(1)),
                target: id(2),
                amount: 6,
            }));
            assert!(events.contains(&BattleEvent::StatusRemoved {
                target: id(2),
                status: StatusId::new("poison"),
            }));
            assert_eq!(arena.get(id(2)).unwrap().current_hit_points(), 11);
        }

        #[test]
        fn remove_status_without_match_is_silent() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::single(id(2), "mend", id(1)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert!(!events
                .iter()
                .any(|e| matches!(e, BattleEvent::StatusRemoved { .. })));
            assert!(events.contains(&BattleEvent::HealApplied {
                source: Some(id(2)),
                target: id(1),
                amount: 0,
            }));
        }

        #[test]
        fn self_action_applies_status_to_actor() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::untargeted(id(1), "guard"),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert!(events.contains(&BattleEvent::StatusApplied {
                target: id(1),
                status: StatusId::new("guard"),
            }));
            assert_eq!(arena.get(id(1)).unwrap().effective_attribute("defense"), 3);
        }

        #[test]
        fn rally_heals_every_living_ally() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::untargeted(id(1), "rally"),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            let healed = events
                .iter()
                .filter(|e| matches!(e, BattleEvent::HealApplied { .. }))
                .count();
            assert_eq!(healed, 2);
            assert_eq!(arena.get(id(2)).unwrap().current_hit_points(), 7);
        }
    }

    mod drop_tests {
        use super::*;

        #[test]
        fn defeated_actor_is_dropped() {
            let mut arena = arena();
            arena.get_mut(id(3)).unwrap().apply_damage(100);
            let events = run(
                &TurnIntent::single(id(3), "strike", id(1)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert_eq!(
                events,
                vec![BattleEvent::IntentDropped {
                    actor: id(3),
                    reason: DropReason::ActorDefeated,
                }]
            );
            assert_eq!(arena.get(id(1)).unwrap().current_hit_points(), 20);
        }

        #[test]
        fn defeated_single_target_is_dropped() {
            let mut arena = arena();
            let events = run(
                &TurnIntent::single(id(1), "strike", id(5)),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert_eq!(
                events,
                vec![BattleEvent::IntentDropped {
                    actor: id(1),
                    reason: DropReason::TargetDefeated,
                }]
            );
        }

        #[test]
        fn area_action_with_nobody_alive_is_dropped() {
            let mut arena = arena();
            arena.get_mut(id(3)).unwrap().apply_damage(100);
            arena.get_mut(id(4)).unwrap().apply_damage(100);
            let events = run(
                &TurnIntent::untargeted(id(1), "sweep"),
                &mut arena,
                &mut ScriptedRolls::new(vec![]),
            );
            assert_eq!(
                events,
                vec![BattleEvent::IntentDropped {
                    actor: id(1),
                    reason: DropReason::NoLivingTargets,
                }]
            );
        }

        #[test]
        fn unknown_action_is_an_error() {
            let catalog = catalog();
            let rules = RulesConfig::default();
            let mut arena = arena();
            let before = arena.clone();
            let err = ActionResolver::new(&catalog, &StandardFormula, &rules)
                .resolve(
                    &TurnIntent::single(id(1), "meteor", id(3)),
                    &mut arena,
                    &mut ScriptedRolls::new(vec![]),
                )
                .unwrap_err();
            assert_eq!(err, BattleError::UnknownAction(ActionId::new("meteor")));
            assert_eq!(arena, before);
        }
    }
}
