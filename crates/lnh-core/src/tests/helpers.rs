//! Test helper functions for setting up catalogs, rosters and sessions.

use std::sync::Arc;

use crate::ai::BasicAi;
use crate::arena::RosterDefinition;
use crate::battle::{Advance, Battle, RoundReport};
use crate::catalog::{ActionCatalog, ActionDefinition, EffectSpec, TargetingRule};
use crate::combatant::{CombatantDefinition, CombatantId, StatusId, StatusKind, Team};
use crate::config::BattleConfig;
use crate::event::{BattleEvent, EventEnvelope};
use crate::rng::ScriptedRolls;
use crate::session::BattleSession;

// =============================================================================
// Catalog
// =============================================================================

/// A small catalog covering every targeting rule and effect kind.
///
/// - `strike`: single enemy, power 8, always hits
/// - `jab`: single enemy, power 3, accuracy 0.6
/// - `sweep`: all enemies, power 4
/// - `mend`: single ally heal, power 6
/// - `rally`: all allies heal, power 2
/// - `venom`: single enemy, damage-over-time 2 for 2 turns
/// - `mark`: single enemy, marker status for 1 turn
/// - `guard`: self, +3 defense for 1 turn
/// - `wait`: self, no effect
#[must_use]
pub fn standard_catalog() -> Arc<ActionCatalog> {
    Arc::new(
        ActionCatalog::from_definitions([
            ActionDefinition::new("strike", "Strike", TargetingRule::SingleEnemy, 8)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("jab", "Jab", TargetingRule::SingleEnemy, 3)
                .with_accuracy(0.6)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("sweep", "Sweep", TargetingRule::AllEnemies, 4)
                .with_effect(EffectSpec::Damage { power: None }),
            ActionDefinition::new("mend", "Mend", TargetingRule::SingleAlly, 6)
                .with_effect(EffectSpec::Heal { power: None }),
            ActionDefinition::new("rally", "Rally", TargetingRule::AllAllies, 2)
                .with_effect(EffectSpec::Heal { power: None }),
            ActionDefinition::new("venom", "Venom", TargetingRule::SingleEnemy, 0).with_effect(
                EffectSpec::ApplyStatus {
                    status: StatusId::new("venom"),
                    duration: 2,
                    magnitude: 2,
                    kind: StatusKind::DamageOverTime,
                },
            ),
            ActionDefinition::new("mark", "Mark", TargetingRule::SingleEnemy, 0).with_effect(
                EffectSpec::ApplyStatus {
                    status: StatusId::new("marked"),
                    duration: 1,
                    magnitude: 0,
                    kind: StatusKind::Marker,
                },
            ),
            ActionDefinition::new("guard", "Guard", TargetingRule::SelfOnly, 0).with_effect(
                EffectSpec::ApplyStatus {
                    status: StatusId::new("guard"),
                    duration: 1,
                    magnitude: 3,
                    kind: StatusKind::Modifier {
                        attribute: "defense".to_string(),
                    },
                },
            ),
            ActionDefinition::new("wait", "Wait", TargetingRule::SelfOnly, 0),
        ])
        .expect("standard catalog is valid"),
    )
}

// =============================================================================
// Rosters
// =============================================================================

/// Shorthand for a combatant ID.
#[must_use]
pub fn cid(raw: u64) -> CombatantId {
    CombatantId::new(raw)
}

/// Combatant with the given team, hit points and speed.
#[must_use]
pub fn fighter(id: u64, team: Team, hit_points: u32, speed: i32) -> CombatantDefinition {
    CombatantDefinition::new(cid(id), &format!("Fighter {id}"), team, hit_points)
        .with_attribute("speed", speed)
}

/// Three players (1-3) against three enemies (4-6) with mixed speeds.
#[must_use]
pub fn skirmish_roster() -> RosterDefinition {
    RosterDefinition::new(vec![
        fighter(1, Team::PLAYER, 30, 7).with_attribute("power", 2),
        fighter(2, Team::PLAYER, 24, 5).with_action("mend").with_action("strike"),
        fighter(3, Team::PLAYER, 20, 9).with_action("jab").with_action("sweep"),
        fighter(4, Team::ENEMY, 26, 6).with_attribute("defense", 1),
        fighter(5, Team::ENEMY, 22, 9).with_action("venom").with_action("strike"),
        fighter(6, Team::ENEMY, 18, 4).with_action("rally").with_action("jab"),
    ])
}

// =============================================================================
// Driving Battles
// =============================================================================

/// Started battle whose accuracy rolls always return `roll`.
#[must_use]
pub fn scripted_battle(roster: &RosterDefinition, roll: f64) -> Battle {
    let mut battle = Battle::new(standard_catalog(), roster, BattleConfig::default())
        .expect("roster is valid")
        .with_roll_source(ScriptedRolls::new(vec![roll]));
    battle.begin().expect("roster has two sides");
    battle
}

/// Session where every team is driven by [`BasicAi`].
#[must_use]
pub fn ai_session(roster: &RosterDefinition, seed: u64) -> BattleSession {
    let mut session = BattleSession::new(standard_catalog(), roster, BattleConfig::with_seed(seed))
        .expect("roster is valid");
    for team in session.battle().arena().teams() {
        session.set_controller(team, BasicAi::new());
    }
    session
}

/// Resolves the pending round, panicking if it is not ready.
pub fn resolve_round(battle: &mut Battle) -> RoundReport {
    match battle.advance().expect("battle accepts advance") {
        Advance::Resolved(report) => report,
        Advance::NotReady { pending } => panic!("round not ready, pending {pending:?}"),
    }
}

/// Plays an AI session to the end (or `max_rounds`), returning every event.
pub fn play_out(session: &mut BattleSession, max_rounds: u32) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for _ in 0..max_rounds {
        if session.current_outcome().is_finished() {
            break;
        }
        match session.advance_if_ready().expect("battle still running") {
            Advance::Resolved(report) => events.extend(report.events),
            Advance::NotReady { pending } => panic!("AI left {pending:?} pending"),
        }
    }
    events
}

/// Strips envelopes down to their events.
#[must_use]
pub fn events_of(envelopes: &[EventEnvelope]) -> Vec<BattleEvent> {
    envelopes.iter().map(|e| e.event().clone()).collect()
}
