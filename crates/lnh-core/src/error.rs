//! Error types for the battle engine.
//!
//! Every error here is a caller-input error: nothing in the engine performs
//! I/O, so nothing is transient or retryable. A rejected call never changes
//! battle state.
//!
//! `Display` output is diagnostic text for logs, not a user-facing message.
//! The structured reasons ([`TargetError`], [`ActorError`]) are what a
//! presentation layer should match on.

use thiserror::Error;

use crate::battle::BattlePhase;
use crate::catalog::ActionId;
use crate::combatant::CombatantId;

/// Why a target list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    /// A single-target action was submitted without a target.
    #[error("a target is required")]
    Missing,
    /// More targets were supplied than the rule allows.
    #[error("too many targets supplied")]
    TooMany,
    /// The target is not part of this battle.
    #[error("combatant {0} is not in this battle")]
    Unknown(CombatantId),
    /// The target is already defeated.
    #[error("combatant {0} is already defeated")]
    Defeated(CombatantId),
    /// The target is on the wrong side for the targeting rule.
    #[error("combatant {0} is on the wrong side for this action")]
    WrongSide(CombatantId),
    /// A self-targeted action named someone other than the actor.
    #[error("self-targeted action aimed at combatant {0}")]
    NotSelf(CombatantId),
}

/// Why an actor was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActorError {
    /// The actor is not part of this battle.
    #[error("not in this battle")]
    Unknown,
    /// The actor is defeated and can no longer act.
    #[error("already defeated")]
    Defeated,
}

/// Errors surfaced by intent submission and round advancement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The action ID is not in the catalog.
    #[error("unknown action: {0}")]
    UnknownAction(ActionId),

    /// The intent's target list does not fit the action's targeting rule.
    #[error("invalid target for actor {actor}: {reason}")]
    InvalidTarget {
        /// Submitting combatant.
        actor: CombatantId,
        /// What was wrong with the targets.
        reason: TargetError,
    },

    /// The actor cannot submit an intent.
    #[error("invalid actor {actor}: {reason}")]
    InvalidActor {
        /// Submitting combatant.
        actor: CombatantId,
        /// What was wrong with the actor.
        reason: ActorError,
    },

    /// The actor already queued an intent this round.
    #[error("combatant {0} already submitted an intent this round")]
    DuplicateIntent(CombatantId),

    /// The battle reached a terminal outcome.
    #[error("battle has already finished")]
    BattleAlreadyFinished,

    /// The battle has not left setup yet.
    #[error("battle is not accepting intents during {0}")]
    NotAcceptingIntents(BattlePhase),
}

/// Errors raised while loading or validating an action catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two definitions share an ID.
    #[error("duplicate action id: {0}")]
    DuplicateAction(ActionId),

    /// Accuracy outside `[0.0, 1.0]`.
    #[error("action {action} has accuracy {accuracy}, expected a value in [0, 1]")]
    InvalidAccuracy {
        /// Offending action.
        action: ActionId,
        /// Supplied accuracy.
        accuracy: f64,
    },

    /// The catalog source is not valid JSON for the expected shape.
    #[error("failed to parse action catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while instantiating a battle from a roster.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Two roster entries share an ID.
    #[error("duplicate combatant id: {0}")]
    DuplicateCombatant(CombatantId),

    /// A roster entry has no hit points to lose.
    #[error("combatant {0} has zero max hit points")]
    ZeroMaxHitPoints(CombatantId),

    /// A loadout names an action missing from the catalog.
    #[error("combatant {combatant} lists unknown action {action}")]
    UnknownLoadoutAction {
        /// Combatant whose loadout is wrong.
        combatant: CombatantId,
        /// Missing action.
        action: ActionId,
    },

    /// Fewer than two sides have a living combatant.
    #[error("a battle needs living combatants on at least two sides, found {living_sides}")]
    NotEnoughSides {
        /// Number of sides with at least one living combatant.
        living_sides: usize,
    },

    /// `begin` was called outside the setup phase.
    #[error("battle already started")]
    AlreadyStarted,

    /// The roster source is not valid JSON for the expected shape.
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_target_display_includes_reason() {
        let err = BattleError::InvalidTarget {
            actor: CombatantId::new(2),
            reason: TargetError::Defeated(CombatantId::new(9)),
        };
        assert_eq!(
            err.to_string(),
            "invalid target for actor 2: combatant 9 is already defeated"
        );
    }

    #[test]
    fn battle_error_is_comparable() {
        assert_eq!(
            BattleError::DuplicateIntent(CombatantId::new(1)),
            BattleError::DuplicateIntent(CombatantId::new(1))
        );
        assert_ne!(
            BattleError::BattleAlreadyFinished,
            BattleError::DuplicateIntent(CombatantId::new(1))
        );
    }
}
