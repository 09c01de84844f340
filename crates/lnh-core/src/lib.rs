//! # LnH Core
//!
//! Turn-based battle engine for LnH Battle.
//!
//! This crate is the deterministic, engine-agnostic rules core: it owns
//! combatant state, orders each round, resolves actions and decides who won.
//! It knows nothing about rendering, input or windowing; a presentation layer
//! drives it through [`BattleSession`] and renders the events it emits.
//!
//! ## Architecture
//!
//! - **Combatants**: Identity, hit points, attributes, status effects
//! - **Catalog**: Static action definitions shared across battles
//! - **Resolvers**: Turn order, action resolution, numeric model
//! - **Battle**: Phase state machine driving rounds to an outcome
//! - **Session**: Facade with event listeners and AI controllers
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use lnh_core::{
//!     ActionCatalog, Advance, BasicAi, BattleConfig, BattleOutcome, BattleSession,
//!     RosterDefinition, Team,
//! };
//!
//! let catalog = Arc::new(ActionCatalog::from_json_str(r#"{"actions": [
//!     {"id": "strike", "name": "Strike", "targeting": "single_enemy",
//!      "base_power": 5, "effects": [{"type": "damage"}]}
//! ]}"#).unwrap());
//! let roster = RosterDefinition::from_json_str(r#"{"combatants": [
//!     {"id": 1, "display_name": "Hero", "team": 0, "max_hit_points": 30, "attributes": {"speed": 4}},
//!     {"id": 2, "display_name": "Rat", "team": 1, "max_hit_points": 8}
//! ]}"#).unwrap();
//!
//! let mut session = BattleSession::new(catalog, &roster, BattleConfig::with_seed(7)).unwrap();
//! session.set_controller(Team::PLAYER, BasicAi::new());
//! session.set_controller(Team::ENEMY, BasicAi::new());
//!
//! while !session.current_outcome().is_finished() {
//!     let Advance::Resolved(_) = session.advance_if_ready().unwrap() else { unreachable!() };
//! }
//! assert_eq!(session.current_outcome(), BattleOutcome::Victory(Team::PLAYER));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ai;
pub mod arena;
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod config;
pub mod error;
pub mod event;
pub mod intent;
pub mod resolver;
pub mod rng;
pub mod session;

pub use ai::{BasicAi, IntentProvider};
pub use arena::{Arena, RosterDefinition};
pub use battle::{Advance, Battle, BattleOutcome, BattlePhase, RoundReport};
pub use catalog::{ActionCatalog, ActionDefinition, ActionId, EffectSpec, TargetingRule};
pub use combatant::{
    Attributes, Combatant, CombatantDefinition, CombatantId, StatusEffectInstance, StatusId,
    StatusKind, Team,
};
pub use config::{BattleConfig, IntentPolicy, RulesConfig};
pub use error::{ActorError, BattleError, CatalogError, SetupError, TargetError};
pub use event::{BattleEvent, DropReason, EventEnvelope, EventKind};
pub use intent::TurnIntent;
pub use resolver::{DamageModel, StandardFormula};
pub use rng::{RngRolls, RollSource, ScriptedRolls};
pub use session::{BattleSession, SubscriptionId};

#[cfg(test)]
mod tests;
