//! Round resolution.
//!
//! Resolution happens in two steps, each owned by its own resolver:
//! 1. [`TurnOrderResolver`] orders the queued intents by speed
//! 2. [`ActionResolver`] applies each intent in that order, mutating the
//!    arena and returning effect events
//!
//! The numbers behind damage and healing come from a [`DamageModel`];
//! [`StandardFormula`] is the default.
//!
//! # Invariants
//!
//! - Resolvers MUST be deterministic given the same roster, intents and rolls
//! - Every random decision goes through the supplied
//!   [`RollSource`](crate::rng::RollSource)
//! - Targets are expanded at resolution time, never at submission time

mod action;
mod formula;
mod turn_order;

pub use action::{validate_targets, ActionResolver};
pub use formula::{DamageModel, StandardFormula};
pub use turn_order::TurnOrderResolver;
