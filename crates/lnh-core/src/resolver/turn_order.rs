//! Turn order for one round.
//!
//! # Ordering
//!
//! 1. Intents whose actor is unknown or defeated are dropped
//! 2. Remaining intents are sorted by effective speed, highest first
//! 3. Equal speeds are broken by ascending [`CombatantId`]
//!
//! The result is a pure function of the intents and the roster, so calling
//! [`TurnOrderResolver::order`] twice on identical inputs yields the same
//! sequence.
//!
//! [`CombatantId`]: crate::combatant::CombatantId

use std::cmp::Reverse;

use crate::arena::Arena;
use crate::config::RulesConfig;
use crate::intent::TurnIntent;

/// Orders queued intents by speed.
///
/// # Example
///
/// ```
/// use lnh_core::arena::{Arena, RosterDefinition};
/// use lnh_core::combatant::{CombatantDefinition, CombatantId, Team};
/// use lnh_core::intent::TurnIntent;
/// use lnh_core::resolver::TurnOrderResolver;
///
/// let arena = Arena::from_roster(&RosterDefinition::new(vec![
///     CombatantDefinition::new(CombatantId::new(1), "Slow", Team::PLAYER, 10)
///         .with_attribute("speed", 2),
///     CombatantDefinition::new(CombatantId::new(2), "Fast", Team::ENEMY, 10)
///         .with_attribute("speed", 9),
/// ])).unwrap();
///
/// let intents = [
///     TurnIntent::untargeted(CombatantId::new(1), "wait"),
///     TurnIntent::untargeted(CombatantId::new(2), "wait"),
/// ];
/// let order = TurnOrderResolver::new("speed").order(&intents, &arena);
/// assert_eq!(order[0].actor, CombatantId::new(2));
/// ```
#[derive(Debug, Clone)]
pub struct TurnOrderResolver {
    speed_attribute: String,
}

impl TurnOrderResolver {
    /// Creates a resolver reading the named speed attribute.
    #[must_use]
    pub fn new(speed_attribute: &str) -> Self {
        Self {
            speed_attribute: speed_attribute.to_string(),
        }
    }

    /// Creates a resolver using the configured speed attribute.
    #[must_use]
    pub fn from_rules(rules: &RulesConfig) -> Self {
        Self::new(&rules.speed_attribute)
    }

    /// Returns the intents in resolution order.
    ///
    /// Empty input yields an empty order.
    #[must_use]
    pub fn order<'a>(
        &self,
        intents: impl IntoIterator<Item = &'a TurnIntent>,
        arena: &Arena,
    ) -> Vec<TurnIntent> {
        let mut keyed: Vec<_> = intents
            .into_iter()
            .filter_map(|intent| {
                let actor = arena.get(intent.actor).filter(|c| c.is_alive())?;
                let speed = actor.effective_attribute(&self.speed_attribute);
                Some(((Reverse(speed), intent.actor), intent))
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, intent)| intent.clone()).collect()
    }
}
