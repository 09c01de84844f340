//! Combatant model for the battle engine.
//!
//! This module provides the participant types of a battle:
//! - [`CombatantId`]: Unique identifier within one battle
//! - [`Team`]: Side a combatant fights for
//! - [`CombatantDefinition`]: Starting stats supplied by the presentation layer
//! - [`Combatant`]: Runtime state owned by the battle for its whole lifetime
//!
//! # Invariants
//!
//! - `current_hit_points` is always within `[0, max_hit_points]`
//! - A combatant is defeated exactly when `current_hit_points == 0`
//!
//! # Example
//!
//! ```
//! use lnh_core::combatant::{Combatant, CombatantDefinition, CombatantId, Team};
//!
//! let mut knight = Combatant::from_definition(
//!     &CombatantDefinition::new(CombatantId::new(1), "Knight", Team::PLAYER, 20),
//! );
//!
//! assert_eq!(knight.apply_damage(25), 20);
//! assert_eq!(knight.current_hit_points(), 0);
//! assert!(knight.is_defeated());
//! ```

pub mod attributes;
pub mod status;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ActionId;

pub use attributes::Attributes;
pub use status::{StatusEffectInstance, StatusId, StatusKind};

/// Unique identifier for a combatant within one battle.
///
/// Ordered by numeric value; the ordering is the stable tie-break used by
/// turn ordering and by every deterministic iteration over the roster.
///
/// # Example
///
/// ```
/// use lnh_core::combatant::CombatantId;
///
/// let a = CombatantId::new(1);
/// let b = CombatantId::new(2);
///
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a new `CombatantId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<CombatantId> for u64 {
    fn from(id: CombatantId) -> Self {
        id.0
    }
}

/// Side index of a combatant.
///
/// Two-sided battles use [`Team::PLAYER`] and [`Team::ENEMY`]; any other index
/// is a further side. Every team other than a combatant's own is hostile to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(u8);

impl Team {
    /// The player-controlled side (index 0).
    pub const PLAYER: Self = Self(0);
    /// The opposing side (index 1).
    pub const ENEMY: Self = Self(1);

    /// Creates a team from its side index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the side index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PLAYER => write!(f, "Player"),
            Self::ENEMY => write!(f, "Enemy"),
            Self(index) => write!(f, "Team {index}"),
        }
    }
}

// =============================================================================
// Definition
// =============================================================================

/// Starting stats and side assignment for one combatant.
///
/// This is the inbound roster format; the battle turns each definition into
/// a [`Combatant`] at setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantDefinition {
    /// Unique identifier within the battle.
    pub id: CombatantId,
    /// Name shown by the presentation layer.
    pub display_name: String,
    /// Side the combatant fights for.
    pub team: Team,
    /// Maximum hit points. Must be positive.
    pub max_hit_points: u32,
    /// Starting hit points; defaults to `max_hit_points`.
    #[serde(default)]
    pub starting_hit_points: Option<u32>,
    /// Named stats (speed, power, defense, ...).
    #[serde(default)]
    pub attributes: Attributes,
    /// Actions this combatant knows, in preference order. Used by AI
    /// controllers; an empty loadout means "anything in the catalog".
    #[serde(default)]
    pub actions: Vec<ActionId>,
}

impl CombatantDefinition {
    /// Creates a definition with full health, no attributes and no loadout.
    #[must_use]
    pub fn new(id: CombatantId, display_name: &str, team: Team, max_hit_points: u32) -> Self {
        Self {
            id,
            display_name: display_name.to_string(),
            team,
            max_hit_points,
            starting_hit_points: None,
            attributes: Attributes::new(),
            actions: Vec::new(),
        }
    }

    /// Sets one attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: i32) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Sets the starting hit points.
    #[must_use]
    pub fn with_starting_hit_points(mut self, hit_points: u32) -> Self {
        self.starting_hit_points = Some(hit_points);
        self
    }

    /// Appends an action to the loadout.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<ActionId>) -> Self {
        self.actions.push(action.into());
        self
    }
}

// =============================================================================
// Combatant
// =============================================================================

/// Runtime state of one participant in a battle.
///
/// Identity (`id`, `display_name`, `team`, `max_hit_points`) is fixed for the
/// battle. Hit points and status effects are mutated only by the action
/// resolver and the round-end tick; the presentation layer only ever sees
/// shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    display_name: String,
    team: Team,
    max_hit_points: u32,
    current_hit_points: u32,
    attributes: Attributes,
    status_effects: Vec<StatusEffectInstance>,
    actions: Vec<ActionId>,
}

impl Combatant {
    /// Instantiates a combatant from its definition.
    ///
    /// Starting hit points above the maximum are clamped down.
    #[must_use]
    pub fn from_definition(def: &CombatantDefinition) -> Self {
        let current = def
            .starting_hit_points
            .unwrap_or(def.max_hit_points)
            .min(def.max_hit_points);
        Self {
            id: def.id,
            display_name: def.display_name.clone(),
            team: def.team,
            max_hit_points: def.max_hit_points,
            current_hit_points: current,
            attributes: def.attributes.clone(),
            status_effects: Vec::new(),
            actions: def.actions.clone(),
        }
    }

    /// Returns the combatant's ID.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the maximum hit points.
    #[must_use]
    pub const fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    /// Returns the current hit points.
    #[must_use]
    pub const fn current_hit_points(&self) -> u32 {
        self.current_hit_points
    }

    /// True once hit points reached zero.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.current_hit_points == 0
    }

    /// True while the combatant can still act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_defeated()
    }

    /// Returns the base attributes, without status modifiers.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Base attribute plus every active modifier status for it.
    ///
    /// Saturates at the `i32` bounds however many modifiers stack.
    #[must_use]
    pub fn effective_attribute(&self, name: &str) -> i32 {
        self.status_effects
            .iter()
            .map(|s| s.modifier_for(name))
            .fold(self.attributes.get(name), i32::saturating_add)
    }

    /// Returns the active status effects in application order.
    #[must_use]
    pub fn status_effects(&self) -> &[StatusEffectInstance] {
        &self.status_effects
    }

    /// True if at least one instance of the status is active.
    #[must_use]
    pub fn has_status(&self, effect_id: &StatusId) -> bool {
        self.status_effects.iter().any(|s| &s.effect_id == effect_id)
    }

    /// Returns the loadout.
    #[must_use]
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    /// Hit points as a fraction of the maximum, in `[0.0, 1.0]`.
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_hit_points == 0 {
            return 0.0;
        }
        f64::from(self.current_hit_points) / f64::from(self.max_hit_points)
    }

    /// Reduces hit points, clamping at zero.
    ///
    /// Over-damage is absorbed silently.
    ///
    /// # Returns
    ///
    /// The hit points actually removed.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current_hit_points);
        self.current_hit_points -= applied;
        applied
    }

    /// Restores hit points, clamping at `max_hit_points`.
    ///
    /// # Returns
    ///
    /// The hit points actually restored.
    pub fn apply_heal(&mut self, amount: u32) -> u32 {
        let missing = self.max_hit_points - self.current_hit_points;
        let applied = amount.min(missing);
        self.current_hit_points += applied;
        applied
    }

    /// Appends a status effect.
    pub fn add_status(&mut self, instance: StatusEffectInstance) {
        self.status_effects.push(instance);
    }

    /// Removes every instance of the given status.
    ///
    /// # Returns
    ///
    /// The number of instances removed.
    pub fn remove_status(&mut self, effect_id: &StatusId) -> usize {
        let before = self.status_effects.len();
        self.status_effects.retain(|s| &s.effect_id != effect_id);
        before - self.status_effects.len()
    }

    /// Removes every status whose duration has run out.
    ///
    /// # Returns
    ///
    /// The removed instances, in their original order.
    pub fn remove_expired_statuses(&mut self) -> Vec<StatusEffectInstance> {
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.status_effects)
            .into_iter()
            .partition(StatusEffectInstance::is_expired);
        self.status_effects = active;
        expired
    }

    /// Decrements the remaining duration of every active status by one.
    pub fn decrement_statuses(&mut self) {
        for status in &mut self.status_effects {
            status.remaining_turns = status.remaining_turns.saturating_sub(1);
        }
    }
}
