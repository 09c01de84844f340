//! Action catalog: the static moves combatants can perform.
//!
//! Definitions are loaded once (from code or JSON) and never mutated during a
//! battle. The catalog itself is shared between sessions as
//! `Arc<ActionCatalog>`, and each definition is handed out as an
//! `Arc<ActionDefinition>` so the resolver can hold one while it mutates the
//! roster.
//!
//! # JSON format
//!
//! ```
//! use lnh_core::catalog::{ActionCatalog, ActionId, TargetingRule};
//!
//! let catalog = ActionCatalog::from_json_str(r#"{
//!     "actions": [
//!         {
//!             "id": "strike",
//!             "name": "Strike",
//!             "targeting": "single_enemy",
//!             "base_power": 6,
//!             "accuracy": 0.9,
//!             "effects": [{ "type": "damage" }]
//!         }
//!     ]
//! }"#).unwrap();
//!
//! let strike = catalog.lookup(&ActionId::new("strike")).unwrap();
//! assert_eq!(strike.targeting, TargetingRule::SingleEnemy);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combatant::{StatusId, StatusKind};
use crate::error::{BattleError, CatalogError};

/// Unique identifier of an action definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Creates a new `ActionId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the action ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which combatants an action may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingRule {
    /// One living combatant of another team.
    SingleEnemy,
    /// One living combatant of the actor's team (the actor included).
    SingleAlly,
    /// Every living combatant of every other team, at resolution time.
    AllEnemies,
    /// Every living combatant of the actor's team, at resolution time.
    AllAllies,
    /// The actor only.
    #[serde(rename = "self")]
    SelfOnly,
}

impl TargetingRule {
    /// True for rules that expand to a whole side at resolution time.
    #[must_use]
    pub const fn is_area(self) -> bool {
        matches!(self, Self::AllEnemies | Self::AllAllies)
    }

    /// True for rules aimed at the actor's opponents.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::SingleEnemy | Self::AllEnemies)
    }
}

/// One consequence of a hit, applied in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectSpec {
    /// Deal damage through the damage model.
    Damage {
        /// Overrides the action's `base_power` for this effect.
        #[serde(default)]
        power: Option<u32>,
    },
    /// Restore hit points.
    Heal {
        /// Overrides the action's `base_power` for this effect.
        #[serde(default)]
        power: Option<u32>,
    },
    /// Append a status effect to the target.
    ApplyStatus {
        /// Status to apply.
        status: StatusId,
        /// Initial `remaining_turns`.
        duration: u32,
        /// Strength of the status.
        #[serde(default)]
        magnitude: i32,
        /// Mechanical behavior of the status.
        #[serde(default)]
        kind: StatusKind,
    },
    /// Remove every instance of a status from the target.
    RemoveStatus {
        /// Status to remove.
        status: StatusId,
    },
}

/// Immutable definition of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique identifier.
    pub id: ActionId,
    /// Human readable name.
    pub name: String,
    /// Which combatants the action may be aimed at.
    pub targeting: TargetingRule,
    /// Power used by effects that don't override it.
    #[serde(default)]
    pub base_power: u32,
    /// Hit probability in `[0.0, 1.0]`.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    /// Effects applied on hit, in order.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

fn default_accuracy() -> f64 {
    1.0
}

impl ActionDefinition {
    /// Creates an action that always hits and has no effects yet.
    #[must_use]
    pub fn new(id: &str, name: &str, targeting: TargetingRule, base_power: u32) -> Self {
        Self {
            id: ActionId::new(id),
            name: name.to_string(),
            targeting,
            base_power,
            accuracy: 1.0,
            effects: Vec::new(),
        }
    }

    /// Sets the accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Appends an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.push(effect);
        self
    }

    /// True if any effect deals damage.
    #[must_use]
    pub fn is_damaging(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, EffectSpec::Damage { .. }))
    }

    /// True if any effect heals.
    #[must_use]
    pub fn is_healing(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, EffectSpec::Heal { .. }))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(CatalogError::InvalidAccuracy {
                action: self.id.clone(),
                accuracy: self.accuracy,
            });
        }
        Ok(())
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    actions: Vec<ActionDefinition>,
}

/// Registry of every action available in a session.
///
/// Populate it with [`register`](Self::register) or one of the loaders, then
/// wrap it in an `Arc` and treat it as read-only.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, Arc<ActionDefinition>>,
}

impl ActionCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: BTreeMap::new(),
        }
    }

    /// Builds a catalog from definitions, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateAction`] or
    /// [`CatalogError::InvalidAccuracy`] on the first bad definition.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ActionDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for def in definitions {
            catalog.register(def)?;
        }
        Ok(catalog)
    }

    /// Parses a catalog from JSON of the form `{"actions": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or a validation
    /// error for a bad definition.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_definitions(file.actions)
    }

    /// Adds a definition.
    ///
    /// # Errors
    ///
    /// Fails if the ID is already registered or the accuracy is outside
    /// `[0.0, 1.0]`.
    pub fn register(&mut self, definition: ActionDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        if self.actions.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateAction(definition.id));
        }
        self.actions
            .insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Looks up a definition by ID.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownAction`] if the ID is not registered.
    pub fn lookup(&self, id: &ActionId) -> Result<Arc<ActionDefinition>, BattleError> {
        self.actions
            .get(id)
            .cloned()
            .ok_or_else(|| BattleError::UnknownAction(id.clone()))
    }

    /// True if the ID is registered.
    #[must_use]
    pub fn contains(&self, id: &ActionId) -> bool {
        self.actions.contains_key(id)
    }

    /// Iterates over registered IDs in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ActionId> + '_ {
        self.actions.keys()
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no action is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
