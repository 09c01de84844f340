//! Status effect instances attached to combatants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a status effect (e.g. `"poison"`, `"haste"`).
///
/// # Example
///
/// ```
/// use lnh_core::combatant::StatusId;
///
/// let poison = StatusId::new("poison");
/// assert_eq!(poison.as_str(), "poison");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    /// Creates a new `StatusId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the status ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StatusId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StatusId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a status effect does while it is active.
///
/// # Variants
///
/// - `Marker`: No mechanical effect, only visible to the presentation layer
/// - `Modifier`: Adds `magnitude` to the named attribute
/// - `DamageOverTime`: Holder loses `magnitude` hit points at each round-end tick
/// - `HealOverTime`: Holder recovers `magnitude` hit points at each round-end tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusKind {
    /// No mechanical effect.
    #[default]
    Marker,
    /// Adds `magnitude` to an attribute while active.
    Modifier {
        /// Attribute name the modifier applies to.
        attribute: String,
    },
    /// Periodic damage applied at round end.
    DamageOverTime,
    /// Periodic healing applied at round end.
    HealOverTime,
}

/// One active status effect on one combatant.
///
/// `remaining_turns` counts round-end ticks the effect still survives. An
/// instance with `remaining_turns == 0` expires at the next tick.
///
/// # Example
///
/// ```
/// use lnh_core::combatant::{StatusEffectInstance, StatusKind};
///
/// let slow = StatusEffectInstance::new("slow", 2, -3)
///     .with_kind(StatusKind::Modifier { attribute: "speed".into() });
///
/// assert_eq!(slow.modifier_for("speed"), -3);
/// assert_eq!(slow.modifier_for("power"), 0);
/// assert!(!slow.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectInstance {
    /// Which status this is.
    pub effect_id: StatusId,
    /// Round-end ticks left before expiry.
    pub remaining_turns: u32,
    /// Strength of the effect; meaning depends on `kind`.
    pub magnitude: i32,
    /// Mechanical behavior of the effect.
    #[serde(default)]
    pub kind: StatusKind,
}

impl StatusEffectInstance {
    /// Creates a marker status.
    #[must_use]
    pub fn new(effect_id: impl Into<StatusId>, remaining_turns: u32, magnitude: i32) -> Self {
        Self {
            effect_id: effect_id.into(),
            remaining_turns,
            magnitude,
            kind: StatusKind::Marker,
        }
    }

    /// Replaces the kind of this status.
    #[must_use]
    pub fn with_kind(mut self, kind: StatusKind) -> Self {
        self.kind = kind;
        self
    }

    /// True when the status is due to be removed at the next tick.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_turns == 0
    }

    /// Contribution of this status to the named attribute.
    #[must_use]
    pub fn modifier_for(&self, attribute: &str) -> i32 {
        match &self.kind {
            StatusKind::Modifier { attribute: a } if a == attribute => self.magnitude,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_remaining_is_expired() {
        assert!(StatusEffectInstance::new("stun", 0, 0).is_expired());
        assert!(!StatusEffectInstance::new("stun", 1, 0).is_expired());
    }

    #[test]
    fn non_modifier_contributes_nothing() {
        let poison = StatusEffectInstance::new("poison", 3, 4).with_kind(StatusKind::DamageOverTime);
        assert_eq!(poison.modifier_for("speed"), 0);
    }

    #[test]
    fn kind_defaults_to_marker_when_absent() {
        let status: StatusEffectInstance = serde_json::from_str(
            r#"{"effect_id": "focus", "remaining_turns": 1, "magnitude": 0}"#,
        )
        .unwrap();
        assert_eq!(status.kind, StatusKind::Marker);
        assert_eq!(status.effect_id, StatusId::new("focus"));
    }

    #[test]
    fn modifier_kind_uses_tagged_form() {
        let kind: StatusKind =
            serde_json::from_str(r#"{"type": "modifier", "attribute": "defense"}"#).unwrap();
        assert_eq!(
            kind,
            StatusKind::Modifier {
                attribute: "defense".to_string()
            }
        );
    }
}
