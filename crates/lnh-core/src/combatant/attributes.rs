//! Named integer attributes for combatants.
//!
//! Attributes are free-form: the engine only interprets the names configured
//! in [`RulesConfig`](crate::config::RulesConfig) (speed, power, defense by
//! default). Anything else is carried along for the presentation layer and
//! for attribute-modifier status effects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from attribute name to integer value.
///
/// Backed by a `BTreeMap` so iteration and serialization order are stable.
/// Missing attributes read as `0`.
///
/// # Example
///
/// ```
/// use lnh_core::combatant::Attributes;
///
/// let attrs = Attributes::new().with("speed", 10).with("power", 4);
/// assert_eq!(attrs.get("speed"), 10);
/// assert_eq!(attrs.get("defense"), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, i32>);

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, name: &str, value: i32) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of an attribute, or `0` if it is not set.
    #[must_use]
    pub fn get(&self, name: &str) -> i32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, name: &str, value: i32) {
        self.0.insert(name.to_string(), value);
    }

    /// Returns true if the attribute is explicitly set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of explicitly set attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, i32)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (&'a str, i32)>>(iter: T) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}
