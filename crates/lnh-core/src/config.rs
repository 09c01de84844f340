//! Battle configuration.
//!
//! Numeric tuning lives here rather than in the resolver so a presentation
//! layer (or a data file) can rebalance without touching engine code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combatant::Team;

/// Attribute names and numeric floors used by action resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Attribute that orders turns (higher acts first).
    pub speed_attribute: String,
    /// Attribute added to an attacker's damage.
    pub power_attribute: String,
    /// Attribute subtracted from incoming damage.
    pub defense_attribute: String,
    /// Lowest damage a hit can deal. Keeps battles from stalling.
    pub minimum_damage: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            speed_attribute: "speed".to_string(),
            power_attribute: "power".to_string(),
            defense_attribute: "defense".to_string(),
            minimum_damage: 1,
        }
    }
}

/// Which living combatants must submit an intent before a round can resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentPolicy {
    /// Every living combatant must submit.
    #[default]
    AllLiving,
    /// Only living members of these teams must submit. Others may submit
    /// voluntarily or be filled in by an AI controller; if they do neither
    /// they skip the round.
    Teams(BTreeSet<Team>),
}

impl IntentPolicy {
    /// True if living members of `team` must submit.
    #[must_use]
    pub fn requires(&self, team: Team) -> bool {
        match self {
            Self::AllLiving => true,
            Self::Teams(teams) => teams.contains(&team),
        }
    }
}

/// Everything needed to configure one battle.
///
/// # Example
///
/// ```
/// use lnh_core::config::{BattleConfig, IntentPolicy};
/// use lnh_core::combatant::Team;
///
/// let config = BattleConfig::with_seed(99).requiring_teams([Team::PLAYER]);
/// assert_eq!(config.seed, 99);
/// assert!(config.intent_policy.requires(Team::PLAYER));
/// assert!(!config.intent_policy.requires(Team::ENEMY));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Numeric tuning.
    pub rules: RulesConfig,
    /// Who must submit each round.
    pub intent_policy: IntentPolicy,
    /// Seed for the default roll source.
    pub seed: u64,
}

impl BattleConfig {
    /// Default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Restricts mandatory submission to the given teams.
    #[must_use]
    pub fn requiring_teams(mut self, teams: impl IntoIterator<Item = Team>) -> Self {
        self.intent_policy = IntentPolicy::Teams(teams.into_iter().collect());
        self
    }

    /// Replaces the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_use_standard_attribute_names() {
        let rules = RulesConfig::default();
        assert_eq!(rules.speed_attribute, "speed");
        assert_eq!(rules.minimum_damage, 1);
    }

    #[test]
    fn all_living_requires_every_team() {
        assert!(IntentPolicy::AllLiving.requires(Team::new(7)));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: BattleConfig =
            serde_json::from_str(r#"{"seed": 5, "rules": {"minimum_damage": 2}}"#).unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.rules.minimum_damage, 2);
        assert_eq!(config.rules.power_attribute, "power");
        assert_eq!(config.intent_policy, IntentPolicy::AllLiving);
    }

    #[test]
    fn team_policy_parses() {
        let config: BattleConfig =
            serde_json::from_str(r#"{"intent_policy": {"teams": [0]}}"#).unwrap();
        assert!(config.intent_policy.requires(Team::PLAYER));
        assert!(!config.intent_policy.requires(Team::ENEMY));
    }
}
