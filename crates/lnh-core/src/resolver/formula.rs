//! Numeric model for damage and healing.

use crate::combatant::Combatant;
use crate::config::RulesConfig;

/// Turns an effect's power into a hit point amount.
///
/// Implementations must be pure functions of their arguments so resolution
/// stays deterministic. The returned amount is the raw result; clamping to
/// the target's hit points happens in the combatant model.
///
/// # Example
///
/// ```
/// use lnh_core::combatant::{Combatant, CombatantDefinition, CombatantId, Team};
/// use lnh_core::config::RulesConfig;
/// use lnh_core::resolver::DamageModel;
///
/// /// Ignores attributes entirely.
/// struct Flat;
///
/// impl DamageModel for Flat {
///     fn damage(&self, power: u32, _: &Combatant, _: &Combatant, _: &RulesConfig) -> u32 {
///         power
///     }
///     fn heal(&self, power: u32, _: &Combatant, _: &Combatant, _: &RulesConfig) -> u32 {
///         power
///     }
/// }
///
/// let a = Combatant::from_definition(&CombatantDefinition::new(CombatantId::new(1), "A", Team::PLAYER, 10));
/// assert_eq!(Flat.damage(4, &a, &a, &RulesConfig::default()), 4);
/// ```
pub trait DamageModel: Send + Sync {
    /// Damage dealt by `actor` to `target` for an effect of the given power.
    fn damage(&self, power: u32, actor: &Combatant, target: &Combatant, rules: &RulesConfig)
        -> u32;

    /// Healing done by `actor` to `target` for an effect of the given power.
    fn heal(&self, power: u32, actor: &Combatant, target: &Combatant, rules: &RulesConfig) -> u32;
}

/// Default numeric model.
///
/// - damage = `max(minimum_damage, power + actor.power - target.defense)`
/// - heal = `power`
///
/// Attribute reads include active modifier statuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormula;

impl StandardFormula {
    /// Creates the standard formula.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DamageModel for StandardFormula {
    fn damage(
        &self,
        power: u32,
        actor: &Combatant,
        target: &Combatant,
        rules: &RulesConfig,
    ) -> u32 {
        let raw = i64::from(power) + i64::from(actor.effective_attribute(&rules.power_attribute))
            - i64::from(target.effective_attribute(&rules.defense_attribute));
        let floored = raw.clamp(i64::from(rules.minimum_damage), i64::from(u32::MAX));
        u32::try_from(floored).unwrap_or(u32::MAX)
    }

    fn heal(&self, power: u32, _actor: &Combatant, _target: &Combatant, _rules: &RulesConfig) -> u32 {
        power
    }
}
