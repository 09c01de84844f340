//! Turn intents: a combatant's declared action for the current round.

use serde::{Deserialize, Serialize};

use crate::catalog::ActionId;
use crate::combatant::CombatantId;

/// "Combatant `actor` uses `action` on `targets`."
///
/// Intents are ephemeral: they are queued while the battle awaits intents and
/// discarded once the round resolves. `targets` may be empty for
/// self-targeted and area actions.
///
/// # Example
///
/// ```
/// use lnh_core::intent::TurnIntent;
/// use lnh_core::combatant::CombatantId;
///
/// let intent = TurnIntent::single(CombatantId::new(1), "strike", CombatantId::new(2));
/// assert_eq!(intent.targets, vec![CombatantId::new(2)]);
/// assert_eq!(intent.action.as_str(), "strike");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnIntent {
    /// Acting combatant.
    pub actor: CombatantId,
    /// Action to perform.
    pub action: ActionId,
    /// Chosen targets; may be empty.
    #[serde(default)]
    pub targets: Vec<CombatantId>,
}

impl TurnIntent {
    /// Creates an intent with an explicit target list.
    #[must_use]
    pub fn new(actor: CombatantId, action: impl Into<ActionId>, targets: Vec<CombatantId>) -> Self {
        Self {
            actor,
            action: action.into(),
            targets,
        }
    }

    /// Intent aimed at one combatant.
    #[must_use]
    pub fn single(actor: CombatantId, action: impl Into<ActionId>, target: CombatantId) -> Self {
        Self::new(actor, action, vec![target])
    }

    /// Intent with no explicit targets (self or area actions).
    #[must_use]
    pub fn untargeted(actor: CombatantId, action: impl Into<ActionId>) -> Self {
        Self::new(actor, action, Vec::new())
    }
}
