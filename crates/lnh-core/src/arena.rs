//! Arena: the roster container for one battle.
//!
//! The Arena owns every [`Combatant`] taking part in a battle. It provides:
//! - Combatant storage with deterministic iteration order (`BTreeMap`)
//! - Side queries (living allies / enemies of a team)
//! - Roster validation at setup
//!
//! # Determinism
//!
//! All iteration goes through the `BTreeMap`, so every query returns
//! combatants in ascending [`CombatantId`] order. Resolution code relies on
//! this for reproducible event streams.
//!
//! # Ownership
//!
//! Read access is public. Mutable access is crate-private: only the action
//! resolver and the round-end tick change combatant state.
//!
//! # Example
//!
//! ```
//! use lnh_core::arena::{Arena, RosterDefinition};
//! use lnh_core::combatant::{CombatantDefinition, CombatantId, Team};
//!
//! let roster = RosterDefinition::new(vec![
//!     CombatantDefinition::new(CombatantId::new(2), "Goblin", Team::ENEMY, 8),
//!     CombatantDefinition::new(CombatantId::new(1), "Hero", Team::PLAYER, 20),
//! ]);
//! let arena = Arena::from_roster(&roster).unwrap();
//!
//! let ids: Vec<_> = arena.ids_sorted().collect();
//! assert_eq!(ids, vec![CombatantId::new(1), CombatantId::new(2)]);
//! assert_eq!(arena.living_enemies_of(Team::PLAYER).count(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, CombatantDefinition, CombatantId, Team};
use crate::error::SetupError;

// =============================================================================
// Roster Definition
// =============================================================================

/// Inbound roster: every combatant's starting stats and side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterDefinition {
    /// Combatants in the battle, in any order.
    pub combatants: Vec<CombatantDefinition>,
}

impl RosterDefinition {
    /// Wraps a list of definitions.
    #[must_use]
    pub fn new(combatants: Vec<CombatantDefinition>) -> Self {
        Self { combatants }
    }

    /// Parses a roster from JSON of the form `{"combatants": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Parse`] for malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Every combatant in one battle, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    combatants: BTreeMap<CombatantId, Combatant>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            combatants: BTreeMap::new(),
        }
    }

    /// Instantiates every combatant of a roster.
    ///
    /// # Errors
    ///
    /// - [`SetupError::DuplicateCombatant`] if two entries share an ID
    /// - [`SetupError::ZeroMaxHitPoints`] if an entry has `max_hit_points == 0`
    pub fn from_roster(roster: &RosterDefinition) -> Result<Self, SetupError> {
        let mut arena = Self::new();
        for def in &roster.combatants {
            if def.max_hit_points == 0 {
                return Err(SetupError::ZeroMaxHitPoints(def.id));
            }
            if arena.combatants.contains_key(&def.id) {
                return Err(SetupError::DuplicateCombatant(def.id));
            }
            arena
                .combatants
                .insert(def.id, Combatant::from_definition(def));
        }
        Ok(arena)
    }

    /// Returns a combatant by ID.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Returns a mutable combatant by ID.
    #[must_use]
    pub(crate) fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// True if the ID belongs to this battle.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.combatants.contains_key(&id)
    }

    /// Iterates over IDs in ascending order.
    pub fn ids_sorted(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.combatants.keys().copied()
    }

    /// Iterates over combatants in ascending ID order.
    pub fn combatants_sorted(&self) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants.values()
    }

    /// Iterates over living combatants in ascending ID order.
    pub fn living(&self) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants.values().filter(|c| c.is_alive())
    }

    /// Living members of `team`, in ID order.
    pub fn living_on(&self, team: Team) -> impl Iterator<Item = &Combatant> + '_ {
        self.living().filter(move |c| c.team() == team)
    }

    /// Living members of `team` (the team's own allies), in ID order.
    pub fn living_allies_of(&self, team: Team) -> impl Iterator<Item = &Combatant> + '_ {
        self.living_on(team)
    }

    /// Living members of every other team, in ID order.
    pub fn living_enemies_of(&self, team: Team) -> impl Iterator<Item = &Combatant> + '_ {
        self.living().filter(move |c| c.team() != team)
    }

    /// Teams that still have at least one living member.
    #[must_use]
    pub fn teams_with_living(&self) -> BTreeSet<Team> {
        self.living().map(Combatant::team).collect()
    }

    /// Every team present in the roster, living or not.
    #[must_use]
    pub fn teams(&self) -> BTreeSet<Team> {
        self.combatants.values().map(Combatant::team).collect()
    }

    /// Sum of current hit points over the whole roster.
    #[must_use]
    pub fn total_hit_points(&self) -> u64 {
        self.combatants
            .values()
            .map(|c| u64::from(c.current_hit_points()))
            .sum()
    }

    /// Returns the number of combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Returns true if the arena has no combatants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> RosterDefinition {
        RosterDefinition::new(vec![
            CombatantDefinition::new(CombatantId::new(3), "Orc", Team::ENEMY, 10),
            CombatantDefinition::new(CombatantId::new(1), "Hero", Team::PLAYER, 20),
            CombatantDefinition::new(CombatantId::new(2), "Cleric", Team::PLAYER, 15),
            CombatantDefinition::new(CombatantId::new(4), "Wolf", Team::ENEMY, 6)
                .with_starting_hit_points(0),
        ])
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn from_roster_instantiates_all() {
            let arena = Arena::from_roster(&roster()).unwrap();
            assert_eq!(arena.len(), 4);
            assert!(arena.contains(CombatantId::new(4)));
            assert!(!arena.contains(CombatantId::new(5)));
        }

        #[test]
        fn duplicate_id_rejected() {
            let mut r = roster();
            r.combatants.push(CombatantDefinition::new(
                CombatantId::new(1),
                "Clone",
                Team::ENEMY,
                5,
            ));
            let err = Arena::from_roster(&r).unwrap_err();
            assert!(matches!(err, SetupError::DuplicateCombatant(id) if id == CombatantId::new(1)));
        }

        #[test]
        fn zero_max_hp_rejected() {
            let r = RosterDefinition::new(vec![CombatantDefinition::new(
                CombatantId::new(1),
                "Ghost",
                Team::PLAYER,
                0,
            )]);
            assert!(matches!(
                Arena::from_roster(&r),
                Err(SetupError::ZeroMaxHitPoints(_))
            ));
        }

        #[test]
        fn roster_parses_from_json() {
            let r = RosterDefinition::from_json_str(
                r#"{"combatants": [
                    {"id": 1, "display_name": "Hero", "team": 0, "max_hit_points": 20,
                     "attributes": {"speed": 10}, "actions": ["strike"]}
                ]}"#,
            )
            .unwrap();
            assert_eq!(r.combatants.len(), 1);
            assert_eq!(r.combatants[0].attributes.get("speed"), 10);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn iteration_is_sorted_by_id() {
            let arena = Arena::from_roster(&roster()).unwrap();
            let ids: Vec<_> = arena.ids_sorted().map(CombatantId::as_u64).collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }

        #[test]
        fn living_excludes_defeated() {
            let arena = Arena::from_roster(&roster()).unwrap();
            let enemies: Vec<_> = arena
                .living_enemies_of(Team::PLAYER)
                .map(Combatant::id)
                .collect();
            assert_eq!(enemies, vec![CombatantId::new(3)]);
        }

        #[test]
        fn allies_include_self_team_only() {
            let arena = Arena::from_roster(&roster()).unwrap();
            let allies: Vec<_> = arena
                .living_allies_of(Team::PLAYER)
                .map(Combatant::id)
                .collect();
            assert_eq!(allies, vec![CombatantId::new(1), CombatantId::new(2)]);
        }

        #[test]
        fn teams_with_living_tracks_wipes() {
            let mut arena = Arena::from_roster(&roster()).unwrap();
            assert_eq!(arena.teams_with_living().len(), 2);

            arena.get_mut(CombatantId::new(3)).unwrap().apply_damage(99);
            let living = arena.teams_with_living();
            assert_eq!(living.len(), 1);
            assert!(living.contains(&Team::PLAYER));
            assert_eq!(arena.teams().len(), 2);
        }

        #[test]
        fn total_hit_points_sums_roster() {
            let arena = Arena::from_roster(&roster()).unwrap();
            assert_eq!(arena.total_hit_points(), 45);
        }
    }
}
