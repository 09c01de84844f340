//! Effect events emitted while a battle resolves.
//!
//! Every observable consequence of a round (a hit, a miss, a status change, a
//! defeat) is recorded as a [`BattleEvent`]. The presentation layer renders
//! these; nothing else about a round is visible to it.
//!
//! # Architecture
//!
//! - [`BattleEvent`]: What happened
//! - [`EventKind`]: Coarse category used for subscription filters
//! - [`EventEnvelope`]: Round and sequence metadata for replay ordering
//!
//! Sequence numbers increase strictly across the whole battle, so a list of
//! envelopes sorted by `sequence` is the exact order things happened.
//!
//! # Example
//!
//! ```
//! use lnh_core::event::{BattleEvent, EventEnvelope, EventKind};
//! use lnh_core::combatant::CombatantId;
//!
//! let envelope = EventEnvelope::new(
//!     1,
//!     0,
//!     BattleEvent::DamageDealt {
//!         source: Some(CombatantId::new(1)),
//!         target: CombatantId::new(2),
//!         amount: 7,
//!     },
//! );
//!
//! assert_eq!(envelope.event().kind(), EventKind::Vitals);
//! assert_eq!(envelope.round(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::BattleOutcome;
use crate::catalog::ActionId;
use crate::combatant::{CombatantId, StatusId};

// =============================================================================
// Events
// =============================================================================

/// Why a queued intent was skipped during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The actor was defeated earlier in the round.
    ActorDefeated,
    /// The single target was defeated earlier in the round.
    TargetDefeated,
    /// An area action found no living combatant on its side.
    NoLivingTargets,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActorDefeated => write!(f, "actor defeated"),
            Self::TargetDefeated => write!(f, "target defeated"),
            Self::NoLivingTargets => write!(f, "no living targets"),
        }
    }
}

/// One resolved consequence of a round.
///
/// Hit point amounts are what actually changed after clamping, never the
/// raw formula output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// An actor started resolving an action.
    ActionUsed {
        /// Acting combatant.
        actor: CombatantId,
        /// Action performed.
        action: ActionId,
        /// Targets after expansion at resolution time.
        targets: Vec<CombatantId>,
    },
    /// The hit check against one target failed.
    ActionMissed {
        /// Acting combatant.
        actor: CombatantId,
        /// Target that was missed.
        target: CombatantId,
    },
    /// Hit points were removed.
    DamageDealt {
        /// Attacker, or `None` for periodic status damage.
        source: Option<CombatantId>,
        /// Combatant that lost hit points.
        target: CombatantId,
        /// Hit points removed.
        amount: u32,
    },
    /// Hit points were restored.
    HealApplied {
        /// Healer, or `None` for periodic status healing.
        source: Option<CombatantId>,
        /// Combatant that recovered hit points.
        target: CombatantId,
        /// Hit points restored.
        amount: u32,
    },
    /// A status effect was appended.
    StatusApplied {
        /// Holder of the new status.
        target: CombatantId,
        /// Status applied.
        status: StatusId,
    },
    /// A status effect was removed by an action.
    StatusRemoved {
        /// Former holder.
        target: CombatantId,
        /// Status removed.
        status: StatusId,
    },
    /// A status effect ran out at a round-end tick.
    StatusExpired {
        /// Former holder.
        target: CombatantId,
        /// Status that expired.
        status: StatusId,
    },
    /// A queued intent was skipped.
    IntentDropped {
        /// Combatant whose intent was skipped.
        actor: CombatantId,
        /// Why it was skipped.
        reason: DropReason,
    },
    /// A combatant's hit points reached zero.
    CombatantDefeated {
        /// Defeated combatant.
        combatant: CombatantId,
    },
    /// A round finished resolving.
    RoundEnded {
        /// Round number, starting at 1.
        round: u32,
    },
    /// The battle reached a terminal outcome.
    BattleEnded {
        /// Final outcome.
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Returns the category of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ActionUsed { .. } | Self::ActionMissed { .. } | Self::IntentDropped { .. } => {
                EventKind::Action
            }
            Self::DamageDealt { .. } | Self::HealApplied { .. } | Self::CombatantDefeated { .. } => {
                EventKind::Vitals
            }
            Self::StatusApplied { .. } | Self::StatusRemoved { .. } | Self::StatusExpired { .. } => {
                EventKind::Status
            }
            Self::RoundEnded { .. } | Self::BattleEnded { .. } => EventKind::Lifecycle,
        }
    }

    /// Returns the combatant the event is about, if it has one.
    #[must_use]
    pub const fn subject(&self) -> Option<CombatantId> {
        match self {
            Self::ActionUsed { actor, .. }
            | Self::ActionMissed { actor, .. }
            | Self::IntentDropped { actor, .. } => Some(*actor),
            Self::DamageDealt { target, .. }
            | Self::HealApplied { target, .. }
            | Self::StatusApplied { target, .. }
            | Self::StatusRemoved { target, .. }
            | Self::StatusExpired { target, .. } => Some(*target),
            Self::CombatantDefeated { combatant } => Some(*combatant),
            Self::RoundEnded { .. } | Self::BattleEnded { .. } => None,
        }
    }
}

/// Event category for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Actions used, missed or dropped.
    Action,
    /// Hit point changes and defeats.
    Vitals,
    /// Status effects applied, removed or expired.
    Status,
    /// Round and battle boundaries.
    Lifecycle,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "Action"),
            Self::Vitals => write!(f, "Vitals"),
            Self::Status => write!(f, "Status"),
            Self::Lifecycle => write!(f, "Lifecycle"),
        }
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// A [`BattleEvent`] with its position in the battle's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    round: u32,
    sequence: u64,
    event: BattleEvent,
}

impl EventEnvelope {
    /// Creates a new envelope.
    ///
    /// # Arguments
    ///
    /// * `round` - Round the event happened in
    /// * `sequence` - Position in the whole battle's stream
    /// * `event` - The event
    #[must_use]
    pub const fn new(round: u32, sequence: u64, event: BattleEvent) -> Self {
        Self {
            round,
            sequence,
            event,
        }
    }

    /// Returns the round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the wrapped event.
    #[must_use]
    pub const fn event(&self) -> &BattleEvent {
        &self.event
    }

    /// Consumes the envelope and returns the event.
    #[must_use]
    pub fn into_event(self) -> BattleEvent {
        self.event
    }
}

/// Collects events for one round, stamping each with the next sequence
/// number of the battle.
#[derive(Debug)]
pub(crate) struct EventLog<'a> {
    round: u32,
    next_sequence: &'a mut u64,
    events: Vec<EventEnvelope>,
}

impl<'a> EventLog<'a> {
    pub(crate) fn new(round: u32, next_sequence: &'a mut u64) -> Self {
        Self {
            round,
            next_sequence,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: BattleEvent) {
        tracing::trace!(round = self.round, sequence = *self.next_sequence, ?event, "event");
        self.events
            .push(EventEnvelope::new(self.round, *self.next_sequence, event));
        *self.next_sequence += 1;
    }

    pub(crate) fn into_events(self) -> Vec<EventEnvelope> {
        self.events
    }
}

// =============================================================================
// Tests
// =============================================================================
