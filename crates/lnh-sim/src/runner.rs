//! Runs seeded AI-vs-AI matches and aggregates their outcomes.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lnh_core::{
    ActionCatalog, Advance, BasicAi, BattleConfig, BattleOutcome, BattleSession,
    RosterDefinition,
};
use rayon::prelude::*;
use tracing::{debug, info};

/// Result of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Seed the match ran with.
    pub seed: u64,
    /// Outcome when the match stopped; `InProgress` if it hit the round cap.
    pub outcome: BattleOutcome,
    /// Rounds resolved.
    pub rounds: u32,
}

/// Aggregated results of a batch of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Matches run.
    pub matches: usize,
    /// Match count per outcome label ("Player victory", "draw", "unfinished").
    pub outcomes: BTreeMap<String, usize>,
    /// Mean rounds across all matches.
    pub average_rounds: f64,
}

impl Summary {
    /// Folds per-match results into totals.
    #[must_use]
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut outcomes = BTreeMap::new();
        for result in results {
            let label = match result.outcome {
                BattleOutcome::InProgress => "unfinished".to_string(),
                outcome => outcome.to_string(),
            };
            *outcomes.entry(label).or_insert(0) += 1;
        }
        // Exact while the totals stay below 2^53.
        let (total_rounds, count) = results.iter().fold((0.0, 0.0), |(sum, n), r| {
            (sum + f64::from(r.rounds), n + 1.0)
        });
        let average_rounds = if count > 0.0 {
            total_rounds / count
        } else {
            0.0
        };
        Self {
            matches: results.len(),
            outcomes,
            average_rounds,
        }
    }
}

/// Plays one match with every team under [`BasicAi`].
///
/// # Errors
///
/// Fails if the roster is invalid or a controller leaves an actor without
/// an intent.
pub fn run_match(
    catalog: &Arc<ActionCatalog>,
    roster: &RosterDefinition,
    seed: u64,
    max_rounds: u32,
) -> Result<MatchResult> {
    let mut session = BattleSession::new(Arc::clone(catalog), roster, BattleConfig::with_seed(seed))
        .with_context(|| format!("match {seed}: invalid roster"))?;
    for team in session.battle().arena().teams() {
        session.set_controller(team, BasicAi::new());
    }

    let mut rounds = 0;
    while rounds < max_rounds && !session.current_outcome().is_finished() {
        match session.advance_if_ready()? {
            Advance::Resolved(report) => rounds = report.round,
            Advance::NotReady { pending } => {
                bail!("match {seed}: no intent chosen for {pending:?}")
            }
        }
    }

    let outcome = session.current_outcome();
    debug!(seed, rounds, %outcome, "match complete");
    Ok(MatchResult {
        seed,
        outcome,
        rounds,
    })
}

/// Runs `matches` matches in parallel; match `i` uses seed `base_seed + i`.
///
/// # Errors
///
/// Returns the first match error encountered.
pub fn run_matches(
    catalog: &Arc<ActionCatalog>,
    roster: &RosterDefinition,
    base_seed: u64,
    matches: u64,
    max_rounds: u32,
) -> Result<Vec<MatchResult>> {
    info!(matches, base_seed, max_rounds, "running matches");
    (0..matches)
        .into_par_iter()
        .map(|i| run_match(catalog, roster, base_seed.wrapping_add(i), max_rounds))
        .collect()
}
