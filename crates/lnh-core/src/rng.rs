//! Injectable randomness for accuracy rolls.
//!
//! The battle never reaches for a global generator. Every random decision
//! goes through a [`RollSource`] supplied at construction, so a battle is
//! fully replayable from its seed.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform rolls in `[0.0, 1.0)`.
///
/// Implementations must be deterministic for a given construction (seed or
/// script) so battles can be replayed.
pub trait RollSource: Send {
    /// Returns the next roll in `[0.0, 1.0)`.
    fn roll_unit(&mut self) -> f64;
}

/// Adapts any `rand` generator into a [`RollSource`].
///
/// # Example
///
/// ```
/// use lnh_core::rng::{RngRolls, RollSource};
///
/// let mut a = RngRolls::seeded(7);
/// let mut b = RngRolls::seeded(7);
/// assert_eq!(a.roll_unit().to_bits(), b.roll_unit().to_bits());
/// ```
#[derive(Debug, Clone)]
pub struct RngRolls<R> {
    rng: R,
}

impl<R: RngCore> RngRolls<R> {
    /// Wraps a generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRolls<ChaCha8Rng> {
    /// Deterministic ChaCha8 generator seeded from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> RollSource for RngRolls<R> {
    fn roll_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of rolls, cycling when exhausted.
///
/// Intended for tests and tutorials where the outcome of every accuracy roll
/// must be scripted.
///
/// # Example
///
/// ```
/// use lnh_core::rng::{RollSource, ScriptedRolls};
///
/// let mut rolls = ScriptedRolls::new(vec![0.1, 0.9]);
/// assert!((rolls.roll_unit() - 0.1).abs() < f64::EPSILON);
/// assert!((rolls.roll_unit() - 0.9).abs() < f64::EPSILON);
/// assert!((rolls.roll_unit() - 0.1).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    next: usize,
}

impl ScriptedRolls {
    /// Creates a script. An empty script always rolls `0.0`.
    #[must_use]
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, next: 0 }
    }

    /// Number of rolls consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl RollSource for ScriptedRolls {
    fn roll_unit(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        roll
    }
}

/// Accuracy check.
///
/// Certain outcomes (`accuracy >= 1.0` or `<= 0.0`) consume no roll, so
/// adding an always-hit action to a battle does not shift later rolls.
pub fn hit_check(rolls: &mut dyn RollSource, accuracy: f64) -> bool {
    if accuracy >= 1.0 {
        return true;
    }
    if accuracy <= 0.0 {
        return false;
    }
    rolls.roll_unit() < accuracy
}
