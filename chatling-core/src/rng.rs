//! Injectable randomness.
//!
//! The action and event engines never sample a global RNG; they draw
//! through the [`Dice`] capability so tests can force every branch.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Uniform randomness as the engine consumes it: unit-interval draws for
/// probability gates and index picks for outcome tables.
pub trait Dice: Send + Sync {
    /// A uniform draw in `[0, 1)`.
    fn roll(&self) -> f64;

    /// A uniform index in `0..n`. Returns 0 when `n` is 0 or 1.
    fn pick(&self, n: usize) -> usize;
}

/// The default dice: thread-local entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }

    fn pick(&self, n: usize) -> usize {
        if n < 2 {
            return 0;
        }
        rand::thread_rng().gen_range(0..n)
    }
}

/// Dice over a seeded [`StdRng`]: reproducible streams for simulations
/// and benchmarks.
#[derive(Debug)]
pub struct SeededDice {
    rng: Mutex<StdRng>,
}

impl SeededDice {
    /// Dice seeded from `seed`. The same seed replays the same stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&self) -> f64 {
        self.rng.lock().r#gen::<f64>()
    }

    fn pick(&self, n: usize) -> usize {
        if n < 2 {
            return 0;
        }
        self.rng.lock().gen_range(0..n)
    }
}

/// Scripted dice for tests: hands out queued rolls and picks in order.
/// Once a queue runs dry, rolls return 1.0 (which fails every `< p` gate)
/// and picks return 0, so an exhausted script means "nothing further
/// happens" rather than a new random branch.
#[derive(Debug, Default)]
pub struct SequenceDice {
    rolls: Mutex<VecDeque<f64>>,
    picks: Mutex<VecDeque<usize>>,
}

impl SequenceDice {
    /// Script the given rolls and picks.
    #[must_use]
    pub fn scripted(
        rolls: impl IntoIterator<Item = f64>,
        picks: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
            picks: Mutex::new(picks.into_iter().collect()),
        }
    }
}

impl Dice for SequenceDice {
    fn roll(&self) -> f64 {
        self.rolls.lock().pop_front().unwrap_or(1.0)
    }

    fn pick(&self, n: usize) -> usize {
        let scripted = self.picks.lock().pop_front().unwrap_or(0);
        if n == 0 { 0 } else { scripted.min(n - 1) }
    }
}
