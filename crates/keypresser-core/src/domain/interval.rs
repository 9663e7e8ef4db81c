//! Randomised wait between two presses of the same emitter.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive millisecond range an emitter draws its next wait from.
///
/// The bounds may be given in either order; sampling always uses
/// `[min(a, b), max(a, b)]`.  Equal bounds make the wait deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl IntervalRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A fixed interval.
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Returns `(low, high)` with the bounds swapped if needed.
    pub fn bounds(&self) -> (u64, u64) {
        if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        }
    }

    /// Draws a wait in milliseconds using the thread-local RNG.
    pub fn sample_ms(&self) -> u64 {
        self.sample_ms_with(&mut rand::rng())
    }

    /// Draws a wait in milliseconds from the given RNG.
    pub fn sample_ms_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let (low, high) = self.bounds();
        if low == high {
            low
        } else {
            rng.random_range(low..=high)
        }
    }

    /// Draws a wait as a [`Duration`].
    pub fn sample(&self) -> Duration {
        Duration::from_millis(self.sample_ms())
    }
}

impl Default for IntervalRange {
    fn default() -> Self {
        Self::fixed(1000)
    }
}
