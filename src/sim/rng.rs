//! Seeded randomness for the simulation
//!
//! Same seed + same inputs = same run. Nothing in `sim` may touch an
//! unseeded source.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Run RNG (PCG32 seeded from the run seed)
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform in [min, max); returns `min` for an empty range
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Cumulative weighted pick over `(value, weight)` entries.
    ///
    /// Draws `r` in [0, total) and walks the entries subtracting weights;
    /// the entry that takes `r` below zero wins. Non-positive weights are
    /// skipped so they can never be chosen. Returns `None` when no entry has
    /// positive weight.
    pub fn weighted_choice<T: Copy>(&mut self, entries: &[(T, f32)]) -> Option<T> {
        let total: f32 = entries.iter().map(|&(_, w)| w.max(0.0)).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        let mut r = self.next_f32() * total;
        let mut last = None;
        for &(value, weight) in entries {
            if weight <= 0.0 {
                continue;
            }
            last = Some(value);
            r -= weight;
            if r < 0.0 {
                return Some(value);
            }
        }
        // Float rounding can leave a sliver of `r`; it belongs to the last live entry
        last
    }
}
