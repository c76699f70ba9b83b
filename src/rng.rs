//! Injectable randomness
//!
//! Every random decision in the simulations (tile spawns, food placement,
//! launch angles, power-up rolls) goes through [`RandomSource`] so games can
//! be replayed from a seed or driven by a fixed script in tests.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn next(&mut self) -> f64;

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn next_index(&mut self, len: usize) -> usize {
        let idx = (self.next() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// Uniform sample in `[lo, hi)`
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

/// PCG-backed source, reproducible from its seed
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` so a script can never produce an
/// out-of-range index.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
