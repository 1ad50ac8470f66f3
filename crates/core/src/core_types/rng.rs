//! Injectable dice for ignition, spread, extinguish and debris rolls
//!
//! Every probabilistic decision in the engine goes through [`RandomSource`],
//! so a seeded generator makes whole scenarios reproducible. Any `rand::Rng`
//! (e.g. `StdRng::seed_from_u64`) is a `RandomSource` out of the box.

use rand::Rng;

/// Source of uniform random numbers
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn next_f32(&mut self) -> f32;

    /// Uniform integer in `[low, high)`; returns `low` for an empty range
    fn range_i32(&mut self, low: i32, high: i32) -> i32;

    /// Bernoulli trial with success probability `probability`
    fn chance(&mut self, probability: f32) -> bool {
        if probability <= 0.0 {
            return false;
        }
        self.next_f32() < probability
    }

    /// Uniformly pick -1 or +1
    fn sign(&mut self) -> i32 {
        if self.next_f32() < 0.5 {
            -1
        } else {
            1
        }
    }
}

impl<R: Rng> RandomSource for R {
    fn next_f32(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.random_range(low..high)
    }
}

/// Random source that always returns the same draw.
///
/// A value of `0.999` makes every roll below certainty fail, `0.0` makes
/// every roll with a positive probability succeed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom {
    value: f32,
}

impl FixedRandom {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 0.999_999),
        }
    }

    /// Every roll below certainty fails
    pub fn never() -> Self {
        Self::new(0.999_999)
    }

    /// Every roll with positive probability succeeds
    pub fn always() -> Self {
        Self::new(0.0)
    }
}

impl RandomSource for FixedRandom {
    fn next_f32(&mut self) -> f32 {
        self.value
    }

    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high - low) as f32;
        low + ((self.value * span) as i32).min(high - low - 1)
    }
}
