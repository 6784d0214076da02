//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct wraps the `rand` crate's `StdRng` and provides the
//! handful of draws the genetic operators need: probabilities, indices, shuffles and
//! sampling without replacement.
//!
//! ## Example
//!
//! ```rust
//! use zebra_ga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let picks = rng.sample_distinct(10, 3);
//!
//! assert_eq!(picks.len(), 3);
//! assert!(picks.iter().all(|&i| i < 10));
//! ```

use rand::{
    rngs::StdRng,
    seq::{index, SliceRandom},
    Rng, SeedableRng,
};

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from `seed` when given, from entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new(),
        }
    }

    /// Returns a uniform value in `[0, 1)`.
    pub fn probability(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Returns `true` with probability `p`. Values outside `[0, 1]` are clamped.
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.gen_bool(p)
    }

    /// Returns a uniform index in `[0, len)`.
    ///
    /// `len` must be non-zero; callers check for empty collections first.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Returns a uniform integer in `[low, high]`.
    pub fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    /// Returns a uniform float in `[0, upper)`, or `0.0` when `upper` is not positive.
    pub fn uniform_up_to(&mut self, upper: f64) -> f64 {
        if upper > 0.0 {
            self.rng.gen_range(0.0..upper)
        } else {
            0.0
        }
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }

    /// Samples `amount` distinct indices from `0..length`, in sampling order.
    ///
    /// `amount` is clamped to `length`.
    pub fn sample_distinct(&mut self, length: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, length, amount.min(length)).into_vec()
    }

    /// Picks two distinct indices from `0..length`. `length` must be at least 2.
    pub fn distinct_pair(&mut self, length: usize) -> (usize, usize) {
        let picks = self.sample_distinct(length, 2);
        (picks[0], picks[1])
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
