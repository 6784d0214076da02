//! # Mutation
//!
//! Every mutation is a swap of one category's values between two slots, so mutated
//! chromosomes always keep the permutation invariant and never need repair.

use crate::constraints::ConstraintSet;
use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// With probability `rate`, swaps one random category between two distinct random
/// slots. Returns an unchanged copy otherwise, or when there is nothing to swap.
pub fn swap_mutate(
    chromosome: &Chromosome,
    rate: f64,
    rng: &mut RandomNumberGenerator,
) -> Chromosome {
    if chromosome.num_slots() < 2 || chromosome.num_categories() == 0 || !rng.chance(rate) {
        return chromosome.clone();
    }
    let (a, b) = rng.distinct_pair(chromosome.num_slots());
    let category = rng.index(chromosome.num_categories());
    chromosome.swapped(category, a, b)
}

/// Mutation that turns into a short burst of gentler swaps near a solution.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveMutation {
    near_optimal_within: f64,
    min_swaps: usize,
    max_swaps: usize,
    rate_factor: f64,
}

impl AdaptiveMutation {
    /// Creates an adaptive mutation.
    ///
    /// # Arguments
    ///
    /// * `near_optimal_within` - A chromosome whose fitness is at most this far from the
    ///   maximum counts as near-optimal.
    /// * `min_swaps`, `max_swaps` - The inclusive range of swaps applied to near-optimal
    ///   chromosomes.
    /// * `rate_factor` - Multiplier on the rate for each of those swaps.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if the swap range is empty or the factor
    /// is not a number in `[0, 1]`.
    pub fn new(
        near_optimal_within: f64,
        min_swaps: usize,
        max_swaps: usize,
        rate_factor: f64,
    ) -> Result<Self> {
        let mutation = Self {
            near_optimal_within,
            min_swaps,
            max_swaps,
            rate_factor,
        };
        mutation.validate()?;
        Ok(mutation)
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.min_swaps == 0 || self.min_swaps > self.max_swaps {
            return Err(GeneticError::Configuration(format!(
                "Swap range {}..={} is empty",
                self.min_swaps, self.max_swaps
            )));
        }
        if !(0.0..=1.0).contains(&self.rate_factor) {
            return Err(GeneticError::Configuration(format!(
                "Rate factor must be in [0, 1], got {}",
                self.rate_factor
            )));
        }
        Ok(())
    }

    pub fn get_near_optimal_within(&self) -> f64 {
        self.near_optimal_within
    }

    /// Mutates a chromosome whose own fitness is `gap` away from the maximum.
    pub fn mutate(
        &self,
        chromosome: &Chromosome,
        rate: f64,
        gap: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        if gap > self.near_optimal_within {
            return swap_mutate(chromosome, rate, rng);
        }
        let swaps = rng.range_inclusive(self.min_swaps, self.max_swaps);
        let rate = rate * self.rate_factor;
        let mut mutated = chromosome.clone();
        for _ in 0..swaps {
            mutated = swap_mutate(&mutated, rate, rng);
        }
        mutated
    }
}

impl Default for AdaptiveMutation {
    fn default() -> Self {
        Self {
            near_optimal_within: 2.0,
            min_swaps: 2,
            max_swaps: 4,
            rate_factor: 0.5,
        }
    }
}

/// Mutation aimed at the constraints a chromosome still misses.
///
/// If any missing constraint depends on slot neighbourhood, a random pair of adjacent
/// slots is swapped, in a category the constraint mentions when it declares a shape.
/// Otherwise a plain swap is applied.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DirectedMutation {
    probability: f64,
}

impl DirectedMutation {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if `probability` is outside `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        let directed = Self { probability };
        directed.validate()?;
        Ok(directed)
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(GeneticError::Configuration(format!(
                "Directed mutation probability must be in [0, 1], got {}",
                self.probability
            )));
        }
        Ok(())
    }

    pub fn get_probability(&self) -> f64 {
        self.probability
    }

    /// Applies the directed move with the configured probability.
    pub fn mutate(
        &self,
        chromosome: &Chromosome,
        missing: &[usize],
        constraints: &ConstraintSet,
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        if missing.is_empty() || !rng.chance(self.probability) {
            return chromosome.clone();
        }
        self.force(chromosome, missing, constraints, rng)
    }

    /// Applies the directed move unconditionally.
    pub fn force(
        &self,
        chromosome: &Chromosome,
        missing: &[usize],
        constraints: &ConstraintSet,
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        let slots = chromosome.num_slots();
        let positional = missing
            .iter()
            .copied()
            .find(|&index| constraints.is_adjacency_sensitive(index));

        match positional {
            Some(index) if slots >= 2 && chromosome.num_categories() > 0 => {
                let categories = constraints.shape(index).categories();
                let category = if categories.is_empty() {
                    rng.index(chromosome.num_categories())
                } else {
                    categories[rng.index(categories.len())]
                };
                let slot = rng.index(slots - 1);
                chromosome.swapped(category, slot, slot + 1)
            }
            _ => swap_mutate(chromosome, 1.0, rng),
        }
    }
}

impl Default for DirectedMutation {
    fn default() -> Self {
        Self { probability: 0.3 }
    }
}

/// The main mutation operator a run uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum MutationStrategy {
    /// A single swap at the current rate.
    Uniform,
    /// See [`AdaptiveMutation`].
    Adaptive(AdaptiveMutation),
    /// The directed move, gated by the current rate instead of its own probability.
    Directed(DirectedMutation),
}

impl Default for MutationStrategy {
    fn default() -> Self {
        MutationStrategy::Adaptive(AdaptiveMutation::default())
    }
}

impl MutationStrategy {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if the wrapped mutation is invalid.
    pub fn validate(&self) -> Result<()> {
        match self {
            MutationStrategy::Uniform => Ok(()),
            MutationStrategy::Adaptive(adaptive) => adaptive.validate(),
            MutationStrategy::Directed(directed) => directed.validate(),
        }
    }

    /// Mutates `chromosome`.
    ///
    /// # Arguments
    ///
    /// * `rate` - The current mutation rate. A rate of `0.0` leaves every chromosome
    ///   unchanged.
    /// * `gap` - Distance of this chromosome's fitness from the maximum.
    /// * `missing` - The constraints this chromosome does not satisfy.
    pub fn mutate(
        &self,
        chromosome: &Chromosome,
        rate: f64,
        gap: f64,
        missing: &[usize],
        constraints: &ConstraintSet,
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        match self {
            MutationStrategy::Uniform => swap_mutate(chromosome, rate, rng),
            MutationStrategy::Adaptive(adaptive) => adaptive.mutate(chromosome, rate, gap, rng),
            MutationStrategy::Directed(directed) => {
                if missing.is_empty() || !rng.chance(rate) {
                    chromosome.clone()
                } else {
                    directed.force(chromosome, missing, constraints, rng)
                }
            }
        }
    }
}
