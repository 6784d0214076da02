//! # Elite Refiner
//!
//! Coordinates hill climbing on the best members of a population. The genetic loop
//! uses it in two places: light polishing of the top survivors once the population is
//! close to a solution, and intensive climbing when a near-optimal plateau persists.

use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::evolution::Challenge;
use crate::local_search::{HillClimbing, LocalSearch};

/// Applies hill climbing to the leading near-optimal members of a sorted population.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EliteRefiner {
    /// How many of the leading individuals are considered.
    top: usize,
    /// Only individuals at most this far from the maximum score are refined.
    within: f64,
    algorithm: HillClimbing,
}

impl EliteRefiner {
    /// Creates a new refiner.
    ///
    /// # Arguments
    ///
    /// * `top` - How many of the leading individuals are considered.
    /// * `within` - Only individuals at most this far from the maximum score are refined.
    /// * `iterations` - The hill-climbing iteration budget per individual.
    ///
    /// # Errors
    ///
    /// Returns an error if `iterations` is 0.
    pub fn new(top: usize, within: f64, iterations: usize) -> Result<Self> {
        Ok(Self {
            top,
            within,
            algorithm: HillClimbing::new(iterations)?,
        })
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.algorithm = self.algorithm.with_parallel_threshold(threshold);
        self
    }

    pub fn get_top(&self) -> usize {
        self.top
    }

    pub fn get_within(&self) -> f64 {
        self.within
    }

    /// Refines the leading individuals in place.
    ///
    /// # Arguments
    ///
    /// * `population` - The individuals, sorted by descending fitness.
    /// * `fitness` - The fitness scores corresponding to each individual.
    /// * `challenge` - The challenge used to evaluate fitness.
    ///
    /// # Returns
    ///
    /// The number of individuals whose score improved.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitness vector length doesn't match the population length.
    pub fn refine(
        &self,
        population: &mut [Chromosome],
        fitness: &[f64],
        challenge: &dyn Challenge,
    ) -> Result<usize> {
        if population.len() != fitness.len() {
            return Err(GeneticError::Configuration(format!(
                "Population size ({}) does not match fitness vector size ({})",
                population.len(),
                fitness.len()
            )));
        }

        let mut improved = 0;
        for (individual, &score) in population.iter_mut().zip(fitness).take(self.top) {
            if challenge.gap(score) > self.within {
                continue;
            }
            let refined = self.algorithm.search(individual, challenge);
            if challenge.score(&refined) > score {
                improved += 1;
            }
            *individual = refined;
        }

        Ok(improved)
    }
}

impl Default for EliteRefiner {
    fn default() -> Self {
        Self {
            top: 5,
            within: 2.0,
            algorithm: HillClimbing::clamped(15),
        }
    }
}
