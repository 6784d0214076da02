//! # BreedStrategy
//!
//! The `BreedStrategy` trait defines the interface for strategies responsible for breeding
//! offspring from a pool of parents. The operators it is built from live alongside it:
//! [`crossover`] and [`mutation`].
pub mod combinatorial;
pub mod crossover;
pub mod mutation;

use std::fmt::Debug;

use crate::{
    constraints::ConstraintSet,
    domain::{Chromosome, Domain},
    error::Result,
    evolution::Challenge,
    rng::RandomNumberGenerator,
};

/// What a breed strategy needs to know about the current generation.
#[derive(Clone, Copy)]
pub struct BreedContext<'a> {
    pub domain: &'a Domain,
    pub constraints: &'a ConstraintSet,
    /// Scores children for fitness-dependent operators.
    pub challenge: &'a dyn Challenge,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// The best fitness in the current population.
    pub best_fitness: f64,
}

impl BreedContext<'_> {
    /// Distance from the population's best fitness to the maximum score.
    pub fn best_gap(&self) -> f64 {
        self.challenge.gap(self.best_fitness)
    }
}

/// # BreedStrategy
///
/// Produces offspring from a pool of scored parents.
pub trait BreedStrategy
where
    Self: Debug + Send + Sync,
{
    /// Breeds exactly `quota` children.
    ///
    /// ## Parameters
    ///
    /// - `parents`: The selection pool, sorted by descending fitness.
    /// - `fitness`: The fitness of each parent.
    /// - `quota`: The number of children to return.
    /// - `context`: The domain, constraints and current rates.
    /// - `rng`: The run's random number generator.
    ///
    /// ## Errors
    ///
    /// This method can fail if:
    /// - The parents slice is empty while `quota` is positive
    /// - The fitness slice does not match the parents
    /// - A child cannot be repaired
    fn breed(
        &self,
        parents: &[Chromosome],
        fitness: &[f64],
        quota: usize,
        context: &BreedContext<'_>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>>;
}

pub use combinatorial::{
    CombinatorialBreedConfig, CombinatorialBreedConfigBuilder, CombinatorialBreedStrategy,
};
pub use crossover::CrossoverStrategy;
pub use mutation::{AdaptiveMutation, DirectedMutation, MutationStrategy};
