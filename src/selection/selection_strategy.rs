use std::fmt::Debug;

use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Trait for parent selection strategies.
///
/// A strategy picks one parent per call and returns its index into `population`.
/// Implementations must always return a valid index for a non-empty population.
///
/// # Examples
///
/// ```
/// use zebra_ga::domain::Chromosome;
/// use zebra_ga::rng::RandomNumberGenerator;
/// use zebra_ga::selection::{SelectionStrategy, TournamentSelection};
///
/// let population = vec![
///     Chromosome::from_slots(vec![vec![0], vec![1]]),
///     Chromosome::from_slots(vec![vec![1], vec![0]]),
/// ];
/// let fitness = vec![1.0, 0.0];
/// let mut rng = RandomNumberGenerator::from_seed(3);
///
/// let selection = TournamentSelection::new(2).unwrap();
/// assert_eq!(selection.select(&population, &fitness, &mut rng).unwrap(), 0);
/// ```
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Selects one individual and returns its index.
    ///
    /// # Arguments
    ///
    /// * `population` - The candidates, usually the top of the sorted population.
    /// * `fitness` - The fitness scores corresponding to each candidate.
    /// * `rng` - The run's random number generator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The population is empty
    /// - The fitness vector length doesn't match the population length
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;
}

pub(crate) fn check_inputs(population: &[Chromosome], fitness: &[f64]) -> Result<()> {
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }
    if population.len() != fitness.len() {
        return Err(GeneticError::Configuration(format!(
            "Population size ({}) doesn't match fitness vector size ({})",
            population.len(),
            fitness.len()
        )));
    }
    Ok(())
}
