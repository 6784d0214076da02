use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::{check_inputs, SelectionStrategy};

/// A selection strategy that picks the fittest of a small random group.
///
/// `tournament_size` distinct candidates are sampled without replacement (fewer if
/// the population is smaller). The highest fitness wins; on a tie the candidate
/// sampled first wins.
///
/// Smaller tournaments explore more, larger ones exploit more.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Creates a new TournamentSelection strategy with the specified tournament size.
    ///
    /// # Arguments
    ///
    /// * `tournament_size` - The number of individuals that participate in each tournament.
    ///   Must be at least 1. A tournament size of 1 is equivalent to random selection.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        let selection = Self { tournament_size };
        selection.validate()?;
        Ok(selection)
    }

    /// # Errors
    ///
    /// Returns an error if the tournament size is 0.
    pub fn validate(&self) -> Result<()> {
        if self.tournament_size < 1 {
            return Err(GeneticError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament over validated, non-empty fitness values.
    pub(crate) fn run_tournament(
        &self,
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> usize {
        let contestants = rng.sample_distinct(fitness.len(), self.tournament_size);

        let mut winner = contestants[0];
        for &candidate in &contestants[1..] {
            if fitness[candidate] > fitness[winner] {
                winner = candidate;
            }
        }
        winner
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { tournament_size: 3 }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        check_inputs(population, fitness)?;
        Ok(self.run_tournament(fitness, rng))
    }
}
