//! # Selection
//!
//! Parent selection strategies. Each one implements [`SelectionStrategy`] and returns
//! the index of one chosen parent. [`Selection`] is the configuration-level choice
//! between them.

pub mod hybrid;
pub mod pool;
pub mod roulette;
pub mod selection_strategy;
pub mod tournament;

pub use hybrid::{HybridSelection, TournamentTier};
pub use pool::{ParentPool, PoolTier};
pub use roulette::RouletteWheelSelection;
pub use selection_strategy::SelectionStrategy;
pub use tournament::TournamentSelection;

use crate::domain::Chromosome;
use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// The selection strategy a run uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Roulette(RouletteWheelSelection),
    Tournament(TournamentSelection),
    Hybrid(HybridSelection),
}

impl Selection {
    /// # Errors
    ///
    /// Returns [`crate::GeneticError::Configuration`] if the wrapped strategy is invalid.
    pub fn validate(&self) -> Result<()> {
        match self {
            Selection::Roulette(_) => Ok(()),
            Selection::Tournament(strategy) => strategy.validate(),
            Selection::Hybrid(strategy) => strategy.validate(),
        }
    }

    /// Binds the maximum score for strategies that measure against it.
    pub fn for_max_score(self, max_score: f64) -> Self {
        match self {
            Selection::Hybrid(hybrid) => Selection::Hybrid(hybrid.with_max_score(max_score)),
            other => other,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Hybrid(HybridSelection::default())
    }
}

impl SelectionStrategy for Selection {
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        match self {
            Selection::Roulette(strategy) => strategy.select(population, fitness, rng),
            Selection::Tournament(strategy) => strategy.select(population, fitness, rng),
            Selection::Hybrid(strategy) => strategy.select(population, fitness, rng),
        }
    }
}
