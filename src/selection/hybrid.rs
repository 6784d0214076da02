use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;
use crate::selection::roulette::RouletteWheelSelection;
use crate::selection::selection_strategy::{check_inputs, SelectionStrategy};
use crate::selection::tournament::TournamentSelection;

/// A tournament size that applies once the population's best fitness is within
/// `within` of the maximum score.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TournamentTier {
    pub within: f64,
    pub tournament_size: usize,
}

/// Tournament selection that tightens as the population approaches a solution, and
/// roulette selection before that.
///
/// Tiers are checked in order of increasing `within`; the first tier the population's
/// best fitness reaches decides the tournament size. With the default tiers and 15
/// constraints: best 14 gives size 3, 13 gives 5, 10 to 12 give 7, anything lower
/// falls back to roulette.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HybridSelection {
    tiers: Vec<TournamentTier>,
    max_score: Option<f64>,
    roulette: RouletteWheelSelection,
}

impl HybridSelection {
    /// Creates a hybrid selection with custom tiers.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a tier has a zero tournament size or a
    /// negative or non-finite band.
    pub fn new(mut tiers: Vec<TournamentTier>) -> Result<Self> {
        tiers.sort_by(|a, b| a.within.total_cmp(&b.within));
        let hybrid = Self {
            tiers,
            max_score: None,
            roulette: RouletteWheelSelection::new(),
        };
        hybrid.validate()?;
        Ok(hybrid)
    }

    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a tier is invalid or the tiers are not
    /// ordered by increasing band.
    pub fn validate(&self) -> Result<()> {
        for tier in &self.tiers {
            if tier.tournament_size < 1 {
                return Err(GeneticError::Configuration(
                    "Tournament size must be at least 1".to_string(),
                ));
            }
            if !tier.within.is_finite() || tier.within < 0.0 {
                return Err(GeneticError::Configuration(format!(
                    "Tier band must be a non-negative number, got {}",
                    tier.within
                )));
            }
        }
        if self.tiers.windows(2).any(|pair| pair[0].within > pair[1].within) {
            return Err(GeneticError::Configuration(
                "Tournament tiers must be ordered by increasing band".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the maximum score the tiers are measured against.
    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = Some(max_score);
        self
    }

    pub fn get_tiers(&self) -> &[TournamentTier] {
        &self.tiers
    }

    /// The tournament size for a population whose best fitness is `best`, or `None`
    /// when roulette applies.
    pub fn tournament_size_for(&self, best: f64, max_score: f64) -> Option<usize> {
        let gap = max_score - best;
        self.tiers
            .iter()
            .find(|tier| gap <= tier.within)
            .map(|tier| tier.tournament_size)
    }
}

impl Default for HybridSelection {
    fn default() -> Self {
        Self {
            tiers: vec![
                TournamentTier {
                    within: 1.0,
                    tournament_size: 3,
                },
                TournamentTier {
                    within: 2.0,
                    tournament_size: 5,
                },
                TournamentTier {
                    within: 5.0,
                    tournament_size: 7,
                },
            ],
            max_score: None,
            roulette: RouletteWheelSelection::new(),
        }
    }
}

impl SelectionStrategy for HybridSelection {
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        check_inputs(population, fitness)?;
        let max_score = self.max_score.ok_or_else(|| {
            GeneticError::Configuration(
                "Hybrid selection needs the maximum score before selecting".to_string(),
            )
        })?;

        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        match self.tournament_size_for(best, max_score) {
            Some(size) => Ok(TournamentSelection::new(size)?.run_tournament(fitness, rng)),
            None => Ok(self.roulette.spin(fitness, rng)),
        }
    }
}
