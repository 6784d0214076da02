use tracing::debug;

use crate::adaptive::AlgorithmState;
use crate::error::{GeneticError, Result};

/// Operator rates and population growth for one fitness tier.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerTier {
    /// The tier applies when the best fitness is at most this far from the maximum.
    pub within: f64,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Added to the population-size cap each generation the tier applies.
    pub population_delta: usize,
    /// Upper limit for that growth, as a fraction of the maximum population.
    /// `None` means the maximum population itself.
    pub population_cap: Option<f64>,
}

/// Adjusts mutation rate, crossover rate and population size from the best fitness and
/// the population's diversity.
///
/// Tiers are checked from the tightest band outwards; when none applies the baseline
/// rates are used. Afterwards, if fewer than `low_diversity_ratio` of the current
/// population cap are distinct, the mutation rate is multiplied by
/// `low_diversity_boost` (never above 1).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterController {
    tiers: Vec<ControllerTier>,
    baseline_mutation_rate: f64,
    baseline_crossover_rate: f64,
    low_diversity_ratio: f64,
    low_diversity_boost: f64,
    min_population: usize,
    max_population: usize,
}

impl ParameterController {
    /// Creates a controller with custom tiers.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a rate is outside `[0, 1]`, a band is
    /// negative or not a number, or a population cap fraction is not positive.
    pub fn new(
        mut tiers: Vec<ControllerTier>,
        baseline_mutation_rate: f64,
        baseline_crossover_rate: f64,
    ) -> Result<Self> {
        tiers.sort_by(|a, b| a.within.total_cmp(&b.within));
        let controller = Self {
            tiers,
            baseline_mutation_rate,
            baseline_crossover_rate,
            ..Self::default()
        };
        controller.validate()?;
        Ok(controller)
    }

    /// Checks rates, bands and caps, and that the tiers are ordered from the tightest
    /// band outwards.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let check_rate = |name: &str, rate: f64| {
            if (0.0..=1.0).contains(&rate) {
                Ok(())
            } else {
                Err(GeneticError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, rate
                )))
            }
        };
        check_rate("Baseline mutation rate", self.baseline_mutation_rate)?;
        check_rate("Baseline crossover rate", self.baseline_crossover_rate)?;
        for tier in &self.tiers {
            check_rate("Tier mutation rate", tier.mutation_rate)?;
            check_rate("Tier crossover rate", tier.crossover_rate)?;
            if !tier.within.is_finite() || tier.within < 0.0 {
                return Err(GeneticError::Configuration(format!(
                    "Tier band must be a non-negative number, got {}",
                    tier.within
                )));
            }
            if tier.population_cap.is_some_and(|cap| cap.is_nan() || cap <= 0.0) {
                return Err(GeneticError::Configuration(
                    "Tier population cap must be a positive fraction".to_string(),
                ));
            }
        }
        if self.tiers.windows(2).any(|pair| pair[0].within > pair[1].within) {
            return Err(GeneticError::Configuration(
                "Controller tiers must be ordered by increasing band".to_string(),
            ));
        }
        if self.low_diversity_ratio.is_nan() || self.low_diversity_boost.is_nan() {
            return Err(GeneticError::Configuration(
                "Low-diversity ratio and boost must be numbers".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the multiplier and threshold of the low-diversity rule.
    pub fn with_low_diversity(mut self, ratio: f64, boost: f64) -> Self {
        self.low_diversity_ratio = ratio;
        self.low_diversity_boost = boost;
        self
    }

    /// Sets the range the population-size cap is kept in.
    pub fn with_population_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_population = min;
        self.max_population = max;
        self
    }

    pub fn get_tiers(&self) -> &[ControllerTier] {
        &self.tiers
    }

    pub fn get_population_bounds(&self) -> (usize, usize) {
        (self.min_population, self.max_population)
    }

    /// Updates `state` for the next generation.
    ///
    /// # Arguments
    ///
    /// * `best_fitness` - The best fitness of the current population.
    /// * `diversity_count` - The number of distinct chromosomes in it.
    /// * `max_score` - The score of a solution.
    /// * `state` - The run state to update.
    pub fn adapt(
        &self,
        best_fitness: f64,
        diversity_count: usize,
        max_score: f64,
        state: &mut AlgorithmState,
    ) {
        let gap = max_score - best_fitness;

        match self.tiers.iter().find(|tier| gap <= tier.within) {
            Some(tier) => {
                state.mutation_rate = tier.mutation_rate;
                state.crossover_rate = tier.crossover_rate;
                if tier.population_delta > 0 {
                    let cap = tier.population_cap.map_or(self.max_population, |fraction| {
                        (self.max_population as f64 * fraction).floor() as usize
                    });
                    state.population_size = cap.min(state.population_size + tier.population_delta);
                }
            }
            None => {
                state.mutation_rate = self.baseline_mutation_rate;
                state.crossover_rate = self.baseline_crossover_rate;
            }
        }

        state.population_size = state
            .population_size
            .clamp(self.min_population, self.max_population.max(self.min_population));

        if (diversity_count as f64) < self.low_diversity_ratio * state.population_size as f64 {
            state.mutation_rate = (state.mutation_rate * self.low_diversity_boost).min(1.0);
            debug!(
                diversity = diversity_count,
                mutation_rate = state.mutation_rate,
                "Low diversity, mutation rate boosted"
            );
        }
    }
}

impl Default for ParameterController {
    fn default() -> Self {
        Self {
            tiers: vec![
                ControllerTier {
                    within: 1.0,
                    mutation_rate: 0.40,
                    crossover_rate: 0.95,
                    population_delta: 100,
                    population_cap: None,
                },
                ControllerTier {
                    within: 2.0,
                    mutation_rate: 0.25,
                    crossover_rate: 0.90,
                    population_delta: 50,
                    population_cap: Some(0.8),
                },
                ControllerTier {
                    within: 4.0,
                    mutation_rate: 0.20,
                    crossover_rate: 0.85,
                    population_delta: 0,
                    population_cap: None,
                },
            ],
            baseline_mutation_rate: 0.15,
            baseline_crossover_rate: 0.80,
            low_diversity_ratio: 0.3,
            low_diversity_boost: 1.5,
            min_population: 100,
            max_population: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AlgorithmState {
        AlgorithmState::new(3000, 0.15, 0.85)
    }

    #[test]
    fn test_tiers_for_fifteen_constraints() {
        let controller = ParameterController::default();

        let mut s = state();
        controller.adapt(14.0, 3000, 15.0, &mut s);
        assert_eq!((s.mutation_rate, s.crossover_rate), (0.40, 0.95));
        assert_eq!(s.population_size, 3100);

        let mut s = state();
        controller.adapt(13.0, 3000, 15.0, &mut s);
        assert_eq!((s.mutation_rate, s.crossover_rate), (0.25, 0.90));
        assert_eq!(s.population_size, 3050);

        let mut s = state();
        controller.adapt(11.0, 3000, 15.0, &mut s);
        assert_eq!((s.mutation_rate, s.crossover_rate), (0.20, 0.85));
        assert_eq!(s.population_size, 3000);

        let mut s = state();
        controller.adapt(8.0, 3000, 15.0, &mut s);
        assert_eq!((s.mutation_rate, s.crossover_rate), (0.15, 0.80));
    }

    #[test]
    fn test_population_growth_is_capped() {
        let controller = ParameterController::default();
        let mut s = AlgorithmState::new(4990, 0.15, 0.85);
        controller.adapt(14.0, 5000, 15.0, &mut s);
        assert_eq!(s.population_size, 5000);

        // the 13/15 tier caps growth at 80% of the maximum
        let mut s = AlgorithmState::new(3990, 0.15, 0.85);
        controller.adapt(13.0, 5000, 15.0, &mut s);
        assert_eq!(s.population_size, 4000);
    }

    #[test]
    fn test_low_diversity_boosts_mutation() {
        let controller = ParameterController::default();
        let mut s = state();
        controller.adapt(8.0, 10, 15.0, &mut s);
        assert!((s.mutation_rate - 0.225).abs() < 1e-12);

        let mut s = state();
        controller.adapt(14.0, 10, 15.0, &mut s);
        assert!((s.mutation_rate - 0.60).abs() < 1e-12);
    }

    #[test]
    fn test_boost_is_clamped() {
        let controller = ParameterController::default().with_low_diversity(0.3, 10.0);
        let mut s = state();
        controller.adapt(14.0, 0, 15.0, &mut s);
        assert_eq!(s.mutation_rate, 1.0);
    }

    #[test]
    fn test_population_clamped_to_bounds() {
        let controller = ParameterController::default().with_population_bounds(200, 400);
        let mut s = AlgorithmState::new(50, 0.15, 0.85);
        controller.adapt(0.0, 50, 15.0, &mut s);
        assert_eq!(s.population_size, 200);
    }

    #[test]
    fn test_rejects_invalid_rates() {
        let tier = ControllerTier {
            within: 1.0,
            mutation_rate: 1.5,
            crossover_rate: 0.9,
            population_delta: 0,
            population_cap: None,
        };
        assert!(ParameterController::new(vec![tier], 0.1, 0.8).is_err());
        assert!(ParameterController::new(Vec::new(), -0.1, 0.8).is_err());
        assert!(ParameterController::new(Vec::new(), 0.1, 0.8).is_ok());
    }

    #[test]
    fn test_new_sorts_tiers_and_validate_rejects_unsorted() {
        let tier = |within: f64| ControllerTier {
            within,
            mutation_rate: 0.2,
            crossover_rate: 0.9,
            population_delta: 0,
            population_cap: None,
        };
        let controller = ParameterController::new(vec![tier(3.0), tier(1.0)], 0.1, 0.8).unwrap();
        assert_eq!(controller.get_tiers()[0].within, 1.0);
        assert!(controller.validate().is_ok());

        let unsorted = ParameterController {
            tiers: vec![tier(3.0), tier(1.0)],
            ..ParameterController::default()
        };
        assert!(matches!(
            unsorted.validate(),
            Err(GeneticError::Configuration(_))
        ));
    }
}
