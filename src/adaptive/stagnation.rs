use std::collections::HashSet;

use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::evolution::Challenge;

/// Number of distinct chromosomes in a population.
pub fn distinct_count(population: &[Chromosome]) -> usize {
    population.iter().collect::<HashSet<_>>().len()
}

/// Share of distinct chromosomes in a population, as a percentage. `0.0` when empty.
pub fn diversity_percent(population: &[Chromosome]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    distinct_count(population) as f64 / population.len() as f64 * 100.0
}

/// Detects a population that has collapsed onto one fitness level with little variety.
///
/// A population is stagnant when more than `max_fitness_share` of it sits at the
/// population's maximum fitness and fewer than `distinct_share` of it is distinct.
/// [`is_stagnant`](Self::is_stagnant) measures both over the population passed in;
/// [`is_stagnant_at_top`](Self::is_stagnant_at_top) measures them over the leading
/// `window` members of a population sorted by descending fitness. A run only checks
/// every `interval` generations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StagnationDetector {
    max_fitness_share: f64,
    distinct_share: f64,
    window: usize,
    interval: usize,
}

impl StagnationDetector {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if either share is outside `[0, 1]`.
    pub fn new(max_fitness_share: f64, distinct_share: f64) -> Result<Self> {
        let detector = Self {
            max_fitness_share,
            distinct_share,
            ..Self::default()
        };
        detector.validate()?;
        Ok(detector)
    }

    /// Sets how many of the best members [`is_stagnant_at_top`](Self::is_stagnant_at_top)
    /// looks at.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Sets how many generations pass between checks.
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval;
        self
    }

    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a share is outside `[0, 1]` or the
    /// window or interval is 0.
    pub fn validate(&self) -> Result<()> {
        for (name, share) in [
            ("Max-fitness share", self.max_fitness_share),
            ("Distinct share", self.distinct_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(GeneticError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, share
                )));
            }
        }
        if self.window == 0 || self.interval == 0 {
            return Err(GeneticError::Configuration(
                "Stagnation window and interval cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_max_fitness_share(&self) -> f64 {
        self.max_fitness_share
    }

    pub fn get_distinct_share(&self) -> f64 {
        self.distinct_share
    }

    pub fn get_window(&self) -> usize {
        self.window
    }

    pub fn get_interval(&self) -> usize {
        self.interval
    }

    /// Returns `true` if `generation` is one the population should be checked at.
    pub fn is_due(&self, generation: usize) -> bool {
        self.interval > 0 && generation % self.interval == 0
    }

    /// Checks a scored population. An empty population, or one whose scores do not
    /// line up with it, is never stagnant.
    pub fn is_stagnant(&self, population: &[Chromosome], scores: &[f64]) -> bool {
        if population.is_empty() || population.len() != scores.len() {
            return false;
        }
        let size = population.len() as f64;

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let at_max = scores.iter().filter(|&&s| s == max).count() as f64;
        if at_max / size <= self.max_fitness_share {
            return false;
        }

        (distinct_count(population) as f64) / size < self.distinct_share
    }

    /// Checks the leading `window` members of a population sorted by descending
    /// fitness.
    pub fn is_stagnant_at_top(&self, population: &[Chromosome], scores: &[f64]) -> bool {
        if population.len() != scores.len() {
            return false;
        }
        let top = self.window.min(population.len());
        self.is_stagnant(&population[..top], &scores[..top])
    }

    /// Scores the population with `challenge` and checks it.
    pub fn is_stagnant_with(&self, population: &[Chromosome], challenge: &dyn Challenge) -> bool {
        let scores: Vec<f64> = population.iter().map(|c| challenge.score(c)).collect();
        self.is_stagnant(population, &scores)
    }
}

impl Default for StagnationDetector {
    fn default() -> Self {
        Self {
            max_fitness_share: 0.7,
            distinct_share: 0.3,
            window: 100,
            interval: 50,
        }
    }
}
