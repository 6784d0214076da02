use std::collections::BTreeMap;

use crate::domain::Chromosome;

/// Mutable per-run state shared by the controller and the generational loop.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmState {
    /// Current population-size cap.
    pub population_size: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub generations_without_improvement: usize,
    /// Consecutive generations the best fitness has spent at a given distance from the
    /// maximum, keyed by that distance rounded up to a whole score unit. Only the
    /// current plateau has an entry.
    pub plateau_generations: BTreeMap<usize, usize>,
    pub best: Option<Chromosome>,
    pub best_fitness: f64,
    pub fitness_history: Vec<f64>,
    /// Share of distinct chromosomes per generation, as a percentage.
    pub diversity_history: Vec<f64>,
    pub generation: usize,
}

impl AlgorithmState {
    pub fn new(population_size: usize, mutation_rate: f64, crossover_rate: f64) -> Self {
        Self {
            population_size,
            mutation_rate,
            crossover_rate,
            generations_without_improvement: 0,
            plateau_generations: BTreeMap::new(),
            best: None,
            best_fitness: f64::NEG_INFINITY,
            fitness_history: Vec::new(),
            diversity_history: Vec::new(),
            generation: 0,
        }
    }

    /// Plateau key for a distance from the maximum score.
    pub fn plateau_key(gap: f64) -> usize {
        if gap.is_finite() && gap > 0.0 {
            gap.ceil() as usize
        } else {
            0
        }
    }

    /// Records the outcome of one evaluated generation.
    ///
    /// # Arguments
    ///
    /// * `best` - The best chromosome of this generation.
    /// * `best_fitness` - Its fitness.
    /// * `gap` - Its distance from the maximum score.
    /// * `diversity_percent` - Share of distinct chromosomes in the population.
    ///
    /// # Returns
    ///
    /// `true` if this generation improved on the best fitness seen so far.
    pub fn record(
        &mut self,
        best: &Chromosome,
        best_fitness: f64,
        gap: f64,
        diversity_percent: f64,
    ) -> bool {
        self.fitness_history.push(best_fitness);
        self.diversity_history.push(diversity_percent);

        let key = Self::plateau_key(gap);
        self.plateau_generations.retain(|&k, _| k == key);
        *self.plateau_generations.entry(key).or_insert(0) += 1;

        if best_fitness > self.best_fitness {
            self.best_fitness = best_fitness;
            self.best = Some(best.clone());
            self.generations_without_improvement = 0;
            true
        } else {
            self.generations_without_improvement += 1;
            false
        }
    }

    /// Generations spent on the plateau `gap` away from the maximum, `0` if the best
    /// fitness is not currently there.
    pub fn plateau_generations(&self, gap: f64) -> usize {
        self.plateau_generations
            .get(&Self::plateau_key(gap))
            .copied()
            .unwrap_or(0)
    }
}
