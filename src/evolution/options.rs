//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the configuration of a run: population bounds,
//! base operator rates, how each generation is split between survivors, offspring and
//! immigrants, and the strategy objects for every stage of the loop.
//!
//! ## Example
//!
//! ```rust
//! use zebra_ga::evolution::options::{CacheType, EvolutionOptions, LogLevel};
//!
//! let options = EvolutionOptions::builder()
//!     .initial_population(500)
//!     .population_bounds(100, 2000)
//!     .generation_limit(300)
//!     .log_level(LogLevel::Minimal)
//!     .cache_type(CacheType::ThreadLocal)
//!     .seed(42)
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! assert_eq!(options.get_generation_limit(), Some(300));
//!
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.get_initial_population(), 3000);
//! ```
//!
//! ## Defaults
//!
//! | option | default |
//! |---|---|
//! | initial population | 3000 |
//! | population bounds | 100 ..= 5000 |
//! | mutation / crossover rate | 0.15 / 0.85 |
//! | survival / immigration fraction | 0.10 / 0.15 |
//! | parent pool | top 10 within 1 of the maximum, top 50 within 2, top 200 otherwise |
//! | generation limit | none |
//! | parallel threshold | 1000 |

use crate::adaptive::{
    DiversityInjector, ParameterController, PlateauEscalation, StagnationDetector,
};
use crate::breeding::{CombinatorialBreedConfig, CrossoverStrategy, MutationStrategy};
use crate::caching::DEFAULT_CACHE_CAPACITY;
use crate::error::{GeneticError, Result};
use crate::evolution::population::{RestartPolicy, SeedingPlan};
use crate::local_search::EliteRefiner;
use crate::selection::{ParentPool, Selection};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Logs every generation.
    Verbose,
    /// Logs every `log_interval` generations.
    Minimal,
    /// Logs only the start and the end of a run.
    None,
}

/// Which fitness cache a run uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheType {
    None,
    /// One map shared by all threads.
    Global,
    /// One map per worker thread.
    ThreadLocal,
}

/// What a run maximizes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessMode {
    /// The number of satisfied constraints.
    Count,
    /// The sum of the weights of satisfied constraints.
    Weighted,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    /// `None` runs until solved or cancelled
    generation_limit: Option<usize>,
    log_level: LogLevel,
    log_interval: usize,
    initial_population: usize,
    min_population: usize,
    max_population: usize,
    mutation_rate: f64,
    crossover_rate: f64,
    survival_fraction: f64,
    immigration_fraction: f64,
    /// Parents are drawn from this many of the best individuals
    parent_pool: ParentPool,
    /// Minimum number of items to process in parallel
    parallel_threshold: usize,
    cache_type: CacheType,
    cache_capacity: usize,
    fitness_mode: FitnessMode,
    seed: Option<u64>,
    selection: Selection,
    crossover: CrossoverStrategy,
    mutation: MutationStrategy,
    breeding: CombinatorialBreedConfig,
    controller: ParameterController,
    stagnation: StagnationDetector,
    diversity: DiversityInjector,
    refinement: EliteRefiner,
    plateau: PlateauEscalation,
    seeding: SeedingPlan,
    restart: RestartPolicy,
}

impl EvolutionOptions {
    /// Checks the options for values no run can work with.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| -> Result<()> { Err(GeneticError::Configuration(message)) };

        if self.min_population == 0 {
            return fail("Minimum population cannot be zero".to_string());
        }
        if self.min_population > self.max_population {
            return fail(format!(
                "Minimum population ({}) exceeds maximum population ({})",
                self.min_population, self.max_population
            ));
        }
        if !(self.min_population..=self.max_population).contains(&self.initial_population) {
            return fail(format!(
                "Initial population ({}) must be within {}..={}",
                self.initial_population, self.min_population, self.max_population
            ));
        }
        for (name, value) in [
            ("Mutation rate", self.mutation_rate),
            ("Crossover rate", self.crossover_rate),
            ("Survival fraction", self.survival_fraction),
            ("Immigration fraction", self.immigration_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{} must be in [0, 1], got {}", name, value));
            }
        }
        if self.survival_fraction + self.immigration_fraction > 1.0 {
            return fail(format!(
                "Survival ({}) and immigration ({}) fractions leave no room for offspring",
                self.survival_fraction, self.immigration_fraction
            ));
        }
        if self.generation_limit == Some(0) {
            return fail("Generation limit cannot be zero".to_string());
        }
        if self.log_interval == 0 {
            return fail("Log interval cannot be zero".to_string());
        }
        if self.cache_capacity == 0 {
            return fail("Cache capacity cannot be zero".to_string());
        }
        self.parent_pool.validate()?;
        self.selection.validate()?;
        self.mutation.validate()?;
        self.breeding.directed.validate()?;
        self.controller.validate()?;
        self.stagnation.validate()?;
        self.diversity.validate()?;
        self.plateau.validate()?;
        self.seeding.validate()?;
        self.restart.validate()?;
        Ok(())
    }

    pub fn get_generation_limit(&self) -> Option<usize> {
        self.generation_limit
    }

    pub fn get_log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn get_log_interval(&self) -> usize {
        self.log_interval
    }

    pub fn get_initial_population(&self) -> usize {
        self.initial_population
    }

    pub fn get_min_population(&self) -> usize {
        self.min_population
    }

    pub fn get_max_population(&self) -> usize {
        self.max_population
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn get_survival_fraction(&self) -> f64 {
        self.survival_fraction
    }

    pub fn get_immigration_fraction(&self) -> f64 {
        self.immigration_fraction
    }

    pub fn get_parent_pool(&self) -> &ParentPool {
        &self.parent_pool
    }

    /// Returns the minimum number of items to process in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn get_cache_type(&self) -> CacheType {
        self.cache_type
    }

    pub fn get_cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub fn get_fitness_mode(&self) -> FitnessMode {
        self.fitness_mode
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn get_selection(&self) -> &Selection {
        &self.selection
    }

    pub fn get_crossover(&self) -> &CrossoverStrategy {
        &self.crossover
    }

    pub fn get_mutation(&self) -> &MutationStrategy {
        &self.mutation
    }

    pub fn get_breeding(&self) -> &CombinatorialBreedConfig {
        &self.breeding
    }

    pub fn get_controller(&self) -> &ParameterController {
        &self.controller
    }

    pub fn get_stagnation(&self) -> &StagnationDetector {
        &self.stagnation
    }

    pub fn get_diversity(&self) -> &DiversityInjector {
        &self.diversity
    }

    pub fn get_refinement(&self) -> &EliteRefiner {
        &self.refinement
    }

    pub fn get_plateau(&self) -> &PlateauEscalation {
        &self.plateau
    }

    pub fn get_seeding(&self) -> &SeedingPlan {
        &self.seeding
    }

    pub fn get_restart(&self) -> &RestartPolicy {
        &self.restart
    }

    /// Sets the generation limit. `None` removes it.
    pub fn set_generation_limit(&mut self, limit: Option<usize>) {
        self.generation_limit = limit;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Sets the seed. `None` seeds from entropy.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Sets the parallel threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Sets the fitness mode.
    pub fn set_fitness_mode(&mut self, mode: FitnessMode) {
        self.fitness_mode = mode;
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        EvolutionOptionsBuilder::default().build()
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances. Unset
/// values take their defaults; call [`EvolutionOptions::validate`] (the launcher does)
/// to check the result.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    generation_limit: Option<usize>,
    log_level: Option<LogLevel>,
    log_interval: Option<usize>,
    initial_population: Option<usize>,
    population_bounds: Option<(usize, usize)>,
    mutation_rate: Option<f64>,
    crossover_rate: Option<f64>,
    survival_fraction: Option<f64>,
    immigration_fraction: Option<f64>,
    parent_pool: Option<ParentPool>,
    parallel_threshold: Option<usize>,
    cache_type: Option<CacheType>,
    cache_capacity: Option<usize>,
    fitness_mode: Option<FitnessMode>,
    seed: Option<u64>,
    selection: Option<Selection>,
    crossover: Option<CrossoverStrategy>,
    mutation: Option<MutationStrategy>,
    breeding: Option<CombinatorialBreedConfig>,
    controller: Option<ParameterController>,
    stagnation: Option<StagnationDetector>,
    diversity: Option<DiversityInjector>,
    refinement: Option<EliteRefiner>,
    plateau: Option<PlateauEscalation>,
    seeding: Option<SeedingPlan>,
    restart: Option<RestartPolicy>,
}

impl EvolutionOptionsBuilder {
    /// Sets the maximum number of generations.
    pub fn generation_limit(mut self, value: usize) -> Self {
        self.generation_limit = Some(value);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Sets how often `LogLevel::Minimal` logs, in generations.
    pub fn log_interval(mut self, value: usize) -> Self {
        self.log_interval = Some(value);
        self
    }

    /// Sets the size of the first generation.
    pub fn initial_population(mut self, value: usize) -> Self {
        self.initial_population = Some(value);
        self
    }

    /// Sets the range the adaptive population cap stays in.
    pub fn population_bounds(mut self, min: usize, max: usize) -> Self {
        self.population_bounds = Some((min, max));
        self
    }

    /// Sets the starting mutation rate.
    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    /// Sets the starting crossover rate.
    pub fn crossover_rate(mut self, value: f64) -> Self {
        self.crossover_rate = Some(value);
        self
    }

    pub fn survival_fraction(mut self, value: f64) -> Self {
        self.survival_fraction = Some(value);
        self
    }

    pub fn immigration_fraction(mut self, value: f64) -> Self {
        self.immigration_fraction = Some(value);
        self
    }

    /// Draws parents from the top `value` individuals at every fitness level.
    pub fn selection_pool(mut self, value: usize) -> Self {
        self.parent_pool = Some(ParentPool::flat(value));
        self
    }

    pub fn parent_pool(mut self, value: ParentPool) -> Self {
        self.parent_pool = Some(value);
        self
    }

    /// Sets the parallel threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    pub fn cache_type(mut self, value: CacheType) -> Self {
        self.cache_type = Some(value);
        self
    }

    pub fn cache_capacity(mut self, value: usize) -> Self {
        self.cache_capacity = Some(value);
        self
    }

    pub fn fitness_mode(mut self, value: FitnessMode) -> Self {
        self.fitness_mode = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn selection(mut self, value: Selection) -> Self {
        self.selection = Some(value);
        self
    }

    pub fn crossover(mut self, value: CrossoverStrategy) -> Self {
        self.crossover = Some(value);
        self
    }

    pub fn mutation(mut self, value: MutationStrategy) -> Self {
        self.mutation = Some(value);
        self
    }

    pub fn breeding(mut self, value: CombinatorialBreedConfig) -> Self {
        self.breeding = Some(value);
        self
    }

    pub fn controller(mut self, value: ParameterController) -> Self {
        self.controller = Some(value);
        self
    }

    pub fn stagnation(mut self, value: StagnationDetector) -> Self {
        self.stagnation = Some(value);
        self
    }

    pub fn diversity(mut self, value: DiversityInjector) -> Self {
        self.diversity = Some(value);
        self
    }

    pub fn refinement(mut self, value: EliteRefiner) -> Self {
        self.refinement = Some(value);
        self
    }

    pub fn plateau(mut self, value: PlateauEscalation) -> Self {
        self.plateau = Some(value);
        self
    }

    pub fn seeding(mut self, value: SeedingPlan) -> Self {
        self.seeding = Some(value);
        self
    }

    pub fn restart(mut self, value: RestartPolicy) -> Self {
        self.restart = Some(value);
        self
    }

    /// Sets how many generations without improvement trigger a restart.
    pub fn restart_after(mut self, generations: usize) -> Self {
        let restart = self.restart.take().unwrap_or_default();
        self.restart = Some(restart.with_after(generations));
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let (min_population, max_population) = self.population_bounds.unwrap_or((100, 5000));
        EvolutionOptions {
            generation_limit: self.generation_limit,
            log_level: self.log_level.unwrap_or(LogLevel::None),
            log_interval: self.log_interval.unwrap_or(100),
            initial_population: self.initial_population.unwrap_or(3000),
            min_population,
            max_population,
            mutation_rate: self.mutation_rate.unwrap_or(0.15),
            crossover_rate: self.crossover_rate.unwrap_or(0.85),
            survival_fraction: self.survival_fraction.unwrap_or(0.10),
            immigration_fraction: self.immigration_fraction.unwrap_or(0.15),
            parent_pool: self.parent_pool.unwrap_or_default(),
            parallel_threshold: self.parallel_threshold.unwrap_or(1000),
            cache_type: self.cache_type.unwrap_or(CacheType::Global),
            cache_capacity: self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            fitness_mode: self.fitness_mode.unwrap_or(FitnessMode::Count),
            seed: self.seed,
            selection: self.selection.unwrap_or_default(),
            crossover: self.crossover.unwrap_or_default(),
            mutation: self.mutation.unwrap_or_default(),
            breeding: self.breeding.unwrap_or_default(),
            controller: self.controller.unwrap_or_default(),
            stagnation: self.stagnation.unwrap_or_default(),
            diversity: self.diversity.unwrap_or_default(),
            refinement: self.refinement.unwrap_or_default(),
            plateau: self.plateau.unwrap_or_default(),
            seeding: self.seeding.unwrap_or_default(),
            restart: self.restart.unwrap_or_default(),
        }
    }
}
