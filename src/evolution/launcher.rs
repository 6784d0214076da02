//! # EvolutionLauncher
//!
//! Runs the generational loop. A run moves through the phases
//! `Initialize -> Evaluate -> CheckTerminal -> Adapt -> Reproduce -> Replace` and back
//! to `Evaluate` until the population holds a solution, the generation limit is
//! reached, or the run is cancelled.
//!
//! [`EvolutionLauncher::run`] drives a whole run; [`EvolutionLauncher::start`] returns
//! an [`EvolutionRun`] that is advanced one generation at a time with
//! [`EvolutionRun::step`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{
    challenge::Challenge,
    options::{EvolutionOptions, FitnessMode, LogLevel},
};
use crate::{
    adaptive::{distinct_count, AlgorithmState, ParameterController, PlateauInput},
    breeding::{BreedContext, BreedStrategy, CombinatorialBreedStrategy},
    caching::ScoringCache,
    constraints::{ConstraintSet, WeightedFitness},
    domain::{Chromosome, Domain},
    error::{GeneticError, OptionExt, Result},
    evolution::builder::EvolutionLauncherBuilder,
    rng::RandomNumberGenerator,
};

/// Why a run stopped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The best chromosome satisfies every constraint.
    Solved,
    /// The generation limit was reached first.
    Exhausted,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Where a run is in its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialize,
    Evaluate,
    CheckTerminal,
    Adapt,
    Reproduce,
    Replace,
    Terminated(Termination),
}

/// The outcome of a run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    /// The best chromosome seen over the whole run.
    pub best: Chromosome,
    /// Its fitness under the run's fitness mode.
    pub fitness: f64,
    /// The fitness of a solution under the run's fitness mode.
    pub max_score: f64,
    /// How many constraints it satisfies.
    pub satisfied: usize,
    /// Generations evaluated.
    pub generations: usize,
    pub termination: Termination,
    /// Best fitness of each generation.
    pub fitness_history: Vec<f64>,
    /// Share of distinct chromosomes in each generation, as a percentage.
    pub diversity_history: Vec<f64>,
}

impl EvolutionResult {
    pub fn is_solved(&self) -> bool {
        self.termination == Termination::Solved
    }
}

/// Solves a constraint set over a domain with an adaptive genetic algorithm.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher {
    domain: Domain,
    constraints: ConstraintSet,
    options: EvolutionOptions,
}

impl EvolutionLauncher {
    /// Creates a new `EvolutionLauncher`.
    ///
    /// # Arguments
    ///
    /// * `domain` - The categories and values to assign.
    /// * `constraints` - The rules a solution must satisfy, built against `domain`.
    /// * `options` - Evolution options controlling the evolution process.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if the options fail validation.
    pub fn new(
        domain: Domain,
        constraints: ConstraintSet,
        options: EvolutionOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            domain,
            constraints,
            options,
        })
    }

    /// Returns a builder for creating an `EvolutionLauncher`.
    pub fn builder() -> EvolutionLauncherBuilder {
        EvolutionLauncherBuilder::new()
    }

    pub fn get_domain(&self) -> &Domain {
        &self.domain
    }

    pub fn get_constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn get_options(&self) -> &EvolutionOptions {
        &self.options
    }

    /// Runs until the population holds a solution or the generation limit is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if a chromosome cannot be built or repaired, which only happens
    /// when the constraints do not match the domain.
    ///
    /// # Performance
    ///
    /// Fitness is evaluated in parallel once the population reaches the configured
    /// parallel threshold.
    pub fn run(&self) -> Result<EvolutionResult> {
        self.run_with_cancel(None)
    }

    /// Like [`run`](Self::run), but also stops with [`Termination::Cancelled`] once
    /// `cancel` is set. The flag is checked at the start of every generation.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_with_cancel(&self, cancel: Option<Arc<AtomicBool>>) -> Result<EvolutionResult> {
        let mut run = self.start_with_cancel(cancel);
        while run.step()?.is_none() {}
        run.result()
    }

    /// Prepares a run without evaluating anything.
    pub fn start(&self) -> EvolutionRun<'_> {
        self.start_with_cancel(None)
    }

    /// Prepares a run that stops once `cancel` is set.
    pub fn start_with_cancel(&self, cancel: Option<Arc<AtomicBool>>) -> EvolutionRun<'_> {
        let options = &self.options;

        let base: Arc<dyn Challenge> = match options.get_fitness_mode() {
            FitnessMode::Count => Arc::new(self.constraints.clone()),
            FitnessMode::Weighted => Arc::new(WeightedFitness::new(self.constraints.clone())),
        };
        let max_score = base.max_score();
        let challenge =
            ScoringCache::new(base, options.get_cache_type(), options.get_cache_capacity());

        let breeder = CombinatorialBreedStrategy::new(
            options.get_breeding().clone(),
            options.get_selection().clone().for_max_score(max_score),
            options.get_crossover().clone(),
            options.get_mutation().clone(),
        );
        let controller = options
            .get_controller()
            .clone()
            .with_population_bounds(options.get_min_population(), options.get_max_population());

        let state = AlgorithmState::new(
            options.get_initial_population(),
            options.get_mutation_rate(),
            options.get_crossover_rate(),
        );

        info!(
            categories = self.domain.num_categories(),
            slots = self.domain.num_slots(),
            constraints = self.constraints.len(),
            population = options.get_initial_population(),
            max_score,
            "Starting evolution"
        );

        EvolutionRun {
            launcher: self,
            challenge,
            breeder,
            controller,
            rng: RandomNumberGenerator::from_optional_seed(options.get_seed()),
            state,
            population: Vec::new(),
            fitness: Vec::new(),
            phase: Phase::Initialize,
            cancel,
        }
    }
}

/// A run in progress. Advance it with [`step`](Self::step).
pub struct EvolutionRun<'a> {
    launcher: &'a EvolutionLauncher,
    challenge: ScoringCache<Arc<dyn Challenge>>,
    breeder: CombinatorialBreedStrategy,
    controller: ParameterController,
    rng: RandomNumberGenerator,
    state: AlgorithmState,
    population: Vec<Chromosome>,
    /// Parallel to `population` after evaluation, descending.
    fitness: Vec<f64>,
    phase: Phase,
    cancel: Option<Arc<AtomicBool>>,
}

impl EvolutionRun<'_> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &AlgorithmState {
        &self.state
    }

    /// The current population. Sorted by descending fitness between `Evaluate` and
    /// `Replace`.
    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// Fitness of the last evaluated population, descending.
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            Phase::Terminated(termination) => Some(termination),
            _ => None,
        }
    }

    /// Runs one generation.
    ///
    /// # Returns
    ///
    /// `Some` with the reason once the run has stopped, `None` otherwise. Further calls
    /// after a stop return the same reason without doing any work.
    ///
    /// # Errors
    ///
    /// Returns an error if a chromosome cannot be built, repaired or bred.
    pub fn step(&mut self) -> Result<Option<Termination>> {
        if let Some(termination) = self.termination() {
            return Ok(Some(termination));
        }

        if self.phase == Phase::Initialize {
            self.population = self.fresh(self.state.population_size)?;
            self.phase = Phase::Evaluate;
        }

        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Ok(Some(self.stop(Termination::Cancelled)));
        }
        if self
            .launcher
            .options
            .get_generation_limit()
            .is_some_and(|limit| self.state.generation >= limit)
        {
            return Ok(Some(self.stop(Termination::Exhausted)));
        }
        self.state.generation += 1;

        self.phase = Phase::Evaluate;
        self.evaluate()?;
        let best_fitness = self.fitness[0];
        let gap = self.challenge.gap(best_fitness);
        let diversity = distinct_count(&self.population);
        let diversity_percent = 100.0 * diversity as f64 / self.population.len() as f64;
        let improved = self.state.record(
            &self.population[0],
            best_fitness,
            gap,
            diversity_percent,
        );
        self.log_generation(best_fitness, diversity_percent, improved);

        self.phase = Phase::CheckTerminal;
        if gap <= 0.0 {
            return Ok(Some(self.stop(Termination::Solved)));
        }

        self.phase = Phase::Adapt;
        self.controller.adapt(
            best_fitness,
            diversity,
            self.challenge.max_score(),
            &mut self.state,
        );

        let launcher = self.launcher;
        let options = &launcher.options;
        let restart = options.get_restart();
        if restart.is_due(self.state.generations_without_improvement) {
            let size = self.state.population_size;
            let keep = restart.survivors(size, gap);
            warn!(
                generation = self.state.generation,
                kept = keep,
                "No improvement for {} generations, restarting",
                self.state.generations_without_improvement
            );
            self.population.truncate(keep);
            let fresh = self.fresh(size.saturating_sub(keep))?;
            self.population.extend(fresh);
            self.state.generations_without_improvement = 0;
            self.phase = Phase::Evaluate;
            return Ok(None);
        }

        let stagnation = options.get_stagnation();
        if stagnation.is_due(self.state.generation)
            && stagnation.is_stagnant_at_top(&self.population, &self.fitness)
        {
            warn!(
                generation = self.state.generation,
                distinct = diversity,
                "Population stagnant, injecting diversity"
            );
            let injector = options.get_diversity();
            let best = self.population[0].clone();
            let mut exploded = injector.diversity_explosion(
                &best,
                self.state.population_size,
                &launcher.domain,
                &mut self.rng,
            )?;
            if let Some(index) = launcher.constraints.first_missing_shaped(&best) {
                exploded.extend(injector.force_targeted_variations(
                    &best,
                    index,
                    injector.get_stagnation_variations(),
                    &launcher.constraints,
                    &mut self.rng,
                ));
            }
            self.population = exploded;
            self.phase = Phase::Evaluate;
            return Ok(None);
        }

        self.phase = Phase::Reproduce;
        let next = self.reproduce(best_fitness, gap)?;

        self.phase = Phase::Replace;
        self.population = next;
        self.phase = Phase::Evaluate;
        Ok(None)
    }

    /// Builds the result from the best chromosome seen so far. A run that has not
    /// stopped yet reports [`Termination::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::EmptyPopulation`] if no generation has been evaluated.
    pub fn result(&self) -> Result<EvolutionResult> {
        let best = self
            .state
            .best
            .clone()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        let satisfied = self.launcher.constraints.fitness(&best);
        Ok(EvolutionResult {
            fitness: self.state.best_fitness,
            max_score: self.challenge.max_score(),
            satisfied,
            best,
            generations: self.state.generation,
            termination: self.termination().unwrap_or(Termination::Cancelled),
            fitness_history: self.state.fitness_history.clone(),
            diversity_history: self.state.diversity_history.clone(),
        })
    }

    fn stop(&mut self, termination: Termination) -> Termination {
        self.phase = Phase::Terminated(termination);
        info!(
            ?termination,
            generations = self.state.generation,
            best_fitness = self.state.best_fitness,
            "Evolution finished"
        );
        termination
    }

    fn fresh(&mut self, size: usize) -> Result<Vec<Chromosome>> {
        self.launcher.options.get_seeding().populate(
            size,
            &self.launcher.domain,
            &self.launcher.constraints,
            &mut self.rng,
        )
    }

    /// Scores the population and sorts it by descending fitness. The sort is stable,
    /// so equal scores keep their order.
    fn evaluate(&mut self) -> Result<()> {
        if self.population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let challenge = &self.challenge;
        let sanitize = |score: f64| {
            if score.is_nan() {
                f64::NEG_INFINITY
            } else {
                score
            }
        };
        let scores: Vec<f64> =
            if self.population.len() >= self.launcher.options.get_parallel_threshold() {
                self.population
                    .par_iter()
                    .map(|c| sanitize(challenge.score(c)))
                    .collect()
            } else {
                self.population
                    .iter()
                    .map(|c| sanitize(challenge.score(c)))
                    .collect()
            };

        let mut scored: Vec<(Chromosome, f64)> =
            std::mem::take(&mut self.population).into_iter().zip(scores).collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (population, fitness): (Vec<Chromosome>, Vec<f64>) = scored.into_iter().unzip();
        self.population = population;
        self.fitness = fitness;
        Ok(())
    }

    /// Builds the next generation from the sorted current one: the survivors (refined
    /// when close to a solution), any plateau extras, offspring and immigrants. The
    /// result never exceeds the population-size cap.
    fn reproduce(&mut self, best_fitness: f64, gap: f64) -> Result<Vec<Chromosome>> {
        let launcher = self.launcher;
        let options = &launcher.options;
        let cap = self.state.population_size;
        let len = self.population.len();

        let survivors_quota = ((cap as f64 * options.get_survival_fraction()).floor() as usize)
            .max(1)
            .min(len);
        let immigrants_quota = (cap as f64 * options.get_immigration_fraction()).floor() as usize;

        let mut survivors = self.population[..survivors_quota].to_vec();
        let refinement = options.get_refinement();
        if gap <= refinement.get_within() {
            let improved = refinement.refine(
                &mut survivors,
                &self.fitness[..survivors_quota],
                &self.challenge,
            )?;
            if improved > 0 {
                debug!(improved, "Elite refinement improved survivors");
            }
        }

        let extras = options.get_plateau().escalate(
            &PlateauInput {
                population: &self.population,
                fitness: &self.fitness,
                state: &self.state,
                challenge: &self.challenge,
                constraints: &launcher.constraints,
                directed: &options.get_breeding().directed,
                injector: options.get_diversity(),
                parallel_threshold: options.get_parallel_threshold(),
            },
            &mut self.rng,
        );

        let offspring_quota = cap.saturating_sub(survivors_quota + immigrants_quota + extras.len());
        let pool = options.get_parent_pool().size_for(gap).min(len);
        let context = BreedContext {
            domain: &launcher.domain,
            constraints: &launcher.constraints,
            challenge: &self.challenge,
            mutation_rate: self.state.mutation_rate,
            crossover_rate: self.state.crossover_rate,
            best_fitness,
        };
        let offspring = self.breeder.breed(
            &self.population[..pool],
            &self.fitness[..pool],
            offspring_quota,
            &context,
            &mut self.rng,
        )?;

        let immigrants = options.get_seeding().populate(
            immigrants_quota,
            &launcher.domain,
            &launcher.constraints,
            &mut self.rng,
        )?;

        let mut next = survivors;
        next.extend(extras);
        next.extend(offspring);
        next.extend(immigrants);
        next.truncate(cap);
        Ok(next)
    }

    fn log_generation(&self, best_fitness: f64, diversity_percent: f64, improved: bool) {
        let options = &self.launcher.options;
        let generation = self.state.generation;
        match options.get_log_level() {
            LogLevel::Verbose => debug!(
                generation,
                best_fitness,
                improved,
                diversity = diversity_percent,
                population = self.population.len(),
                mutation_rate = self.state.mutation_rate,
                crossover_rate = self.state.crossover_rate,
                "Generation evaluated"
            ),
            LogLevel::Minimal if generation % options.get_log_interval() == 0 => debug!(
                generation,
                best_fitness,
                diversity = diversity_percent,
                "Generation evaluated"
            ),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::{DiversityInjector, StagnationDetector};
    use crate::constraints::{FixedSlot, NextTo, SameSlot};
    use crate::domain::{AttributeCategory, AttributeRef};

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("color", ["red", "green", "blue"]),
            AttributeCategory::new("pet", ["cat", "dog", "fish"]),
        ])
        .unwrap()
    }

    fn constraints(domain: &Domain) -> ConstraintSet {
        ConstraintSet::builder()
            .with_constraint(FixedSlot::new("red first", AttributeRef::new(0, 0), 0))
            .with_constraint(SameSlot::new(
                "green dog",
                AttributeRef::new(0, 1),
                AttributeRef::new(1, 1),
            ))
            .with_constraint(NextTo::new(
                "cat next to red",
                AttributeRef::new(1, 0),
                AttributeRef::new(0, 0),
            ))
            .build(domain)
            .unwrap()
    }

    fn options() -> EvolutionOptions {
        EvolutionOptions::builder()
            .initial_population(60)
            .population_bounds(20, 200)
            .generation_limit(200)
            .seed(11)
            .build()
    }

    #[test]
    fn test_run_solves_small_instance() {
        let domain = domain();
        let constraints = constraints(&domain);
        let launcher = EvolutionLauncher::new(domain, constraints.clone(), options()).unwrap();

        let result = launcher.run().unwrap();
        assert_eq!(result.termination, Termination::Solved);
        assert!(constraints.is_solution(&result.best));
        assert_eq!(result.satisfied, 3);
        assert_eq!(result.fitness, result.max_score);
        assert_eq!(result.fitness_history.len(), result.generations);
        assert_eq!(result.diversity_history.len(), result.generations);
    }

    #[test]
    fn test_step_moves_through_phases() {
        let domain = domain();
        let constraints = constraints(&domain);
        let launcher = EvolutionLauncher::new(domain, constraints, options()).unwrap();
        let mut run = launcher.start();

        assert_eq!(run.phase(), Phase::Initialize);
        assert!(run.result().is_err());

        let outcome = run.step().unwrap();
        assert_eq!(run.state().generation, 1);
        match outcome {
            Some(termination) => assert_eq!(run.phase(), Phase::Terminated(termination)),
            None => assert_eq!(run.phase(), Phase::Evaluate),
        }
        assert!(run.result().is_ok());
    }

    #[test]
    fn test_fitness_is_sorted_after_evaluation() {
        let domain = domain();
        let constraints = ConstraintSet::builder()
            .with_constraint(FixedSlot::new("red first", AttributeRef::new(0, 0), 0))
            .with_constraint(FixedSlot::new("green first", AttributeRef::new(0, 1), 0))
            .build(&domain)
            .unwrap();
        let launcher = EvolutionLauncher::new(domain, constraints, options()).unwrap();
        let mut run = launcher.start();

        run.step().unwrap();
        let fitness = run.fitness();
        assert_eq!(fitness.len(), 60);
        assert!(fitness.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_generation_limit_exhausts_unsolvable_run() {
        let domain = domain();
        // Red cannot be both first and last.
        let constraints = ConstraintSet::builder()
            .with_constraint(FixedSlot::new("red first", AttributeRef::new(0, 0), 0))
            .with_constraint(FixedSlot::new("red last", AttributeRef::new(0, 0), 2))
            .build(&domain)
            .unwrap();
        let options = EvolutionOptions::builder()
            .initial_population(30)
            .population_bounds(20, 60)
            .generation_limit(15)
            .seed(5)
            .build();
        let launcher = EvolutionLauncher::new(domain, constraints, options).unwrap();

        let result = launcher.run().unwrap();
        assert_eq!(result.termination, Termination::Exhausted);
        assert_eq!(result.generations, 15);
        assert_eq!(result.fitness, 1.0);
    }

    #[test]
    fn test_cancelled_before_first_generation() {
        let domain = domain();
        let constraints = constraints(&domain);
        let launcher = EvolutionLauncher::new(domain, constraints, options()).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));

        let mut run = launcher.start_with_cancel(Some(cancel));
        assert_eq!(run.step().unwrap(), Some(Termination::Cancelled));
        assert_eq!(run.step().unwrap(), Some(Termination::Cancelled));
        assert_eq!(run.state().generation, 0);
        assert!(matches!(run.result(), Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_stagnant_top_is_rebuilt_with_targeted_variants() {
        let domain = domain();
        let constraints = ConstraintSet::builder()
            .with_constraint(FixedSlot::new("red first", AttributeRef::new(0, 0), 0))
            .with_constraint(FixedSlot::new("red last", AttributeRef::new(0, 0), 2))
            .build(&domain)
            .unwrap();
        // any best share and any duplicate in the top count as stagnant
        let options = EvolutionOptions::builder()
            .initial_population(30)
            .population_bounds(20, 60)
            .generation_limit(10)
            .stagnation(StagnationDetector::new(0.0, 1.0).unwrap().with_interval(1))
            .diversity(DiversityInjector::default().with_stagnation_variations(5))
            .seed(8)
            .build();
        let launcher = EvolutionLauncher::new(domain, constraints.clone(), options).unwrap();
        let mut run = launcher.start();

        assert_eq!(run.step().unwrap(), None);
        let best = run.state().best.clone().unwrap();
        let missing = constraints.first_missing_shaped(&best).unwrap();

        let population = run.population();
        assert_eq!(population.len(), run.state().population_size + 5);
        assert_eq!(population[0], best);
        assert!(population[population.len() - 5..]
            .iter()
            .all(|c| constraints.constraint(missing).unwrap().is_satisfied(c)));
    }

    #[test]
    fn test_zero_generation_limit_rejected() {
        let domain = domain();
        let constraints = constraints(&domain);
        let options = EvolutionOptions::builder().generation_limit(0).build();
        assert!(matches!(
            EvolutionLauncher::new(domain, constraints, options),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let domain = domain();
        let constraints = constraints(&domain);
        let options = EvolutionOptions::builder().mutation_rate(2.0).build();
        assert!(matches!(
            EvolutionLauncher::new(domain, constraints, options),
            Err(GeneticError::Configuration(_))
        ));
    }
}
