use tracing::warn;

use crate::adaptive::{AlgorithmState, DiversityInjector};
use crate::breeding::DirectedMutation;
use crate::constraints::ConstraintSet;
use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::evolution::Challenge;
use crate::local_search::{HillClimbing, LocalSearch};
use crate::rng::RandomNumberGenerator;

/// Escalating effort for a population stuck just short of a solution.
///
/// While the best fitness sits within `within` of the maximum:
/// - after `directed_after` generations on that plateau, up to `directed_limit`
///   near-optimal elites get a forced directed mutation;
/// - after `climb_after` generations, up to `climb_limit` of them are hill-climbed with
///   `climb_iterations` iterations instead.
///
/// In both cases `variations` targeted variants of the best chromosome are added for
/// the first constraint it misses that declares a shape. In the climbing stage those
/// variants are hill-climbed too.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlateauEscalation {
    within: f64,
    directed_after: usize,
    directed_limit: usize,
    climb_after: usize,
    climb_limit: usize,
    climb_iterations: usize,
    variations: usize,
}

/// Everything an escalation step reads.
pub struct PlateauInput<'a> {
    pub population: &'a [Chromosome],
    pub fitness: &'a [f64],
    pub state: &'a AlgorithmState,
    pub challenge: &'a dyn Challenge,
    pub constraints: &'a ConstraintSet,
    pub directed: &'a DirectedMutation,
    pub injector: &'a DiversityInjector,
    pub parallel_threshold: usize,
}

impl PlateauEscalation {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if the climbing stage starts before the
    /// directed stage or `climb_iterations` is 0.
    pub fn new(
        within: f64,
        directed_after: usize,
        directed_limit: usize,
        climb_after: usize,
        climb_limit: usize,
        climb_iterations: usize,
    ) -> Result<Self> {
        let escalation = Self {
            within,
            directed_after,
            directed_limit,
            climb_after,
            climb_limit,
            climb_iterations,
            ..Self::default()
        };
        escalation.validate()?;
        Ok(escalation)
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.climb_after < self.directed_after {
            return Err(GeneticError::Configuration(format!(
                "Hill climbing stage ({}) must not start before the directed stage ({})",
                self.climb_after, self.directed_after
            )));
        }
        if self.climb_iterations == 0 {
            return Err(GeneticError::Configuration(
                "Maximum iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_variations(mut self, variations: usize) -> Self {
        self.variations = variations;
        self
    }

    pub fn get_within(&self) -> f64 {
        self.within
    }

    /// Returns the extra chromosomes to add to the next generation. Empty unless the
    /// best fitness has stayed on a near-optimal plateau long enough.
    ///
    /// `population` must be sorted by descending fitness.
    pub fn escalate(
        &self,
        input: &PlateauInput<'_>,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<Chromosome> {
        let (Some(best), Some(&best_fitness)) = (input.population.first(), input.fitness.first())
        else {
            return Vec::new();
        };
        let gap = input.challenge.gap(best_fitness);
        if gap <= 0.0 || gap > self.within {
            return Vec::new();
        }

        let plateau = input.state.plateau_generations(gap);
        if plateau <= self.directed_after {
            return Vec::new();
        }

        let elites: Vec<&Chromosome> = input
            .population
            .iter()
            .zip(input.fitness)
            .take_while(|(_, f)| input.challenge.gap(**f) <= self.within)
            .map(|(c, _)| c)
            .collect();

        let climber = (plateau > self.climb_after).then(|| {
            HillClimbing::clamped(self.climb_iterations)
                .with_parallel_threshold(input.parallel_threshold)
        });

        let mut extras = Vec::new();
        if let Some(climber) = &climber {
            warn!(
                plateau,
                elites = elites.len().min(self.climb_limit),
                "Plateau persists, hill climbing near-optimal elites"
            );
            extras.extend(
                elites
                    .iter()
                    .take(self.climb_limit)
                    .map(|c| climber.search(c, input.challenge)),
            );
        } else {
            warn!(
                plateau,
                elites = elites.len().min(self.directed_limit),
                "Plateau persists, directing mutation at near-optimal elites"
            );
            for elite in elites.iter().take(self.directed_limit) {
                let missing = input.constraints.missing_constraints(elite);
                extras.push(input.directed.force(elite, &missing, input.constraints, rng));
            }
        }

        if let Some(index) = input.constraints.first_missing_shaped(best) {
            let variations = input.injector.force_targeted_variations(
                best,
                index,
                self.variations,
                input.constraints,
                rng,
            );
            match &climber {
                Some(climber) => extras.extend(
                    variations
                        .iter()
                        .map(|c| climber.search(c, input.challenge)),
                ),
                None => extras.extend(variations),
            }
        }

        extras
    }
}

impl Default for PlateauEscalation {
    fn default() -> Self {
        Self {
            within: 1.0,
            directed_after: 20,
            directed_limit: 50,
            climb_after: 50,
            climb_limit: 30,
            climb_iterations: 30,
            variations: 20,
        }
    }
}
