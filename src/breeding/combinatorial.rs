//! # Combinatorial Breeding Strategy
//!
//! The default breeding loop: select two parents, recombine them, mutate each child,
//! and near a solution apply directed mutation aimed at the constraints the child
//! still misses.

use std::fmt::Debug;

use crate::breeding::{
    BreedContext, BreedStrategy, CrossoverStrategy, DirectedMutation, MutationStrategy,
};
use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;
use crate::selection::{Selection, SelectionStrategy};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CombinatorialBreedConfig {
    /// Directed mutation is applied once the population's best fitness is within this
    /// distance of the maximum
    pub directed_within: f64,
    pub directed: DirectedMutation,
}

impl Default for CombinatorialBreedConfig {
    fn default() -> Self {
        Self {
            directed_within: 3.0,
            directed: DirectedMutation::default(),
        }
    }
}

impl CombinatorialBreedConfig {
    pub fn builder() -> CombinatorialBreedConfigBuilder {
        CombinatorialBreedConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct CombinatorialBreedConfigBuilder {
    directed_within: Option<f64>,
    directed: Option<DirectedMutation>,
}

impl CombinatorialBreedConfigBuilder {
    pub fn directed_within(mut self, value: f64) -> Self {
        self.directed_within = Some(value);
        self
    }

    pub fn directed(mut self, value: DirectedMutation) -> Self {
        self.directed = Some(value);
        self
    }

    pub fn build(self) -> CombinatorialBreedConfig {
        let default = CombinatorialBreedConfig::default();
        CombinatorialBreedConfig {
            directed_within: self.directed_within.unwrap_or(default.directed_within),
            directed: self.directed.unwrap_or(default.directed),
        }
    }
}

/// A breeding strategy for permutation chromosomes.
///
/// It combines:
/// - a [`Selection`] strategy for parents
/// - a [`CrossoverStrategy`] whose children are repaired
/// - a [`MutationStrategy`] applied to every child
/// - a [`DirectedMutation`] applied near a solution
#[derive(Debug, Clone)]
pub struct CombinatorialBreedStrategy {
    config: CombinatorialBreedConfig,
    selection: Selection,
    crossover: CrossoverStrategy,
    mutation: MutationStrategy,
}

impl CombinatorialBreedStrategy {
    pub fn new(
        config: CombinatorialBreedConfig,
        selection: Selection,
        crossover: CrossoverStrategy,
        mutation: MutationStrategy,
    ) -> Self {
        Self {
            config,
            selection,
            crossover,
            mutation,
        }
    }

    pub fn get_config(&self) -> &CombinatorialBreedConfig {
        &self.config
    }

    pub fn get_selection(&self) -> &Selection {
        &self.selection
    }

    fn finish_child(
        &self,
        child: Chromosome,
        context: &BreedContext<'_>,
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        let missing = context.constraints.missing_constraints(&child);
        let gap = context.challenge.gap(context.challenge.score(&child));

        let mutated = self.mutation.mutate(
            &child,
            context.mutation_rate,
            gap,
            &missing,
            context.constraints,
            rng,
        );

        if context.best_gap() <= self.config.directed_within {
            self.config
                .directed
                .mutate(&mutated, &missing, context.constraints, rng)
        } else {
            mutated
        }
    }
}

impl Default for CombinatorialBreedStrategy {
    fn default() -> Self {
        Self::new(
            CombinatorialBreedConfig::default(),
            Selection::default(),
            CrossoverStrategy::default(),
            MutationStrategy::default(),
        )
    }
}

impl BreedStrategy for CombinatorialBreedStrategy {
    fn breed(
        &self,
        parents: &[Chromosome],
        fitness: &[f64],
        quota: usize,
        context: &BreedContext<'_>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>> {
        if quota == 0 {
            return Ok(Vec::new());
        }
        if parents.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let best_gap = context.best_gap();
        let mut offspring = Vec::with_capacity(quota);

        while offspring.len() < quota {
            let first = self.selection.select(parents, fitness, rng)?;
            let second = self.selection.select(parents, fitness, rng)?;

            let (left, right) = self.crossover.crossover(
                &parents[first],
                &parents[second],
                context.crossover_rate,
                best_gap,
                context.domain,
                rng,
            )?;

            for child in [left, right] {
                if offspring.len() == quota {
                    break;
                }
                offspring.push(self.finish_child(child, context, rng));
            }
        }

        Ok(offspring)
    }
}
