use rayon::prelude::*;

use crate::domain::Chromosome;
use crate::error::{GeneticError, Result};
use crate::evolution::Challenge;

use super::LocalSearch;

/// Best-improvement hill climbing over single-category swaps.
///
/// Each iteration scores every neighbour reachable by swapping one category between
/// two slots (`categories × N(N-1)/2` neighbours) and moves to the best one if it beats
/// the current score. Ties go to the neighbour enumerated first: categories in order,
/// then slot pairs `(a, b)` with `a < b` in lexicographic order. The climb stops at a
/// local optimum, at the maximum score, or after `max_iterations` moves.
///
/// Neighbour scoring runs on rayon once the neighbourhood has at least
/// `parallel_threshold` members. Scores are collected in enumeration order, so the
/// result is the same either way.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HillClimbing {
    max_iterations: usize,
    parallel_threshold: usize,
}

impl HillClimbing {
    /// Creates a new hill climbing algorithm with the given maximum number of iterations.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iterations` is 0.
    pub fn new(max_iterations: usize) -> Result<Self> {
        if max_iterations == 0 {
            return Err(GeneticError::Configuration(
                "Maximum iterations must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            parallel_threshold: 1000,
        })
    }

    /// Like [`HillClimbing::new`], raising a zero budget to one iteration.
    pub(crate) fn clamped(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            parallel_threshold: 1000,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Every `(category, a, b)` swap, in enumeration order.
    pub fn neighbourhood(chromosome: &Chromosome) -> Vec<(usize, usize, usize)> {
        let slots = chromosome.num_slots();
        let mut moves = Vec::with_capacity(chromosome.num_categories() * slots * slots / 2);
        for category in 0..chromosome.num_categories() {
            for a in 0..slots {
                for b in (a + 1)..slots {
                    moves.push((category, a, b));
                }
            }
        }
        moves
    }

    fn score_moves(
        &self,
        chromosome: &Chromosome,
        moves: &[(usize, usize, usize)],
        challenge: &dyn Challenge,
    ) -> Vec<f64> {
        let score = |&(category, a, b): &(usize, usize, usize)| {
            challenge.score(&chromosome.swapped(category, a, b))
        };
        if moves.len() >= self.parallel_threshold {
            moves.par_iter().map(score).collect()
        } else {
            moves.iter().map(score).collect()
        }
    }
}

impl LocalSearch for HillClimbing {
    fn search(&self, chromosome: &Chromosome, challenge: &dyn Challenge) -> Chromosome {
        let max_score = challenge.max_score();
        let moves = Self::neighbourhood(chromosome);
        let mut current = chromosome.clone();
        let mut current_score = challenge.score(&current);

        for _ in 0..self.max_iterations {
            if current_score >= max_score {
                break;
            }

            let scores = self.score_moves(&current, &moves, challenge);

            let mut best: Option<(usize, f64)> = None;
            for (index, &score) in scores.iter().enumerate() {
                if score > best.map_or(current_score, |(_, s)| s) {
                    best = Some((index, score));
                }
            }

            match best {
                Some((index, score)) => {
                    let (category, a, b) = moves[index];
                    current.swap_in_place(category, a, b);
                    current_score = score;
                }
                None => break,
            }
        }

        current
    }
}
