use std::sync::Arc;

use crate::domain::Chromosome;

/// Scores chromosomes. Higher is better; `max_score` is the score of a solution.
pub trait Challenge: Send + Sync {
    fn score(&self, chromosome: &Chromosome) -> f64;

    fn max_score(&self) -> f64;

    /// Distance from `score` to the best possible score.
    fn gap(&self, score: f64) -> f64 {
        self.max_score() - score
    }
}

impl<C: Challenge + ?Sized> Challenge for &C {
    fn score(&self, chromosome: &Chromosome) -> f64 {
        (**self).score(chromosome)
    }

    fn max_score(&self) -> f64 {
        (**self).max_score()
    }
}

impl<C: Challenge + ?Sized> Challenge for Arc<C> {
    fn score(&self, chromosome: &Chromosome) -> f64 {
        (**self).score(chromosome)
    }

    fn max_score(&self) -> f64 {
        (**self).max_score()
    }
}
