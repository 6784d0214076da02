//! # Local Search Algorithms
//!
//! This module provides local search algorithms for refining solutions in genetic algorithms.
//! Local search improves a chromosome by exploring its neighbourhood and moving to better
//! neighbours; the genetic loop uses it to polish near-optimal elites.

use std::fmt::Debug;

use crate::domain::Chromosome;
use crate::evolution::Challenge;

pub mod hill_climbing;
pub mod manager;

/// A trait for local search algorithms.
pub trait LocalSearch: Debug + Send + Sync {
    /// Returns the best chromosome found from `chromosome`. The input itself is
    /// returned (as a copy) when no neighbour improves on it.
    fn search(&self, chromosome: &Chromosome, challenge: &dyn Challenge) -> Chromosome;
}

pub use hill_climbing::HillClimbing;
pub use manager::EliteRefiner;
