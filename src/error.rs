//! # Error Types
//!
//! This module defines the error type shared by every part of the solver.
//! Only configuration problems are expected to fail: selection, crossover and
//! mutation are total over well-formed chromosomes, and stagnation is a state
//! handled by the engine rather than an error.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use zebra_ga::domain::{AttributeCategory, Domain};
//! use zebra_ga::error::{GeneticError, Result};
//!
//! fn build() -> Result<Domain> {
//!     Domain::new(vec![
//!         AttributeCategory::new("color", ["red", "green"]),
//!         AttributeCategory::new("pet", ["cat", "dog"]),
//!     ])
//! }
//!
//! assert!(build().is_ok());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use zebra_ga::error::{GeneticError, OptionExt};
//!
//! fn best_score(scores: &[usize]) -> zebra_ga::error::Result<usize> {
//!     scores.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//!
//! assert!(best_score(&[]).is_err());
//! ```

use thiserror::Error;

/// Represents errors that can occur while configuring or running the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticError {
    /// A malformed domain, constraint set or set of options. Raised before any
    /// generation runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A chromosome or category does not fit the shape of the domain.
    #[error("Domain error: {0}")]
    Domain(String),

    /// A repair pass ran out of replacement values for a category.
    #[error("Repair exhausted: {0}")]
    RepairExhaustion(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,
}

/// A specialized Result type for solver operations.
///
/// This type is a convenience wrapper around `std::result::Result` with the error type
/// fixed to `GeneticError`.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an Option to a Result using a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
