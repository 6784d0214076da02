pub mod adaptive;
pub mod breeding;
pub mod caching;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod evolution;
pub mod instances;
pub mod local_search;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use constraints::{Constraint, ConstraintSet};
pub use domain::{AttributeCategory, AttributeRef, Chromosome, Domain};
pub use error::{GeneticError, OptionExt, Result};
pub use evolution::{EvolutionLauncher, EvolutionOptions, EvolutionResult, Termination};
