//! The generational loop and its configuration.

pub mod builder;
pub mod challenge;
pub mod launcher;
pub mod options;
pub mod population;

pub use builder::EvolutionLauncherBuilder;
pub use challenge::Challenge;
pub use launcher::{EvolutionLauncher, EvolutionResult, EvolutionRun, Phase, Termination};
pub use options::{CacheType, EvolutionOptions, EvolutionOptionsBuilder, FitnessMode, LogLevel};
pub use population::{seeded_chromosome, RestartPolicy, SeedingPlan};
