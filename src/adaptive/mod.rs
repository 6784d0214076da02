//! # Adaptive Control
//!
//! Per-run state and the components that observe each generation and steer the next
//! one: the [`ParameterController`] sets operator rates and the population cap, the
//! [`StagnationDetector`] notices a collapsed population, the [`DiversityInjector`]
//! rebuilds it, and [`PlateauEscalation`] pushes harder when the best fitness sits just
//! short of a solution.

pub mod controller;
pub mod diversity;
pub mod plateau;
pub mod stagnation;
pub mod state;

pub use controller::{ControllerTier, ParameterController};
pub use diversity::DiversityInjector;
pub use plateau::{PlateauEscalation, PlateauInput};
pub use stagnation::{distinct_count, diversity_percent, StagnationDetector};
pub use state::AlgorithmState;
