//! # Simulation Crate
//!
//! The `sim` crate provides the theoretical side of the rRNA copy-number
//! study: sampling community traits, integrating Lotka-Volterra and
//! consumer-resource dynamics across temperatures, building the simulated
//! WMCN grid, and fitting the copy-number distribution parameter `p` to
//! field observations by bootstrap.

pub mod dynamics;
pub mod errors;
pub mod fitting;
pub mod prelude;
pub mod simulation;
pub mod traits;

pub use fitting::{BootstrapFitter, FitResult, Observation};
pub use simulation::SimulationGrid;
