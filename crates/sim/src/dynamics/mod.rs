//! Population dynamics: ODE right-hand sides and their integrator.
//!
//! - [`LotkaVolterra`]: generalized Lotka-Volterra competition
//! - [`ConsumerResource`]: linear multi-resource consumer model
//! - [`DormandPrince`]: adaptive RK45 used for both
//! - [`Arrhenius`]: temperature scaling of growth and uptake rates

pub mod arrhenius;
pub mod consumer_resource;
pub mod integrator;
pub mod lotka_volterra;

pub use arrhenius::{Arrhenius, KELVIN_OFFSET, celsius_to_kelvin, kelvin_to_celsius};
pub use consumer_resource::ConsumerResource;
pub use integrator::{DormandPrince, IntegratorOptions, OdeSystem, Solution};
pub use lotka_volterra::LotkaVolterra;
