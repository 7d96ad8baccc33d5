//! Trial ensembles and grid production.
//!
//! - [`GlvConfig`] / [`ConsumerResourceConfig`]: serde configurations with
//!   the reference defaults.
//! - [`GlvBuilder`] / [`ConsumerResourceBuilder`]: fluent builders with
//!   validation.
//! - [`TrialRunner`]: parallel trials with per-trial seeds.
//! - [`SimulationGrid`]: mean WMCN per (temperature, p), with CSV round trip.

pub mod builder;
pub mod engine;
pub mod grid;
pub mod parameters;

pub use builder::{ConsumerResourceBuilder, GlvBuilder};
pub use engine::{
    ConsumerResourceEnsemble, ConsumerResourceTrial, GlvEnsemble, GlvOutcome, GlvTrial,
    TrialFailure, TrialRunner, copy_number_class_abundance, run_consumer_resource,
    run_consumer_resource_trial, run_consumer_resource_with_progress, run_glv, run_glv_trial,
    run_glv_with_progress, simulated_wmcn, weighted_trait_mean,
};
pub use grid::{GridEntry, SimulationGrid};
pub use parameters::{ConsumerResourceConfig, GlvConfig, inclusive_range};
