//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use ribotherm_sim::prelude::*;
//!
//! let sampler = CopyNumberSampler::new(0.8, 10).unwrap();
//! assert_eq!(sampler.max_copy_number(), 10);
//! ```

pub use crate::dynamics::{
    Arrhenius, ConsumerResource, DormandPrince, IntegratorOptions, LotkaVolterra, OdeSystem,
};
pub use crate::errors::{FitError, GridError, IntegrationError, SamplingError, SimulationError};
pub use crate::fitting::{BootstrapConfig, BootstrapFitter, FitResult, Observation, round_to_nearest};
pub use crate::simulation::{
    ConsumerResourceBuilder, ConsumerResourceConfig, GlvBuilder, GlvConfig, SimulationGrid,
    TrialFailure, TrialRunner, run_consumer_resource, run_glv,
};
pub use crate::traits::{CompetitionMatrix, CopyNumberSampler, UptakeMatrix};
