//! Fitting the geometric copy-number parameter `p` to observed WMCN.

pub mod bootstrap;

pub use bootstrap::{
    BootstrapConfig, BootstrapFitter, FitResult, Observation, ReplicateFit, round_to_nearest,
};
