//! Per-species trait sampling.
//!
//! Every trial draws its traits fresh from its own RNG:
//! - rRNA copy numbers from a truncated geometric distribution,
//! - competition coefficients from a normal distribution,
//! - consumer-model uptake rates from a uniform distribution.

pub mod copy_number;
pub mod interactions;

pub use copy_number::{CopyNumberSampler, geometric_weights};
pub use interactions::{
    CompetitionMatrix, UptakeMatrix, sample_competition_matrix, sample_uptake_rates,
};
