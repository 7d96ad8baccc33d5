//! Geometric copy-number distribution.
//!
//! Copy numbers take values `1..=max_copy_number` with weights proportional to
//! `p * (1 - p)^n`. The parameter `p` is the quantity fitted against field
//! data: larger `p` puts more of the starting community at low copy number.

use crate::errors::SamplingError;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

/// Default upper bound of the copy-number range.
pub const DEFAULT_MAX_COPY_NUMBER: usize = 10;

/// Normalized geometric weights for copy numbers `1..=max_copy_number`.
///
/// Element `i` of the result is the probability of copy number `i + 1`.
///
/// # Errors
/// Returns an error if `p` is not in the open interval (0, 1) or if
/// `max_copy_number` is zero.
pub fn geometric_weights(p: f64, max_copy_number: usize) -> Result<Vec<f64>, SamplingError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(SamplingError::InvalidGeometricParameter(p));
    }
    if max_copy_number == 0 {
        return Err(SamplingError::InvalidMaxCopyNumber(max_copy_number));
    }

    let raw: Vec<f64> = (1..=max_copy_number)
        .map(|n| p * (1.0 - p).powi(n as i32))
        .collect();
    let total: f64 = raw.iter().sum();
    Ok(raw.into_iter().map(|w| w / total).collect())
}

/// Draws copy-number labels from the truncated geometric distribution.
#[derive(Debug, Clone)]
pub struct CopyNumberSampler {
    p: f64,
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl CopyNumberSampler {
    /// Create a sampler for `1..=max_copy_number` with geometric parameter `p`.
    pub fn new(p: f64, max_copy_number: usize) -> Result<Self, SamplingError> {
        let weights = geometric_weights(p, max_copy_number)?;
        // Weights are finite and positive for p in (0, 1)
        let index = WeightedIndex::new(&weights)
            .map_err(|_| SamplingError::InvalidGeometricParameter(p))?;
        Ok(Self { p, weights, index })
    }

    /// Geometric parameter.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Largest copy number this sampler can return.
    pub fn max_copy_number(&self) -> usize {
        self.weights.len()
    }

    /// Normalized weights, indexed by `copy_number - 1`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Draw one copy number.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.index.sample(rng) as u32 + 1
    }

    /// Draw copy numbers for `n` species independently.
    pub fn sample_community<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<u32> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}
