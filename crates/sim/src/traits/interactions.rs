//! Interaction traits: GLV competition coefficients and consumer-model
//! uptake rates.

use crate::errors::SamplingError;
use nalgebra::DMatrix;
use rand::Rng;
use rand::distr::{Distribution, Uniform};
use rand_distr::Normal;

/// Default uptake-rate range for the consumer-resource model.
pub const DEFAULT_UPTAKE_RANGE: (f64, f64) = (0.5e5, 3e5);

/// Square matrix of pairwise competition coefficients `alpha[k, j]`.
///
/// The diagonal is always exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionMatrix(DMatrix<f64>);

impl CompetitionMatrix {
    /// Build from an explicit matrix, forcing the diagonal to 1.
    ///
    /// # Panics
    /// Panics if `matrix` is not square.
    pub fn from_matrix(mut matrix: DMatrix<f64>) -> Self {
        assert!(
            matrix.is_square(),
            "competition matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        );
        matrix.fill_diagonal(1.0);
        Self(matrix)
    }

    /// No cross-competition: the identity matrix.
    pub fn identity(n: usize) -> Self {
        Self(DMatrix::identity(n, n))
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    /// Whether the matrix has no species.
    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    /// Coefficient of species `j` acting on species `k`.
    #[inline]
    pub fn get(&self, k: usize, j: usize) -> f64 {
        self.0[(k, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }
}

/// Draw an `n x n` competition matrix with i.i.d. `Normal(mean, sd)`
/// off-diagonal entries. The diagonal is set to 1 after sampling.
pub fn sample_competition_matrix<R: Rng + ?Sized>(
    n: usize,
    mean: f64,
    sd: f64,
    rng: &mut R,
) -> Result<CompetitionMatrix, SamplingError> {
    let normal = Normal::new(mean, sd).map_err(|_| SamplingError::InvalidNormal { mean, sd })?;
    // Row-major draw order so a seed maps to the same matrix regardless of
    // nalgebra's column-major storage.
    let draws: Vec<f64> = (0..n * n).map(|_| normal.sample(rng)).collect();
    Ok(CompetitionMatrix::from_matrix(DMatrix::from_row_slice(
        n, n, &draws,
    )))
}

/// Per-(species, resource) uptake-rate coefficients before temperature
/// scaling. Shared by every temperature of a trial.
#[derive(Debug, Clone, PartialEq)]
pub struct UptakeMatrix(DMatrix<f64>);

impl UptakeMatrix {
    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        Self(matrix)
    }

    pub fn num_species(&self) -> usize {
        self.0.nrows()
    }

    pub fn num_resources(&self) -> usize {
        self.0.ncols()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    /// Apply a uniform multiplicative scale (e.g. an Arrhenius factor).
    pub fn scaled(&self, factor: f64) -> DMatrix<f64> {
        &self.0 * factor
    }
}

/// Draw uptake rates i.i.d. from `Uniform[low, high)`.
pub fn sample_uptake_rates<R: Rng + ?Sized>(
    num_species: usize,
    num_resources: usize,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<UptakeMatrix, SamplingError> {
    let uniform = Uniform::new(low, high).map_err(|_| SamplingError::InvalidUniform { low, high })?;
    let draws: Vec<f64> = (0..num_species * num_resources)
        .map(|_| uniform.sample(rng))
        .collect();
    Ok(UptakeMatrix(DMatrix::from_row_slice(
        num_species,
        num_resources,
        &draws,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_competition_diagonal_is_one() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let alpha = sample_competition_matrix(20, 0.5, 0.25, &mut rng).unwrap();
        assert_eq!(alpha.len(), 20);
        for k in 0..20 {
            assert_eq!(alpha.get(k, k), 1.0);
        }
    }

    #[test]
    fn test_competition_off_diagonal_varies() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let alpha = sample_competition_matrix(10, 0.5, 0.25, &mut rng).unwrap();
        let off: Vec<f64> = (0..10)
            .flat_map(|k| (0..10).filter(move |&j| j != k).map(move |j| (k, j)))
            .map(|(k, j)| alpha.get(k, j))
            .collect();
        let mean = off.iter().sum::<f64>() / off.len() as f64;
        assert!((mean - 0.5).abs() < 0.1, "mean off-diagonal {mean}");
        assert!(off.iter().any(|&a| (a - off[0]).abs() > 1e-9));
    }

    #[test]
    fn test_competition_rejects_negative_sd() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(sample_competition_matrix(3, 0.5, -1.0, &mut rng).is_err());
    }

    #[test]
    fn test_from_matrix_overwrites_diagonal() {
        let alpha = CompetitionMatrix::from_matrix(DMatrix::from_element(3, 3, 0.2));
        assert_eq!(alpha.get(1, 1), 1.0);
        assert_eq!(alpha.get(0, 2), 0.2);
    }

    #[test]
    #[should_panic(expected = "must be square")]
    fn test_from_matrix_rejects_non_square() {
        CompetitionMatrix::from_matrix(DMatrix::zeros(2, 3));
    }

    #[test]
    fn test_uptake_rates_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let (low, high) = DEFAULT_UPTAKE_RANGE;
        let rates = sample_uptake_rates(15, 10, low, high, &mut rng).unwrap();
        assert_eq!(rates.num_species(), 15);
        assert_eq!(rates.num_resources(), 10);
        assert!(rates.as_matrix().iter().all(|&r| r >= low && r < high));
    }

    #[test]
    fn test_uptake_rejects_empty_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        assert!(sample_uptake_rates(2, 2, 3.0, 1.0, &mut rng).is_err());
    }
}
