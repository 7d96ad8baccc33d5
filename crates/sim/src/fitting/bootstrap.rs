//! Bootstrap RMS-error fit of `p` against a [`SimulationGrid`].
//!
//! Each replicate resamples the observations with replacement, scores every
//! candidate `p` by the RMS error between observed and simulated WMCN at the
//! observation temperatures, and keeps the best candidate. The estimate is
//! the mean over replicates, with the population SD as its spread.

use crate::errors::FitError;
use crate::simulation::SimulationGrid;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One field sample: observed WMCN at a temperature (Celsius).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sample: String,
    pub wmcn: f64,
    pub temperature: f64,
}

impl Observation {
    /// # Errors
    /// Rejects a non-finite WMCN or temperature.
    pub fn new(sample: impl Into<String>, wmcn: f64, temperature: f64) -> Result<Self, FitError> {
        let sample = sample.into();
        if !wmcn.is_finite() || !temperature.is_finite() {
            return Err(FitError::InvalidObservation { sample });
        }
        Ok(Self {
            sample,
            wmcn,
            temperature,
        })
    }
}

/// Bootstrap settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Draws per replicate; `None` uses the number of observations
    pub sample_size: Option<usize>,
    /// Number of bootstrap replicates
    pub num_replicates: usize,
    /// Master seed (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            num_replicates: 100,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    pub fn new(num_replicates: usize, seed: Option<u64>) -> Self {
        Self {
            sample_size: None,
            num_replicates,
            seed,
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }
}

/// Best candidate of a single replicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicateFit {
    pub p: f64,
    pub rms_error: f64,
}

/// Summary over all replicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Mean of the per-replicate estimates
    pub mean_p: f64,
    /// Population standard deviation of the estimates
    pub sd_p: f64,
    /// Mean of the per-replicate minimum RMS errors
    pub mean_min_error: f64,
}

impl FitResult {
    /// Summarize replicate fits; `None` when there are none.
    pub fn from_replicates(replicates: &[ReplicateFit]) -> Option<Self> {
        if replicates.is_empty() {
            return None;
        }
        let n = replicates.len() as f64;
        let mean_p = replicates.iter().map(|r| r.p).sum::<f64>() / n;
        let variance = replicates
            .iter()
            .map(|r| (r.p - mean_p).powi(2))
            .sum::<f64>()
            / n;
        let mean_min_error = replicates.iter().map(|r| r.rms_error).sum::<f64>() / n;
        Some(Self {
            mean_p,
            sd_p: variance.sqrt(),
            mean_min_error,
        })
    }
}

/// Candidate in `candidates` closest to `value`; the first wins on ties.
pub fn round_to_nearest(value: f64, candidates: &[f64]) -> Option<f64> {
    let mut nearest = None;
    let mut min_diff = f64::INFINITY;
    for &candidate in candidates {
        let diff = (value - candidate).abs();
        if diff < min_diff {
            min_diff = diff;
            nearest = Some(candidate);
        }
    }
    nearest
}

/// Bootstrap fitter over a fixed grid and candidate list.
#[derive(Debug, Clone)]
pub struct BootstrapFitter<'a> {
    grid: &'a SimulationGrid,
    candidates: Vec<f64>,
    config: BootstrapConfig,
}

impl<'a> BootstrapFitter<'a> {
    /// # Errors
    /// Fails on an empty candidate list, zero replicates or a zero sample
    /// size.
    pub fn new(
        grid: &'a SimulationGrid,
        candidates: Vec<f64>,
        config: BootstrapConfig,
    ) -> Result<Self, FitError> {
        if candidates.is_empty() {
            return Err(FitError::NoCandidates);
        }
        if config.num_replicates == 0 {
            return Err(FitError::InvalidParameter(
                "num_replicates must be at least 1".into(),
            ));
        }
        if config.sample_size == Some(0) {
            return Err(FitError::InvalidParameter(
                "sample_size must be at least 1".into(),
            ));
        }
        Ok(Self {
            grid,
            candidates,
            config,
        })
    }

    /// Use every `p` present in the grid as a candidate.
    pub fn with_grid_candidates(
        grid: &'a SimulationGrid,
        config: BootstrapConfig,
    ) -> Result<Self, FitError> {
        let candidates = grid.p_values();
        Self::new(grid, candidates, config)
    }

    pub fn candidates(&self) -> &[f64] {
        &self.candidates
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Simulated WMCN for each observation and candidate, `[obs][candidate]`.
    ///
    /// # Errors
    /// `MissingGridEntry` for the first (observation, candidate) pair the grid
    /// does not cover.
    pub fn lookup_table(&self, observations: &[Observation]) -> Result<Vec<Vec<f64>>, FitError> {
        observations
            .iter()
            .map(|obs| {
                self.candidates
                    .iter()
                    .map(|&p| {
                        self.grid
                            .get(obs.temperature, p)
                            .ok_or(FitError::MissingGridEntry {
                                temperature: obs.temperature,
                                p,
                            })
                    })
                    .collect()
            })
            .collect()
    }

    /// Run every replicate; results are in replicate order.
    pub fn replicates(&self, observations: &[Observation]) -> Result<Vec<ReplicateFit>, FitError> {
        if observations.is_empty() {
            return Err(FitError::NoObservations);
        }
        let simulated = self.lookup_table(observations)?;
        let sample_size = self.config.sample_size.unwrap_or(observations.len());

        let mut master = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };
        let seeds: Vec<u64> = (0..self.config.num_replicates)
            .map(|_| master.random())
            .collect();

        log::debug!(
            "Bootstrapping {} replicates of {} draws over {} candidates",
            seeds.len(),
            sample_size,
            self.candidates.len()
        );

        let fits = seeds
            .par_iter()
            .map(|&seed| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                self.replicate(observations, &simulated, sample_size, &mut local_rng)
            })
            .collect();
        Ok(fits)
    }

    /// Full bootstrap fit.
    pub fn fit(&self, observations: &[Observation]) -> Result<FitResult, FitError> {
        let replicates = self.replicates(observations)?;
        let result = FitResult::from_replicates(&replicates).ok_or(FitError::NoObservations)?;
        log::info!(
            "Fitted p = {:.4} (SD {:.4}, mean RMS error {:.4})",
            result.mean_p,
            result.sd_p,
            result.mean_min_error
        );
        Ok(result)
    }

    fn replicate<R: Rng + ?Sized>(
        &self,
        observations: &[Observation],
        simulated: &[Vec<f64>],
        sample_size: usize,
        rng: &mut R,
    ) -> ReplicateFit {
        let mut squared_error = vec![0.0; self.candidates.len()];
        for _ in 0..sample_size {
            let index = rng.random_range(0..observations.len());
            let observed = observations[index].wmcn;
            for (acc, &predicted) in squared_error.iter_mut().zip(&simulated[index]) {
                *acc += (observed - predicted).powi(2);
            }
        }

        let mut best = ReplicateFit {
            p: self.candidates[0],
            rms_error: (squared_error[0] / sample_size as f64).sqrt(),
        };
        for (&p, &sum) in self.candidates.iter().zip(&squared_error).skip(1) {
            let rms_error = (sum / sample_size as f64).sqrt();
            if rms_error < best.rms_error {
                best = ReplicateFit { p, rms_error };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// WMCN falls with temperature and with p.
    fn linear_grid() -> SimulationGrid {
        let mut grid = SimulationGrid::new();
        for t in [5.0, 10.0, 15.0, 20.0] {
            for p in [0.2, 0.4, 0.6, 0.8] {
                grid.insert(t, p, 4.0 - 0.05 * t - 2.0 * p).unwrap();
            }
        }
        grid
    }

    fn observations_for(grid: &SimulationGrid, p: f64) -> Vec<Observation> {
        grid.temperatures()
            .into_iter()
            .enumerate()
            .map(|(i, t)| Observation::new(format!("s{i}"), grid.get(t, p).unwrap(), t).unwrap())
            .collect()
    }

    #[test]
    fn test_observation_rejects_non_finite() {
        assert!(Observation::new("a", f64::NAN, 10.0).is_err());
        assert!(Observation::new("a", 2.0, f64::INFINITY).is_err());
        assert!(Observation::new("a", 2.0, 10.0).is_ok());
    }

    #[test]
    fn test_round_to_nearest() {
        let candidates = [0.2, 0.4, 0.6];
        assert_eq!(round_to_nearest(0.43, &candidates), Some(0.4));
        assert_eq!(round_to_nearest(0.9, &candidates), Some(0.6));
        assert_eq!(round_to_nearest(0.3, &[0.2, 0.4]), Some(0.2));
        assert_eq!(round_to_nearest(0.3, &[]), None);
    }

    #[test]
    fn test_from_replicates_population_sd() {
        let replicates = [
            ReplicateFit { p: 0.2, rms_error: 0.1 },
            ReplicateFit { p: 0.4, rms_error: 0.3 },
        ];
        let result = FitResult::from_replicates(&replicates).unwrap();
        assert!(approx_eq(result.mean_p, 0.3, 1e-12));
        assert!(approx_eq(result.sd_p, 0.1, 1e-12));
        assert!(approx_eq(result.mean_min_error, 0.2, 1e-12));
        assert!(FitResult::from_replicates(&[]).is_none());
    }

    #[test]
    fn test_recovers_exact_p() {
        let grid = linear_grid();
        let observations = observations_for(&grid, 0.6);
        let fitter =
            BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(50, Some(1))).unwrap();
        let result = fitter.fit(&observations).unwrap();
        assert!(approx_eq(result.mean_p, 0.6, 1e-12));
        assert!(approx_eq(result.sd_p, 0.0, 1e-12));
        assert!(approx_eq(result.mean_min_error, 0.0, 1e-9));
    }

    #[test]
    fn test_first_minimum_wins_on_tie() {
        let mut grid = SimulationGrid::new();
        grid.insert(10.0, 0.3, 2.0).unwrap();
        grid.insert(10.0, 0.5, 2.0).unwrap();
        let observations = vec![Observation::new("a", 2.0, 10.0).unwrap()];
        let fitter =
            BootstrapFitter::new(&grid, vec![0.5, 0.3], BootstrapConfig::new(5, Some(2))).unwrap();
        let result = fitter.fit(&observations).unwrap();
        assert_eq!(result.mean_p, 0.5);
    }

    #[test]
    fn test_observation_temperature_rounded() {
        let grid = linear_grid();
        let observations = vec![Observation::new("a", grid.get(10.0, 0.4).unwrap(), 10.0004).unwrap()];
        let fitter =
            BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(3, Some(3))).unwrap();
        assert!(approx_eq(fitter.fit(&observations).unwrap().mean_p, 0.4, 1e-12));
    }

    #[test]
    fn test_missing_grid_entry_fails() {
        let grid = linear_grid();
        let observations = vec![
            Observation::new("a", 2.0, 10.0).unwrap(),
            Observation::new("b", 2.0, 12.5).unwrap(),
        ];
        let fitter =
            BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(10, Some(4))).unwrap();
        match fitter.fit(&observations) {
            Err(FitError::MissingGridEntry { temperature, .. }) => assert_eq!(temperature, 12.5),
            other => panic!("Expected MissingGridEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_half_hundredth_temperature_rounds_to_even() {
        let mut grid = SimulationGrid::new();
        grid.insert(10.12, 0.5, 2.0).unwrap();
        let observations = vec![Observation::new("a", 2.0, 10.125).unwrap()];
        let fitter =
            BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(3, Some(6))).unwrap();

        let result = fitter.fit(&observations).unwrap();
        assert_eq!(result.mean_p, 0.5);
        assert!(approx_eq(result.mean_min_error, 0.0, 1e-12));
    }

    #[test]
    fn test_invalid_setup() {
        let grid = linear_grid();
        assert_eq!(
            BootstrapFitter::new(&grid, vec![], BootstrapConfig::default()).unwrap_err(),
            FitError::NoCandidates
        );
        assert!(BootstrapFitter::new(&grid, vec![0.2], BootstrapConfig::new(0, None)).is_err());
        assert!(BootstrapFitter::new(
            &grid,
            vec![0.2],
            BootstrapConfig::new(5, None).with_sample_size(0)
        )
        .is_err());

        let fitter = BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::default()).unwrap();
        assert_eq!(fitter.fit(&[]).unwrap_err(), FitError::NoObservations);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let grid = linear_grid();
        let observations: Vec<Observation> = grid
            .temperatures()
            .into_iter()
            .enumerate()
            .map(|(i, t)| Observation::new(format!("s{i}"), 3.0 - 0.04 * t, t).unwrap())
            .collect();
        let config = BootstrapConfig::new(40, Some(42));
        let a = BootstrapFitter::with_grid_candidates(&grid, config.clone())
            .unwrap()
            .fit(&observations)
            .unwrap();
        let b = BootstrapFitter::with_grid_candidates(&grid, config)
            .unwrap()
            .fit(&observations)
            .unwrap();
        assert_eq!(a, b);
    }
}
