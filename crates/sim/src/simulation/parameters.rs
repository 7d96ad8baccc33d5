//! Simulation parameters and configuration.
//!
//! Defaults reproduce the reference experiment: a 100-species GLV community
//! swept over 278..=299 K and a 15-species, 10-resource consumer model swept
//! over 276..=298 K and eight supply concentrations.

use crate::dynamics::{Arrhenius, IntegratorOptions};
use crate::errors::SimulationError;
use crate::traits::copy_number::DEFAULT_MAX_COPY_NUMBER;
use crate::traits::interactions::DEFAULT_UPTAKE_RANGE;
use serde::{Deserialize, Serialize};

/// Evenly spaced values from `start` to `end` inclusive.
///
/// The final value is included when it lies within half a step of `end`,
/// so `inclusive_range(1.0, 4.5, 0.5)` yields eight values.
pub fn inclusive_range(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || end < start {
        return vec![start];
    }
    let count = ((end - start) / step + 0.5).floor() as usize + 1;
    (0..count).map(|i| start + i as f64 * step).collect()
}

fn check_positive(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

fn check_count(name: &str, value: usize) -> Result<(), SimulationError> {
    if value == 0 {
        Err(SimulationError::InvalidParameter(format!(
            "{name} must be at least 1"
        )))
    } else {
        Ok(())
    }
}

fn check_temperatures(temperatures: &[f64]) -> Result<(), SimulationError> {
    if temperatures.is_empty() {
        return Err(SimulationError::InvalidParameter(
            "at least one temperature is required".into(),
        ));
    }
    for &t in temperatures {
        check_positive("temperature (K)", t)?;
    }
    Ok(())
}

/// Generalized Lotka-Volterra ensemble configuration.
///
/// Temperatures are absolute (Kelvin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlvConfig {
    /// Number of species per community
    pub num_species: usize,
    /// Largest rRNA copy number drawn
    pub max_copy_number: usize,
    /// Geometric parameter of the copy-number distribution
    pub p: f64,
    /// Temperatures to simulate, in Kelvin
    pub temperatures: Vec<f64>,
    /// Integration horizon in hours
    pub duration: f64,
    /// Starting abundance of every species
    pub initial_abundance: f64,
    /// Global death rate `delta`
    pub death_rate: f64,
    /// Mean of the competition coefficients
    pub competition_mean: f64,
    /// Standard deviation of the competition coefficients
    pub competition_sd: f64,
    /// Growth-rate temperature scaling
    pub arrhenius: Arrhenius,
    /// Number of independent trials
    pub num_trials: usize,
    /// Integrator tolerances and budgets
    pub integrator: IntegratorOptions,
    /// Master seed (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for GlvConfig {
    fn default() -> Self {
        Self {
            num_species: 100,
            max_copy_number: DEFAULT_MAX_COPY_NUMBER,
            p: 0.8,
            temperatures: inclusive_range(278.0, 299.0, 3.0),
            duration: 800.0,
            initial_abundance: 0.01,
            death_rate: 0.05,
            competition_mean: 0.5,
            competition_sd: 0.25,
            arrhenius: Arrhenius::LOTKA_VOLTERRA,
            num_trials: 500,
            integrator: IntegratorOptions::default(),
            seed: None,
        }
    }
}

impl GlvConfig {
    /// Default configuration with an explicit p, trial count and seed.
    pub fn new(p: f64, num_trials: usize, seed: Option<u64>) -> Self {
        Self {
            p,
            num_trials,
            seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        check_count("num_species", self.num_species)?;
        check_count("max_copy_number", self.max_copy_number)?;
        check_count("num_trials", self.num_trials)?;
        if !(self.p > 0.0 && self.p < 1.0) {
            return Err(SimulationError::InvalidParameter(format!(
                "p must be in (0, 1), got {}",
                self.p
            )));
        }
        check_temperatures(&self.temperatures)?;
        check_positive("duration", self.duration)?;
        check_non_negative("initial_abundance", self.initial_abundance)?;
        check_non_negative("death_rate", self.death_rate)?;
        check_non_negative("competition_sd", self.competition_sd)?;
        if !self.competition_mean.is_finite() {
            return Err(SimulationError::InvalidParameter(
                "competition_mean must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Linear consumer-resource ensemble configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerResourceConfig {
    /// Number of consumer species
    pub num_species: usize,
    /// Number of resources
    pub num_resources: usize,
    /// Temperatures to simulate, in Kelvin; the last one sets the reference
    /// rates used for WMGR
    pub temperatures: Vec<f64>,
    /// Resource supply concentrations to sweep
    pub supply_concentrations: Vec<f64>,
    /// Integration horizon in hours
    pub duration: f64,
    /// Starting density of every species
    pub start_density: f64,
    /// Global death / dilution rate `delta`
    pub death_rate: f64,
    /// Uniform range `[low, high)` of the uptake coefficients
    pub uptake_range: (f64, f64),
    /// Uptake temperature scaling
    pub arrhenius: Arrhenius,
    /// Number of independent trials
    pub num_trials: usize,
    /// Integrator tolerances and budgets
    pub integrator: IntegratorOptions,
    /// Master seed (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for ConsumerResourceConfig {
    fn default() -> Self {
        Self {
            num_species: 15,
            num_resources: 10,
            temperatures: inclusive_range(276.0, 298.0, 2.0),
            supply_concentrations: inclusive_range(1.0, 4.5, 0.5),
            duration: 1000.0,
            start_density: 0.1,
            death_rate: 0.1,
            uptake_range: DEFAULT_UPTAKE_RANGE,
            arrhenius: Arrhenius::CONSUMER_RESOURCE,
            num_trials: 250,
            integrator: IntegratorOptions::default(),
            seed: None,
        }
    }
}

impl ConsumerResourceConfig {
    pub fn new(num_trials: usize, seed: Option<u64>) -> Self {
        Self {
            num_trials,
            seed,
            ..Self::default()
        }
    }

    /// Temperature at which the reference rates `rm` are evaluated.
    pub fn reference_temperature(&self) -> Option<f64> {
        self.temperatures.last().copied()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        check_count("num_species", self.num_species)?;
        check_count("num_resources", self.num_resources)?;
        check_count("num_trials", self.num_trials)?;
        check_temperatures(&self.temperatures)?;
        if self.supply_concentrations.is_empty() {
            return Err(SimulationError::InvalidParameter(
                "at least one supply concentration is required".into(),
            ));
        }
        for &c in &self.supply_concentrations {
            check_non_negative("supply concentration", c)?;
        }
        check_positive("duration", self.duration)?;
        check_non_negative("start_density", self.start_density)?;
        check_non_negative("death_rate", self.death_rate)?;
        let (low, high) = self.uptake_range;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(SimulationError::InvalidParameter(format!(
                "uptake_range must satisfy low < high, got [{low}, {high})"
            )));
        }
        Ok(())
    }
}
