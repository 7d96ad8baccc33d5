//! Builder pattern for ensemble configurations.
//!
//! Provides a fluent API over [`GlvConfig`] and [`ConsumerResourceConfig`]
//! with validation on `build()`.

use crate::dynamics::IntegratorOptions;
use crate::errors::SimulationError;
use crate::simulation::{ConsumerResourceConfig, GlvConfig, inclusive_range};
use std::time::Duration;

/// Builder for [`GlvConfig`].
///
/// # Examples
///
/// ```
/// use ribotherm_sim::simulation::GlvBuilder;
///
/// let config = GlvBuilder::new()
///     .num_species(20)
///     .p(0.6)
///     .temperature_range(278.0, 290.0, 4.0)
///     .trials(10)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.temperatures, vec![278.0, 282.0, 286.0, 290.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlvBuilder {
    config: GlvConfig,
}

impl GlvBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_species(mut self, n: usize) -> Self {
        self.config.num_species = n;
        self
    }

    pub fn max_copy_number(mut self, max: usize) -> Self {
        self.config.max_copy_number = max;
        self
    }

    /// Set the geometric copy-number parameter.
    pub fn p(mut self, p: f64) -> Self {
        self.config.p = p;
        self
    }

    /// Explicit list of temperatures in Kelvin.
    pub fn temperatures(mut self, temperatures: Vec<f64>) -> Self {
        self.config.temperatures = temperatures;
        self
    }

    /// Inclusive, evenly spaced temperature sweep in Kelvin.
    pub fn temperature_range(mut self, start: f64, end: f64, step: f64) -> Self {
        self.config.temperatures = inclusive_range(start, end, step);
        self
    }

    /// Integration horizon in hours.
    pub fn duration(mut self, hours: f64) -> Self {
        self.config.duration = hours;
        self
    }

    pub fn initial_abundance(mut self, x0: f64) -> Self {
        self.config.initial_abundance = x0;
        self
    }

    pub fn death_rate(mut self, delta: f64) -> Self {
        self.config.death_rate = delta;
        self
    }

    /// Mean and standard deviation of the off-diagonal competition
    /// coefficients.
    pub fn competition(mut self, mean: f64, sd: f64) -> Self {
        self.config.competition_mean = mean;
        self.config.competition_sd = sd;
        self
    }

    pub fn trials(mut self, n: usize) -> Self {
        self.config.num_trials = n;
        self
    }

    pub fn integrator(mut self, options: IntegratorOptions) -> Self {
        self.config.integrator = options;
        self
    }

    /// Per-integration wall-clock limit.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.config.integrator.timeout = Some(limit);
        self
    }

    /// Set the random seed for reproducibility (default: None = random).
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<GlvConfig, SimulationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Builder for [`ConsumerResourceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConsumerResourceBuilder {
    config: ConsumerResourceConfig,
}

impl ConsumerResourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_species(mut self, n: usize) -> Self {
        self.config.num_species = n;
        self
    }

    pub fn num_resources(mut self, n: usize) -> Self {
        self.config.num_resources = n;
        self
    }

    pub fn temperatures(mut self, temperatures: Vec<f64>) -> Self {
        self.config.temperatures = temperatures;
        self
    }

    pub fn temperature_range(mut self, start: f64, end: f64, step: f64) -> Self {
        self.config.temperatures = inclusive_range(start, end, step);
        self
    }

    pub fn supply_concentrations(mut self, concentrations: Vec<f64>) -> Self {
        self.config.supply_concentrations = concentrations;
        self
    }

    pub fn duration(mut self, hours: f64) -> Self {
        self.config.duration = hours;
        self
    }

    pub fn start_density(mut self, density: f64) -> Self {
        self.config.start_density = density;
        self
    }

    pub fn death_rate(mut self, delta: f64) -> Self {
        self.config.death_rate = delta;
        self
    }

    pub fn uptake_range(mut self, low: f64, high: f64) -> Self {
        self.config.uptake_range = (low, high);
        self
    }

    pub fn trials(mut self, n: usize) -> Self {
        self.config.num_trials = n;
        self
    }

    pub fn integrator(mut self, options: IntegratorOptions) -> Self {
        self.config.integrator = options;
        self
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.config.integrator.timeout = Some(limit);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<ConsumerResourceConfig, SimulationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = GlvBuilder::new().build().unwrap();
        assert_eq!(config, GlvConfig::default());
    }

    #[test]
    fn test_builder_all_options() {
        let config = GlvBuilder::new()
            .num_species(10)
            .max_copy_number(5)
            .p(0.4)
            .temperatures(vec![280.0, 290.0])
            .duration(100.0)
            .initial_abundance(0.05)
            .death_rate(0.1)
            .competition(0.3, 0.1)
            .trials(4)
            .timeout(Duration::from_secs(5))
            .seed(12345)
            .build()
            .unwrap();

        assert_eq!(config.num_species, 10);
        assert_eq!(config.max_copy_number, 5);
        assert_eq!(config.temperatures, vec![280.0, 290.0]);
        assert_eq!(config.competition_mean, 0.3);
        assert_eq!(config.integrator.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.seed, Some(12345));
    }

    #[test]
    fn test_builder_invalid_p() {
        let result = GlvBuilder::new().p(0.0).build();
        match result {
            Err(SimulationError::InvalidParameter(msg)) => assert!(msg.contains("p must be")),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_zero_species() {
        assert!(GlvBuilder::new().num_species(0).build().is_err());
        assert!(ConsumerResourceBuilder::new().num_resources(0).build().is_err());
    }

    #[test]
    fn test_consumer_resource_builder() {
        let config = ConsumerResourceBuilder::new()
            .num_species(3)
            .num_resources(2)
            .temperature_range(280.0, 290.0, 5.0)
            .supply_concentrations(vec![1.0, 2.0])
            .duration(50.0)
            .start_density(0.2)
            .death_rate(0.05)
            .uptake_range(1.0, 2.0)
            .trials(2)
            .seed(1)
            .build()
            .unwrap();

        assert_eq!(config.temperatures, vec![280.0, 285.0, 290.0]);
        assert_eq!(config.reference_temperature(), Some(290.0));
        assert_eq!(config.uptake_range, (1.0, 2.0));
    }

    #[test]
    fn test_consumer_resource_builder_invalid_uptake() {
        assert!(ConsumerResourceBuilder::new()
            .uptake_range(2.0, 2.0)
            .build()
            .is_err());
    }
}
