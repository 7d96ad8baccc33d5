use std::error;
use std::fmt;
use std::time::Duration;

/// Errors raised while setting up trait distributions.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// Geometric parameter outside the open interval (0, 1)
    InvalidGeometricParameter(f64),
    /// Maximum copy number must be at least 1
    InvalidMaxCopyNumber(usize),
    /// Normal distribution parameters rejected (mean, sd)
    InvalidNormal { mean: f64, sd: f64 },
    /// Uniform range rejected (low, high)
    InvalidUniform { low: f64, high: f64 },
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometricParameter(p) => {
                write!(f, "Invalid geometric parameter p = {p} (must be in (0, 1))")
            }
            Self::InvalidMaxCopyNumber(n) => {
                write!(f, "Invalid maximum copy number {n} (must be >= 1)")
            }
            Self::InvalidNormal { mean, sd } => {
                write!(f, "Invalid normal distribution N({mean}, {sd})")
            }
            Self::InvalidUniform { low, high } => {
                write!(f, "Invalid uniform range [{low}, {high})")
            }
        }
    }
}

impl error::Error for SamplingError {}

/// Failure of the adaptive ODE integrator.
///
/// These are distinct from a legitimate outcome in which some or all species
/// reach zero abundance.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// The time span is empty or reversed
    InvalidSpan { t0: f64, t1: f64 },
    /// A derivative or state component became NaN or infinite
    NonFinite { t: f64 },
    /// The step size collapsed below machine precision
    StepSizeUnderflow { t: f64, h: f64 },
    /// The step budget ran out before reaching the end time
    MaxStepsExceeded { t: f64, steps: usize },
    /// The wall-clock budget ran out before reaching the end time
    Timeout { t: f64, limit: Duration },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpan { t0, t1 } => write!(f, "Invalid time span [{t0}, {t1}]"),
            Self::NonFinite { t } => write!(f, "Non-finite state encountered at t = {t}"),
            Self::StepSizeUnderflow { t, h } => {
                write!(f, "Step size underflow at t = {t} (h = {h:e})")
            }
            Self::MaxStepsExceeded { t, steps } => {
                write!(f, "Exceeded {steps} steps before completion (t = {t})")
            }
            Self::Timeout { t, limit } => {
                write!(f, "Integration timed out after {limit:?} (t = {t})")
            }
        }
    }
}

impl error::Error for IntegrationError {}

/// Errors from building or running simulation trials.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A configuration value was rejected
    InvalidParameter(String),
    /// Trait sampling could not be set up
    Sampling(SamplingError),
    /// Integration failed at the given temperature (Kelvin)
    Integration {
        temperature: f64,
        source: IntegrationError,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            Self::Sampling(e) => write!(f, "Sampling error: {e}"),
            Self::Integration {
                temperature,
                source,
            } => write!(f, "Integration failed at T = {temperature} K: {source}"),
        }
    }
}

impl error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Sampling(e) => Some(e),
            Self::Integration { source, .. } => Some(source),
            Self::InvalidParameter(_) => None,
        }
    }
}

impl From<SamplingError> for SimulationError {
    fn from(e: SamplingError) -> Self {
        Self::Sampling(e)
    }
}

/// Errors when building, reading or writing a simulation grid.
#[derive(Debug)]
pub enum GridError {
    /// IO error
    Io(std::io::Error),
    /// CSV parse or write error
    Csv(csv::Error),
    /// Two rows share the same rounded (temperature, p) key
    DuplicateEntry { temperature: f64, p: f64 },
    /// A temperature, p or WMCN value was NaN or infinite
    NonFiniteEntry { temperature: f64, p: f64, wmcn: f64 },
    /// Every trial failed for one p value, so no mean could be formed
    EmptyEnsemble { p: f64 },
    /// Simulation error while producing the grid
    Simulation(SimulationError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
            Self::DuplicateEntry { temperature, p } => {
                write!(f, "Duplicate grid entry for T = {temperature}, p = {p}")
            }
            Self::NonFiniteEntry { temperature, p, wmcn } => write!(
                f,
                "Non-finite grid entry T = {temperature}, p = {p}, WMCN = {wmcn}"
            ),
            Self::EmptyEnsemble { p } => write!(f, "All trials failed for p = {p}"),
            Self::Simulation(e) => write!(f, "Simulation error: {e}"),
        }
    }
}

impl error::Error for GridError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Simulation(e) => Some(e),
            Self::DuplicateEntry { .. }
            | Self::NonFiniteEntry { .. }
            | Self::EmptyEnsemble { .. } => None,
        }
    }
}

impl From<std::io::Error> for GridError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for GridError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<SimulationError> for GridError {
    fn from(e: SimulationError) -> Self {
        Self::Simulation(e)
    }
}

/// Errors from the bootstrap parameter fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// No observations were supplied
    NoObservations,
    /// No candidate parameter values were supplied
    NoCandidates,
    /// Sample size or trial count was zero
    InvalidParameter(String),
    /// An observation carried a non-finite WMCN or temperature
    InvalidObservation { sample: String },
    /// The grid has no entry for a (temperature, p) pair required by a draw
    MissingGridEntry { temperature: f64, p: f64 },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoObservations => write!(f, "No observations to fit"),
            Self::NoCandidates => write!(f, "No candidate p values"),
            Self::InvalidParameter(msg) => write!(f, "Invalid fit parameter: {msg}"),
            Self::InvalidObservation { sample } => {
                write!(f, "Observation '{sample}' has a non-finite WMCN or temperature")
            }
            Self::MissingGridEntry { temperature, p } => write!(
                f,
                "Simulation grid has no entry for T = {temperature:.2}, p = {p:.4}"
            ),
        }
    }
}

impl error::Error for FitError {}
