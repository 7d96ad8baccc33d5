//! Trial ensembles for the GLV and consumer-resource models.
//!
//! Each trial draws its own traits from an independent RNG seeded from the
//! master RNG, integrates every temperature (and supply level), and returns
//! an independent record. Averaging is a separate reduction over the
//! successful records; failed trials are reported, never zero-filled.

use crate::dynamics::{ConsumerResource, DormandPrince, LotkaVolterra, OdeSystem};
use crate::errors::SimulationError;
use crate::simulation::{ConsumerResourceConfig, GlvConfig};
use crate::traits::{CopyNumberSampler, sample_competition_matrix, sample_uptake_rates};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

/// A trial that could not be completed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialFailure {
    /// Index of the trial within its ensemble
    pub trial: usize,
    pub error: SimulationError,
}

/// Runs independent trials in parallel with reproducible per-trial seeds.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    num_trials: usize,
    seed: Option<u64>,
}

impl TrialRunner {
    pub fn new(num_trials: usize, seed: Option<u64>) -> Self {
        Self { num_trials, seed }
    }

    pub fn num_trials(&self) -> usize {
        self.num_trials
    }

    /// Per-trial seeds drawn sequentially from the master RNG.
    pub fn trial_seeds(&self) -> Vec<u64> {
        let mut master = match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };
        (0..self.num_trials).map(|_| master.random()).collect()
    }

    /// Run `trial` once per seed; results come back in trial order.
    pub fn run<T, F>(&self, trial: F) -> (Vec<T>, Vec<TrialFailure>)
    where
        T: Send,
        F: Fn(usize, &mut Xoshiro256PlusPlus) -> Result<T, SimulationError> + Sync,
    {
        self.run_with_progress(trial, || {})
    }

    /// Like [`run`](Self::run), calling `on_trial_done` after each trial.
    pub fn run_with_progress<T, F, P>(&self, trial: F, on_trial_done: P) -> (Vec<T>, Vec<TrialFailure>)
    where
        T: Send,
        F: Fn(usize, &mut Xoshiro256PlusPlus) -> Result<T, SimulationError> + Sync,
        P: Fn() + Sync,
    {
        let seeds = self.trial_seeds();

        let outcomes: Vec<(usize, Result<T, SimulationError>)> = seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let outcome = trial(index, &mut local_rng);
                on_trial_done();
                (index, outcome)
            })
            .collect();

        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(error) => {
                    log::warn!("Trial {index} failed: {error}");
                    failures.push(TrialFailure {
                        trial: index,
                        error,
                    });
                }
            }
        }
        (records, failures)
    }
}

/// Abundance-weighted arithmetic mean copy number of a simulated community.
///
/// Returns `None` when total biomass is zero or not finite.
pub fn simulated_wmcn(copy_numbers: &[u32], abundances: &[f64]) -> Option<f64> {
    let weights: Vec<f64> = copy_numbers.iter().map(|&c| f64::from(c)).collect();
    weighted_trait_mean(&weights, abundances)
}

/// `sum_k trait_k * X_k / sum_k X_k`, or `None` for zero biomass.
pub fn weighted_trait_mean(traits: &[f64], abundances: &[f64]) -> Option<f64> {
    assert_eq!(traits.len(), abundances.len(), "trait/abundance length mismatch");
    let biomass: f64 = abundances.iter().sum();
    if biomass <= 0.0 || !biomass.is_finite() {
        return None;
    }
    let weighted: f64 = traits.iter().zip(abundances).map(|(t, x)| t * x).sum();
    Some(weighted / biomass)
}

/// Relative abundance of each copy-number class `1..=max_copy_number`.
///
/// All zeros when total biomass is zero.
pub fn copy_number_class_abundance(
    copy_numbers: &[u32],
    abundances: &[f64],
    max_copy_number: usize,
) -> Vec<f64> {
    assert_eq!(copy_numbers.len(), abundances.len(), "copy-number/abundance length mismatch");
    let mut classes = vec![0.0; max_copy_number];
    let biomass: f64 = abundances.iter().sum();
    if biomass <= 0.0 || !biomass.is_finite() {
        return classes;
    }
    for (&c, &x) in copy_numbers.iter().zip(abundances) {
        if let Some(slot) = (c as usize).checked_sub(1).and_then(|i| classes.get_mut(i)) {
            *slot += x / biomass;
        }
    }
    classes
}

/// Final state of one GLV trial at one temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct GlvOutcome {
    /// Temperature in Kelvin
    pub temperature: f64,
    pub abundances: Vec<f64>,
    pub wmcn: Option<f64>,
    /// Relative abundance per copy-number class, indexed by `copy_number - 1`
    pub class_abundance: Vec<f64>,
}

/// One GLV trial across all temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct GlvTrial {
    pub trial: usize,
    pub copy_numbers: Vec<u32>,
    pub outcomes: Vec<GlvOutcome>,
}

/// Run a single GLV trial with the given RNG.
pub fn run_glv_trial<R: Rng + ?Sized>(
    config: &GlvConfig,
    sampler: &CopyNumberSampler,
    trial: usize,
    rng: &mut R,
) -> Result<GlvTrial, SimulationError> {
    let n = config.num_species;
    let copy_numbers = sampler.sample_community(n, rng);
    let alpha = sample_competition_matrix(n, config.competition_mean, config.competition_sd, rng)?;
    let rate_constants: Vec<f64> = copy_numbers.iter().map(|&c| f64::from(c)).collect();

    let solver = DormandPrince::new(config.integrator);
    let initial = vec![config.initial_abundance; n];

    let mut outcomes = Vec::with_capacity(config.temperatures.len());
    for &temperature in &config.temperatures {
        let growth_rates = config.arrhenius.scale(&rate_constants, temperature);
        let system = LotkaVolterra::new(growth_rates, &alpha, config.death_rate);
        let solution = solver
            .integrate(&system, (0.0, config.duration), &initial)
            .map_err(|source| SimulationError::Integration {
                temperature,
                source,
            })?;

        outcomes.push(GlvOutcome {
            temperature,
            wmcn: simulated_wmcn(&copy_numbers, &solution.y),
            class_abundance: copy_number_class_abundance(
                &copy_numbers,
                &solution.y,
                config.max_copy_number,
            ),
            abundances: solution.y,
        });
    }

    Ok(GlvTrial {
        trial,
        copy_numbers,
        outcomes,
    })
}

/// Results of a GLV ensemble.
#[derive(Debug, Clone)]
pub struct GlvEnsemble {
    /// Temperatures in Kelvin
    pub temperatures: Vec<f64>,
    pub max_copy_number: usize,
    pub trials: Vec<GlvTrial>,
    pub failures: Vec<TrialFailure>,
}

impl GlvEnsemble {
    /// Mean WMCN per temperature over trials with a defined WMCN.
    pub fn mean_wmcn(&self) -> Vec<Option<f64>> {
        (0..self.temperatures.len())
            .map(|t| {
                let values: Vec<f64> = self
                    .trials
                    .iter()
                    .filter_map(|trial| trial.outcomes.get(t).and_then(|o| o.wmcn))
                    .collect();
                mean(&values)
            })
            .collect()
    }

    /// Mean relative abundance per copy-number class, `[class][temperature]`.
    pub fn mean_class_abundance(&self) -> Vec<Vec<f64>> {
        let mut sums = vec![vec![0.0; self.temperatures.len()]; self.max_copy_number];
        if self.trials.is_empty() {
            return sums;
        }
        for trial in &self.trials {
            for (t, outcome) in trial.outcomes.iter().enumerate() {
                for (c, &value) in outcome.class_abundance.iter().enumerate() {
                    sums[c][t] += value;
                }
            }
        }
        let n = self.trials.len() as f64;
        for row in &mut sums {
            for value in row.iter_mut() {
                *value /= n;
            }
        }
        sums
    }
}

/// Run a full GLV ensemble.
pub fn run_glv(config: &GlvConfig) -> Result<GlvEnsemble, SimulationError> {
    run_glv_with_progress(config, || {})
}

pub fn run_glv_with_progress<P: Fn() + Sync>(
    config: &GlvConfig,
    on_trial_done: P,
) -> Result<GlvEnsemble, SimulationError> {
    config.validate()?;
    let sampler = CopyNumberSampler::new(config.p, config.max_copy_number)?;

    log::info!(
        "Running {} GLV trials (p = {}, {} species, {} temperatures)",
        config.num_trials,
        config.p,
        config.num_species,
        config.temperatures.len()
    );

    let runner = TrialRunner::new(config.num_trials, config.seed);
    let (trials, failures) = runner.run_with_progress(
        |index, rng| run_glv_trial(config, &sampler, index, rng),
        on_trial_done,
    );

    log::debug!("GLV ensemble finished: {} ok, {} failed", trials.len(), failures.len());

    Ok(GlvEnsemble {
        temperatures: config.temperatures.clone(),
        max_copy_number: config.max_copy_number,
        trials,
        failures,
    })
}

/// One consumer-resource trial: WMGR indexed `[concentration][temperature]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerResourceTrial {
    pub trial: usize,
    pub wmgr: Vec<Vec<Option<f64>>>,
}

/// Run a single consumer-resource trial with the given RNG.
pub fn run_consumer_resource_trial<R: Rng + ?Sized>(
    config: &ConsumerResourceConfig,
    trial: usize,
    rng: &mut R,
) -> Result<ConsumerResourceTrial, SimulationError> {
    let ns = config.num_species;
    let nr = config.num_resources;
    let (low, high) = config.uptake_range;
    let uptake = sample_uptake_rates(ns, nr, low, high, rng)?;

    let reference_temperature = config.reference_temperature().ok_or_else(|| {
        SimulationError::InvalidParameter("at least one temperature is required".into())
    })?;
    let per_resource = 1.0 / nr as f64;
    let reference_rates = uptake.scaled(config.arrhenius.factor(reference_temperature) * per_resource);
    let max_growth: Vec<f64> = (0..ns).map(|k| reference_rates.row(k).sum()).collect();

    let solver = DormandPrince::new(config.integrator);
    let mut wmgr = Vec::with_capacity(config.supply_concentrations.len());

    for &concentration in &config.supply_concentrations {
        let mut row = Vec::with_capacity(config.temperatures.len());
        for &temperature in &config.temperatures {
            let rates = uptake.scaled(config.arrhenius.factor(temperature) * per_resource);
            let system = ConsumerResource::with_uniform_supply(rates, config.death_rate, concentration);
            debug_assert_eq!(system.dimension(), ns + nr);
            let solution = solver
                .integrate(
                    &system,
                    (0.0, config.duration),
                    &system.initial_state(config.start_density),
                )
                .map_err(|source| SimulationError::Integration {
                    temperature,
                    source,
                })?;
            row.push(weighted_trait_mean(&max_growth, &solution.y[..ns]));
        }
        wmgr.push(row);
    }

    Ok(ConsumerResourceTrial { trial, wmgr })
}

/// Results of a consumer-resource ensemble.
#[derive(Debug, Clone)]
pub struct ConsumerResourceEnsemble {
    pub temperatures: Vec<f64>,
    pub supply_concentrations: Vec<f64>,
    pub trials: Vec<ConsumerResourceTrial>,
    pub failures: Vec<TrialFailure>,
}

impl ConsumerResourceEnsemble {
    /// Mean WMGR per `[concentration][temperature]` cell.
    pub fn mean_wmgr(&self) -> Vec<Vec<Option<f64>>> {
        (0..self.supply_concentrations.len())
            .map(|c| {
                (0..self.temperatures.len())
                    .map(|t| {
                        let values: Vec<f64> = self
                            .trials
                            .iter()
                            .filter_map(|trial| trial.wmgr.get(c).and_then(|row| row.get(t)).copied().flatten())
                            .collect();
                        mean(&values)
                    })
                    .collect()
            })
            .collect()
    }
}

pub fn run_consumer_resource(
    config: &ConsumerResourceConfig,
) -> Result<ConsumerResourceEnsemble, SimulationError> {
    run_consumer_resource_with_progress(config, || {})
}

pub fn run_consumer_resource_with_progress<P: Fn() + Sync>(
    config: &ConsumerResourceConfig,
    on_trial_done: P,
) -> Result<ConsumerResourceEnsemble, SimulationError> {
    config.validate()?;

    log::info!(
        "Running {} consumer-resource trials ({} species, {} resources, {} x {} cells)",
        config.num_trials,
        config.num_species,
        config.num_resources,
        config.supply_concentrations.len(),
        config.temperatures.len()
    );

    let runner = TrialRunner::new(config.num_trials, config.seed);
    let (trials, failures) = runner.run_with_progress(
        |index, rng| run_consumer_resource_trial(config, index, rng),
        on_trial_done,
    );

    Ok(ConsumerResourceEnsemble {
        temperatures: config.temperatures.clone(),
        supply_concentrations: config.supply_concentrations.clone(),
        trials,
        failures,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
