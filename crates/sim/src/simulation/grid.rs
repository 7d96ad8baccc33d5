//! Precomputed simulation grid: mean simulated WMCN per (temperature, p).
//!
//! Keys are rounded to 2 decimals in temperature (Celsius) and 4 decimals in
//! `p`, so lookups with observed temperatures tolerate float noise. Ties
//! round to even, so 10.125 °C shares a key with 10.12 °C.

use crate::dynamics::kelvin_to_celsius;
use crate::errors::GridError;
use crate::simulation::{GlvConfig, GlvEnsemble, run_glv_with_progress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// One row of the grid CSV (`Temperature,p,WMCN`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    /// Temperature in Celsius
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    pub p: f64,
    #[serde(rename = "WMCN")]
    pub wmcn: f64,
}

type GridKey = (i64, i64);

#[inline]
fn grid_key(temperature: f64, p: f64) -> GridKey {
    (
        (temperature * 100.0).round_ties_even() as i64,
        (p * 10_000.0).round_ties_even() as i64,
    )
}

/// Read-only lookup table produced by GLV sweeps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationGrid {
    entries: BTreeMap<GridKey, GridEntry>,
}

impl SimulationGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value; a second value for the same rounded key is an error.
    ///
    /// # Errors
    /// `NonFiniteEntry` if any of the three values is NaN or infinite;
    /// `DuplicateEntry` if the rounded key is already present.
    pub fn insert(&mut self, temperature: f64, p: f64, wmcn: f64) -> Result<(), GridError> {
        if !(temperature.is_finite() && p.is_finite() && wmcn.is_finite()) {
            return Err(GridError::NonFiniteEntry {
                temperature,
                p,
                wmcn,
            });
        }
        let key = grid_key(temperature, p);
        if self.entries.contains_key(&key) {
            return Err(GridError::DuplicateEntry { temperature, p });
        }
        self.entries.insert(
            key,
            GridEntry {
                temperature,
                p,
                wmcn,
            },
        );
        Ok(())
    }

    /// Mean simulated WMCN at `(temperature, p)` after rounding.
    pub fn get(&self, temperature: f64, p: f64) -> Option<f64> {
        self.entries.get(&grid_key(temperature, p)).map(|e| e.wmcn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by temperature, then p.
    pub fn entries(&self) -> impl Iterator<Item = &GridEntry> {
        self.entries.values()
    }

    /// Distinct temperatures, ascending.
    pub fn temperatures(&self) -> Vec<f64> {
        let mut seen: BTreeMap<i64, f64> = BTreeMap::new();
        for (&(t, _), entry) in &self.entries {
            seen.entry(t).or_insert(entry.temperature);
        }
        seen.into_values().collect()
    }

    /// Distinct p values, ascending.
    pub fn p_values(&self) -> Vec<f64> {
        let mut seen: BTreeMap<i64, f64> = BTreeMap::new();
        for (&(_, p), entry) in &self.entries {
            seen.entry(p).or_insert(entry.p);
        }
        seen.into_values().collect()
    }

    /// Predicted WMCN curve for one `p` over the given temperatures.
    pub fn predict(&self, p: f64, temperatures: &[f64]) -> Vec<Option<f64>> {
        temperatures.iter().map(|&t| self.get(t, p)).collect()
    }

    /// Run one GLV ensemble per `p` and store the mean WMCN per temperature.
    ///
    /// `config.p` is overridden by each value of `p_values`.
    pub fn from_glv_sweep(config: &GlvConfig, p_values: &[f64]) -> Result<Self, GridError> {
        Self::from_glv_sweep_with_progress(config, p_values, || {}, |_, _| {})
    }

    /// Like [`from_glv_sweep`](Self::from_glv_sweep), calling `on_trial_done`
    /// after every trial and handing each finished ensemble to `on_ensemble`
    /// once its means are stored.
    pub fn from_glv_sweep_with_progress<P, E>(
        config: &GlvConfig,
        p_values: &[f64],
        on_trial_done: P,
        mut on_ensemble: E,
    ) -> Result<Self, GridError>
    where
        P: Fn() + Sync,
        E: FnMut(f64, &GlvEnsemble),
    {
        let mut grid = Self::new();
        for &p in p_values {
            let sweep_config = GlvConfig {
                p,
                ..config.clone()
            };
            let ensemble = run_glv_with_progress(&sweep_config, &on_trial_done)?;
            grid.insert_ensemble(p, &ensemble)?;
            on_ensemble(p, &ensemble);
        }
        Ok(grid)
    }

    /// Store the mean WMCN per temperature of one ensemble under `p`.
    ///
    /// Temperatures are converted to Celsius. Temperatures at which no trial
    /// had living biomass are skipped with a warning.
    ///
    /// # Errors
    /// `EmptyEnsemble` if every trial failed; `DuplicateEntry` if `p` was
    /// already stored for one of the temperatures.
    pub fn insert_ensemble(&mut self, p: f64, ensemble: &GlvEnsemble) -> Result<(), GridError> {
        if ensemble.trials.is_empty() {
            return Err(GridError::EmptyEnsemble { p });
        }
        if !ensemble.failures.is_empty() {
            log::warn!(
                "p = {p}: {} of {} trials failed and were excluded",
                ensemble.failures.len(),
                ensemble.failures.len() + ensemble.trials.len()
            );
        }

        for (&kelvin, mean) in ensemble.temperatures.iter().zip(ensemble.mean_wmcn()) {
            match mean {
                Some(wmcn) => self.insert(kelvin_to_celsius(kelvin), p, wmcn)?,
                None => log::warn!("p = {p}, T = {kelvin} K: no trial had living biomass"),
            }
        }
        Ok(())
    }

    /// Read a `Temperature,p,WMCN` CSV.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, GridError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut grid = Self::new();
        for row in csv_reader.deserialize() {
            let entry: GridEntry = row?;
            grid.insert(entry.temperature, entry.p, entry.wmcn)?;
        }
        Ok(grid)
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), GridError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for entry in self.entries() {
            csv_writer.serialize(entry)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let file = std::fs::File::create(path)?;
        self.to_writer(io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::GlvBuilder;

    fn sample_grid() -> SimulationGrid {
        let mut grid = SimulationGrid::new();
        for (t, base) in [(5.0, 3.0), (10.0, 2.5), (15.0, 2.0)] {
            for p in [0.2, 0.5, 0.8] {
                grid.insert(t, p, base - p).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_lookup_rounds_keys() {
        let grid = sample_grid();
        assert_eq!(grid.get(10.0, 0.5), Some(2.0));
        assert_eq!(grid.get(10.001, 0.50001), Some(2.0));
        assert_eq!(grid.get(10.01, 0.5), None);
        assert_eq!(grid.get(10.0, 0.5001), None);
    }

    #[test]
    fn test_lookup_rounds_ties_to_even() {
        let mut grid = SimulationGrid::new();
        grid.insert(10.12, 0.5, 2.0).unwrap();
        grid.insert(10.38, 0.5, 1.5).unwrap();

        // 10.125 and 10.375 are exact in binary, so both are true ties.
        assert_eq!(grid.get(10.125, 0.5), Some(2.0));
        assert_eq!(grid.get(10.375, 0.5), Some(1.5));
        assert_eq!(grid.get(10.13, 0.5), None);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut grid = SimulationGrid::new();
        for (t, p, wmcn) in [
            (10.0, 0.5, f64::NAN),
            (f64::INFINITY, 0.5, 2.0),
            (10.0, f64::NAN, 2.0),
        ] {
            assert!(matches!(
                grid.insert(t, p, wmcn),
                Err(GridError::NonFiniteEntry { .. })
            ));
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut grid = sample_grid();
        let err = grid.insert(5.004, 0.2, 1.0).unwrap_err();
        assert!(matches!(err, GridError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_axes() {
        let grid = sample_grid();
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.temperatures(), vec![5.0, 10.0, 15.0]);
        assert_eq!(grid.p_values(), vec![0.2, 0.5, 0.8]);
    }

    #[test]
    fn test_predict() {
        let grid = sample_grid();
        assert_eq!(
            grid.predict(0.8, &[5.0, 15.0, 20.0]),
            vec![Some(3.0 - 0.8), Some(2.0 - 0.8), None]
        );
    }

    #[test]
    fn test_csv_round_trip() {
        let grid = sample_grid();
        let mut buffer = Vec::new();
        grid.to_writer(&mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Temperature,p,WMCN\n"));

        let back = SimulationGrid::from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_csv_duplicate_row_rejected() {
        let csv = "Temperature,p,WMCN\n5.0,0.2,1.0\n5.0,0.2,1.5\n";
        assert!(matches!(
            SimulationGrid::from_reader(csv.as_bytes()),
            Err(GridError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_csv_malformed_row() {
        let csv = "Temperature,p,WMCN\nwarm,0.2,1.0\n";
        let err = SimulationGrid::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, GridError::Csv(_)));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<csv::Error>().is_some());
    }

    #[test]
    fn test_csv_nan_row_rejected() {
        let csv = "Temperature,p,WMCN\n5.0,0.2,1.0\n10.0,0.2,NaN\n";
        assert!(matches!(
            SimulationGrid::from_reader(csv.as_bytes()),
            Err(GridError::NonFiniteEntry { temperature, .. }) if temperature == 10.0
        ));
    }

    #[test]
    fn test_from_glv_sweep_uses_celsius() {
        let config = GlvBuilder::new()
            .num_species(5)
            .temperatures(vec![278.0, 290.0])
            .duration(100.0)
            .trials(2)
            .seed(17)
            .build()
            .unwrap();
        let grid = SimulationGrid::from_glv_sweep(&config, &[0.3, 0.7]).unwrap();

        assert_eq!(grid.temperatures(), vec![5.0, 17.0]);
        assert_eq!(grid.p_values(), vec![0.3, 0.7]);
        assert!(grid.get(5.0, 0.3).is_some());
    }

    #[test]
    fn test_sweep_reports_each_ensemble() {
        let config = GlvBuilder::new()
            .num_species(4)
            .temperatures(vec![280.0])
            .duration(50.0)
            .trials(2)
            .seed(5)
            .build()
            .unwrap();
        let trials_done = std::sync::atomic::AtomicUsize::new(0);
        let mut seen = Vec::new();
        let grid = SimulationGrid::from_glv_sweep_with_progress(
            &config,
            &[0.2, 0.6],
            || {
                trials_done.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            },
            |p, ensemble| seen.push((p, ensemble.trials.len() + ensemble.failures.len())),
        )
        .unwrap();

        assert_eq!(seen, vec![(0.2, 2), (0.6, 2)]);
        assert_eq!(trials_done.into_inner(), 4);
        assert_eq!(grid.p_values(), vec![0.2, 0.6]);
    }

    #[test]
    fn test_insert_ensemble_all_failed() {
        let ensemble = GlvEnsemble {
            temperatures: vec![278.0],
            max_copy_number: 10,
            trials: Vec::new(),
            failures: vec![crate::simulation::TrialFailure {
                trial: 0,
                error: crate::errors::SimulationError::InvalidParameter("boom".into()),
            }],
        };
        let mut grid = SimulationGrid::new();
        assert!(matches!(
            grid.insert_ensemble(0.5, &ensemble),
            Err(GridError::EmptyEnsemble { .. })
        ));
        assert!(grid.is_empty());
    }
}
