//! End-to-end: simulate a grid, write and reload it, then fit `p`.

use ribotherm_sim::errors::FitError;
use ribotherm_sim::fitting::{BootstrapConfig, BootstrapFitter, Observation, round_to_nearest};
use ribotherm_sim::simulation::{GlvBuilder, SimulationGrid};

fn simulated_grid() -> SimulationGrid {
    let config = GlvBuilder::new()
        .num_species(12)
        .temperatures(vec![278.0, 284.0, 290.0, 296.0])
        .duration(150.0)
        .trials(4)
        .seed(11)
        .build()
        .unwrap();
    SimulationGrid::from_glv_sweep(&config, &[0.2, 0.5, 0.8]).unwrap()
}

#[test]
fn test_grid_csv_round_trip_on_disk() {
    let grid = simulated_grid();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.csv");

    grid.write_csv(&path).unwrap();
    let back = SimulationGrid::read_csv(&path).unwrap();

    assert_eq!(back.len(), grid.len());
    for entry in grid.entries() {
        let reloaded = back.get(entry.temperature, entry.p).unwrap();
        assert!((reloaded - entry.wmcn).abs() < 1e-12);
    }
}

#[test]
fn test_fit_recovers_generating_p() {
    let grid = simulated_grid();
    let observations: Vec<Observation> = grid
        .temperatures()
        .into_iter()
        .enumerate()
        .map(|(i, t)| Observation::new(format!("sample{i}"), grid.get(t, 0.5).unwrap(), t).unwrap())
        .collect();

    let fitter =
        BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(30, Some(5))).unwrap();
    let result = fitter.fit(&observations).unwrap();

    assert!((result.mean_p - 0.5).abs() < 1e-12);
    assert!(result.sd_p.abs() < 1e-12);
    assert!(result.mean_min_error.abs() < 1e-12);
    assert_eq!(round_to_nearest(result.mean_p, &grid.p_values()), Some(0.5));

    let curve = grid.predict(0.5, &grid.temperatures());
    assert!(curve.iter().all(Option::is_some));
}

#[test]
fn test_fit_fails_on_uncovered_temperature() {
    let grid = simulated_grid();
    let observations = vec![
        Observation::new("cold", 3.0, 5.0).unwrap(),
        Observation::new("odd", 3.0, 7.25).unwrap(),
    ];
    let fitter =
        BootstrapFitter::with_grid_candidates(&grid, BootstrapConfig::new(10, Some(1))).unwrap();

    assert!(matches!(
        fitter.fit(&observations),
        Err(FitError::MissingGridEntry { .. })
    ));
}

#[test]
fn test_fit_is_thread_count_independent() {
    let grid = simulated_grid();
    let observations: Vec<Observation> = grid
        .temperatures()
        .into_iter()
        .map(|t| Observation::new(format!("t{t}"), 2.5, t).unwrap())
        .collect();
    let config = BootstrapConfig::new(25, Some(99));

    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let single = pool
        .install(|| {
            BootstrapFitter::with_grid_candidates(&grid, config.clone())
                .unwrap()
                .fit(&observations)
        })
        .unwrap();
    let parallel = BootstrapFitter::with_grid_candidates(&grid, config)
        .unwrap()
        .fit(&observations)
        .unwrap();

    assert_eq!(single, parallel);
}
