//! Integration tests for seeded GLV and consumer-resource ensembles.

use ribotherm_sim::simulation::{
    ConsumerResourceBuilder, GlvBuilder, GlvConfig, run_consumer_resource, run_glv,
};

fn small_config(seed: u64) -> GlvConfig {
    GlvBuilder::new()
        .num_species(10)
        .temperatures(vec![278.0, 287.0, 296.0])
        .duration(150.0)
        .trials(6)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn test_same_seed_identical_ensembles() {
    let a = run_glv(&small_config(2024)).unwrap();
    let b = run_glv(&small_config(2024)).unwrap();

    assert_eq!(a.trials, b.trials);
    assert_eq!(a.failures, b.failures);
    assert_eq!(a.mean_wmcn(), b.mean_wmcn());
    assert_eq!(a.mean_class_abundance(), b.mean_class_abundance());
}

#[test]
fn test_different_seeds_differ() {
    let a = run_glv(&small_config(1)).unwrap();
    let b = run_glv(&small_config(2)).unwrap();

    let copy_numbers_a: Vec<_> = a.trials.iter().map(|t| &t.copy_numbers).collect();
    let copy_numbers_b: Vec<_> = b.trials.iter().map(|t| &t.copy_numbers).collect();
    assert_ne!(copy_numbers_a, copy_numbers_b);
}

#[test]
fn test_result_independent_of_thread_count() {
    let config = small_config(77);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let single = pool.install(|| run_glv(&config)).unwrap();
    let default = run_glv(&config).unwrap();

    assert_eq!(single.trials, default.trials);
}

#[test]
fn test_class_abundance_matches_wmcn() {
    let ensemble = run_glv(&small_config(5)).unwrap();
    for trial in &ensemble.trials {
        for outcome in &trial.outcomes {
            let from_classes: f64 = outcome
                .class_abundance
                .iter()
                .enumerate()
                .map(|(i, share)| (i + 1) as f64 * share)
                .sum();
            let wmcn = outcome.wmcn.unwrap();
            assert!((from_classes - wmcn).abs() < 1e-9);
        }
    }
}

#[test]
fn test_high_p_lowers_mean_copy_number() {
    let low = GlvBuilder::new()
        .num_species(20)
        .p(0.2)
        .temperatures(vec![290.0])
        .duration(100.0)
        .trials(8)
        .seed(3)
        .build()
        .unwrap();
    let high = GlvConfig { p: 0.9, ..low.clone() };

    let mean_low = run_glv(&low).unwrap().mean_wmcn()[0].unwrap();
    let mean_high = run_glv(&high).unwrap().mean_wmcn()[0].unwrap();
    assert!(
        mean_high < mean_low,
        "p = 0.9 gave {mean_high}, p = 0.2 gave {mean_low}"
    );
}

#[test]
fn test_consumer_resource_reproducible() {
    let config = ConsumerResourceBuilder::new()
        .num_species(4)
        .num_resources(3)
        .temperatures(vec![280.0, 290.0])
        .supply_concentrations(vec![1.0, 4.0])
        .duration(100.0)
        .trials(3)
        .seed(8)
        .build()
        .unwrap();

    let a = run_consumer_resource(&config).unwrap();
    let b = run_consumer_resource(&config).unwrap();
    assert_eq!(a.trials, b.trials);
    assert_eq!(a.mean_wmgr(), b.mean_wmgr());
}
