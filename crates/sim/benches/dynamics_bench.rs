use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use ribotherm_sim::dynamics::{Arrhenius, ConsumerResource, DormandPrince, LotkaVolterra};
use ribotherm_sim::traits::{CopyNumberSampler, sample_competition_matrix, sample_uptake_rates};

fn bench_glv_integration(c: &mut Criterion) {
    let mut group = c.benchmark_group("glv_integration");

    for &n in &[10usize, 50, 100] {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let sampler = CopyNumberSampler::new(0.8, 10).unwrap();
        let copy_numbers: Vec<f64> = sampler
            .sample_community(n, &mut rng)
            .into_iter()
            .map(f64::from)
            .collect();
        let alpha = sample_competition_matrix(n, 0.5, 0.25, &mut rng).unwrap();
        let rates = Arrhenius::LOTKA_VOLTERRA.scale(&copy_numbers, 290.0);
        let solver = DormandPrince::default();
        let initial = vec![0.01; n];

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("species", n), &n, |b, _| {
            b.iter(|| {
                let system = LotkaVolterra::new(rates.clone(), &alpha, 0.05);
                black_box(solver.integrate(&system, (0.0, 800.0), &initial))
            })
        });
    }

    group.finish();
}

fn bench_consumer_resource_integration(c: &mut Criterion) {
    let mut group = c.benchmark_group("consumer_resource_integration");

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let uptake = sample_uptake_rates(15, 10, 0.5e5, 3e5, &mut rng).unwrap();
    let rates = uptake.scaled(Arrhenius::CONSUMER_RESOURCE.factor(290.0) / 10.0);
    let system = ConsumerResource::with_uniform_supply(rates, 0.1, 2.0);
    let initial = system.initial_state(0.1);
    let solver = DormandPrince::default();

    group.bench_function("15x10", |b| {
        b.iter(|| black_box(solver.integrate(&system, (0.0, 1000.0), &initial)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_glv_integration,
    bench_consumer_resource_integration
);
criterion_main!(benches);
