use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use stepkmeans::{
    generate_random_dataset, initialize, run_to_convergence, step, Dataset, GeneratorConfig,
    InitMethod, DEFAULT_MAX_ITERS,
};

fn dataset(n_samples: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    generate_random_dataset(&GeneratorConfig::default().with_count(n_samples), &mut rng).unwrap()
}

fn benchmark_step_varying_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_samples");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let k = 8;
    let sample_sizes = [50, 1_000, 10_000];

    for n_samples in sample_sizes.iter() {
        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_samples),
            n_samples,
            |b, &n_samples| {
                let data = dataset(n_samples);
                let mut rng = ChaCha8Rng::seed_from_u64(42);
                let centroids = initialize(&data, k, InitMethod::Random, None, &mut rng).unwrap();

                b.iter(|| step(black_box(&data), &centroids.view(), &mut rng).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_init_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("init_methods");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let data = dataset(5_000);
    let k = 20;

    for method in [InitMethod::Random, InitMethod::Farthest, InitMethod::KMeansPlusPlus] {
        group.bench_with_input(BenchmarkId::from_parameter(method), &method, |b, &method| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| initialize(black_box(&data), k, method, None, &mut rng).unwrap());
        });
    }
    group.finish();
}

fn benchmark_run_varying_clusters(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_clusters");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let data = dataset(2_000);
    let cluster_counts = [2, 8, 32];

    for k in cluster_counts.iter() {
        group.throughput(Throughput::Elements(*k as u64));
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, &k| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let initial =
                initialize(&data, k, InitMethod::KMeansPlusPlus, None, &mut rng).unwrap();

            b.iter(|| {
                run_to_convergence(
                    black_box(&data),
                    k,
                    &initial.view(),
                    DEFAULT_MAX_ITERS,
                    0.0,
                    &mut rng,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_step_varying_samples,
    benchmark_init_methods,
    benchmark_run_varying_clusters,
);

criterion_main!(benches);
