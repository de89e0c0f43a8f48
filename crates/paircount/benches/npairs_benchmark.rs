use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use paircount::{
    CountConfig, CountConfigBuilder, Domain, IsolationRadius, npairs_3d, npairs_xy_z,
    spherical_isolation,
};
use paircount_test::Catalog;

const LENGTH: f64 = 100.0;

fn configs() -> [(&'static str, CountConfig); 2] {
    [
        (
            "serial",
            CountConfigBuilder::new().num_threads(1).build().unwrap(),
        ),
        ("rayon", CountConfig::default()),
    ]
}

fn bench_npairs(c: &mut Criterion) {
    let domain = Domain::periodic_cube(LENGTH).unwrap();
    let rbins = [1.0, 2.5, 5.0, 10.0];

    let mut group = c.benchmark_group("npairs_3d");
    for n_points in [1_000usize, 10_000, 50_000] {
        let catalog = Catalog::from_random(n_points, [LENGTH; 3], 1, 2525365464_u64);
        group.throughput(Throughput::Elements(n_points as u64));
        for (name, config) in configs() {
            group.bench_with_input(
                BenchmarkId::new(name, n_points),
                &catalog,
                |b, catalog: &Catalog| {
                    b.iter(|| npairs_3d(&catalog.points(), None, &rbins, &domain, &config))
                },
            );
        }
    }
    group.finish();
}

fn bench_projected(c: &mut Criterion) {
    let domain = Domain::periodic_cube(LENGTH).unwrap();
    let rp_bins = [1.0, 2.0, 4.0];
    let pi_bins = [5.0, 10.0, 20.0];
    let catalog = Catalog::from_random(20_000, [LENGTH; 3], 1, 77);

    let mut group = c.benchmark_group("projected");
    for (name, config) in configs() {
        group.bench_function(BenchmarkId::new("npairs_xy_z", name), |b| {
            b.iter(|| npairs_xy_z(&catalog.points(), None, &rp_bins, &pi_bins, &domain, &config))
        });
        group.bench_function(BenchmarkId::new("spherical_isolation", name), |b| {
            b.iter(|| {
                spherical_isolation(
                    &catalog.points(),
                    None,
                    IsolationRadius::Uniform(2.0),
                    &domain,
                    &config,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_npairs, bench_projected);
criterion_main!(benches);
