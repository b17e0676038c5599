//! Criterion benchmarks for street fitting.
//! Sizes: street length in {20, 60, 150} (points at unit spacing), with
//! random holes scattered around the street.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use drillroute::api::{fit_curve, FitCfg};
use drillroute::geom::{select_near, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn street_and_holes(len: usize, seed: u64) -> (Vec<Vec2>, Vec<Vec2>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let street: Vec<Vec2> = (0..=len)
        .map(|k| Vec2::new(k as f64, 0.3 * (k as f64 / 7.0).sin()))
        .collect();
    let holes: Vec<Vec2> = (0..len / 2)
        .map(|_| Vec2::new(rng.gen_range(0.0..len as f64), rng.gen_range(3.0..9.0)))
        .collect();
    (street, holes)
}

fn bench_fit(c: &mut Criterion) {
    let cfg = FitCfg::default();
    let mut group = c.benchmark_group("fit_curve");
    group.sample_size(10);
    for &len in &[20usize, 60, 150] {
        group.bench_with_input(BenchmarkId::new("holes_only", len), &len, |b, &len| {
            b.iter_batched(
                || {
                    let (street, holes) = street_and_holes(len, 11);
                    let near = select_near(&street, &holes, cfg.hole_radius);
                    (street, near)
                },
                |(street, near)| black_box(fit_curve(&street, &near, &[], &[], &cfg)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit);
criterion_main!(benches);
