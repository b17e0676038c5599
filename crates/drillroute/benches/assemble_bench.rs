//! Criterion benchmarks for pose-graph assembly.
//!
//! Street poses on jittered parallel lanes, no holes, so the time is the
//! pairwise edge test. Compares the R-tree prefilter with exhaustive pairing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drillroute::api::{assemble, AssemblyCfg, AssemblyInput, NoProgress, Progress};
use drillroute::geom::{BlockedGeometry, Polygon, Pose};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn lanes(poses: usize, seed: u64) -> Vec<Vec<Pose>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let per_lane = poses / 4;
    (0..4)
        .map(|lane| {
            (0..per_lane)
                .map(|k| {
                    Pose::new(
                        k as f64 * 0.5 + rng.gen_range(-0.05..0.05),
                        lane as f64 * 12.0 + rng.gen_range(-0.2..0.2),
                        rng.gen_range(-0.1..0.1),
                    )
                })
                .collect()
        })
        .collect()
}

fn bench_assemble(c: &mut Criterion) {
    let fence = Polygon::rect(-10.0, -10.0, 1000.0, 60.0);
    let obstacles = [Polygon::rect(20.0, 2.0, 24.0, 10.0)];
    let blocked = BlockedGeometry::build(&[], &obstacles, &fence, 0.75);
    let mut group = c.benchmark_group("assemble");
    group.sample_size(10);
    for &n in &[200usize, 800, 2000] {
        let streets = lanes(n, 7);
        let input = AssemblyInput {
            home: Pose::new(-2.0, 0.0, 0.0),
            street_poses: &streets,
            transit_poses: &[],
            holes: &[],
            blocked: &blocked,
        };
        for (name, indexed) in [("rtree", true), ("exhaustive", false)] {
            let cfg = AssemblyCfg {
                use_spatial_index: indexed,
                ..AssemblyCfg::default()
            };
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                b.iter(|| {
                    let graph = assemble(&input, &cfg, &Progress::new(&NoProgress));
                    black_box(graph.map(|g| g.edges.len()).unwrap_or(0))
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
