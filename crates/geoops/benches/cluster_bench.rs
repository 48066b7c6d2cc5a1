//! Criterion benchmarks for greedy point clustering.
//! Focus sizes: point count n in {100, 1000, 5000}.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::Point;
use geoops::cluster::{group_by_centroid_distance, group_by_distance};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Points scattered over roughly 10 km around a city center.
fn scattered(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Point::new(
                116.40 + rng.gen_range(-0.05..0.05),
                39.90 + rng.gen_range(-0.05..0.05),
            )
        })
        .collect()
}

fn bench_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");
    group.sample_size(20);
    for &n in &[100usize, 1000, 5000] {
        let points = scattered(n, 7);
        group.bench_with_input(BenchmarkId::new("first_point", n), &points, |b, pts| {
            b.iter(|| group_by_distance(pts, 500.0))
        });
        group.bench_with_input(BenchmarkId::new("centroid", n), &points, |b, pts| {
            b.iter(|| group_by_centroid_distance(pts, 500.0))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cluster);
criterion_main!(benches);
