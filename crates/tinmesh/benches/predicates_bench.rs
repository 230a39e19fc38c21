//! Criterion microbenches for the orientation/in-circle predicates.
//!
//! Focus cases: well-separated points (fast path only) versus near-collinear
//! / near-cocircular points (forces the compensated-precision fallback),
//! since that fallback is the cost the fast path exists to avoid.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::point;
use tinmesh::kernel::{in_circle, orientation, PredicateStats, Thresholds};

fn bench_orientation(c: &mut Criterion) {
    let mut group = c.benchmark_group("orientation");
    let t = Thresholds::from_nominal_spacing(1.0);

    group.bench_function(BenchmarkId::new("orientation", "well_separated"), |b| {
        let mut stats = PredicateStats::default();
        let a = point![0.0, 0.0];
        let bpt = point![1.0, 0.0];
        let cpt = point![0.3, 1.0];
        b.iter(|| orientation(a, bpt, cpt, &t, &mut stats));
    });

    group.bench_function(BenchmarkId::new("orientation", "near_collinear"), |b| {
        let mut stats = PredicateStats::default();
        let a = point![0.0, 0.0];
        let bpt = point![1.0, 0.0];
        let cpt = point![0.5, 1e-20];
        b.iter(|| orientation(a, bpt, cpt, &t, &mut stats));
    });

    group.finish();
}

fn bench_in_circle(c: &mut Criterion) {
    let mut group = c.benchmark_group("in_circle");
    let t = Thresholds::from_nominal_spacing(1.0);

    group.bench_function(BenchmarkId::new("in_circle", "well_separated"), |b| {
        let mut stats = PredicateStats::default();
        let a = point![1.0, 0.0];
        let bpt = point![0.0, 1.0];
        let cpt = point![-1.0, 0.0];
        let d = point![0.0, 0.0];
        b.iter(|| in_circle(a, bpt, cpt, d, &t, &mut stats));
    });

    group.bench_function(BenchmarkId::new("in_circle", "near_cocircular"), |b| {
        let mut stats = PredicateStats::default();
        let a = point![1.0, 0.0];
        let bpt = point![0.0, 1.0];
        let cpt = point![-1.0, 0.0];
        let d = point![0.0, -1.0 + 1e-15];
        b.iter(|| in_circle(a, bpt, cpt, d, &t, &mut stats));
    });

    group.finish();
}

criterion_group!(benches, bench_orientation, bench_in_circle);
criterion_main!(benches);
