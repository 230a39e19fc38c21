//! Criterion benchmarks for incremental vertex insertion.
//! Focus sizes: n in {100, 1_000, 10_000} random points inserted one at a
//! time into a fresh mesh, plus a single-vertex removal on a pre-built mesh
//! of the same sizes.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tinmesh::prelude::*;

fn random_points(n: usize, seed: u64) -> Vec<(f64, f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| (rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0), 0.0)).collect()
}

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");
    for &n in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("add_vertices", n), &n, |b, &n| {
            b.iter_batched(
                || (Mesh::new(MeshConfig::default()), random_points(n, 7)),
                |(mut mesh, points)| {
                    let _ids = mesh.add_vertices(&points, &NullMonitor);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_removal(c: &mut Criterion) {
    let mut group = c.benchmark_group("removal");
    for &n in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("remove_vertex", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut mesh = Mesh::new(MeshConfig::default());
                    let points = random_points(n, 11);
                    let ids = mesh.add_vertices(&points, &NullMonitor);
                    (mesh, ids[ids.len() / 2])
                },
                |(mut mesh, id)| {
                    mesh.remove_vertex(id);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insertion, bench_removal);
criterion_main!(benches);
