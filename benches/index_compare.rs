use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use lost_core::sim::{Body, BruteForce, KdTree, MedianTree, SpatialIndex, World};
use lost_core::{IndexKind, SimSettings, point_within};

const SIZES: [usize; 3] = [100, 1_000, 10_000];
const LEVEL_RADIUS: f64 = 1_000.0;
const QUERY_RADIUS: f64 = 20.0;

/// Deterministic point cloud; benchmarks must not depend on OS randomness.
fn cloud(n: usize) -> Vec<(DVec2, usize)> {
    let mut rng = Pcg32::seed_from_u64(0x1057 ^ n as u64);
    (0..n).map(|i| (point_within(&mut rng, LEVEL_RADIUS), i)).collect()
}

fn query_all(index: &impl SpatialIndex<usize>, items: &[(DVec2, usize)]) -> usize {
    let mut out = Vec::new();
    for (pos, _) in items {
        index.query_within_into(*pos, QUERY_RADIUS, &mut out);
    }
    out.len()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/build");
    for n in SIZES {
        let items = cloud(n);
        group.bench_with_input(BenchmarkId::new("insertion", n), &items, |b, items| {
            b.iter(|| black_box(KdTree::build_by_insertion(items.iter().copied())));
        });
        group.bench_with_input(BenchmarkId::new("median", n), &items, |b, items| {
            let mut rng = Pcg32::seed_from_u64(7);
            b.iter_batched(
                || items.clone(),
                |items| black_box(MedianTree::build(items, &mut rng)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/query_all");
    for n in SIZES {
        let items = cloud(n);
        let kd = KdTree::build_by_insertion(items.iter().copied());
        let median = MedianTree::build(items.clone(), &mut Pcg32::seed_from_u64(7));

        group.bench_function(BenchmarkId::new("insertion", n), |b| {
            b.iter(|| black_box(query_all(&kd, &items)));
        });
        group.bench_function(BenchmarkId::new("median", n), |b| {
            b.iter(|| black_box(query_all(&median, &items)));
        });
        if n <= 1_000 {
            let brute = BruteForce::build(items.iter().copied());
            group.bench_function(BenchmarkId::new("brute", n), |b| {
                b.iter(|| black_box(query_all(&brute, &items)));
            });
        }
    }
    group.finish();
}

fn bench_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world/tick");
    for kind in IndexKind::ALL {
        group.bench_function(BenchmarkId::new(kind.as_str(), 1_000), |b| {
            b.iter_batched(
                || {
                    let mut world = World::new(SimSettings {
                        stats_interval: 0,
                        ..SimSettings::with_index(kind)
                    });
                    for (pos, _) in cloud(1_000) {
                        let id = world.next_id();
                        world.add_body(Body::rock(id, pos));
                    }
                    world.tick();
                    world
                },
                |mut world| black_box(world.tick()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_world_tick);
criterion_main!(benches);
