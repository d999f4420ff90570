//! Lost Core entry point
//!
//! Native harness comparing the broad-phase indices against a brute-force scan, then
//! running a short world simulation with each index.
//!
//! Usage: `lost-core [settings.json] [bodies] [radius]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lost_core::SimSettings;

    env_logger::init();
    log::info!("Lost Core (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) => SimSettings::load_or_default(path),
        None => SimSettings::default(),
    };
    if let Err(e) = settings.validate() {
        log::error!("Invalid settings: {e}");
        std::process::exit(2);
    }

    let sizes: Vec<usize> = match args.get(1).and_then(|s| s.parse().ok()) {
        Some(n) => vec![n],
        None => vec![100, 1_000, 10_000, 20_000],
    };
    let radii: Vec<f64> = match args.get(2).and_then(|s| s.parse().ok()) {
        Some(r) => vec![r],
        None => vec![1_000.0, 2_500.0, 5_000.0],
    };

    println!("\nComparing broad-phase indices...");
    harness::compare_indices(&settings, &sizes, &radii);

    println!("\nRunning world simulation...");
    harness::run_worlds(&settings, 1_000, 300);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core has no browser entry point
}

#[cfg(not(target_arch = "wasm32"))]
mod harness {
    use std::time::{Duration, Instant};

    use glam::DVec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use lost_core::sim::{Body, BruteForce, KdTree, MedianTree, SpatialIndex, World};
    use lost_core::{IndexKind, SimSettings, point_within};

    /// Ordered neighbor pairs `(i, j)` with `i < j` found by querying around every point
    fn count_pairs(index: &impl SpatialIndex<usize>, points: &[DVec2], radius: f64) -> usize {
        let mut found = Vec::new();
        let mut pairs = 0;
        for (i, p) in points.iter().enumerate() {
            found.clear();
            index.query_within_into(*p, radius, &mut found);
            pairs += found.iter().filter(|&&j| j > i).count();
        }
        pairs
    }

    fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
        let start = Instant::now();
        let out = f();
        (out, start.elapsed())
    }

    fn ms(d: Duration) -> f64 {
        d.as_secs_f64() * 1000.0
    }

    pub fn compare_indices(settings: &SimSettings, sizes: &[usize], radii: &[f64]) {
        let mut rng = Pcg32::seed_from_u64(settings.seed);

        for &n in sizes {
            for &level in radii {
                let points: Vec<DVec2> = (0..n).map(|_| point_within(&mut rng, level)).collect();
                let items = || points.iter().copied().enumerate().map(|(i, p)| (p, i));
                let query = lost_core::consts::DEFAULT_EFFECT_RANGE;

                let (brute, brute_build) = timed(|| BruteForce::build(items()));
                let (kd, kd_build) = timed(|| KdTree::build_by_insertion(items()));
                let (median, median_build) =
                    timed(|| MedianTree::build(items().collect(), &mut rng));

                // The quadratic scan gets slow; skip it past the point where it adds nothing.
                let (expected, brute_query) = if n <= 10_000 {
                    let (count, t) = timed(|| count_pairs(&brute, &points, query));
                    (Some(count), t)
                } else {
                    (None, Duration::ZERO)
                };
                let (kd_pairs, kd_query) = timed(|| count_pairs(&kd, &points, query));
                let (median_pairs, median_query) = timed(|| count_pairs(&median, &points, query));

                println!(
                    "n={n:>6} level={level:>6} | brute {:>8.2}+{:>9.2}ms | kd {:>7.2}+{:>8.2}ms depth {:>5} | median {:>7.2}+{:>8.2}ms depth {:>3} | pairs {kd_pairs}",
                    ms(brute_build),
                    ms(brute_query),
                    ms(kd_build),
                    ms(kd_query),
                    kd.depth(),
                    ms(median_build),
                    ms(median_query),
                    median.depth(),
                );

                if kd_pairs != median_pairs || expected.is_some_and(|e| e != kd_pairs) {
                    log::error!(
                        "Pair counts disagree: brute={expected:?} kd={kd_pairs} median={median_pairs}"
                    );
                }
            }
        }
    }

    pub fn run_worlds(settings: &SimSettings, bodies: usize, ticks: u64) {
        for kind in IndexKind::ALL {
            let mut world = World::new(SimSettings {
                index: kind,
                ..settings.clone()
            });
            let mut rng = Pcg32::seed_from_u64(settings.seed);
            for _ in 0..bodies {
                let id = world.next_id();
                let pos = point_within(&mut rng, settings.level_radius);
                let vel = point_within(&mut rng, 2.0);
                world.add_body(Body::rock(id, pos).with_velocity(vel));
            }

            let mut contacts = 0;
            let (_, elapsed) = timed(|| {
                for _ in 0..ticks {
                    contacts += world.tick().contacts;
                    world.drain_events();
                }
            });
            println!(
                "{:>9}: {ticks} ticks in {:.1}ms, {contacts} contacts, {} bodies left",
                kind.as_str(),
                ms(elapsed),
                world.len()
            );
        }
    }
}
