use glam::DVec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use lost_core::IndexKind;
use lost_core::sim::shape::circle_circle;
use lost_core::sim::{Body, BodyId, BruteForce, CollisionIndex, Shape, SpatialIndex, resolve};

fn vec2(range: f64) -> impl Strategy<Value = DVec2> {
    (-range..range, -range..range).prop_map(|(x, y)| DVec2::new(x, y))
}

/// Integer grid points, so plenty of coordinates tie on a split axis
fn grid_point() -> impl Strategy<Value = DVec2> {
    (-8i32..8, -8i32..8).prop_map(|(x, y)| DVec2::new(x as f64 * 25.0, y as f64 * 25.0))
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

fn ball(id: u64, pos: DVec2, vel: DVec2, mass: f64) -> Body {
    Body::new(BodyId(id), pos, 0.0)
        .with_shape(Shape::circle(pos, 10.0))
        .with_mass(mass)
        .with_velocity(vel)
}

proptest! {
    #[test]
    fn circle_intersection_is_symmetric(
        c1 in vec2(100.0), r1 in 0.0f64..50.0,
        c2 in vec2(100.0), r2 in 0.0f64..50.0,
    ) {
        prop_assert_eq!(circle_circle(c1, r1, c2, r2), circle_circle(c2, r2, c1, r1));
        let (a, b) = (Shape::circle(c1, r1), Shape::circle(c2, r2));
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn resolve_conserves_momentum_and_energy(
        pa in vec2(50.0), pb in vec2(50.0),
        va in vec2(20.0), vb in vec2(20.0),
        ma in 0.1f64..100.0, mb in 0.1f64..100.0,
    ) {
        prop_assume!(pa.distance(pb) > 1e-3);
        let mut a = ball(1, pa, va, ma);
        let mut b = ball(2, pb, vb, mb);

        let momentum = va * ma + vb * mb;
        let energy = 0.5 * (ma * va.length_squared() + mb * vb.length_squared());

        let result = resolve(&mut a, &mut b, 0.8);
        prop_assert!(result.impulse);

        let after = a.velocity * ma + b.velocity * mb;
        let scale = 1.0 + momentum.length();
        prop_assert!((after - momentum).length() <= 1e-9 * scale * 100.0);

        let energy_after =
            0.5 * (ma * a.velocity.length_squared() + mb * b.velocity.length_squared());
        prop_assert!((energy_after - energy).abs() <= 1e-9 * (1.0 + energy) * 100.0);
    }

    #[test]
    fn trees_agree_with_brute_force(
        points in prop::collection::vec(vec2(500.0), 0..200),
        target in vec2(600.0),
        radius in 0.0f64..400.0,
        seed in any::<u64>(),
    ) {
        let brute = BruteForce::build(points.iter().copied().enumerate().map(|(i, p)| (p, i)));
        let expected = sorted(brute.query_within(target, radius));
        let mut rng = Pcg32::seed_from_u64(seed);
        for kind in IndexKind::ALL {
            let index = CollisionIndex::build(kind, points.iter().copied(), &mut rng);
            prop_assert_eq!(sorted(index.query_within(target, radius)), expected.clone());
        }
    }

    #[test]
    fn ties_on_split_planes_are_found(
        points in prop::collection::vec(grid_point(), 1..150),
        pick in any::<prop::sample::Index>(),
        radius in prop::sample::select(vec![0.0, 25.0, 50.0, 75.0]),
        seed in any::<u64>(),
    ) {
        // Querying from an indexed point with radii that land exactly on grid spacing
        let target = points[pick.index(points.len())];
        let brute = BruteForce::build(points.iter().copied().enumerate().map(|(i, p)| (p, i)));
        let expected = sorted(brute.query_within(target, radius));
        let mut rng = Pcg32::seed_from_u64(seed);
        for kind in IndexKind::ALL {
            let index = CollisionIndex::build(kind, points.iter().copied(), &mut rng);
            prop_assert_eq!(sorted(index.query_within(target, radius)), expected.clone());
        }
    }

    #[test]
    fn rebuilding_gives_the_same_answers(
        points in prop::collection::vec(vec2(300.0), 0..120),
        target in vec2(300.0),
        radius in 0.0f64..150.0,
        s1 in any::<u64>(),
        s2 in any::<u64>(),
    ) {
        for kind in IndexKind::ALL {
            let mut rng1 = Pcg32::seed_from_u64(s1);
            let mut rng2 = Pcg32::seed_from_u64(s2);
            let first = CollisionIndex::build(kind, points.iter().copied(), &mut rng1);
            let second = CollisionIndex::build(kind, points.iter().copied(), &mut rng2);
            prop_assert_eq!(
                sorted(first.query_within(target, radius)),
                sorted(second.query_within(target, radius))
            );
        }
    }
}
