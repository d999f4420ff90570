//! End-to-end checks on a populated level

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use lost_core::sim::{Body, BodyId, CollisionIndex, SimEvent, SpatialIndex, Unbounded, World};
use lost_core::{IndexKind, SimSettings, point_within};

const COUNT: usize = 1_000;
const RADIUS: f64 = 10.0;
const LEVEL: f64 = 1_000.0;

fn level_points(seed: u64) -> Vec<DVec2> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..COUNT).map(|_| point_within(&mut rng, LEVEL)).collect()
}

fn brute_pairs(points: &[DVec2]) -> Vec<(usize, usize)> {
    let reach = 2.0 * RADIUS;
    let mut pairs = Vec::new();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if points[i].distance_squared(points[j]) <= reach * reach {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[test]
fn test_index_pairs_match_brute_force() {
    let points = level_points(42);
    let expected = brute_pairs(&points);
    assert!(!expected.is_empty(), "level too sparse to mean anything");

    let mut rng = Pcg32::seed_from_u64(7);
    for kind in IndexKind::ALL {
        let index = CollisionIndex::build(kind, points.iter().copied(), &mut rng);
        let mut found = Vec::new();
        let mut pairs = Vec::new();
        for (i, p) in points.iter().enumerate() {
            found.clear();
            index.query_within_into(*p, 2.0 * RADIUS, &mut found);
            pairs.extend(found.iter().filter(|&&j| j > i).map(|&j| (i, j)));
        }
        pairs.sort_unstable();
        assert_eq!(pairs, expected, "{} pair set differs", kind.as_str());
    }
}

#[test]
fn test_world_contacts_match_brute_force() {
    let points = level_points(43);
    let expected = brute_pairs(&points).len();

    for kind in IndexKind::ALL {
        // No overlap push, so every contact test in the first tick sees spawn positions
        let settings = SimSettings {
            overlap_softening: 0.0,
            stats_interval: 0,
            ..SimSettings::with_index(kind)
        };
        let mut world = World::new(settings).with_boundary(Box::new(Unbounded));
        for p in &points {
            let id = world.next_id();
            world.add_body(Body::new(id, *p, 0.0));
        }

        let stats = world.tick();
        assert_eq!(stats.live, COUNT);
        assert_eq!(stats.spawned, COUNT);
        assert_eq!(stats.contacts, expected, "{}", kind.as_str());

        let collisions: Vec<(BodyId, BodyId)> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::Collided { a, b } => Some((a, b)),
                _ => None,
            })
            .collect();
        assert_eq!(collisions.len(), expected);
        assert!(collisions.iter().all(|(a, b)| a < b));
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let run = || {
        let mut world = World::new(SimSettings {
            stats_interval: 0,
            ..SimSettings::default()
        });
        for p in level_points(44).into_iter().take(300) {
            let id = world.next_id();
            world.add_body(Body::rock(id, p).with_velocity(p.perp().normalize_or_zero() * 3.0));
        }
        for _ in 0..50 {
            world.tick();
        }
        world
            .bodies()
            .iter()
            .map(|b| (b.id(), b.position, b.velocity))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_shots_clear_rocks_over_time() {
    let mut world = World::new(SimSettings {
        stats_interval: 0,
        ..SimSettings::with_index(IndexKind::Insertion)
    });
    let mut rocks = Vec::new();
    for i in 0..5 {
        let id = world.next_id();
        rocks.push(world.add_body(Body::rock(id, DVec2::new(100.0 + i as f64 * 50.0, 0.0))));
    }
    world.tick();

    // One shot per rock, fired along +x from just in front of it
    for i in 0..5 {
        let id = world.next_id();
        let origin = DVec2::new(100.0 + i as f64 * 50.0 - 15.0, 0.0);
        world.add_body(Body::shot(id, origin, 0.0, 10.0, 1, 15));
    }
    for _ in 0..5 {
        world.tick();
    }

    for id in rocks {
        assert!(world.body(id).is_none(), "rock {id} survived");
    }
    assert!(world.bodies().iter().all(|b| b.kind != lost_core::sim::BodyKind::Shot));
}
