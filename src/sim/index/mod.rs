//! Broad-phase spatial indices
//!
//! Two interchangeable 2D partition trees answer "every item within `radius` of
//! `point`":
//! - [`KdTree`]: grown by inserting items one at a time, never rebalanced
//! - [`MedianTree`]: rebuilt from scratch around randomly chosen pivots
//!
//! Neither wins at every population size, so both are kept and benchmarked against
//! each other (see `benches/index_compare.rs` and the `lost-core` binary). Results are
//! exact on `distance <= radius`, free of duplicates and in no particular order.
//! Tree walks use an explicit stack; a degenerate tree is a linear chain and must not
//! overflow the call stack.

pub mod kd;
pub mod median;

pub use kd::KdTree;
pub use median::MedianTree;

use glam::DVec2;
use rand::Rng;

use crate::settings::IndexKind;

/// Common query contract of every spatial index
pub trait SpatialIndex<T: Copy> {
    /// Append every item within `radius` of `point` to `out`.
    ///
    /// A negative (or NaN) radius matches nothing.
    fn query_within_into(&self, point: DVec2, radius: f64, out: &mut Vec<T>);

    /// Every item within `radius` of `point`
    fn query_within(&self, point: DVec2, radius: f64) -> Vec<T> {
        let mut out = Vec::new();
        self.query_within_into(point, radius, &mut out);
        out
    }

    /// Number of indexed items
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splitting axis of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The axis children of a node split on
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Coordinate of `v` along this axis
    #[inline]
    pub fn of(self, v: DVec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }
}

/// Tree node shared by both partition trees.
///
/// Items strictly below the node on `axis` live under `below`, the rest (ties
/// included) under `above`.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub pos: DVec2,
    pub axis: Axis,
    pub item: T,
    pub below: Option<usize>,
    pub above: Option<usize>,
}

/// Radius accepted by queries: non-negative and not NaN
#[inline]
pub(crate) fn valid_radius(radius: f64) -> bool {
    radius >= 0.0
}

/// Range query over a node arena whose root is `nodes[0]`.
///
/// Every visited node is tested against the radius. A subtree is skipped only when
/// its splitting plane provably separates it from the query disk, so this may visit
/// empty-handed subtrees but never misses a match.
pub(crate) fn walk_within<T: Copy>(nodes: &[Node<T>], point: DVec2, radius: f64, out: &mut Vec<T>) {
    if nodes.is_empty() || !valid_radius(radius) {
        return;
    }
    let radius_sq = radius * radius;
    let mut stack = vec![0usize];

    while let Some(idx) = stack.pop() {
        let node = &nodes[idx];
        if node.pos.distance_squared(point) <= radius_sq {
            out.push(node.item);
        }

        let target = node.axis.of(point);
        let split = node.axis.of(node.pos);
        if let Some(below) = node.below {
            if target - radius < split {
                stack.push(below);
            }
        }
        if let Some(above) = node.above {
            if target + radius >= split {
                stack.push(above);
            }
        }
    }
}

/// Linear scan; the reference the trees are checked against
#[derive(Debug, Clone, Default)]
pub struct BruteForce<T> {
    items: Vec<(DVec2, T)>,
}

impl<T: Copy> BruteForce<T> {
    pub fn build(items: impl IntoIterator<Item = (DVec2, T)>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<T: Copy> SpatialIndex<T> for BruteForce<T> {
    fn query_within_into(&self, point: DVec2, radius: f64, out: &mut Vec<T>) {
        if !valid_radius(radius) {
            return;
        }
        let radius_sq = radius * radius;
        out.extend(
            self.items
                .iter()
                .filter(|(pos, _)| pos.distance_squared(point) <= radius_sq)
                .map(|&(_, item)| item),
        );
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// The index a world rebuilds each tick, storing slots into its live body list
#[derive(Debug, Clone)]
pub enum CollisionIndex {
    Insertion(KdTree<usize>),
    Median(MedianTree<usize>),
}

impl Default for CollisionIndex {
    fn default() -> Self {
        CollisionIndex::Median(MedianTree::default())
    }
}

impl CollisionIndex {
    /// Build the requested index over `positions`, item `i` being the i-th position
    pub fn build<R: Rng + ?Sized>(
        kind: IndexKind,
        positions: impl IntoIterator<Item = DVec2>,
        rng: &mut R,
    ) -> Self {
        let items = positions.into_iter().enumerate().map(|(slot, pos)| (pos, slot));
        Self::build_items(kind, items, rng)
    }

    /// Build the requested index over explicit `(position, slot)` pairs
    pub fn build_items<R: Rng + ?Sized>(
        kind: IndexKind,
        items: impl IntoIterator<Item = (DVec2, usize)>,
        rng: &mut R,
    ) -> Self {
        let items = items.into_iter();
        match kind {
            IndexKind::Insertion => CollisionIndex::Insertion(KdTree::build_by_insertion(items)),
            IndexKind::Median => CollisionIndex::Median(MedianTree::build(items.collect(), rng)),
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            CollisionIndex::Insertion(_) => IndexKind::Insertion,
            CollisionIndex::Median(_) => IndexKind::Median,
        }
    }
}

impl SpatialIndex<usize> for CollisionIndex {
    fn query_within_into(&self, point: DVec2, radius: f64, out: &mut Vec<usize>) {
        match self {
            CollisionIndex::Insertion(tree) => tree.query_within_into(point, radius, out),
            CollisionIndex::Median(tree) => tree.query_within_into(point, radius, out),
        }
    }

    fn len(&self) -> usize {
        match self {
            CollisionIndex::Insertion(tree) => tree.len(),
            CollisionIndex::Median(tree) => tree.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_brute_force_boundary_inclusive() {
        let index = BruteForce::build([
            (DVec2::ZERO, 0),
            (DVec2::new(20.0, 0.0), 1),
            (DVec2::new(21.0, 0.0), 2),
        ]);
        assert_eq!(sorted(index.query_within(DVec2::ZERO, 20.0)), vec![0, 1]);
    }

    #[test]
    fn test_malformed_queries_are_empty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let positions = [DVec2::ZERO, DVec2::ONE];
        for kind in IndexKind::ALL {
            let index = CollisionIndex::build(kind, positions, &mut rng);
            assert!(index.query_within(DVec2::ZERO, -1.0).is_empty());
            assert!(index.query_within(DVec2::ZERO, f64::NAN).is_empty());

            let empty = CollisionIndex::build(kind, std::iter::empty(), &mut rng);
            assert!(empty.is_empty());
            assert!(empty.query_within(DVec2::ZERO, 1e9).is_empty());
        }
        assert!(CollisionIndex::default().query_within(DVec2::ZERO, 10.0).is_empty());
    }

    #[test]
    fn test_zero_radius_finds_exact_point() {
        let mut rng = Pcg32::seed_from_u64(2);
        let positions = [DVec2::new(1.0, 1.0), DVec2::new(1.0, 2.0)];
        for kind in IndexKind::ALL {
            let index = CollisionIndex::build(kind, positions, &mut rng);
            assert_eq!(index.kind(), kind);
            assert_eq!(index.query_within(DVec2::new(1.0, 2.0), 0.0), vec![1]);
        }
    }

    #[test]
    fn test_build_items_keeps_given_slots() {
        let mut rng = Pcg32::seed_from_u64(4);
        let items = [(DVec2::ZERO, 3), (DVec2::new(50.0, 0.0), 7)];
        for kind in IndexKind::ALL {
            let index = CollisionIndex::build_items(kind, items, &mut rng);
            assert_eq!(index.len(), 2);
            assert_eq!(index.query_within(DVec2::new(49.0, 0.0), 5.0), vec![7]);
            assert_eq!(sorted(index.query_within(DVec2::ZERO, 100.0)), vec![3, 7]);
        }
    }

    #[test]
    fn test_trees_match_brute_force() {
        let mut rng = Pcg32::seed_from_u64(3);
        let positions: Vec<DVec2> = (0..400)
            .map(|_| crate::point_within(&mut rng, 500.0))
            .collect();
        let brute = BruteForce::build(positions.iter().copied().enumerate().map(|(i, p)| (p, i)));

        for kind in IndexKind::ALL {
            let index = CollisionIndex::build(kind, positions.iter().copied(), &mut rng);
            assert_eq!(index.len(), positions.len());
            for target in positions.iter().step_by(7) {
                for radius in [0.0, 5.0, 25.0, 120.0] {
                    assert_eq!(
                        sorted(index.query_within(*target, radius)),
                        sorted(brute.query_within(*target, radius)),
                        "{} disagrees at {target} r={radius}",
                        kind.as_str()
                    );
                }
            }
        }
    }
}
