//! Partition tree rebuilt from scratch around random pivots
//!
//! Each node is a randomly chosen pivot; the remaining items are partitioned in place
//! into those strictly below the pivot on the current axis and the rest, and each half
//! is built with the axis swapped. Random pivots give O(n log n) expected builds with
//! no bias from input order. This is not a true median split, which is fine for a
//! broad phase: the tree only has to be shallow on average, never exact.

use glam::DVec2;
use rand::Rng;

use super::{Axis, Node, SpatialIndex, walk_within};

/// Where a freshly built node hangs off its parent
#[derive(Clone, Copy)]
enum Link {
    Root,
    Below(usize),
    Above(usize),
}

/// Random-pivot 2D partition tree over items of type `T`
#[derive(Debug, Clone)]
pub struct MedianTree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for MedianTree<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T: Copy> MedianTree<T> {
    /// Build a tree over `items`, drawing pivots from `rng`
    pub fn build<R: Rng + ?Sized>(mut items: Vec<(DVec2, T)>, rng: &mut R) -> Self {
        let mut nodes: Vec<Node<T>> = Vec::with_capacity(items.len());
        let mut work = vec![(0, items.len(), Axis::X, Link::Root)];

        while let Some((lo, hi, axis, link)) = work.pop() {
            if lo >= hi {
                continue;
            }

            let pick = rng.random_range(lo..hi);
            items.swap(lo, pick);
            let (pivot_pos, pivot_item) = items[lo];
            let split = axis.of(pivot_pos);

            let mut mid = lo + 1;
            for j in lo + 1..hi {
                if axis.of(items[j].0) < split {
                    items.swap(mid, j);
                    mid += 1;
                }
            }

            let idx = nodes.len();
            nodes.push(Node {
                pos: pivot_pos,
                axis,
                item: pivot_item,
                below: None,
                above: None,
            });
            match link {
                Link::Root => {}
                Link::Below(parent) => nodes[parent].below = Some(idx),
                Link::Above(parent) => nodes[parent].above = Some(idx),
            }

            work.push((lo + 1, mid, axis.other(), Link::Below(idx)));
            work.push((mid, hi, axis.other(), Link::Above(idx)));
        }

        Self { nodes }
    }

    /// Length of the longest root-to-leaf path (0 for an empty tree)
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[idx];
            for child in [node.below, node.above].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }
}

impl<T: Copy> SpatialIndex<T> for MedianTree<T> {
    fn query_within_into(&self, point: DVec2, radius: f64, out: &mut Vec<T>) {
        walk_within(&self.nodes, point, radius, out);
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
