//! Kd-tree grown by insertion
//!
//! The root splits on X, its children on Y, and so on. Items go below a node when
//! strictly less than it on the node's axis, otherwise above. There is no
//! rebalancing: sorted or clustered insertion orders degrade the tree toward a linear
//! chain, and that is accepted.

use glam::DVec2;

use super::{Axis, Node, SpatialIndex, walk_within};

/// Insertion-built 2D kd-tree over items of type `T`
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T: Copy> KdTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every item in iteration order
    pub fn build_by_insertion(items: impl IntoIterator<Item = (DVec2, T)>) -> Self {
        let items = items.into_iter();
        let mut tree = Self {
            nodes: Vec::with_capacity(items.size_hint().0),
        };
        for (pos, item) in items {
            tree.insert(pos, item);
        }
        tree
    }

    /// Attach `item` at `pos` as a new leaf
    pub fn insert(&mut self, pos: DVec2, item: T) {
        let new_idx = self.nodes.len();
        if new_idx == 0 {
            self.nodes.push(Node {
                pos,
                axis: Axis::X,
                item,
                below: None,
                above: None,
            });
            return;
        }

        let mut idx = 0;
        loop {
            let node = &mut self.nodes[idx];
            let slot = if node.axis.of(pos) < node.axis.of(node.pos) {
                &mut node.below
            } else {
                &mut node.above
            };
            match *slot {
                Some(child) => idx = child,
                None => {
                    *slot = Some(new_idx);
                    let axis = node.axis.other();
                    self.nodes.push(Node {
                        pos,
                        axis,
                        item,
                        below: None,
                        above: None,
                    });
                    return;
                }
            }
        }
    }

    /// Item stored at exactly `target`, if any
    pub fn get(&self, target: DVec2) -> Option<T> {
        let mut idx = if self.nodes.is_empty() { None } else { Some(0) };
        while let Some(i) = idx {
            let node = &self.nodes[i];
            if node.pos == target {
                return Some(node.item);
            }
            idx = if node.axis.of(target) < node.axis.of(node.pos) {
                node.below
            } else {
                node.above
            };
        }
        None
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

impl<T: Copy> SpatialIndex<T> for KdTree<T> {
    fn query_within_into(&self, point: DVec2, radius: f64, out: &mut Vec<T>) {
        walk_within(&self.nodes, point, radius, out);
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
