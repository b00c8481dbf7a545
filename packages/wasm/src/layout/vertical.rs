//! Vertical placement modes run ahead of the contour pass.
//!
//! The core algorithm only reads each node's `y` and `height`; these
//! helpers fill `y` in for callers that do not supply it.

use log::debug;

use super::config::{LayoutConfig, VerticalPlacement};
use crate::geometry::Coordinate;
use crate::tree::Tree;

/// Assign `y` to every node according to `config.vertical`.
pub(crate) fn place(tree: &mut Tree, config: &LayoutConfig) {
    match config.vertical {
        VerticalPlacement::Given => {}
        VerticalPlacement::Stacked => place_stacked(tree, config.parent_child_margin),
        VerticalPlacement::Layered => place_layered(tree, config.parent_child_margin),
    }
}

fn place_stacked(tree: &mut Tree, margin: Coordinate) {
    // Pre-order visits every parent before its children.
    for id in tree.pre_order() {
        let y = match tree[id].parent {
            Some(parent) => tree[parent].bottom() + margin,
            None => 0.0,
        };
        tree[id].y = y;
    }
}

fn place_layered(tree: &mut Tree, margin: Coordinate) {
    let order = tree.pre_order();
    let mut depths = vec![0usize; tree.node_count()];
    // Tallest node with children, per depth.
    let mut parent_height: Vec<Coordinate> = Vec::new();

    for &id in &order {
        let depth = tree[id].parent.map_or(0, |p| depths[p.index()] + 1);
        depths[id.index()] = depth;
        if !tree[id].is_leaf() {
            if parent_height.len() <= depth {
                parent_height.resize(depth + 1, 0.0);
            }
            parent_height[depth] = parent_height[depth].max(tree[id].height);
        }
    }

    let mut level_y = Vec::with_capacity(parent_height.len() + 1);
    level_y.push(0.0);
    for height in &parent_height {
        let above = level_y.last().copied().unwrap_or(0.0);
        level_y.push(above + height + margin);
    }
    debug!(levels = level_y.len(); "Layered vertical placement");

    for id in order {
        tree[id].y = level_y[depths[id.index()]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeId, NodeSpec};

    /// 0(h=2) -> (1(h=5) -> 3(h=1), 2(h=1) -> 4(h=1))
    fn sample() -> Tree {
        let mut tree = Tree::new(NodeSpec::sized(1.0, 2.0));
        let a = tree.add_child(NodeId(0), NodeSpec::sized(1.0, 5.0)).unwrap();
        let b = tree.add_child(NodeId(0), NodeSpec::sized(1.0, 1.0)).unwrap();
        tree.add_child(a, NodeSpec::sized(1.0, 1.0)).unwrap();
        tree.add_child(b, NodeSpec::sized(1.0, 1.0)).unwrap();
        tree
    }

    #[test]
    fn test_given_placement_keeps_y() {
        let mut tree = Tree::new(NodeSpec::new(1.0, 1.0, 42.0));
        place(&mut tree, &LayoutConfig::default());
        assert_eq!(tree[NodeId(0)].y(), 42.0);
    }

    #[test]
    fn test_stacked_placement() {
        let mut tree = sample();
        place(&mut tree, &LayoutConfig::stacked(10.0, 0.0));
        assert_eq!(tree[NodeId(0)].y(), 0.0);
        assert_eq!(tree[NodeId(1)].y(), 12.0);
        assert_eq!(tree[NodeId(2)].y(), 12.0);
        assert_eq!(tree[NodeId(3)].y(), 27.0);
        assert_eq!(tree[NodeId(4)].y(), 23.0);
    }

    #[test]
    fn test_layered_placement_aligns_depths() {
        let mut tree = sample();
        place(&mut tree, &LayoutConfig::layered(10.0, 0.0));
        assert_eq!(tree[NodeId(0)].y(), 0.0);
        assert_eq!(tree[NodeId(1)].y(), 12.0);
        assert_eq!(tree[NodeId(2)].y(), 12.0);
        // Depth 2 sits below the tallest depth-1 parent.
        assert_eq!(tree[NodeId(3)].y(), 27.0);
        assert_eq!(tree[NodeId(4)].y(), 27.0);
    }
}
