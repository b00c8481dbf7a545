//! Linear-time tidy layout for non-layered trees.
//!
//! Implements the algorithm from "Drawing Non-layered Tidy Trees in Linear
//! Time" (van der Ploeg, 2014), an extension of the Buchheim-Junger-Leipert
//! improvement of Walker's algorithm to nodes of arbitrary width, height
//! and vertical position.
//!
//! # Algorithm Overview
//!
//! 1. **First walk (bottom-up):** Assign each node a preliminary x relative
//!    to its subtree, then re-anchor every finished subtree so its root
//!    sits at relative x 0. Siblings are merged left to right; each merge walks
//!    the right contour of the block placed so far against the left contour
//!    of the new subtree and pushes the new subtree right until nothing
//!    overlaps. Threads let a shallow contour continue into a deeper
//!    neighbour, and cached extreme nodes give O(1) access to the bottom of
//!    every contour, so the whole pass stays O(n).
//! 2. **Second walk (top-down):** Sum modifiers down the tree, realize the
//!    deferred spacing between intermediate siblings, and write the final
//!    x of every node.
//!
//! Coordinates follow the node's top-left corner: a laid-out node covers
//! `[x, x + width] x [y, y + height]`. Children are placed relative to the
//! root, so x can be negative. Both walks use explicit stacks, so
//! tree depth is bounded by memory rather than the call stack.

use log::{debug, info, trace};
use serde::Serialize;

use super::config::LayoutConfig;
use super::contour::ContourTracker;
use super::vertical;
use crate::error::Result;
use crate::geometry::Coordinate;
use crate::tree::{NodeId, Tree};

/// Operation counters from one layout run.
///
/// `contour_steps` is bounded by a small multiple of `nodes` for every
/// tree shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    /// Nodes visited by the first walk.
    pub nodes: usize,
    /// Iterations of the contour comparison loop.
    pub contour_steps: usize,
    /// Threads installed between subtrees of unequal depth.
    pub threads: usize,
    /// Subtree moves caused by overlaps.
    pub shifts: usize,
}

/// The tidy tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct TidyLayout {
    config: LayoutConfig,
}

impl TidyLayout {
    /// Create a new tidy tree layout with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a tidy tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the final x of every node in `tree`.
    ///
    /// Working fields are reset first, so a tree can be laid out any
    /// number of times. On error the tree is left untouched.
    pub fn layout(&self, tree: &mut Tree) -> Result<LayoutStats> {
        self.config.validate()?;
        tree.validate()?;

        info!(nodes = tree.node_count(); "Computing tidy tree layout");
        tree.reset();
        vertical::place(tree, &self.config);

        let stats = Walker::run(tree, self.config.peer_margin);

        debug!(
            nodes = stats.nodes,
            contour_steps = stats.contour_steps,
            threads = stats.threads,
            shifts = stats.shifts;
            "Tidy tree layout complete"
        );
        Ok(stats)
    }
}

/// Lay out `tree` with the default configuration.
pub fn layout(tree: &mut Tree) -> Result<LayoutStats> {
    TidyLayout::with_defaults().layout(tree)
}

/// Per-node state of the explicit first-walk stack.
struct Frame {
    node: NodeId,
    /// Index of the next child to descend into.
    next: usize,
    /// Right-contour owners among the children merged so far.
    tracker: ContourTracker,
}

impl Frame {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            next: 0,
            tracker: ContourTracker::default(),
        }
    }
}

struct Walker<'t> {
    tree: &'t mut Tree,
    peer_margin: Coordinate,
    stats: LayoutStats,
}

impl Walker<'_> {
    fn run(tree: &mut Tree, peer_margin: Coordinate) -> LayoutStats {
        let root = tree.root();
        let mut walker = Walker {
            tree,
            peer_margin,
            stats: LayoutStats::default(),
        };
        walker.first_walk(root);
        walker.second_walk(root);
        walker.stats
    }

    // =========================================================================
    // First walk
    // =========================================================================

    /// Post-order pass assigning preliminary coordinates.
    fn first_walk(&mut self, root: NodeId) {
        let mut stack = vec![Frame::new(root)];

        while let Some(frame) = stack.last() {
            let (node, next) = (frame.node, frame.next);
            if let Some(&child) = self.tree[node].children.get(next) {
                stack.push(Frame::new(child));
                continue;
            }

            stack.pop();
            self.finish_node(node);

            if let Some(parent) = stack.last_mut() {
                self.anchor_subtree(node);
                self.merge_child(parent);
                parent.next += 1;
            }
        }
    }

    /// Merge child `frame.next` of `frame.node` into the block of its left
    /// siblings. The child's own subtree is already laid out.
    fn merge_child(&mut self, frame: &mut Frame) {
        let i = frame.next;
        let child = self.tree[frame.node].children[i];

        if i == 0 {
            let low_y = self.extreme_bottom(self.tree[child].extreme_left);
            frame.tracker.push(low_y, 0);
            return;
        }

        // Depth of the new subtree, taken before threads can change its
        // right extreme.
        let min_y = self.extreme_bottom(self.tree[child].extreme_right);
        self.separate(frame.node, i, &frame.tracker);
        frame.tracker.push(min_y, i);
    }

    /// All children of `node` are placed: center it and cache extremes.
    fn finish_node(&mut self, node: NodeId) {
        self.stats.nodes += 1;
        if !self.tree[node].is_leaf() {
            self.position_root(node);
        }
        self.set_extremes(node);
    }

    /// Shift the finished subtree of `node` so that `prelim + modifier` is
    /// zero. The first comparison in `separate` then always has the two
    /// subtree roots colliding, which pulls the new subtree into contact
    /// with a shallower block on its left.
    fn anchor_subtree(&mut self, node: NodeId) {
        let n = &mut self.tree[node];
        let offset = n.prelim;
        n.modifier -= offset;
        n.modsum_extreme_left -= offset;
        n.modsum_extreme_right -= offset;
    }

    /// Center `node` over the outer edges of its first and last child.
    fn position_root(&mut self, node: NodeId) {
        let children = &self.tree[node].children;
        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            return;
        };

        let first = &self.tree[first];
        let last = &self.tree[last];
        let left_edge = first.prelim + first.modifier;
        let right_edge = last.prelim + last.modifier + last.width;
        let prelim = (left_edge + right_edge) / 2.0 - self.tree[node].width / 2.0;
        self.tree[node].prelim = prelim;
    }

    /// A leaf is its own extreme on both sides; an internal node inherits
    /// the left extreme of its first child and the right extreme of its
    /// last child.
    fn set_extremes(&mut self, node: NodeId) {
        let children = &self.tree[node].children;
        match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => {
                let (el, msel) = {
                    let first = &self.tree[first];
                    (first.extreme_left, first.modsum_extreme_left)
                };
                let (er, mser) = {
                    let last = &self.tree[last];
                    (last.extreme_right, last.modsum_extreme_right)
                };
                let n = &mut self.tree[node];
                n.extreme_left = el;
                n.modsum_extreme_left = msel;
                n.extreme_right = er;
                n.modsum_extreme_right = mser;
            }
            _ => {
                let n = &mut self.tree[node];
                n.extreme_left = Some(node);
                n.extreme_right = Some(node);
                n.modsum_extreme_left = 0.0;
                n.modsum_extreme_right = 0.0;
            }
        }
    }

    fn extreme_bottom(&self, extreme: Option<NodeId>) -> Coordinate {
        extreme.map_or(0.0, |id| self.tree[id].bottom())
    }

    // =========================================================================
    // Overlap resolution
    // =========================================================================

    /// Push child `i` of `parent` right until its left contour clears the
    /// right contour of children `0..i`, then merge threads and extremes.
    fn separate(&mut self, parent: NodeId, i: usize, tracker: &ContourTracker) {
        let (block, current) = {
            let children = &self.tree[parent].children;
            (children[i - 1], children[i])
        };

        // Right contour of the block, and its modifier sum.
        let mut sr = Some(block);
        let mut mssr = self.tree[block].modifier;
        // Left contour of the new subtree, and its modifier sum.
        let mut cl = Some(current);
        let mut mscl = self.tree[current].modifier;
        let mut owner = tracker.cursor();

        while let (Some(r), Some(l)) = (sr, cl) {
            self.stats.contour_steps += 1;

            let (right_edge, sy) = {
                let r = &self.tree[r];
                (mssr + r.prelim + r.width, r.bottom())
            };
            let (left_edge, cy) = {
                let l = &self.tree[l];
                (mscl + l.prelim, l.bottom())
            };

            owner.advance_past(sy);

            let distance = right_edge + self.peer_margin - left_edge;
            if distance > 0.0 {
                mscl += distance;
                self.move_subtree(parent, i, owner.index(), distance);
            }

            if sy <= cy {
                sr = self.tree[r].next_right_contour();
                if let Some(next) = sr {
                    mssr += self.tree[next].modifier;
                }
            }
            if sy >= cy {
                cl = self.tree[l].next_left_contour();
                if let Some(next) = cl {
                    mscl += self.tree[next].modifier;
                }
            }
        }

        match (sr, cl) {
            (None, Some(l)) => self.set_left_thread(parent, i, l, mscl),
            (Some(r), None) => self.set_right_thread(parent, i, r, mssr),
            _ => {}
        }
    }

    /// Shift child `i` by `distance` and spread part of the move across
    /// the siblings between child `anchor` and child `i`.
    fn move_subtree(&mut self, parent: NodeId, i: usize, anchor: usize, distance: Coordinate) {
        self.stats.shifts += 1;

        let child = self.tree[parent].children[i];
        let node = &mut self.tree[child];
        node.modifier += distance;
        node.modsum_extreme_left += distance;
        node.modsum_extreme_right += distance;

        self.distribute_extra(parent, i, anchor, distance);
    }

    /// Queue a linear ramp over the children strictly between `anchor` and
    /// `i`. The second walk turns the queued shift/change values into
    /// modifiers; child `i` itself nets out to zero.
    fn distribute_extra(&mut self, parent: NodeId, i: usize, anchor: usize, distance: Coordinate) {
        if anchor + 1 >= i {
            return;
        }

        let steps = (i - anchor) as Coordinate;
        let (first, current) = {
            let children = &self.tree[parent].children;
            (children[anchor + 1], children[i])
        };

        self.tree[first].shift += distance / steps;
        let current = &mut self.tree[current];
        current.shift -= distance / steps;
        current.change -= distance - distance / steps;
    }

    // =========================================================================
    // Threads
    // =========================================================================

    /// The new subtree is deeper on the left: thread the block's left
    /// extreme to the rest of the new subtree's left contour.
    fn set_left_thread(&mut self, parent: NodeId, i: usize, target: NodeId, modsum_target: Coordinate) {
        let (first, current) = {
            let children = &self.tree[parent].children;
            (children[0], children[i])
        };
        let Some(extreme) = self.tree[first].extreme_left else {
            return;
        };

        let diff = (modsum_target - self.tree[target].modifier) - self.tree[first].modsum_extreme_left;
        let node = &mut self.tree[extreme];
        node.left_thread = Some(target);
        node.modifier += diff;
        node.prelim -= diff;
        trace!(from = extreme.raw(), to = target.raw(); "Left thread");
        self.stats.threads += 1;

        let (el, msel) = {
            let current = &self.tree[current];
            (current.extreme_left, current.modsum_extreme_left)
        };
        let first = &mut self.tree[first];
        first.extreme_left = el;
        first.modsum_extreme_left = msel;
    }

    /// The block is deeper on the right: thread the new subtree's right
    /// extreme back into the block's right contour.
    fn set_right_thread(&mut self, parent: NodeId, i: usize, target: NodeId, modsum_target: Coordinate) {
        let (previous, current) = {
            let children = &self.tree[parent].children;
            (children[i - 1], children[i])
        };
        let Some(extreme) = self.tree[current].extreme_right else {
            return;
        };

        let diff = (modsum_target - self.tree[target].modifier) - self.tree[current].modsum_extreme_right;
        let node = &mut self.tree[extreme];
        node.right_thread = Some(target);
        node.modifier += diff;
        node.prelim -= diff;
        trace!(from = extreme.raw(), to = target.raw(); "Right thread");
        self.stats.threads += 1;

        let (er, mser) = {
            let previous = &self.tree[previous];
            (previous.extreme_right, previous.modsum_extreme_right)
        };
        let current = &mut self.tree[current];
        current.extreme_right = er;
        current.modsum_extreme_right = mser;
    }

    // =========================================================================
    // Second walk
    // =========================================================================

    /// Pre-order pass turning preliminary coordinates into final ones.
    fn second_walk(&mut self, root: NodeId) {
        let mut stack: Vec<(NodeId, Coordinate)> = vec![(root, 0.0)];

        while let Some((node, modsum)) = stack.pop() {
            let modsum = modsum + self.tree[node].modifier;
            let n = &mut self.tree[node];
            n.x = Some(n.prelim + modsum);

            self.add_child_spacing(node);
            stack.extend(
                self.tree[node]
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, modsum)),
            );
        }
    }

    /// Realize the shift/change values queued on `node`'s children.
    fn add_child_spacing(&mut self, node: NodeId) {
        let mut shift = 0.0;
        let mut delta = 0.0;
        for i in 0..self.tree[node].children.len() {
            let child = self.tree[node].children[i];
            let child = &mut self.tree[child];
            shift += child.shift;
            delta += shift + child.change;
            child.modifier += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::error::LayoutError;
    use crate::layout::VerticalPlacement;
    use crate::tree::NodeSpec;

    fn x(tree: &Tree, id: NodeId) -> Coordinate {
        tree[id].x().expect("node should be laid out")
    }

    fn center(tree: &Tree, id: NodeId) -> Coordinate {
        tree.rect(id).expect("node should be laid out").center_x()
    }

    fn stacked() -> TidyLayout {
        TidyLayout::new(LayoutConfig::stacked(0.0, 0.0))
    }

    #[test]
    fn test_single_node() {
        let mut tree = Tree::new(NodeSpec::new(7.0, 3.0, 0.0));
        let stats = layout(&mut tree).unwrap();

        assert_eq!(tree[NodeId(0)].x(), Some(0.0));
        assert_eq!(tree[NodeId(0)].prelim, 0.0);
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.contour_steps, 0);
    }

    #[test]
    fn test_two_leaves_touch_and_root_centers() {
        let mut tree = Tree::new(NodeSpec::new(10.0, 10.0, 0.0));
        let a = tree.add_child(NodeId(0), NodeSpec::new(10.0, 10.0, 10.0)).unwrap();
        let b = tree.add_child(NodeId(0), NodeSpec::new(10.0, 10.0, 10.0)).unwrap();

        layout(&mut tree).unwrap();

        assert_approx_eq!(f64, x(&tree, a), 0.0);
        assert_approx_eq!(f64, x(&tree, b), 10.0);
        assert_approx_eq!(f64, x(&tree, NodeId(0)), 5.0);
    }

    #[test]
    fn test_peer_margin_adds_gap() {
        let mut tree = Tree::new(NodeSpec::sized(10.0, 10.0));
        let a = tree.add_child(NodeId(0), NodeSpec::sized(10.0, 10.0)).unwrap();
        let b = tree.add_child(NodeId(0), NodeSpec::sized(10.0, 10.0)).unwrap();

        TidyLayout::new(LayoutConfig::stacked(5.0, 4.0))
            .layout(&mut tree)
            .unwrap();

        assert_approx_eq!(f64, x(&tree, a), 0.0);
        assert_approx_eq!(f64, x(&tree, b), 14.0);
        assert_approx_eq!(f64, x(&tree, NodeId(0)), 7.0);
        assert_eq!(tree[b].y(), 15.0);
    }

    #[test]
    fn test_linear_chain_is_centered() {
        let widths = [4.0, 10.0, 2.0, 8.0, 6.0];
        let mut tree = Tree::new(NodeSpec::sized(widths[0], 1.0));
        let mut parent = tree.root();
        for &w in &widths[1..] {
            parent = tree.add_child(parent, NodeSpec::sized(w, 1.0)).unwrap();
        }

        stacked().layout(&mut tree).unwrap();

        let root_center = center(&tree, tree.root());
        for id in tree.ids() {
            assert_approx_eq!(f64, center(&tree, id), root_center);
        }
    }

    #[test]
    fn test_equal_width_chain_shares_x() {
        let mut tree = Tree::new(NodeSpec::sized(5.0, 1.0));
        let mut parent = tree.root();
        for _ in 0..20 {
            parent = tree.add_child(parent, NodeSpec::sized(5.0, 1.0)).unwrap();
        }

        stacked().layout(&mut tree).unwrap();

        for id in tree.ids() {
            assert_approx_eq!(f64, x(&tree, id), 0.0);
        }
    }

    /// Two wide grandchildren collide below two narrow middle leaves. The
    /// shift needed at the bottom is spread so all four children end up
    /// evenly spaced.
    #[test]
    fn test_intermediate_siblings_are_spaced_evenly() {
        let mut tree = Tree::new(NodeSpec::sized(10.0, 10.0));
        let root = tree.root();
        let c0 = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let c1 = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let c2 = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let c3 = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let g0 = tree.add_child(c0, NodeSpec::sized(50.0, 10.0)).unwrap();
        let g3 = tree.add_child(c3, NodeSpec::sized(50.0, 10.0)).unwrap();

        let stats = stacked().layout(&mut tree).unwrap();

        assert_approx_eq!(f64, x(&tree, g0), -20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, g3), 30.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, c0), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, c1), 50.0 / 3.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, c2), 100.0 / 3.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, c3), 50.0, epsilon = 1e-9);
        assert_approx_eq!(f64, x(&tree, root), 25.0, epsilon = 1e-9);
        assert_eq!(stats.threads, 2);
    }

    #[test]
    fn test_deep_left_subtree_gets_threaded() {
        // Left child has a three-level chain, right child is a leaf whose
        // sibling below it is wide.
        let mut tree = Tree::new(NodeSpec::sized(10.0, 10.0));
        let root = tree.root();
        let left = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let right = tree.add_child(root, NodeSpec::sized(10.0, 10.0)).unwrap();
        let mut parent = left;
        for _ in 0..3 {
            parent = tree.add_child(parent, NodeSpec::sized(10.0, 10.0)).unwrap();
        }
        let wide = tree.add_child(right, NodeSpec::sized(10.0, 10.0)).unwrap();
        let deep = tree.add_child(wide, NodeSpec::sized(40.0, 10.0)).unwrap();

        let stats = stacked().layout(&mut tree).unwrap();

        assert!(stats.threads >= 1, "expected a thread, got {stats:?}");
        // The wide grandchild must clear the left chain at its depth.
        let chain_right = x(&tree, NodeId(4)) + 10.0;
        assert!(
            x(&tree, deep) >= chain_right - 1e-9,
            "deep node at {} overlaps chain ending at {chain_right}",
            x(&tree, deep)
        );
        assert!(x(&tree, right) >= x(&tree, left) + 10.0 - 1e-9);
    }

    #[test]
    fn test_parent_is_centered_over_children() {
        let mut tree = Tree::new(NodeSpec::sized(6.0, 2.0));
        let root = tree.root();
        let a = tree.add_child(root, NodeSpec::sized(3.0, 9.0)).unwrap();
        tree.add_child(root, NodeSpec::sized(1.0, 1.0)).unwrap();
        for (w, h) in [(3.0, 8.0), (5.0, 5.0), (6.0, 8.0)] {
            tree.add_child(a, NodeSpec::sized(w, h)).unwrap();
        }

        stacked().layout(&mut tree).unwrap();

        for id in tree.ids() {
            let children = tree.children(id);
            let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
                continue;
            };
            let expected = (x(&tree, first) + x(&tree, last) + tree[last].width()) / 2.0
                - tree[id].width() / 2.0;
            assert_approx_eq!(f64, x(&tree, id), expected, epsilon = 1e-9);
        }
    }

    /// Root over `[n1 -> n2, n3]`, or `[n3, n1 -> n2]` when `shallow_first`.
    /// `n2` is wider than `n1`, so `n1` sits right of its own subtree's left
    /// edge.
    fn shallow_sibling_tree(shallow_first: bool) -> (Tree, [NodeId; 3]) {
        let mut tree = Tree::new(NodeSpec::sized(4.0, 1.0));
        let root = tree.root();
        if shallow_first {
            let n3 = tree.add_child(root, NodeSpec::sized(1.0, 1.0)).unwrap();
            let n1 = tree.add_child(root, NodeSpec::sized(1.0, 1.0)).unwrap();
            let n2 = tree.add_child(n1, NodeSpec::sized(4.0, 1.0)).unwrap();
            (tree, [n1, n2, n3])
        } else {
            let n1 = tree.add_child(root, NodeSpec::sized(1.0, 1.0)).unwrap();
            let n2 = tree.add_child(n1, NodeSpec::sized(4.0, 1.0)).unwrap();
            let n3 = tree.add_child(root, NodeSpec::sized(1.0, 1.0)).unwrap();
            (tree, [n1, n2, n3])
        }
    }

    #[test]
    fn test_new_sibling_touches_shallow_block() {
        let engine = TidyLayout::new(LayoutConfig::layered(0.0, 0.0));

        let (mut tree, [n1, n2, n3]) = shallow_sibling_tree(true);
        engine.layout(&mut tree).unwrap();
        assert_approx_eq!(f64, x(&tree, n3), 0.0);
        assert_approx_eq!(f64, x(&tree, n1), 1.0);
        assert_approx_eq!(f64, x(&tree, n2), -0.5);
        assert_approx_eq!(f64, x(&tree, tree.root()), -1.0);

        let (mut tree, [n1, n2, n3]) = shallow_sibling_tree(false);
        engine.layout(&mut tree).unwrap();
        assert_approx_eq!(f64, x(&tree, n1), 0.0);
        assert_approx_eq!(f64, x(&tree, n2), -1.5);
        assert_approx_eq!(f64, x(&tree, n3), 1.0);
        assert_approx_eq!(f64, x(&tree, tree.root()), -1.0);
    }

    #[test]
    fn test_lopsided_tree_mirrors() {
        // A deep branch on one side, a fan of leaves in the middle and a
        // medium branch on the other side.
        let mut tree = Tree::new(NodeSpec::sized(4.0, 2.0));
        let root = tree.root();
        let deep = tree.add_child(root, NodeSpec::sized(3.0, 2.0)).unwrap();
        let mut parent = deep;
        for w in [20.0, 30.0, 40.0] {
            parent = tree.add_child(parent, NodeSpec::sized(w, 2.0)).unwrap();
        }
        for _ in 0..3 {
            tree.add_child(root, NodeSpec::sized(2.0, 2.0)).unwrap();
        }
        let medium = tree.add_child(root, NodeSpec::sized(3.0, 2.0)).unwrap();
        let mid = tree.add_child(medium, NodeSpec::sized(25.0, 2.0)).unwrap();
        tree.add_child(mid, NodeSpec::sized(12.0, 2.0)).unwrap();

        let engine = TidyLayout::new(LayoutConfig::stacked(1.0, 1.0));
        let mut mirror = tree.mirrored();
        engine.layout(&mut tree).unwrap();
        engine.layout(&mut mirror).unwrap();

        assert_approx_eq!(f64, x(&tree, root), 11.25, epsilon = 1e-9);
        let axis = center(&tree, root) + center(&mirror, root);
        for id in tree.ids() {
            assert_approx_eq!(f64, center(&tree, id) + center(&mirror, id), axis, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_layout_twice_gives_same_result() {
        let mut tree = Tree::new(NodeSpec::sized(2.0, 2.0));
        let root = tree.root();
        for i in 0..4 {
            let child = tree.add_child(root, NodeSpec::sized(1.0 + i as f64, 2.0)).unwrap();
            if i % 2 == 0 {
                tree.add_child(child, NodeSpec::sized(7.0, 3.0)).unwrap();
            }
        }
        let engine = TidyLayout::new(LayoutConfig::layered(1.0, 1.0));

        engine.layout(&mut tree).unwrap();
        let first = tree.positions();
        engine.layout(&mut tree).unwrap();
        let second = tree.positions();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_dimensions_leave_tree_untouched() {
        let mut tree = Tree::new(NodeSpec::sized(2.0, 2.0));
        tree.add_child(NodeId(0), NodeSpec::sized(-1.0, 2.0)).unwrap();

        let err = layout(&mut tree).unwrap_err();

        assert!(matches!(err, LayoutError::InvalidDimensions { node, .. } if node == NodeId(1)));
        assert!(!tree.is_laid_out());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut tree = Tree::new(NodeSpec::sized(2.0, 2.0));
        let engine = TidyLayout::new(LayoutConfig {
            peer_margin: -3.0,
            ..Default::default()
        });
        assert!(matches!(
            engine.layout(&mut tree),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deep_chain_does_not_overflow_stack() {
        let n = 100_000;
        let mut tree = Tree::with_capacity(NodeSpec::sized(1.0, 1.0), n);
        let mut parent = tree.root();
        for _ in 1..n {
            parent = tree.add_child(parent, NodeSpec::sized(1.0, 1.0)).unwrap();
        }

        let stats = stacked().layout(&mut tree).unwrap();

        assert_eq!(stats.nodes, n);
        assert!(tree.is_laid_out());
        assert_eq!(tree[parent].x(), Some(0.0));
        assert_eq!(tree[parent].y(), (n - 1) as f64);
    }

    #[test]
    fn test_given_placement_respects_caller_y() {
        // Adjacent siblings are separated even when their y ranges are
        // disjoint.
        let mut tree = Tree::new(NodeSpec::new(10.0, 1.0, 0.0));
        let a = tree.add_child(NodeId(0), NodeSpec::new(10.0, 1.0, 1.0)).unwrap();
        let b = tree.add_child(NodeId(0), NodeSpec::new(10.0, 1.0, 5.0)).unwrap();
        assert_eq!(TidyLayout::with_defaults().config().vertical, VerticalPlacement::Given);

        layout(&mut tree).unwrap();

        assert_eq!(tree[a].y(), 1.0);
        assert_eq!(tree[b].y(), 5.0);
        assert!(x(&tree, b) >= x(&tree, a) + 10.0 - 1e-9);
    }

    // =========================================================================
    // Linear-time regression
    // =========================================================================

    fn balanced(n: usize, branching: usize) -> Tree {
        let mut tree = Tree::with_capacity(NodeSpec::sized(3.0, 2.0), n);
        for i in 1..n {
            let parent = NodeId(((i - 1) / branching) as u32);
            tree.add_child(parent, NodeSpec::sized(1.0 + (i % 5) as f64, 1.0 + (i % 3) as f64))
                .unwrap();
        }
        tree
    }

    /// A long spine where every spine node also has one leaf child.
    fn caterpillar(n: usize) -> Tree {
        let mut tree = Tree::with_capacity(NodeSpec::sized(2.0, 2.0), n);
        let mut spine = tree.root();
        while tree.node_count() + 2 <= n {
            tree.add_child(spine, NodeSpec::sized(4.0, 1.0)).unwrap();
            spine = tree.add_child(spine, NodeSpec::sized(2.0, 2.0)).unwrap();
        }
        tree
    }

    /// One deep branch on the right of many shallow siblings.
    fn broom(n: usize) -> Tree {
        let mut tree = Tree::with_capacity(NodeSpec::sized(2.0, 2.0), n);
        let root = tree.root();
        for _ in 0..n / 2 {
            tree.add_child(root, NodeSpec::sized(3.0, 1.0)).unwrap();
        }
        let mut handle = tree.add_child(root, NodeSpec::sized(2.0, 2.0)).unwrap();
        while tree.node_count() < n {
            handle = tree.add_child(handle, NodeSpec::sized(9.0, 2.0)).unwrap();
        }
        tree
    }

    #[test]
    fn test_contour_steps_grow_linearly() {
        let engine = TidyLayout::new(LayoutConfig::stacked(1.0, 1.0));
        for n in [1_000, 10_000, 50_000] {
            let shapes: [(&str, Tree); 4] = [
                ("binary", balanced(n, 2)),
                ("wide", balanced(n, 7)),
                ("caterpillar", caterpillar(n)),
                ("broom", broom(n)),
            ];
            for (name, mut tree) in shapes {
                let count = tree.node_count();
                let stats = engine.layout(&mut tree).unwrap();
                assert_eq!(stats.nodes, count);
                assert!(
                    stats.contour_steps <= 4 * count,
                    "{name} with {count} nodes took {} contour steps",
                    stats.contour_steps
                );
            }
        }
    }
}
