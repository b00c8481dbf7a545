//! R-tree over laid-out node boxes using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Hit testing a point
//! - Nearest box
//! - Rectangle intersection
//! - Overlap detection between unrelated nodes

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::{Coordinate, Rect};
use crate::tree::{NodeId, Tree};

/// A node's bounding box in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub id: NodeId,
    pub rect: Rect,
}

impl NodeBox {
    pub fn new(id: NodeId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[Coordinate; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.right(), self.rect.bottom()],
        )
    }
}

impl PointDistance for NodeBox {
    /// Squared distance from the point to the nearest edge; zero inside.
    fn distance_2(&self, point: &[Coordinate; 2]) -> Coordinate {
        let dx = (self.rect.x - point[0]).max(point[0] - self.rect.right()).max(0.0);
        let dy = (self.rect.y - point[1]).max(point[1] - self.rect.bottom()).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[Coordinate; 2]) -> bool {
        self.rect.contains(point[0], point[1])
    }
}

/// Spatial index over the boxes of a laid-out tree.
///
/// Uses an R*-tree for efficient spatial queries. Nodes without a final
/// x are skipped.
#[derive(Debug, Default)]
pub struct BoxIndex {
    tree: RTree<NodeBox>,
}

impl BoxIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load the boxes of every laid-out node in `tree`.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut index = Self::new();
        index.rebuild(tree);
        index
    }

    /// Replace the contents with the boxes of `tree`.
    pub fn rebuild(&mut self, tree: &Tree) {
        let boxes: Vec<NodeBox> = tree
            .ids()
            .filter_map(|id| tree.rect(id).map(|rect| NodeBox::new(id, rect)))
            .collect();
        self.tree = RTree::bulk_load(boxes);
    }

    /// The node whose box contains the point. If several do, the lowest id
    /// wins.
    pub fn node_at(&self, x: Coordinate, y: Coordinate) -> Option<NodeId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|node| node.id)
            .min()
    }

    /// The node whose box is closest to the point.
    pub fn nearest(&self, x: Coordinate, y: Coordinate) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|node| node.id)
    }

    /// All nodes whose boxes touch or intersect `rect`, in id order.
    pub fn in_rect(&self, rect: &Rect) -> Vec<NodeId> {
        let envelope = AABB::from_corners([rect.x, rect.y], [rect.right(), rect.bottom()]);
        let mut ids: Vec<NodeId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|node| node.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Pairs of nodes whose boxes overlap by more than
    /// [`EPSILON`](crate::geometry::EPSILON), skipping ancestor/descendant
    /// pairs. Each pair is reported once as `(lower id, higher id)`.
    pub fn overlapping_pairs(&self, tree: &Tree) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        for node in self.tree.iter() {
            for other in self.tree.locate_in_envelope_intersecting(&node.envelope()) {
                if other.id <= node.id || !node.rect.intersects(&other.rect) {
                    continue;
                }
                if tree.is_ancestor(node.id, other.id) || tree.is_ancestor(other.id, node.id) {
                    continue;
                }
                pairs.push((node.id, other.id));
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Clear all boxes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
