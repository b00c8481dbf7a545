//! Node type and related structures.
//!
//! A node carries caller-supplied geometry (width, height, vertical
//! position), its ordered children, and the scratch fields the layout
//! engine fills in:
//! - preliminary x, modifier and deferred shift/change for the contour pass
//! - thread and extreme-node handles that never own anything
//! - the final x, set once by the resolution pass

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

/// Stable node identifier.
///
/// Indexes the owning [`Tree`](super::Tree) arena. Handles stored in
/// thread or extreme fields are plain copies of this id and never keep a
/// node alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Caller-supplied geometry for one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub width: Coordinate,
    pub height: Coordinate,
    /// Vertical position of the node's top edge.
    #[serde(default)]
    pub y: Coordinate,
}

impl NodeSpec {
    pub fn new(width: Coordinate, height: Coordinate, y: Coordinate) -> Self {
        Self { width, height, y }
    }

    /// A node whose vertical position is left to a placement mode.
    pub fn sized(width: Coordinate, height: Coordinate) -> Self {
        Self::new(width, height, 0.0)
    }
}

/// A node stored in the tree arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) width: Coordinate,
    pub(crate) height: Coordinate,
    pub(crate) y: Coordinate,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    /// Final absolute x (left edge). `None` until the resolution pass ran.
    pub(crate) x: Option<Coordinate>,
    /// x relative to the subtree, before ancestor modifiers are applied.
    pub(crate) prelim: Coordinate,
    /// Offset applied to the whole subtree rooted here.
    pub(crate) modifier: Coordinate,
    /// Deferred per-sibling spacing, realized by the resolution pass.
    pub(crate) shift: Coordinate,
    pub(crate) change: Coordinate,

    pub(crate) left_thread: Option<NodeId>,
    pub(crate) right_thread: Option<NodeId>,
    pub(crate) extreme_left: Option<NodeId>,
    pub(crate) extreme_right: Option<NodeId>,
    /// Sum of modifiers on the path down to `extreme_left`.
    pub(crate) modsum_extreme_left: Coordinate,
    /// Sum of modifiers on the path down to `extreme_right`.
    pub(crate) modsum_extreme_right: Coordinate,
}

impl TreeNode {
    pub(crate) fn new(spec: NodeSpec, parent: Option<NodeId>) -> Self {
        Self {
            width: spec.width,
            height: spec.height,
            y: spec.y,
            parent,
            children: Vec::new(),
            x: None,
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            left_thread: None,
            right_thread: None,
            extreme_left: None,
            extreme_right: None,
            modsum_extreme_left: 0.0,
            modsum_extreme_right: 0.0,
        }
    }

    /// Clear every working field back to its neutral value.
    pub(crate) fn reset(&mut self) {
        self.x = None;
        self.prelim = 0.0;
        self.modifier = 0.0;
        self.shift = 0.0;
        self.change = 0.0;
        self.left_thread = None;
        self.right_thread = None;
        self.extreme_left = None;
        self.extreme_right = None;
        self.modsum_extreme_left = 0.0;
        self.modsum_extreme_right = 0.0;
    }

    #[inline]
    pub fn width(&self) -> Coordinate {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Coordinate {
        self.height
    }

    #[inline]
    pub fn y(&self) -> Coordinate {
        self.y
    }

    /// Bottom edge, `y + height`.
    #[inline]
    pub fn bottom(&self) -> Coordinate {
        self.y + self.height
    }

    /// Final x of the left edge, once a layout has completed.
    #[inline]
    pub fn x(&self) -> Option<Coordinate> {
        self.x
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Next node on the left contour: the first child, or the left thread
    /// of a leaf.
    #[inline]
    pub(crate) fn next_left_contour(&self) -> Option<NodeId> {
        match self.children.first() {
            Some(&first) => Some(first),
            None => self.left_thread,
        }
    }

    /// Next node on the right contour: the last child, or the right thread
    /// of a leaf.
    #[inline]
    pub(crate) fn next_right_contour(&self) -> Option<NodeId> {
        match self.children.last() {
            Some(&last) => Some(last),
            None => self.right_thread,
        }
    }
}
