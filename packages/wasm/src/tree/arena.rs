//! Tree - arena-backed rooted, ordered tree.
//!
//! Every node lives in one `Vec<TreeNode>` and is addressed by its
//! [`NodeId`]. Children lists are the only owning edges; threads and
//! extreme-node handles are copies of ids and can point anywhere in the
//! arena. Dropping the tree frees the vector, so teardown never recurses
//! no matter how deep the tree is.

use std::ops::{Index, IndexMut};

use super::node::{NodeId, NodeSpec, TreeNode};
use crate::error::{LayoutError, Result};
use crate::geometry::{Coordinate, Rect};

/// A rooted tree with ordered children.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only a root node.
    pub fn new(root: NodeSpec) -> Self {
        Self::with_capacity(root, 1)
    }

    /// Create a tree with room for `capacity` nodes.
    pub fn with_capacity(root: NodeSpec, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(TreeNode::new(root, None));
        Self {
            nodes,
            root: NodeId(0),
        }
    }

    /// Assemble a tree from nodes whose links were already checked.
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Append a new last child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId> {
        if parent.index() >= self.nodes.len() {
            return Err(LayoutError::UnknownNode(parent));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode::new(spec, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Detach the subtree rooted at `id` and drop all of its nodes.
    ///
    /// The remaining nodes keep their relative arena order and are
    /// renumbered densely. Returns the new id of every old id, or `None`
    /// for removed nodes. Working fields are cleared.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<Option<NodeId>>> {
        let parent = match self.node(id) {
            None => return Err(LayoutError::UnknownNode(id)),
            Some(node) => node.parent.ok_or(LayoutError::DetachRoot(id))?,
        };
        self.nodes[parent.index()].children.retain(|&child| child != id);

        let mut removed = vec![false; self.nodes.len()];
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            removed[next.index()] = true;
            stack.extend(self.nodes[next.index()].children.iter().copied());
        }

        let mut kept = 0;
        let remap: Vec<Option<NodeId>> = removed
            .iter()
            .map(|&gone| {
                (!gone).then(|| {
                    kept += 1;
                    NodeId(kept - 1)
                })
            })
            .collect();

        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_iter()
            .zip(&removed)
            .filter(|(_, gone)| !**gone)
            .map(|(mut node, _)| {
                node.reset();
                node.parent = node.parent.and_then(|p| remap[p.index()]);
                node.children = node
                    .children
                    .iter()
                    .filter_map(|child| remap[child.index()])
                    .collect();
                node
            })
            .collect();
        if let Some(root) = remap[self.root.index()] {
            self.root = root;
        }

        Ok(remap)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, the root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(TreeNode::parent)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Whether `ancestor` lies on the path from `node` up to the root.
    /// A node is not its own ancestor.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Iterate over every node id in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Node ids in pre-order (parent before children, children left to
    /// right). Uses an explicit stack.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().rev().copied());
        }
        order
    }

    /// Node ids in post-order (children left to right, then parent).
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().copied());
        }
        order.reverse();
        order
    }

    // =========================================================================
    // Layout state
    // =========================================================================

    /// Clear every node's working fields, including the final x.
    ///
    /// The layout engine calls this before each run, so laying out the
    /// same tree twice gives the same result.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Whether every node has a final x.
    pub fn is_laid_out(&self) -> bool {
        self.nodes.iter().all(|node| node.x.is_some())
    }

    /// Bounding box of a laid-out node.
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        Some(Rect::new(node.x?, node.y, node.width, node.height))
    }

    /// Bounding box of the whole laid-out tree.
    pub fn bounds(&self) -> Option<Rect> {
        let mut ids = self.ids();
        let first = self.rect(ids.next()?)?;
        ids.try_fold(first, |acc, id| Some(acc.union(&self.rect(id)?)))
    }

    /// `(id, x, y)` for every laid-out node, in arena order.
    pub fn positions(&self) -> Vec<(NodeId, Coordinate, Coordinate)> {
        self.ids()
            .filter_map(|id| {
                let node = &self[id];
                node.x.map(|x| (id, x, node.y))
            })
            .collect()
    }

    /// A copy of this tree with the children of every node reversed.
    ///
    /// Ids are preserved, so `mirrored[id]` is the mirror image of
    /// `self[id]`. Working fields are cleared.
    pub fn mirrored(&self) -> Tree {
        let mut mirror = self.clone();
        for node in &mut mirror.nodes {
            node.children.reverse();
            node.reset();
        }
        mirror
    }

    pub(crate) fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

impl Index<NodeId> for Tree {
    type Output = TreeNode;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Tree {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.index()]
    }
}
