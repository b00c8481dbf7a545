//! TreeEngine - host-facing tree store and layout driver.
//!
//! Hosts name nodes with their own `u32` ids and add them in any order
//! that puts parents first, or in bulk. The engine maps host ids to arena
//! ids, runs the layout and keeps an R-tree of the result for picking.
//! Errors report host ids.

use std::collections::HashMap;

use log::debug;

use crate::error::{LayoutError, Result};
use crate::geometry::{Coordinate, Rect};
use crate::layout::{LayoutConfig, LayoutStats, TidyLayout};
use crate::spatial::BoxIndex;
use crate::tree::{NodeId, NodeSpec, Tree};

/// The core tree engine.
///
/// This struct manages:
/// - The arena tree, built as nodes arrive
/// - ID mapping between host ids and arena ids
/// - The layout engine and its last run
/// - Spatial index for hit testing
#[derive(Debug, Default)]
pub struct TreeEngine {
    layout: TidyLayout,

    tree: Option<Tree>,

    /// Map from host id to arena id
    host_to_node: HashMap<u32, NodeId>,

    /// Host id of each arena slot
    node_to_host: Vec<u32>,

    /// Boxes of the last layout; empty while the tree has changed since
    spatial: BoxIndex,

    last_stats: Option<LayoutStats>,
}

impl TreeEngine {
    /// Create an empty engine.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            layout: TidyLayout::new(config),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.layout.config()
    }

    /// Replace the layout configuration. The current layout, if any, is
    /// kept until the next call to [`layout`](Self::layout).
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<()> {
        config.validate()?;
        self.layout = TidyLayout::new(config);
        Ok(())
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node. `parent` of `None` makes it the root; otherwise the
    /// parent must already be present.
    pub fn add_node(&mut self, id: u32, spec: NodeSpec, parent: Option<u32>) -> Result<()> {
        if self.host_to_node.contains_key(&id) {
            return Err(LayoutError::DuplicateNode(NodeId(id)));
        }

        let node = match parent {
            None => {
                if let Some(tree) = &self.tree {
                    return Err(LayoutError::MultipleRoots {
                        first: to_host(&self.node_to_host, tree.root()),
                        second: NodeId(id),
                    });
                }
                self.tree = Some(Tree::new(spec));
                NodeId(0)
            }
            Some(parent) => {
                let parent_node = self.host_to_node.get(&parent).copied();
                match (self.tree.as_mut(), parent_node) {
                    (Some(tree), Some(parent_node)) => tree.add_child(parent_node, spec)?,
                    _ => return Err(LayoutError::UnknownNode(NodeId(parent))),
                }
            }
        };

        self.host_to_node.insert(id, node);
        self.node_to_host.push(id);
        self.invalidate();
        Ok(())
    }

    /// Replace the whole tree. `parents[i]` is the host id of the parent of
    /// `ids[i]`, or `None` for the root. Nodes may come in any order.
    pub fn load(&mut self, ids: &[u32], specs: &[NodeSpec], parents: &[Option<u32>]) -> Result<()> {
        for len in [specs.len(), parents.len()] {
            if len != ids.len() {
                return Err(LayoutError::LengthMismatch {
                    specs: ids.len(),
                    parents: len,
                });
            }
        }

        let mut host_to_node = HashMap::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            if host_to_node.insert(id, NodeId(i as u32)).is_some() {
                return Err(LayoutError::DuplicateNode(NodeId(id)));
            }
        }

        let arena_parents = parents
            .iter()
            .map(|parent| match parent {
                None => Ok(None),
                Some(p) => host_to_node
                    .get(p)
                    .map(|node| Some(node.raw()))
                    .ok_or(LayoutError::UnknownNode(NodeId(*p))),
            })
            .collect::<Result<Vec<_>>>()?;

        let tree = Tree::from_parents(specs, &arena_parents)
            .map_err(|err| err.map_nodes(|node| to_host(ids, node)))?;

        debug!(nodes = ids.len(); "Loaded tree");
        self.tree = Some(tree);
        self.host_to_node = host_to_node;
        self.node_to_host = ids.to_vec();
        self.invalidate();
        Ok(())
    }

    /// Remove a node together with its whole subtree and return how many
    /// nodes went away. Removing the root empties the engine.
    pub fn remove_node(&mut self, id: u32) -> Result<usize> {
        let (Some(tree), Some(&node)) = (self.tree.as_mut(), self.host_to_node.get(&id)) else {
            return Err(LayoutError::UnknownNode(NodeId(id)));
        };

        if node == tree.root() {
            let removed = self.node_to_host.len();
            self.clear();
            return Ok(removed);
        }

        let hosts = &self.node_to_host;
        let remap = tree
            .remove_subtree(node)
            .map_err(|err| err.map_nodes(|node| to_host(hosts, node)))?;

        let before = self.node_to_host.len();
        self.node_to_host = self
            .node_to_host
            .iter()
            .zip(&remap)
            .filter_map(|(&host, new)| new.map(|_| host))
            .collect();
        self.host_to_node = self
            .node_to_host
            .iter()
            .enumerate()
            .map(|(i, &host)| (host, NodeId(i as u32)))
            .collect();

        let removed = before - self.node_to_host.len();
        debug!(id = id, removed = removed; "Removed subtree");
        self.invalidate();
        Ok(removed)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_to_host.len()
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.tree = None;
        self.host_to_node.clear();
        self.node_to_host.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.reset();
        }
        self.spatial.clear();
        self.last_stats = None;
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the current tree and index the resulting boxes.
    pub fn layout(&mut self) -> Result<LayoutStats> {
        let tree = self.tree.as_mut().ok_or(LayoutError::MissingRoot)?;
        let hosts = &self.node_to_host;
        let stats = self
            .layout
            .layout(tree)
            .map_err(|err| err.map_nodes(|node| to_host(hosts, node)))?;

        self.spatial.rebuild(tree);
        self.last_stats = Some(stats);
        Ok(stats)
    }

    pub fn last_stats(&self) -> Option<LayoutStats> {
        self.last_stats
    }

    /// Position of a host node after layout, as `(x, y)`.
    pub fn position(&self, id: u32) -> Option<(Coordinate, Coordinate)> {
        let tree = self.tree.as_ref()?;
        let node = &tree[*self.host_to_node.get(&id)?];
        Some((node.x()?, node.y()))
    }

    /// Flat `[id, x, y, id, x, y, ...]` for every laid-out node, in the
    /// order the nodes were added.
    pub fn positions(&self) -> Vec<Coordinate> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        let mut flat = Vec::with_capacity(tree.node_count() * 3);
        for (node, x, y) in tree.positions() {
            flat.push(self.node_to_host[node.raw() as usize] as Coordinate);
            flat.push(x);
            flat.push(y);
        }
        flat
    }

    /// Bounding box of the laid-out tree.
    pub fn bounds(&self) -> Option<Rect> {
        self.tree.as_ref()?.bounds()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Host id of the node whose box contains the point.
    pub fn node_at(&self, x: Coordinate, y: Coordinate) -> Option<u32> {
        self.spatial
            .node_at(x, y)
            .map(|node| self.node_to_host[node.raw() as usize])
    }

    /// Host ids of the nodes whose boxes touch `rect`.
    pub fn nodes_in_rect(&self, rect: &Rect) -> Vec<u32> {
        self.spatial
            .in_rect(rect)
            .into_iter()
            .map(|node| self.node_to_host[node.raw() as usize])
            .collect()
    }

    /// Number of unrelated node pairs whose boxes overlap. Zero after any
    /// successful layout with stacked or layered placement.
    pub fn overlap_count(&self) -> usize {
        self.tree
            .as_ref()
            .map_or(0, |tree| self.spatial.overlapping_pairs(tree).len())
    }
}

fn to_host(hosts: &[u32], node: NodeId) -> NodeId {
    hosts
        .get(node.raw() as usize)
        .map_or(node, |&host| NodeId(host))
}
