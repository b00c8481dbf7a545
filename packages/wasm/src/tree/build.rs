//! Bulk tree construction and precondition checks.
//!
//! Two input shapes are accepted: a parent index per node (the shape of
//! the JavaScript `data` call) and flat `[parent, child]` edge pairs (the
//! shape the host graph API hands out). Both are checked with a petgraph
//! directed graph for cycles and unreachable nodes before any layout
//! state exists.

use petgraph::algo::is_cyclic_directed;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;

use super::arena::Tree;
use super::node::{NodeId, NodeSpec, TreeNode};
use crate::error::{LayoutError, Result};

impl Tree {
    /// Build a tree from one `NodeSpec` and one parent entry per node.
    ///
    /// `parents[i]` is the index of node `i`'s parent, or `None` for the
    /// root. Children keep ascending index order. Node `i` gets
    /// `NodeId(i)`.
    pub fn from_parents(specs: &[NodeSpec], parents: &[Option<u32>]) -> Result<Self> {
        if specs.len() != parents.len() {
            return Err(LayoutError::LengthMismatch {
                specs: specs.len(),
                parents: parents.len(),
            });
        }

        let mut root: Option<NodeId> = None;
        let mut links = Vec::with_capacity(specs.len().saturating_sub(1));
        for (i, parent) in parents.iter().enumerate() {
            let child = NodeId(i as u32);
            match parent {
                None => match root {
                    None => root = Some(child),
                    Some(first) => {
                        return Err(LayoutError::MultipleRoots {
                            first,
                            second: child,
                        });
                    }
                },
                Some(p) => {
                    if *p as usize >= specs.len() {
                        return Err(LayoutError::UnknownNode(NodeId(*p)));
                    }
                    links.push((NodeId(*p), child));
                }
            }
        }

        let root = root.ok_or(LayoutError::MissingRoot)?;
        assemble(specs, root, &links)
    }

    /// Build a tree from flat `[parent0, child0, parent1, child1, ...]`
    /// pairs over `specs.len()` nodes.
    ///
    /// Children are ordered by edge order. When `root` is `None` the
    /// unique node without a parent becomes the root.
    pub fn from_edges(specs: &[NodeSpec], edges: &[u32], root: Option<u32>) -> Result<Self> {
        if edges.len() % 2 != 0 {
            return Err(LayoutError::MalformedEdges(edges.len()));
        }

        let node_count = specs.len();
        let mut parent_of: Vec<Option<NodeId>> = vec![None; node_count];
        let mut links = Vec::with_capacity(edges.len() / 2);

        for pair in edges.chunks_exact(2) {
            let (parent, child) = (NodeId(pair[0]), NodeId(pair[1]));
            for id in [parent, child] {
                if id.index() >= node_count {
                    return Err(LayoutError::UnknownNode(id));
                }
            }
            if parent == child {
                return Err(LayoutError::Cycle);
            }
            if parent_of[child.index()].replace(parent).is_some() {
                return Err(LayoutError::SharedChild { child });
            }
            links.push((parent, child));
        }

        let root = match root {
            Some(r) => {
                let r = NodeId(r);
                if r.index() >= node_count {
                    return Err(LayoutError::UnknownNode(r));
                }
                if parent_of[r.index()].is_some() {
                    // The requested root has a parent of its own, so the
                    // edges describe a larger tree or a cycle.
                    return Err(LayoutError::Cycle);
                }
                r
            }
            None => {
                let mut orphans = parent_of
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_none())
                    .map(|(i, _)| NodeId(i as u32));
                let first = orphans.next().ok_or(LayoutError::MissingRoot)?;
                if let Some(second) = orphans.next() {
                    return Err(LayoutError::MultipleRoots { first, second });
                }
                first
            }
        };

        assemble(specs, root, &links)
    }

    /// Check the per-node preconditions of a layout run.
    ///
    /// Every width must be positive, every height non-negative, and all
    /// geometry finite.
    pub fn validate(&self) -> Result<()> {
        for (i, node) in self.nodes().iter().enumerate() {
            let id = NodeId(i as u32);
            if !(node.width.is_finite() && node.height.is_finite() && node.y.is_finite()) {
                return Err(LayoutError::NonFiniteInput { node: id });
            }
            if node.width <= 0.0 || node.height < 0.0 {
                return Err(LayoutError::InvalidDimensions {
                    node: id,
                    width: node.width,
                    height: node.height,
                });
            }
        }
        Ok(())
    }
}

/// Check the `(parent, child)` links for cycles and reachability, then
/// build the arena.
fn assemble(specs: &[NodeSpec], root: NodeId, links: &[(NodeId, NodeId)]) -> Result<Tree> {
    if specs.is_empty() {
        return Err(LayoutError::MissingRoot);
    }

    let mut graph: StableDiGraph<NodeId, ()> = StableDiGraph::with_capacity(specs.len(), links.len());
    for i in 0..specs.len() {
        graph.add_node(NodeId(i as u32));
    }
    for &(parent, child) in links {
        graph.add_edge(
            NodeIndex::new(parent.index()),
            NodeIndex::new(child.index()),
            (),
        );
    }

    if is_cyclic_directed(&graph) {
        return Err(LayoutError::Cycle);
    }

    let mut reached = vec![false; specs.len()];
    let mut dfs = Dfs::new(&graph, NodeIndex::new(root.index()));
    while let Some(ix) = dfs.next(&graph) {
        reached[ix.index()] = true;
    }
    if let Some(i) = reached.iter().position(|&r| !r) {
        return Err(LayoutError::Unreachable {
            node: NodeId(i as u32),
        });
    }

    let mut nodes: Vec<TreeNode> = specs.iter().map(|&spec| TreeNode::new(spec, None)).collect();
    for &(parent, child) in links {
        nodes[child.index()].parent = Some(parent);
        nodes[parent.index()].children.push(child);
    }

    Ok(Tree::from_parts(nodes, root))
}
