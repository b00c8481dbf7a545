//! Error types for tree construction and layout.
//!
//! The layout computation itself cannot fail; every variant here is a
//! precondition violation detected before the contour pass starts.

use thiserror::Error;

use crate::tree::NodeId;

/// The error type for tree construction, validation and layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{node} has invalid dimensions {width} x {height} (width must be > 0, height >= 0)")]
    InvalidDimensions {
        node: NodeId,
        width: f64,
        height: f64,
    },

    #[error("{node} has a non-finite width, height or vertical position")]
    NonFiniteInput { node: NodeId },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("tree has no root")]
    MissingRoot,

    #[error("tree has more than one root: {first} and {second}")]
    MultipleRoots { first: NodeId, second: NodeId },

    #[error("{child} is the child of more than one parent")]
    SharedChild { child: NodeId },

    #[error("parent links form a cycle")]
    Cycle,

    #[error("{node} is not reachable from the root")]
    Unreachable { node: NodeId },

    #[error("edge list must hold [parent, child] pairs, got {0} values")]
    MalformedEdges(usize),

    #[error("got {specs} node specs but {parents} parent entries")]
    LengthMismatch { specs: usize, parents: usize },

    #[error("node id {0} is already in use")]
    DuplicateNode(NodeId),

    #[error("{0} is the root and cannot be detached")]
    DetachRoot(NodeId),

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

impl LayoutError {
    /// Rewrite every node id carried by the error, e.g. from arena ids to
    /// the ids a host used when adding the nodes.
    pub fn map_nodes(self, f: impl Fn(NodeId) -> NodeId) -> Self {
        match self {
            Self::InvalidDimensions {
                node,
                width,
                height,
            } => Self::InvalidDimensions {
                node: f(node),
                width,
                height,
            },
            Self::NonFiniteInput { node } => Self::NonFiniteInput { node: f(node) },
            Self::UnknownNode(node) => Self::UnknownNode(f(node)),
            Self::MultipleRoots { first, second } => Self::MultipleRoots {
                first: f(first),
                second: f(second),
            },
            Self::SharedChild { child } => Self::SharedChild { child: f(child) },
            Self::Unreachable { node } => Self::Unreachable { node: f(node) },
            Self::DuplicateNode(node) => Self::DuplicateNode(f(node)),
            Self::DetachRoot(node) => Self::DetachRoot(f(node)),
            other => other,
        }
    }
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
