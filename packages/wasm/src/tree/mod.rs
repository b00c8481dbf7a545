//! Tree data structures.
//!
//! The tree is an arena of [`TreeNode`]s addressed by stable [`NodeId`]s.
//! Children are owned, ordered id lists; every other link the layout
//! engine keeps (threads, extreme nodes) is a non-owning id.

mod arena;
mod build;
mod node;

pub use arena::Tree;
pub use node::{NodeId, NodeSpec, TreeNode};
