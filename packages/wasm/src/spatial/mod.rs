//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based index over laid-out node boxes,
//! used for point picking from the host and for overlap checks.

mod rtree;

pub use rtree::{BoxIndex, NodeBox};
