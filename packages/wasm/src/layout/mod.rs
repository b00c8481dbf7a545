//! Tidy tree layout.
//!
//! [`TidyLayout`] computes the final x of every node in a [`Tree`] in
//! linear time. Vertical positions come from the tree itself or from one of
//! the [`VerticalPlacement`] modes, which run first.
//!
//! [`Tree`]: crate::tree::Tree

pub mod config;
mod contour;
pub mod tidy_tree;
mod vertical;

pub use config::{LayoutConfig, VerticalPlacement};
pub use tidy_tree::{layout, LayoutStats, TidyLayout};
