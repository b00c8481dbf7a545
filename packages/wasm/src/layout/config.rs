//! Layout configuration.
//!
//! The configuration crosses the WASM boundary as a plain JavaScript
//! object, so every field has a serde default and camelCase name.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::Coordinate;

/// How node vertical positions are chosen before the contour pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalPlacement {
    /// Keep the `y` each node was built with.
    #[default]
    Given,
    /// Place each child `parent_child_margin` below its own parent's bottom
    /// edge. Nodes at the same depth may end up at different heights.
    Stacked,
    /// Give every node at one depth the same `y`: the largest
    /// `parent.bottom + parent_child_margin` over that depth.
    Layered,
}

/// Configuration for the tidy tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Minimum horizontal gap between adjacent sibling subtrees. Zero lets
    /// subtrees touch.
    pub peer_margin: Coordinate,
    /// Vertical gap between a parent and its children, used by the
    /// `Stacked` and `Layered` placements.
    pub parent_child_margin: Coordinate,
    /// Vertical placement mode.
    pub vertical: VerticalPlacement,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            peer_margin: 0.0,
            parent_child_margin: 0.0,
            vertical: VerticalPlacement::Given,
        }
    }
}

impl LayoutConfig {
    /// Stacked placement with the given margins.
    pub fn stacked(parent_child_margin: Coordinate, peer_margin: Coordinate) -> Self {
        Self {
            peer_margin,
            parent_child_margin,
            vertical: VerticalPlacement::Stacked,
        }
    }

    /// Layered placement with the given margins.
    pub fn layered(parent_child_margin: Coordinate, peer_margin: Coordinate) -> Self {
        Self {
            vertical: VerticalPlacement::Layered,
            ..Self::stacked(parent_child_margin, peer_margin)
        }
    }

    pub fn with_peer_margin(self, peer_margin: Coordinate) -> Self {
        Self {
            peer_margin,
            ..self
        }
    }

    /// Reject negative or non-finite margins.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("peerMargin", self.peer_margin),
            ("parentChildMargin", self.parent_child_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
