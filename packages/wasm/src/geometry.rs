//! Axis-aligned geometry shared by the tree, the layout engine and the
//! spatial index.

use serde::{Deserialize, Serialize};

/// Scalar type of every coordinate and dimension.
pub type Coordinate = f64;

/// Tolerance used when comparing laid-out edges that are allowed to touch.
pub const EPSILON: Coordinate = 1e-6;

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: Coordinate,
    pub y: Coordinate,
    pub width: Coordinate,
    pub height: Coordinate,
}

impl Rect {
    pub fn new(x: Coordinate, y: Coordinate, width: Coordinate, height: Coordinate) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> Coordinate {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> Coordinate {
        self.y + self.height
    }

    /// Horizontal center, the point mirrored layouts reflect about.
    #[inline]
    pub fn center_x(&self) -> Coordinate {
        self.x + self.width / 2.0
    }

    /// Whether the two rectangles share an area larger than `EPSILON` on
    /// both axes. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.bottom() - EPSILON
            && other.y < self.bottom() - EPSILON
    }

    pub fn contains(&self, x: Coordinate, y: Coordinate) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}
