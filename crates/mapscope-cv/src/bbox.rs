//! Bounding box operations
//!
//! Core abstraction for representing detected regions. Boxes are always
//! expressed in full-frame pixel coordinates unless stated otherwise.

use opencv::core::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in full-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from OpenCV Rect
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }

    /// Convert to OpenCV Rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Calculate center point
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// One past the rightmost column covered by the box
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row covered by the box
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Translate by an offset. This is the named conversion from
    /// search-window coordinates into full-frame coordinates.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Check that the box lies fully inside a `frame_width`x`frame_height` frame
    pub fn fits_within(&self, frame_width: i32, frame_height: i32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.right() <= frame_width
            && self.bottom() <= frame_height
    }

    /// Grow the box outward by the given margins, clamped to the frame.
    ///
    /// Used to recover a UI panel that sits adjacent to the matched anchor,
    /// e.g. the status strip left of and below the minimap. With all-zero
    /// margins this is the identity for any box already inside the frame.
    pub fn expand(&self, margins: &ExpandMargins, frame_width: i32, frame_height: i32) -> Self {
        let x1 = (self.x - margins.left).max(0);
        let y1 = (self.y - margins.up).max(0);
        let x2 = (self.right() + margins.right).min(frame_width);
        let y2 = (self.bottom() + margins.down).min(frame_height);
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// Directional extension distances applied around a locked region.
///
/// Defaults are tuned for the panel that adjoins the minimap anchor on its
/// left and lower sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandMargins {
    pub left: i32,
    pub right: i32,
    pub up: i32,
    pub down: i32,
}

impl ExpandMargins {
    pub fn new(left: i32, right: i32, up: i32, down: i32) -> Self {
        Self {
            left,
            right,
            up,
            down,
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Default for ExpandMargins {
    fn default() -> Self {
        Self {
            left: 150,
            right: 20,
            up: 0,
            down: 140,
        }
    }
}
