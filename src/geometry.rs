//! Screen geometry for handles and tracks.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center of the box. This is where a hover or press lands.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.center_y())
    }

    /// Vertical center line. Drag gestures on a track are issued along it.
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Whether `x` lies within the horizontal extent of the box (inclusive).
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x <= self.right()
    }
}

impl From<eoka::BoundingBox> for Rect {
    fn from(b: eoka::BoundingBox) -> Self {
        Self::new(b.x, b.y, b.width, b.height)
    }
}
