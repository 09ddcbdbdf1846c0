//! 2D point type shared by samplers, triangulation and output.

use serde::{Deserialize, Serialize};

/// 2D position in image pixel space.
///
/// Serializes as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point
    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point
    pub fn dist(&self, other: &Point) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// True when the point lies in `[0, width] x [0, height]`, edges included
    pub fn in_bounds(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.x <= width && self.y >= 0.0 && self.y <= height
    }

    /// Clamp into `[0, width] x [0, height]`
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width),
            y: self.y.clamp(0.0, height),
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}
