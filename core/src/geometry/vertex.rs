//! Points in the composition plane.

use super::EPSILON;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point. Serializes as a bare `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Vector from `self` to `other`.
    pub fn to(&self, other: &Vertex) -> [f64; 2] {
        [other.x - self.x, other.y - self.y]
    }

    fn as_point(&self) -> na::Point2<f64> {
        na::Point2::new(self.x, self.y)
    }

    fn from_point(p: na::Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<[f64; 2]> for Vertex {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(v: Vertex) -> Self {
        [v.x, v.y]
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Both coordinate deltas within `EPSILON`.
#[inline]
pub fn same(v0: &Vertex, v1: &Vertex) -> bool {
    (v0.x - v1.x).abs() <= EPSILON && (v0.y - v1.y).abs() <= EPSILON
}

#[inline]
pub fn distance(v0: &Vertex, v1: &Vertex) -> f64 {
    na::distance(&v0.as_point(), &v1.as_point())
}

/// Rotate counter-clockwise about the origin.
pub fn rotate(v: &Vertex, angle: f64) -> Vertex {
    Vertex::from_point(na::Rotation2::new(angle) * v.as_point())
}

pub fn translate(v: &Vertex, translation: [f64; 2]) -> Vertex {
    Vertex::from_point(v.as_point() + na::Vector2::new(translation[0], translation[1]))
}

/// Mirror across the line through the origin at `angle` radians.
///
/// `reflect(v, 0.0)` mirrors across the x-axis, `reflect(v, PI / 2.0)` across
/// the y-axis.
pub fn reflect(v: &Vertex, angle: f64) -> Vertex {
    let (s, c) = (2.0 * angle).sin_cos();
    let m = na::Matrix2::new(c, s, s, -c);
    let r = m * na::Vector2::new(v.x, v.y);
    Vertex::new(r.x, r.y)
}
