//! Oriented line segments and the pairwise predicates figures are built on.

use super::utils_2d::{lerp, project_point_on_line};
use super::vertex::{self, Vertex};
use super::EPSILON;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Segment from `a` to `b`. Serializes as `[[ax, ay], [bx, by]]`.
///
/// Extremes (`left`/`right`/`top`/`bottom`) break ties in favour of `a`:
/// when both vertices share an x, `a` is left and `b` is right; when both
/// share a y, `a` is top and `b` is bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Vertex; 2]", into = "[Vertex; 2]")]
pub struct Edge {
    pub a: Vertex,
    pub b: Vertex,
}

impl From<[Vertex; 2]> for Edge {
    fn from(v: [Vertex; 2]) -> Self {
        Self { a: v[0], b: v[1] }
    }
}

impl From<Edge> for [Vertex; 2] {
    fn from(e: Edge) -> Self {
        [e.a, e.b]
    }
}

impl Edge {
    pub const fn new(a: Vertex, b: Vertex) -> Self {
        Self { a, b }
    }

    pub fn from_points(a: [f64; 2], b: [f64; 2]) -> Self {
        Self::new(a.into(), b.into())
    }

    pub fn vertices(&self) -> [Vertex; 2] {
        [self.a, self.b]
    }

    /// Rise over run; infinite for vertical edges.
    pub fn slope(&self) -> f64 {
        (self.b.y - self.a.y) / (self.b.x - self.a.x)
    }

    /// Undefined (non-finite) for vertical edges.
    pub fn intercept_y(&self) -> f64 {
        self.a.y - self.slope() * self.a.x
    }

    pub fn is_vertical(&self) -> bool {
        (self.b.x - self.a.x).abs() <= EPSILON
    }

    pub fn length(&self) -> f64 {
        vertex::distance(&self.a, &self.b)
    }

    pub fn left(&self) -> Vertex {
        if self.b.x < self.a.x { self.b } else { self.a }
    }

    pub fn right(&self) -> Vertex {
        if self.b.x < self.a.x { self.a } else { self.b }
    }

    pub fn top(&self) -> Vertex {
        if self.b.y > self.a.y { self.b } else { self.a }
    }

    pub fn bottom(&self) -> Vertex {
        if self.b.y > self.a.y { self.a } else { self.b }
    }

    /// Same endpoints in either orientation.
    pub fn same(&self, other: &Edge) -> bool {
        (vertex::same(&self.a, &other.a) && vertex::same(&self.b, &other.b))
            || (vertex::same(&self.a, &other.b) && vertex::same(&self.b, &other.a))
    }

    pub fn has_endpoint(&self, v: &Vertex) -> bool {
        vertex::same(&self.a, v) || vertex::same(&self.b, v)
    }

    /// Endpoint opposite `v`, if `v` is one of the endpoints.
    pub fn opposite(&self, v: &Vertex) -> Option<Vertex> {
        if vertex::same(&self.a, v) {
            Some(self.b)
        } else if vertex::same(&self.b, v) {
            Some(self.a)
        } else {
            None
        }
    }

    /// True if `v` lies strictly inside the edge's bounding box.
    ///
    /// On an axis where the edge is degenerate (horizontal or vertical) the
    /// coordinate only has to match within `EPSILON`.
    pub fn within_bounds(&self, v: &Vertex) -> bool {
        open_interval(self.left().x, self.right().x, v.x)
            && open_interval(self.bottom().y, self.top().y, v.y)
    }

    /// Perpendicular foot of `v` on this edge's line, if it falls inside the
    /// edge's bounding box (inclusive).
    pub fn vertex_intersection(&self, v: &Vertex) -> Option<Vertex> {
        let foot = lerp(&self.a, &self.b, project_point_on_line(&self.a, &self.b, v));
        let inside = self.left().x - EPSILON <= foot.x
            && foot.x <= self.right().x + EPSILON
            && self.bottom().y - EPSILON <= foot.y
            && foot.y <= self.top().y + EPSILON;
        inside.then_some(foot)
    }

    /// Distance from `v` to the segment.
    pub fn vertex_distance(&self, v: &Vertex) -> f64 {
        match self.vertex_intersection(v) {
            Some(foot) => vertex::distance(&foot, v),
            None => vertex::distance(&self.a, v).min(vertex::distance(&self.b, v)),
        }
    }
}

fn open_interval(lo: f64, hi: f64, x: f64) -> bool {
    if hi - lo <= EPSILON {
        (x - lo).abs() <= EPSILON
    } else {
        lo + EPSILON < x && x < hi - EPSILON
    }
}

/// Direction of the edge's line folded into [-PI/2, PI/2] through `atan`, so
/// `+inf` and `-inf` slopes agree and near-vertical edges compare sensibly.
fn slope_angle(e: &Edge) -> f64 {
    if e.is_vertical() {
        PI / 2.0
    } else {
        e.slope().atan()
    }
}

/// Lines through the edges are parallel within `EPSILON`.
pub fn parallel(e0: &Edge, e1: &Edge) -> bool {
    let diff = (slope_angle(e0) - slope_angle(e1)).abs();
    diff <= EPSILON || (diff - PI).abs() <= EPSILON
}

/// Edges lie on the same infinite line.
fn collinear(e0: &Edge, e1: &Edge) -> bool {
    if !parallel(e0, e1) {
        return false;
    }
    match (e0.is_vertical(), e1.is_vertical()) {
        (true, true) => (e0.a.x - e1.a.x).abs() <= EPSILON,
        (false, false) => (e0.intercept_y() - e1.intercept_y()).abs() <= EPSILON,
        // Parallel within tolerance but only one is vertical: compare the
        // non-vertical edge's line at the vertical edge's x.
        (true, false) => (e1.slope() * e0.a.x + e1.intercept_y() - e0.a.y).abs() <= EPSILON,
        (false, true) => (e0.slope() * e1.a.x + e0.intercept_y() - e1.a.y).abs() <= EPSILON,
    }
}

fn shared_endpoint(e0: &Edge, e1: &Edge) -> bool {
    e0.has_endpoint(&e1.a) || e0.has_endpoint(&e1.b)
}

/// Edges properly cross: the crossing point is strictly inside both edges.
/// Edges that share an endpoint or are parallel never intersect.
pub fn intersect(e0: &Edge, e1: &Edge) -> bool {
    if shared_endpoint(e0, e1) || parallel(e0, e1) {
        return false;
    }

    let crossing = match (e0.is_vertical(), e1.is_vertical()) {
        (true, false) => {
            let x = e0.a.x;
            Vertex::new(x, e1.slope() * x + e1.intercept_y())
        }
        (false, true) => {
            let x = e1.a.x;
            Vertex::new(x, e0.slope() * x + e0.intercept_y())
        }
        _ => {
            let (m0, m1) = (e0.slope(), e1.slope());
            let (b0, b1) = (e0.intercept_y(), e1.intercept_y());
            let x = (b1 - b0) / (m0 - m1);
            Vertex::new(x, m0 * x + b0)
        }
    };

    e0.within_bounds(&crossing) && e1.within_bounds(&crossing)
}

/// Edges lie on the same line and touch or overlap.
pub fn coincident(e0: &Edge, e1: &Edge) -> bool {
    if !collinear(e0, e1) {
        return false;
    }
    shared_endpoint(e0, e1)
        || e0.within_bounds(&e1.a)
        || e0.within_bounds(&e1.b)
        || e1.within_bounds(&e0.a)
        || e1.within_bounds(&e0.b)
}

/// Order along a line: x ascending, then y ascending.
fn along_line(v0: &Vertex, v1: &Vertex) -> Ordering {
    if (v0.x - v1.x).abs() > EPSILON {
        v0.x.total_cmp(&v1.x)
    } else {
        v0.y.total_cmp(&v1.y)
    }
}

/// Finest collinear pieces spanning the union of two coincident edges.
pub fn subsect(e0: &Edge, e1: &Edge) -> Vec<Edge> {
    if !coincident(e0, e1) {
        return Vec::new();
    }

    let mut points = vec![e0.a, e0.b, e1.a, e1.b];
    points.sort_by(along_line);
    points.dedup_by(|a, b| vertex::same(a, b));

    points.windows(2).map(|w| Edge::new(w[0], w[1])).collect()
}
