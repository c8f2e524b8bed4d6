//! 2D geometry utilities for polygon predicates and boundary tracing.
//!
//! Pure functions over [`Vertex`] rings that the figure predicates and the gap
//! finder share.

use super::{vertex, Edge, Vertex, EPSILON};

// =============================================================================
// Vector Operations
// =============================================================================

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[1] - v1[1] * v2[0]
}

/// 2D dot product.
#[inline]
pub fn dot_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[0] + v1[1] * v2[1]
}

/// Signed turn from direction `d_in` to direction `d_out`, in (-PI, PI].
/// Negative values are clockwise turns.
#[inline]
pub fn turn_angle(d_in: [f64; 2], d_out: [f64; 2]) -> f64 {
    cross_2d(d_in, d_out).atan2(dot_2d(d_in, d_out))
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp(p1: &Vertex, p2: &Vertex, t: f64) -> Vertex {
    Vertex::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y))
}

#[inline]
pub fn midpoint(p1: &Vertex, p2: &Vertex) -> Vertex {
    lerp(p1, p2, 0.5)
}

/// Find parameter t where point projects onto the line through `start`/`end`.
/// Returns t such that point ≈ start + t * (end - start).
pub fn project_point_on_line(start: &Vertex, end: &Vertex, point: &Vertex) -> f64 {
    let d = start.to(end);
    let len_sq = dot_2d(d, d);

    if len_sq < EPSILON * EPSILON {
        return 0.0;
    }

    dot_2d(start.to(point), d) / len_sq
}

// =============================================================================
// Polygon Operations
// =============================================================================

/// Compute signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[Vertex]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    area / 2.0
}

/// True if `point` lies on any edge of the ring, within `EPSILON`.
pub fn point_on_boundary(point: &Vertex, polygon: &[Vertex]) -> bool {
    ring_edges(polygon).any(|e| e.vertex_distance(point) <= EPSILON)
}

/// Test if a point is strictly inside a polygon using the winding number
/// algorithm. Points on the boundary are not inside.
pub fn point_in_polygon(point: &Vertex, polygon: &[Vertex]) -> bool {
    let n = polygon.len();
    if n < 3 || point_on_boundary(point, polygon) {
        return false;
    }

    let mut winding: i32 = 0;

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        let cross = cross_2d(p1.to(&p2), p1.to(point));

        if p1.y <= point.y {
            // Upward crossing
            if p2.y > point.y && cross > 0.0 {
                winding += 1;
            }
        } else if p2.y <= point.y && cross < 0.0 {
            // Downward crossing
            winding -= 1;
        }
    }

    winding != 0
}

/// A point just inside the polygon next to the midpoint of each edge.
///
/// The offset is relative to the edge length so the sample stays clear of
/// neighbouring boundaries at any scale.
pub fn interior_samples(polygon: &[Vertex]) -> Vec<Vertex> {
    let area = polygon_signed_area(polygon);
    if area.abs() <= EPSILON {
        return Vec::new();
    }
    // CCW rings have their interior on the left of each edge.
    let side = area.signum();

    ring_edges(polygon)
        .filter_map(|e| {
            let d = e.a.to(&e.b);
            let len = dot_2d(d, d).sqrt();
            if len <= EPSILON {
                return None;
            }
            let nudge = 1e-6 * len;
            let m = midpoint(&e.a, &e.b);
            Some(Vertex::new(
                m.x - side * d[1] / len * nudge,
                m.y + side * d[0] / len * nudge,
            ))
        })
        .collect()
}

/// Edges joining consecutive vertices, wrapping last to first.
pub fn ring_edges(polygon: &[Vertex]) -> impl Iterator<Item = Edge> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| Edge::new(polygon[i], polygon[(i + 1) % n]))
}

/// Drop consecutive duplicates (including a closing duplicate of the first vertex).
pub fn dedup_ring(mut ring: Vec<Vertex>) -> Vec<Vertex> {
    ring.dedup_by(|a, b| vertex::same(a, b));
    while ring.len() > 1 && vertex::same(&ring[0], &ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

// =============================================================================
// Tests
// =============================================================================
