//! Polygons placed in a composition.
//!
//! A [`Shape`] is a bare vertex ring. A [`Figure`] wraps a shape with a
//! transform (reflection, rotation, position) and derives its placed vertices
//! and edges on demand. Figures are mutated in place; the composition keys its
//! index bookkeeping on their identity.

use crate::geometry::utils_2d::{self, interior_samples, point_in_polygon};
use crate::geometry::{edge, vertex, ApproxEq, Edge, Vertex};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub mod serial;
pub use serial::{Document, FigureData, ShapeData};

/// An ordered vertex ring describing a simple polygon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    vertices: Vec<Vertex>,
}

impl Shape {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn from_points(points: &[[f64; 2]]) -> Self {
        Self::new(points.iter().copied().map(Vertex::from).collect())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> Vec<Edge> {
        utils_2d::ring_edges(&self.vertices).collect()
    }
}

/// Reflection across the figure's own axes. Each flag toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reflection {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    shape: Shape,
    position: Vertex,
    rotation: f64,
    reflection: Reflection,
}

impl From<Shape> for Figure {
    fn from(shape: Shape) -> Self {
        Self::new(shape)
    }
}

impl Figure {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            position: Vertex::origin(),
            rotation: 0.0,
            reflection: Reflection::default(),
        }
    }

    pub fn from_points(points: &[[f64; 2]]) -> Self {
        Self::new(Shape::from_points(points))
    }

    /// Restore a figure with an explicit transform.
    pub fn with_transform(shape: Shape, position: Vertex, rotation: f64, reflection: Reflection) -> Self {
        Self { shape, position, rotation, reflection }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn position(&self) -> Vertex {
        self.position
    }

    pub fn set_position(&mut self, position: Vertex) {
        self.position = position;
    }

    pub fn translate(&mut self, translation: [f64; 2]) {
        self.position = vertex::translate(&self.position, translation);
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Absolute rotation in radians about the figure's local origin.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    pub fn reflection(&self) -> Reflection {
        self.reflection
    }

    pub fn reflect_x(&mut self) {
        self.reflection.x = !self.reflection.x;
    }

    pub fn reflect_y(&mut self) {
        self.reflection.y = !self.reflection.y;
    }

    /// Placed vertices: reflect, then rotate, then translate.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.shape
            .vertices()
            .iter()
            .map(|v| {
                let mut p = *v;
                if self.reflection.x {
                    p = vertex::reflect(&p, 0.0);
                }
                if self.reflection.y {
                    p = vertex::reflect(&p, PI / 2.0);
                }
                if self.rotation != 0.0 {
                    p = vertex::rotate(&p, self.rotation);
                }
                vertex::translate(&p, self.position.to_array())
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<Edge> {
        utils_2d::ring_edges(&self.vertices()).collect()
    }

    /// Strictly inside the placed polygon.
    pub fn contains(&self, v: &Vertex) -> bool {
        point_in_polygon(v, &self.vertices())
    }

    pub fn is_finite(&self) -> bool {
        self.vertices().iter().all(Vertex::is_finite)
    }
}

fn any_edge_pair(a: &Figure, b: &Figure, pred: impl Fn(&Edge, &Edge) -> bool) -> bool {
    let (ea, eb) = (a.edges(), b.edges());
    ea.iter().any(|e0| eb.iter().any(|e1| pred(e0, e1)))
}

/// Any pair of edges properly crosses.
pub fn intersect(a: &Figure, b: &Figure) -> bool {
    any_edge_pair(a, b, edge::intersect)
}

/// Any pair of edges is coincident.
pub fn coincident(a: &Figure, b: &Figure) -> bool {
    any_edge_pair(a, b, edge::coincident)
}

/// The polygons' interiors share positive area.
pub fn overlap(a: &Figure, b: &Figure) -> bool {
    if intersect(a, b) {
        return true;
    }
    let (va, vb) = (a.vertices(), b.vertices());
    let inside = |points: &[Vertex], ring: &[Vertex]| points.iter().any(|p| point_in_polygon(p, ring));

    inside(&va, &vb)
        || inside(&vb, &va)
        || inside(&interior_samples(&va), &vb)
        || inside(&interior_samples(&vb), &va)
}

/// The figures touch along a boundary segment without overlapping.
pub fn siblings(a: &Figure, b: &Figure) -> bool {
    coincident(a, b) && !overlap(a, b)
}

/// Same placed vertex set, in any order.
pub fn same(a: &Figure, b: &Figure) -> bool {
    let (va, mut vb) = (a.vertices(), b.vertices());
    if va.len() != vb.len() {
        return false;
    }
    for v0 in &va {
        match vb.iter().position(|v1| v0.approx_eq(v1)) {
            Some(index) => {
                vb.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}

/// Sub-edges produced by every coincident edge pair of `a` and `b`.
pub fn subsect(a: &Figure, b: &Figure) -> Vec<Edge> {
    let (ea, eb) = (a.edges(), b.edges());
    ea.iter()
        .flat_map(|e0| eb.iter().flat_map(move |e1| edge::subsect(e0, e1)))
        .collect()
}
