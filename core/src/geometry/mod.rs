//! 2D geometry primitives shared by figures, the spatial index and gap tracing.

pub mod vertex;
pub use vertex::Vertex;

pub mod edge;
pub use edge::Edge;

pub mod utils_2d;

/// Tolerance for floating-point comparisons
pub const EPSILON: f64 = 1e-9;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() <= EPSILON
    }
}

impl ApproxEq for Vertex {
    fn approx_eq(&self, other: &Self) -> bool {
        vertex::same(self, other)
    }
}

impl ApproxEq for Edge {
    fn approx_eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}
