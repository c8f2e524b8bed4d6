//! Vertex snapping.
//!
//! A figure snaps by translating so that its vertex nearest to any indexed
//! vertex of another figure lands exactly on it, provided the pair is within
//! the snap radius.

use crate::figure::Figure;
use crate::geometry::{vertex, Vertex, EPSILON};
use crate::index::SpatialIndex;

/// A snap target for one vertex of the moving figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    /// Vertex of the moving figure
    pub from: Vertex,
    /// Indexed vertex it would land on
    pub to: Vertex,
    pub distance: f64,
}

impl SnapPoint {
    pub fn translation(&self) -> [f64; 2] {
        self.from.to(&self.to)
    }
}

/// Every indexed vertex within `radius` of a vertex of `figure`.
pub fn find_snap_points(figure: &Figure, index: &SpatialIndex, radius: f64) -> Vec<SnapPoint> {
    let mut snaps = Vec::new();
    for from in figure.vertices() {
        for entry in index.find(&from, radius) {
            let to = entry.vertex();
            snaps.push(SnapPoint { from, to, distance: vertex::distance(&from, &to) });
        }
    }
    snaps
}

/// The closest snap point, if moving to it changes anything.
pub fn best_snap(figure: &Figure, index: &SpatialIndex, radius: f64) -> Option<SnapPoint> {
    if radius.is_nan() || radius <= 0.0 {
        return None;
    }
    find_snap_points(figure, index, radius)
        .into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .filter(|snap| snap.distance > EPSILON)
}
