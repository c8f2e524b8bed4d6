//! Gap detection by boundary tracing.
//!
//! A gap is a region fully enclosed by figure boundaries that no figure
//! covers. The raw and subsection indices are merged into one graph in which
//! every edge is split at each indexed point lying on it, so T-junctions from
//! any figure become walkable corners. Starting from each edge of a probe
//! figure, the finder walks that graph, always taking the most clockwise
//! turn, until it returns to where it began. Closed walks that overlap no
//! live figure are gaps.

use crate::error::GapError;
use crate::figure::{self, Figure, Shape};
use crate::geometry::utils_2d::{cross_2d, dedup_ring, dot_2d, midpoint, project_point_on_line, turn_angle};
use crate::geometry::{vertex, Edge, Vertex, EPSILON};
use crate::index::SpatialIndex;
use tracing::trace;

/// A walked edge, in travel direction.
type Step = (Vertex, Vertex);

/// Traces closed boundaries over the two edge indices of a composition.
pub struct GapFinder {
    graph: SpatialIndex,
    step_limit: usize,
}

fn same_direction(d0: [f64; 2], d1: [f64; 2]) -> bool {
    let l0 = dot_2d(d0, d0).sqrt();
    let l1 = dot_2d(d1, d1).sqrt();
    if l0 <= EPSILON || l1 <= EPSILON {
        return false;
    }
    cross_2d(d0, d1).abs() / (l0 * l1) <= EPSILON && dot_2d(d0, d1) > 0.0
}

fn walked(steps: &[Step], from: &Vertex, to: &Vertex) -> bool {
    steps.iter().any(|(a, b)| vertex::same(a, from) && vertex::same(b, to))
}

/// `edge` cut at every point of `indices` lying on it.
fn split_at_points(edge: &Edge, indices: [&SpatialIndex; 2]) -> Vec<Edge> {
    let centre = midpoint(&edge.a, &edge.b);
    let reach = edge.length() / 2.0 + EPSILON;

    let mut stops: Vec<(f64, Vertex)> = indices
        .into_iter()
        .flat_map(|index| index.find(&centre, reach))
        .map(|entry| entry.vertex())
        .filter(|v| edge.vertex_distance(v) <= EPSILON)
        .map(|v| (project_point_on_line(&edge.a, &edge.b, &v), v))
        .collect();
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));
    stops.dedup_by(|a, b| vertex::same(&a.1, &b.1));

    stops
        .windows(2)
        .map(|pair| Edge::new(pair[0].1, pair[1].1))
        .filter(|piece| !vertex::same(&piece.a, &piece.b))
        .collect()
}

/// Drop vertices in the middle of a straight run.
fn drop_collinear(ring: Vec<Vertex>) -> Vec<Vertex> {
    let n = ring.len();
    if n < 4 {
        return ring;
    }
    (0..n)
        .filter(|&i| {
            let (prev, v, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            !same_direction(prev.to(&v), v.to(&next))
        })
        .map(|i| ring[i])
        .collect()
}

impl GapFinder {
    pub fn new(raw: &SpatialIndex, subsections: &SpatialIndex) -> Self {
        let indices = [raw, subsections];
        let mut graph = SpatialIndex::new(raw.extent());
        for index in indices {
            for entry in index.entries() {
                // Each edge is registered at both endpoints; split it once.
                for edge in entry.edges().filter(|e| vertex::same(&e.a, &entry.vertex())) {
                    for piece in split_at_points(edge, indices) {
                        graph.insert_edge(piece, &[]);
                    }
                }
            }
        }

        // A trace walks each directed edge at most once.
        let step_limit = 8 * (raw.len() + subsections.len()) + 16;
        Self { graph, step_limit }
    }

    /// Override the walk budget.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Endpoints reachable from `v` in one step, keeping only the nearest
    /// point in each direction.
    fn neighbours(&self, v: &Vertex) -> Vec<Vertex> {
        let mut out: Vec<Vertex> = Vec::new();
        let Some(entry) = self.graph.at(v) else { return out };

        for edge in entry.edges() {
            let Some(other) = edge.opposite(v) else { continue };
            if vertex::same(&other, v) {
                continue;
            }
            let d = v.to(&other);
            match out.iter().position(|o| same_direction(v.to(o), d)) {
                Some(i) => {
                    if vertex::distance(v, &other) < vertex::distance(v, &out[i]) {
                        out[i] = other;
                    }
                }
                None => out.push(other),
            }
        }
        out
    }

    /// The nearest neighbour of `from` lying in the direction of `toward`.
    fn step_toward(&self, from: &Vertex, toward: &Vertex) -> Option<Vertex> {
        let d = from.to(toward);
        self.neighbours(from).into_iter().find(|n| same_direction(from.to(n), d))
    }

    /// Walk from `start` through `first`, turning as far clockwise as possible
    /// at every point. Returns the ring when the walk closes, `None` on dead
    /// ends or when it starts repeating itself.
    fn trace(&self, start: Vertex, first: Vertex, claimed: &mut Vec<Step>) -> Result<Option<Vec<Vertex>>, GapError> {
        let mut ring = vec![start];
        let mut steps: Vec<Step> = vec![(start, first)];
        let (mut prev, mut current) = (start, first);

        for _ in 0..self.step_limit {
            if vertex::same(&current, &start) {
                claimed.extend(steps);
                let ring = drop_collinear(dedup_ring(ring));
                return Ok((ring.len() >= 3).then_some(ring));
            }
            ring.push(current);

            let heading = prev.to(&current);
            let next = self
                .neighbours(&current)
                .into_iter()
                .filter(|n| !vertex::same(n, &prev))
                .min_by(|a, b| {
                    let ta = turn_angle(heading, current.to(a));
                    let tb = turn_angle(heading, current.to(b));
                    ta.total_cmp(&tb)
                });

            let Some(next) = next else {
                trace!("Dead end at ({}, {})", current.x, current.y);
                return Ok(None);
            };
            if walked(&steps, &current, &next) {
                return Ok(None);
            }
            steps.push((current, next));
            prev = current;
            current = next;
        }

        Err(GapError::Unterminated { steps: self.step_limit })
    }

    /// Closed regions bordering `probe` that overlap none of `live` and are
    /// not already listed in `known`.
    pub fn gaps_from(&self, probe: &Figure, live: &[&Figure], known: &[Figure]) -> Result<Vec<Figure>, GapError> {
        let mut claimed: Vec<Step> = Vec::new();
        let mut found: Vec<Figure> = Vec::new();

        for edge in probe.edges() {
            for (from, toward) in [(edge.a, edge.b), (edge.b, edge.a)] {
                let Some(first) = self.step_toward(&from, &toward) else { continue };
                if walked(&claimed, &from, &first) {
                    continue;
                }
                let Some(ring) = self.trace(from, first, &mut claimed)? else { continue };

                let gap = Figure::new(Shape::new(ring));
                if live.iter().any(|f| figure::overlap(&gap, f)) {
                    continue;
                }
                if found.iter().chain(known).any(|g| figure::same(g, &gap)) {
                    continue;
                }
                found.push(gap);
            }
        }

        Ok(found)
    }
}
