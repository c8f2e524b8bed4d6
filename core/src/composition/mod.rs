//! Composition: a collection of figures kept consistent under mutation.
//!
//! Every mutation runs as a table of weighted stages (see [`pipeline`]) that
//! keep the raw edge index, the subsection index, the intersecting pairs and
//! the gap list in step with the figure map.

pub mod history;
pub(crate) mod pipeline;
pub mod serial;
pub mod snap;
pub(crate) mod stages;
mod types;

pub use history::{from_history, replay, Command, HistoryRecord};
pub use serial::{CompositionData, CompositionDocument, FigureEntry};
pub use types::*;

use crate::error::{CompositionError, CompositionResult};
use crate::figure::{self, Figure};
use crate::geometry::{edge, vertex, Edge, Vertex};
use crate::index::SpatialIndex;
use pipeline::StageContext;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Composition {
    pub(crate) options: CompositionOptions,
    pub(crate) figures: BTreeMap<FigureId, Figure>,
    pub(crate) intersecting: BTreeSet<FigurePair>,
    pub(crate) gaps: Vec<Figure>,
    /// Edges of live figures, tagged with their owner.
    pub(crate) raw: SpatialIndex,
    /// Coincident pieces of every live pair, tagged with both owners.
    pub(crate) subsections: SpatialIndex,
    pub(crate) count: u64,
    pub(crate) history: Vec<HistoryRecord>,
    pub(crate) diagnostics: Vec<StageFailure>,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new(CompositionOptions::default())
    }
}

fn index_extent(bounds: &[[f64; 2]; 2]) -> f64 {
    Edge::from_points(bounds[0], bounds[1]).length()
}

impl Composition {
    pub fn new(options: CompositionOptions) -> Self {
        let mut composition = Self::blank(options.clone());
        composition.init(options);
        composition
    }

    /// Empty state with no history.
    pub(crate) fn blank(options: CompositionOptions) -> Self {
        let extent = index_extent(&options.bounds);
        Self {
            options,
            figures: BTreeMap::new(),
            intersecting: BTreeSet::new(),
            gaps: Vec::new(),
            raw: SpatialIndex::new(extent),
            subsections: SpatialIndex::new(extent),
            count: 0,
            history: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Reset to an empty composition with `options`. History restarts with
    /// this call as its first record.
    pub fn init(&mut self, options: CompositionOptions) {
        *self = Self::blank(options.clone());
        self.record(Command::Init(options));
    }

    pub(crate) fn record(&mut self, command: Command) {
        self.history.push(command.to_record());
    }

    fn next_id(&mut self) -> FigureId {
        let id = FigureId::new(self.count);
        self.count += 1;
        id
    }

    pub(crate) fn snap_radius(&self) -> f64 {
        self.options.snap_tolerance * self.bounds_edge().length()
    }

    fn bounds_edge(&self) -> Edge {
        Edge::from_points(self.options.bounds[0], self.options.bounds[1])
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Add a figure and return its id.
    pub fn add(&mut self, figure: Figure) -> CompositionResult<FigureId> {
        self.add_with(figure, MutationOptions::default())
    }

    pub fn add_with(&mut self, figure: Figure, options: MutationOptions) -> CompositionResult<FigureId> {
        let id = self.next_id();
        let snap = options.snap.unwrap_or(self.options.do_snap);
        let recorded = Command::Add { figure: figure.clone(), options };

        self.insert(id, figure, snap)?;
        self.record(recorded);
        debug!(figure = %id, "Added figure");
        Ok(id)
    }

    pub(crate) fn insert(&mut self, id: FigureId, figure: Figure, snap: bool) -> CompositionResult<()> {
        let mut ctx = StageContext { pending: Some(figure), snap, ..StageContext::default() };
        self.run_stages(Action::Insert, id, stages::INSERT, &mut ctx)
    }

    /// Remove a figure. Returns false, and changes nothing, for unknown ids.
    pub fn remove(&mut self, id: FigureId) -> CompositionResult<bool> {
        if !self.figures.contains_key(&id) {
            debug!(figure = %id, "Ignoring removal of unknown figure");
            return Ok(false);
        }

        let mut ctx = StageContext::default();
        self.run_stages(Action::Remove, id, stages::REMOVE, &mut ctx)?;
        self.record(Command::Remove(id));
        debug!(figure = %id, "Removed figure");
        Ok(true)
    }

    /// Apply reflection, then position, then rotation, and report where the
    /// figure ended up.
    pub fn transform(&mut self, id: FigureId, transform: Transform) -> CompositionResult<TransformOutcome> {
        self.transform_with(id, transform, MutationOptions::default())
    }

    pub fn transform_with(
        &mut self,
        id: FigureId,
        transform: Transform,
        options: MutationOptions,
    ) -> CompositionResult<TransformOutcome> {
        let Some(current) = self.figures.get(&id) else {
            return Err(CompositionError::UnknownFigure(id));
        };
        let start = current.position();
        let snap = options.snap.unwrap_or(self.options.do_snap);

        let mut ctx = StageContext { request: transform, snap, ..StageContext::default() };
        self.run_stages(Action::Transform, id, stages::TRANSFORM, &mut ctx)?;

        let final_position = match (ctx.final_position, self.figures.get(&id)) {
            (Some(position), _) => position,
            (None, Some(figure)) => figure.position(),
            (None, None) => start,
        };
        let snapped = snap && transform.position.is_some_and(|target| !vertex::same(&target, &final_position));

        self.record(Command::Transform { id, transform, options });
        Ok(TransformOutcome {
            start: ctx.start.unwrap_or(start),
            target: transform.position,
            final_position,
            snapped,
        })
    }

    pub fn move_to(&mut self, id: FigureId, position: impl Into<Vertex>) -> CompositionResult<TransformOutcome> {
        self.transform(id, Transform::position(position))
    }

    pub fn rotate_to(&mut self, id: FigureId, rotation: f64) -> CompositionResult<TransformOutcome> {
        self.transform(id, Transform::rotation(rotation))
    }

    pub fn reflect_own_x(&mut self, id: FigureId) -> CompositionResult<TransformOutcome> {
        self.transform(id, Transform::reflection(true, false))
    }

    pub fn reflect_own_y(&mut self, id: FigureId) -> CompositionResult<TransformOutcome> {
        self.transform(id, Transform::reflection(false, true))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn options(&self) -> &CompositionOptions {
        &self.options
    }

    /// The domain corners, left one first.
    pub fn bounds(&self) -> [[f64; 2]; 2] {
        let edge = self.bounds_edge();
        [edge.left().to_array(), edge.right().to_array()]
    }

    pub fn set_bounds(&mut self, corner0: [f64; 2], corner1: [f64; 2]) {
        self.options.bounds = [corner0, corner1];
        self.record(Command::SetBounds([corner0, corner1]));
    }

    pub fn snap(&self) -> bool {
        self.options.do_snap
    }

    pub fn set_snap(&mut self, snap: bool) {
        self.options.do_snap = snap;
        self.record(Command::SetSnap(snap));
    }

    pub fn snap_tolerance(&self) -> f64 {
        self.options.snap_tolerance
    }

    pub fn set_snap_tolerance(&mut self, tolerance: f64) {
        self.options.snap_tolerance = tolerance;
        self.record(Command::SetSnapTolerance(tolerance));
    }

    pub fn process_gaps(&self) -> bool {
        self.options.process_gaps
    }

    /// Only affects later mutations; existing gap records are left as they are.
    pub fn set_process_gaps(&mut self, process_gaps: bool) {
        self.options.process_gaps = process_gaps;
        self.record(Command::SetProcessGaps(process_gaps));
    }

    pub fn debug(&self) -> bool {
        self.options.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.get(&id)
    }

    /// Figures in insertion order.
    pub fn figures(&self) -> impl Iterator<Item = (FigureId, &Figure)> {
        self.figures.iter().map(|(id, figure)| (*id, figure))
    }

    pub fn ids(&self) -> Vec<FigureId> {
        self.figures.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    pub fn gaps(&self) -> &[Figure] {
        &self.gaps
    }

    pub fn intersecting(&self) -> Vec<FigurePair> {
        self.intersecting.iter().copied().collect()
    }

    /// Stage failures caught so far, oldest first.
    pub fn diagnostics(&self) -> &[StageFailure] {
        &self.diagnostics
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn vertex_index(&self) -> &SpatialIndex {
        &self.raw
    }

    pub fn subsection_index(&self) -> &SpatialIndex {
        &self.subsections
    }

    fn pairs_where(&self, pred: impl Fn(&Figure, &Figure) -> bool) -> Vec<FigurePair> {
        let entries: Vec<(&FigureId, &Figure)> = self.figures.iter().collect();
        let mut pairs = Vec::new();
        for (i, (a, fa)) in entries.iter().enumerate() {
            for (b, fb) in &entries[i + 1..] {
                if pred(fa, fb) {
                    pairs.push(FigurePair::new(**a, **b));
                }
            }
        }
        pairs
    }

    /// Every pair of figures whose interiors overlap.
    pub fn overlapping(&self) -> Vec<FigurePair> {
        self.pairs_where(figure::overlap)
    }

    /// Figures with no coincident edge against any other figure.
    pub fn floats(&self) -> Vec<FigureId> {
        let touching = self.pairs_where(figure::coincident);
        self.figures
            .keys()
            .copied()
            .filter(|id| !touching.iter().any(|pair| pair.contains(*id)))
            .collect()
    }

    /// Figures with a vertex that no other figure shares.
    pub fn non_integrated(&self) -> Vec<FigureId> {
        self.figures
            .iter()
            .filter(|(_, figure)| {
                figure
                    .vertices()
                    .iter()
                    .any(|v| self.raw.at(v).map_or(true, |entry| entry.tags().len() <= 1))
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Figures with an edge that is coincident with no edge of another figure.
    pub fn non_coincident(&self) -> Vec<FigureId> {
        self.figures
            .iter()
            .filter(|(id, figure)| {
                figure.edges().iter().any(|e0| {
                    !self
                        .figures
                        .iter()
                        .filter(|(other, _)| other != id)
                        .any(|(_, other)| other.edges().iter().any(|e1| edge::coincident(e0, e1)))
                })
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every figure edge with its owner.
    pub fn edges(&self) -> Vec<OwnedEdge> {
        self.figures
            .iter()
            .flat_map(|(id, figure)| figure.edges().into_iter().map(move |edge| OwnedEdge { id: *id, edge }))
            .collect()
    }
}

/// Two compositions hold the same figures, matched by shape and placement.
pub fn same(a: &Composition, b: &Composition) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut unmatched: Vec<&Figure> = b.figures.values().collect();
    for fa in a.figures.values() {
        match unmatched.iter().position(|fb| figure::same(fa, fb)) {
            Some(i) => {
                unmatched.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests_composition;
#[cfg(test)]
mod tests_gaps;
#[cfg(test)]
mod tests_history;
