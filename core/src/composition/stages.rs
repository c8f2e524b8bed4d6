//! Stage tables for insert, remove and transform, and the stage bodies.
//!
//! Weights only matter relative to each other within one table.

use super::pipeline::{Stage, StageContext};
use super::{snap, Composition, FigureId, FigurePair};
use crate::error::StageError;
use crate::figure::{self, Figure};
use crate::gaps::GapFinder;
use tracing::debug;

pub(crate) static INSERT: &[Stage] = &[
    Stage::figure("register figure", -100, register_figure),
    Stage::figure("snap", -6, snap_figure),
    Stage::pair("find intersections", -5, find_intersections),
    Stage::pair("find subsections", -3, find_subsections),
    Stage::figure("index edges", 0, index_edges),
    Stage::figure("prune overlapped gaps", 1, prune_overlapped_gaps),
    Stage::figure("sibling gaps", 2, sibling_gaps),
    Stage::figure("own gaps", 2, own_gaps),
];

pub(crate) static REMOVE: &[Stage] = &[
    Stage::figure("record siblings", -1, record_siblings),
    Stage::figure("clear intersections", 0, clear_intersections),
    Stage::figure("clear coincident gaps", 0, clear_coincident_gaps),
    Stage::pair("clear subsections", 0, clear_subsections),
    Stage::figure("unindex edges", 1, unindex_edges),
    Stage::figure("drop figure", 1, drop_figure),
    Stage::figure("sibling gaps", 2, sibling_gaps),
];

pub(crate) static TRANSFORM: &[Stage] = &[
    Stage::figure("record start", -1000, record_start),
    Stage::figure("unindex edges", -30, unindex_edges),
    Stage::figure("record siblings", -20, record_siblings),
    Stage::pair("clear subsections", -10, clear_subsections),
    Stage::figure("clear coincident gaps", -10, clear_coincident_gaps),
    Stage::figure("reflect", -3, apply_reflection),
    Stage::figure("move", -2, apply_position),
    Stage::figure("rotate", -1, apply_rotation),
    Stage::figure("snap", 0, snap_figure),
    Stage::figure("clear intersections", 10, clear_intersections),
    Stage::figure("index edges", 20, index_edges),
    Stage::pair("find subsections", 20, find_subsections),
    Stage::pair("find intersections", 30, find_intersections),
    Stage::figure("prune overlapped gaps", 40, prune_overlapped_gaps),
    Stage::figure("sibling gaps", 50, sibling_gaps),
    Stage::figure("own gaps", 50, own_gaps),
];

impl Composition {
    pub(crate) fn figure_or_missing(&self, id: FigureId) -> Result<&Figure, StageError> {
        self.figures.get(&id).ok_or(StageError::MissingFigure(id))
    }

    fn figure_mut_or_missing(&mut self, id: FigureId) -> Result<&mut Figure, StageError> {
        self.figures.get_mut(&id).ok_or(StageError::MissingFigure(id))
    }

    /// Live figures sharing an indexed point with `id` that are its siblings.
    pub(crate) fn sibling_ids(&self, id: FigureId) -> Result<Vec<FigureId>, StageError> {
        let figure = self.figure_or_missing(id)?;
        let mut ids: Vec<FigureId> = Vec::new();
        for v in figure.vertices() {
            let entries = [self.subsections.at(&v), self.raw.at(&v)];
            for entry in entries.into_iter().flatten() {
                for tag in entry.tags() {
                    if tag != id && !ids.contains(&tag) {
                        ids.push(tag);
                    }
                }
            }
        }
        ids.retain(|other| {
            self.figures
                .get(other)
                .map(|other| figure::siblings(figure, other))
                .unwrap_or(false)
        });
        Ok(ids)
    }

    /// Trace gaps around `id` and merge them into the gap list.
    pub(crate) fn trace_gaps(&mut self, id: FigureId) -> Result<(), StageError> {
        if !self.options.process_gaps {
            return Ok(());
        }
        if self.intersecting.iter().any(|pair| pair.contains(id)) {
            debug!(figure = %id, "Skipping gap search for intersecting figure");
            return Ok(());
        }

        let found = {
            let probe = self.figure_or_missing(id)?;
            let live: Vec<&Figure> = self.figures.values().collect();
            GapFinder::new(&self.raw, &self.subsections).gaps_from(probe, &live, &self.gaps)?
        };
        self.merge_gaps(found);
        Ok(())
    }

    /// A new gap replaces an overlapping record only if it has more edges.
    fn merge_gaps(&mut self, found: Vec<Figure>) {
        for gap in found {
            match self.gaps.iter().position(|g| figure::overlap(g, &gap)) {
                Some(i) => {
                    if gap.shape().vertices().len() > self.gaps[i].shape().vertices().len() {
                        self.gaps[i] = gap;
                    }
                }
                None => {
                    debug!(vertices = gap.shape().vertices().len(), "Found gap");
                    self.gaps.push(gap);
                }
            }
        }
    }
}

fn register_figure(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let figure = ctx
        .pending
        .take()
        .ok_or_else(|| StageError::Degenerate(format!("nothing to register for {}", id)))?;
    comp.figures.insert(id, figure);
    Ok(())
}

fn record_start(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    ctx.start = Some(comp.figure_or_missing(id)?.position());
    Ok(())
}

fn snap_figure(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let radius = comp.snap_radius();
    let figure = comp.figure_or_missing(id)?;
    if !figure.is_finite() {
        return Err(StageError::Degenerate(format!("{} has non-finite vertices", id)));
    }
    let snap = if ctx.snap { snap::best_snap(figure, &comp.raw, radius) } else { None };

    let figure = comp.figure_mut_or_missing(id)?;
    if let Some(snap) = snap {
        debug!(figure = %id, distance = snap.distance, "Snapping");
        figure.translate(snap.translation());
    }
    ctx.final_position = Some(figure.position());
    Ok(())
}

fn find_intersections(comp: &mut Composition, _: &mut StageContext, id: FigureId, other: FigureId) -> Result<(), StageError> {
    if figure::intersect(comp.figure_or_missing(id)?, comp.figure_or_missing(other)?) {
        comp.intersecting.insert(FigurePair::new(id, other));
    }
    Ok(())
}

fn clear_intersections(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    comp.intersecting.retain(|pair| !pair.contains(id));
    Ok(())
}

fn find_subsections(comp: &mut Composition, _: &mut StageContext, id: FigureId, other: FigureId) -> Result<(), StageError> {
    let pieces = figure::subsect(comp.figure_or_missing(id)?, comp.figure_or_missing(other)?);
    for piece in pieces {
        comp.subsections.insert_edge(piece, &[id, other]);
    }
    Ok(())
}

fn clear_subsections(comp: &mut Composition, _: &mut StageContext, id: FigureId, other: FigureId) -> Result<(), StageError> {
    let pieces = figure::subsect(comp.figure_or_missing(id)?, comp.figure_or_missing(other)?);
    for piece in pieces {
        comp.subsections.remove_edge(&piece, &[id, other]);
    }
    Ok(())
}

fn index_edges(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let edges = comp.figure_or_missing(id)?.edges();
    for edge in edges {
        comp.raw.insert_edge(edge, &[id]);
    }
    Ok(())
}

fn unindex_edges(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let figure = comp.figure_or_missing(id)?;
    let (edges, vertices) = (figure.edges(), figure.vertices());
    for edge in &edges {
        comp.raw.remove_edge(edge, &[id]);
    }
    for v in &vertices {
        comp.raw.remove_tag(v, id);
    }
    Ok(())
}

fn drop_figure(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    ctx.removed = Some(comp.figures.remove(&id).ok_or(StageError::MissingFigure(id))?);
    Ok(())
}

fn record_siblings(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    ctx.siblings = comp.sibling_ids(id)?;
    Ok(())
}

fn clear_coincident_gaps(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let figure = comp.figure_or_missing(id)?.clone();
    comp.gaps.retain(|gap| !figure::coincident(gap, &figure));
    Ok(())
}

fn prune_overlapped_gaps(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let figure = comp.figure_or_missing(id)?.clone();
    comp.gaps.retain(|gap| !figure::overlap(gap, &figure));
    Ok(())
}

/// Re-run gap tracing around each sibling, the recorded ones if the mutation
/// captured them and the current ones otherwise.
fn sibling_gaps(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    if !comp.options.process_gaps {
        return Ok(());
    }
    let mut siblings = ctx.siblings.clone();
    if comp.figures.contains_key(&id) {
        for sibling in comp.sibling_ids(id)? {
            if !siblings.contains(&sibling) {
                siblings.push(sibling);
            }
        }
    }
    for sibling in siblings {
        if sibling != id && comp.figures.contains_key(&sibling) {
            comp.trace_gaps(sibling)?;
        }
    }
    Ok(())
}

fn own_gaps(comp: &mut Composition, _: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    comp.trace_gaps(id)
}

fn apply_reflection(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let Some(reflection) = ctx.request.reflection else { return Ok(()) };
    let figure = comp.figure_mut_or_missing(id)?;
    if reflection.x {
        figure.reflect_x();
    }
    if reflection.y {
        figure.reflect_y();
    }
    Ok(())
}

fn apply_position(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let Some(target) = ctx.request.position else { return Ok(()) };
    if !target.is_finite() {
        return Err(StageError::Degenerate(format!("non-finite target for {}", id)));
    }
    comp.figure_mut_or_missing(id)?.set_position(target);
    Ok(())
}

fn apply_rotation(comp: &mut Composition, ctx: &mut StageContext, id: FigureId) -> Result<(), StageError> {
    let Some(rotation) = ctx.request.rotation else { return Ok(()) };
    if !rotation.is_finite() {
        return Err(StageError::Degenerate(format!("non-finite rotation for {}", id)));
    }
    comp.figure_mut_or_missing(id)?.set_rotation(rotation);
    Ok(())
}
