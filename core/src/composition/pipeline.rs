//! Weighted stage execution.
//!
//! Each mutation is described by a table of stages. Stages with equal weight
//! form a batch; batches run in ascending weight. Inside a batch the
//! per-figure stages run first in table order, then the pairwise stages run
//! once for every other figure, looping figures on the outside.

use super::{Action, Composition, FigureId, StageFailure, Transform};
use crate::error::{CompositionError, CompositionResult, StageError};
use crate::figure::Figure;
use crate::geometry::Vertex;
use std::collections::BTreeMap;
use tracing::{debug_span, error, trace, warn};

pub(crate) type FigureStage = fn(&mut Composition, &mut StageContext, FigureId) -> Result<(), StageError>;
pub(crate) type PairStage = fn(&mut Composition, &mut StageContext, FigureId, FigureId) -> Result<(), StageError>;

#[derive(Clone, Copy)]
pub(crate) enum StageKind {
    PerFigure(FigureStage),
    PerPair(PairStage),
}

#[derive(Clone, Copy)]
pub(crate) struct Stage {
    pub name: &'static str,
    pub weight: i32,
    pub kind: StageKind,
}

impl Stage {
    pub const fn figure(name: &'static str, weight: i32, run: FigureStage) -> Self {
        Self { name, weight, kind: StageKind::PerFigure(run) }
    }

    pub const fn pair(name: &'static str, weight: i32, run: PairStage) -> Self {
        Self { name, weight, kind: StageKind::PerPair(run) }
    }

    fn is_pairwise(&self) -> bool {
        matches!(self.kind, StageKind::PerPair(_))
    }
}

/// Scratch state shared by the stages of one mutation.
#[derive(Debug, Default)]
pub(crate) struct StageContext {
    /// Figure waiting to be registered by an insert.
    pub pending: Option<Figure>,
    /// Figure taken out of the map by a remove.
    pub removed: Option<Figure>,
    pub siblings: Vec<FigureId>,
    pub request: Transform,
    pub snap: bool,
    pub start: Option<Vertex>,
    pub final_position: Option<Vertex>,
}

/// Group stages into batches of equal weight, ascending.
pub(crate) fn organize(stages: &[Stage]) -> Vec<(i32, Vec<&Stage>)> {
    let mut batches: BTreeMap<i32, Vec<&Stage>> = BTreeMap::new();
    for stage in stages {
        batches.entry(stage.weight).or_default().push(stage);
    }
    batches.into_iter().collect()
}

impl Composition {
    /// Run every stage of `stages` for `id`.
    ///
    /// A failing stage is recorded and skipped, unless the composition is in
    /// debug mode, in which case the failure aborts the call.
    pub(crate) fn run_stages(
        &mut self,
        action: Action,
        id: FigureId,
        stages: &[Stage],
        ctx: &mut StageContext,
    ) -> CompositionResult<()> {
        let _span = debug_span!("pipeline", %action, figure = %id).entered();

        for (_, batch) in organize(stages) {
            for stage in batch.iter().filter(|s| !s.is_pairwise()) {
                if let StageKind::PerFigure(run) = stage.kind {
                    trace!(stage = stage.name, "Running stage");
                    let result = run(self, ctx, id);
                    self.settle(stage, action, id, result)?;
                }
            }

            let pairwise: Vec<&Stage> = batch.into_iter().filter(|s| s.is_pairwise()).collect();
            if pairwise.is_empty() {
                continue;
            }
            let others: Vec<FigureId> = self.figures.keys().copied().filter(|other| *other != id).collect();
            for other in others {
                trace!(other = %other, "Running pairwise stages");
                for stage in &pairwise {
                    if let StageKind::PerPair(run) = stage.kind {
                        let result = run(self, ctx, id, other);
                        self.settle(stage, action, id, result)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn settle(
        &mut self,
        stage: &Stage,
        action: Action,
        id: FigureId,
        result: Result<(), StageError>,
    ) -> CompositionResult<()> {
        let Err(source) = result else { return Ok(()) };

        if self.options.debug {
            error!(stage = stage.name, %action, figure = %id, "Stage failed: {}", source);
            return Err(CompositionError::Stage { stage: stage.name, action, source });
        }

        warn!(stage = stage.name, %action, figure = %id, "Stage failed, skipping: {}", source);
        self.diagnostics.push(StageFailure {
            stage: stage.name,
            action,
            figure: id,
            message: source.to_string(),
        });
        Ok(())
    }
}
