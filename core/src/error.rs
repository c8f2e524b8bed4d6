//! Error taxonomy for the composition engine.

use crate::composition::{Action, FigureId};
use thiserror::Error;

/// Malformed or mistyped serialized data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unexpected type `{found}`, expected `{expected}`")]
    UnexpectedType { expected: &'static str, found: String },

    #[error("Unexpected data: {0}")]
    Malformed(String),

    #[error("Invalid figure id: {0}")]
    InvalidId(String),

    #[error("Duplicate figure id: {0}")]
    DuplicateId(FigureId),

    #[error("Unknown history method: {0}")]
    UnknownMethod(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Malformed(e.to_string())
    }
}

/// Boundary tracing gave up.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GapError {
    #[error("Boundary walk did not close after {steps} steps")]
    Unterminated { steps: usize },
}

/// A single pipeline stage failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StageError {
    #[error("Figure {0} is not in the composition")]
    MissingFigure(FigureId),

    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error(transparent)]
    Gap(#[from] GapError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompositionError {
    #[error("Stage \"{stage}\" of {action} failed: {source}")]
    Stage {
        stage: &'static str,
        action: Action,
        #[source]
        source: StageError,
    },

    #[error("Unknown figure: {0}")]
    UnknownFigure(FigureId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for composition operations.
pub type CompositionResult<T> = Result<T, CompositionError>;
