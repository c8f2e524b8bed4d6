pub mod composition;
pub mod error;
pub mod figure;
pub mod gaps;
pub mod geometry;
pub mod index;

pub use composition::{Composition, CompositionOptions, FigureId, MutationOptions, Transform, TransformOutcome};
pub use error::{CompositionError, CompositionResult, GapError, StageError, ValidationError};
pub use figure::{Figure, Reflection, Shape};
pub use geometry::{Edge, Vertex, EPSILON};
