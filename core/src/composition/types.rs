use crate::error::ValidationError;
use crate::figure::Reflection;
use crate::geometry::{Edge, Vertex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ID_PREFIX: &str = "fig-";

/// Identifier of a figure inside one composition, rendered as `fig-N`.
///
/// Ids are handed out in increasing order and never reused, so ordering by id
/// is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FigureId(u64);

impl FigureId {
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

impl FromStr for FigureId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(FigureId)
            .ok_or_else(|| ValidationError::InvalidId(s.to_string()))
    }
}

impl TryFrom<String> for FigureId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FigureId> for String {
    fn from(id: FigureId) -> Self {
        id.to_string()
    }
}

/// Unordered pair of figure ids, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FigurePair {
    pub a: FigureId,
    pub b: FigureId,
}

impl FigurePair {
    pub fn new(x: FigureId, y: FigureId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn contains(&self, id: FigureId) -> bool {
        self.a == id || self.b == id
    }
}

/// Mutation categories the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Insert,
    Remove,
    Transform,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Insert => "insert",
            Action::Remove => "remove",
            Action::Transform => "transform",
        };
        f.write_str(name)
    }
}

/// Construction-time configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompositionOptions {
    /// Stage failures abort the call instead of being logged and skipped.
    pub debug: bool,
    /// Two opposite corners of the coordinate domain.
    pub bounds: [[f64; 2]; 2],
    pub do_snap: bool,
    /// Snap radius as a fraction of the bounds diagonal.
    pub snap_tolerance: f64,
    pub process_gaps: bool,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        Self {
            debug: false,
            bounds: [[0.0, 0.0], [100.0, 100.0]],
            do_snap: true,
            snap_tolerance: 0.001,
            process_gaps: false,
        }
    }
}

/// Per-call overrides for `add` and `transform`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap: Option<bool>,
}

impl MutationOptions {
    pub fn snap(snap: bool) -> Self {
        Self { snap: Some(snap) }
    }
}

/// Requested changes; absent fields are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vertex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
}

impl Transform {
    pub fn position(target: impl Into<Vertex>) -> Self {
        Self { position: Some(target.into()), ..Self::default() }
    }

    pub fn rotation(angle: f64) -> Self {
        Self { rotation: Some(angle), ..Self::default() }
    }

    pub fn reflection(x: bool, y: bool) -> Self {
        Self { reflection: Some(Reflection { x, y }), ..Self::default() }
    }
}

/// What a transform did to the figure's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformOutcome {
    pub start: Vertex,
    pub target: Option<Vertex>,
    #[serde(rename = "final")]
    pub final_position: Vertex,
    /// Snapping moved the figure away from the requested target.
    pub snapped: bool,
}

/// An edge together with the figure it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnedEdge {
    pub id: FigureId,
    pub edge: Edge,
}

/// A stage failure that was caught and skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub stage: &'static str,
    pub action: Action,
    pub figure: FigureId,
    pub message: String,
}
