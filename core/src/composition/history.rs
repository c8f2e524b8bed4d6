//! Mutation history and replay.
//!
//! Every successful public mutation appends one `{ method, args }` record.
//! Delegating methods such as `move_to` go through `transform` and are
//! recorded once, as `transform`. Replaying the records in order on a fresh
//! composition reproduces the same figures.

use super::{Composition, CompositionOptions, FigureId, MutationOptions, Transform};
use crate::error::{CompositionResult, ValidationError};
use crate::figure::Figure;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Wire form of one history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRecord {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// A recorded mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init(CompositionOptions),
    Add { figure: Figure, options: MutationOptions },
    Remove(FigureId),
    Transform { id: FigureId, transform: Transform, options: MutationOptions },
    SetBounds([[f64; 2]; 2]),
    SetSnap(bool),
    SetSnapTolerance(f64),
    SetProcessGaps(bool),
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn arg<T: DeserializeOwned>(record: &HistoryRecord, i: usize) -> Result<T, ValidationError> {
    let value = record.args.get(i).ok_or_else(|| {
        ValidationError::Malformed(format!("`{}` expects an argument at position {}", record.method, i))
    })?;
    Ok(T::deserialize(value)?)
}

fn optional_arg<T: DeserializeOwned + Default>(record: &HistoryRecord, i: usize) -> Result<T, ValidationError> {
    match record.args.get(i) {
        Some(value) => Ok(T::deserialize(value)?),
        None => Ok(T::default()),
    }
}

impl Command {
    pub fn method(&self) -> &'static str {
        match self {
            Command::Init(_) => "init",
            Command::Add { .. } => "add",
            Command::Remove(_) => "remove",
            Command::Transform { .. } => "transform",
            Command::SetBounds(_) => "bounds",
            Command::SetSnap(_) => "snap",
            Command::SetSnapTolerance(_) => "snapTolerance",
            Command::SetProcessGaps(_) => "processGaps",
        }
    }

    pub fn to_record(&self) -> HistoryRecord {
        let args = match self {
            Command::Init(options) => vec![to_value(options)],
            Command::Add { figure, options } => {
                let mut args = vec![figure.normalize()];
                if options.snap.is_some() {
                    args.push(to_value(options));
                }
                args
            }
            Command::Remove(id) => vec![to_value(id)],
            Command::Transform { id, transform, options } => {
                let mut args = vec![to_value(id), to_value(transform)];
                if options.snap.is_some() {
                    args.push(to_value(options));
                }
                args
            }
            Command::SetBounds(bounds) => vec![to_value(&bounds[0]), to_value(&bounds[1])],
            Command::SetSnap(snap) => vec![Value::Bool(*snap)],
            Command::SetSnapTolerance(tolerance) => vec![to_value(tolerance)],
            Command::SetProcessGaps(process_gaps) => vec![Value::Bool(*process_gaps)],
        };
        HistoryRecord { method: self.method().to_string(), args }
    }

    pub fn from_record(record: &HistoryRecord) -> Result<Self, ValidationError> {
        let command = match record.method.as_str() {
            "init" => Command::Init(optional_arg(record, 0)?),
            "add" => {
                let figure = Figure::denormalize(&arg::<Value>(record, 0)?)?;
                Command::Add { figure, options: optional_arg(record, 1)? }
            }
            "remove" => Command::Remove(arg(record, 0)?),
            "transform" => Command::Transform {
                id: arg(record, 0)?,
                transform: arg(record, 1)?,
                options: optional_arg(record, 2)?,
            },
            "bounds" => Command::SetBounds([arg(record, 0)?, arg(record, 1)?]),
            "snap" => Command::SetSnap(arg(record, 0)?),
            "snapTolerance" => Command::SetSnapTolerance(arg(record, 0)?),
            "processGaps" => Command::SetProcessGaps(arg(record, 0)?),
            other => return Err(ValidationError::UnknownMethod(other.to_string())),
        };
        Ok(command)
    }
}

impl Composition {
    /// Run a command through the matching public method.
    pub fn apply(&mut self, command: Command) -> CompositionResult<()> {
        match command {
            Command::Init(options) => self.init(options),
            Command::Add { figure, options } => {
                self.add_with(figure, options)?;
            }
            Command::Remove(id) => {
                self.remove(id)?;
            }
            Command::Transform { id, transform, options } => {
                self.transform_with(id, transform, options)?;
            }
            Command::SetBounds([corner0, corner1]) => self.set_bounds(corner0, corner1),
            Command::SetSnap(snap) => self.set_snap(snap),
            Command::SetSnapTolerance(tolerance) => self.set_snap_tolerance(tolerance),
            Command::SetProcessGaps(process_gaps) => self.set_process_gaps(process_gaps),
        }
        Ok(())
    }
}

/// Re-run `history` on `composition`. Every record is validated before any
/// is applied.
pub fn replay(history: &[HistoryRecord], composition: &mut Composition) -> CompositionResult<()> {
    let commands = history.iter().map(Command::from_record).collect::<Result<Vec<_>, _>>()?;
    debug!(records = commands.len(), "Replaying history");
    for command in commands {
        composition.apply(command)?;
    }
    Ok(())
}

/// Build a composition from its history.
pub fn from_history(history: &[HistoryRecord]) -> CompositionResult<Composition> {
    let mut composition = Composition::blank(CompositionOptions::default());
    replay(history, &mut composition)?;
    Ok(composition)
}
