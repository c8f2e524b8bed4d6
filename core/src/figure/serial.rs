//! Wire documents for shapes and figures.
//!
//! Every document is `{ "type": ..., "data": ... }`. Denormalizing checks the
//! tag first and never hands back a partially built value.

use super::{Figure, Reflection, Shape};
use crate::error::ValidationError;
use crate::geometry::Vertex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeData {
    pub vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureData {
    pub shape: Document,
    pub position: Vertex,
    pub rotation: f64,
    pub reflection: Reflection,
}

/// Tagged document for the shape-like types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Document {
    Shape(ShapeData),
    Figure(Box<FigureData>),
}

impl Document {
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Shape(_) => "shape",
            Document::Figure(_) => "figure",
        }
    }
}

/// Read the `type` tag without committing to a layout.
pub(crate) fn type_tag(value: &Value) -> Result<&str, ValidationError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::Malformed("missing `type` tag".into()))
}

pub(crate) fn expect_type(value: &Value, expected: &'static str) -> Result<(), ValidationError> {
    let found = type_tag(value)?;
    if found != expected {
        return Err(ValidationError::UnexpectedType { expected, found: found.to_string() });
    }
    Ok(())
}

impl Shape {
    pub fn to_document(&self) -> Document {
        Document::Shape(ShapeData { vertices: self.vertices.clone() })
    }

    pub fn normalize(&self) -> Value {
        // Plain data, serialization cannot fail.
        serde_json::to_value(self.to_document()).unwrap_or(Value::Null)
    }

    pub fn from_document(doc: Document) -> Result<Self, ValidationError> {
        match doc {
            Document::Shape(data) => {
                if data.vertices.len() < 3 {
                    return Err(ValidationError::Malformed(format!(
                        "a shape needs at least 3 vertices, got {}",
                        data.vertices.len()
                    )));
                }
                Ok(Shape::new(data.vertices))
            }
            other => Err(ValidationError::UnexpectedType {
                expected: "shape",
                found: other.type_name().to_string(),
            }),
        }
    }

    pub fn denormalize(value: &Value) -> Result<Self, ValidationError> {
        expect_type(value, "shape")?;
        Self::from_document(Document::deserialize(value)?)
    }
}

impl Figure {
    pub fn to_document(&self) -> Document {
        Document::Figure(Box::new(FigureData {
            shape: self.shape.to_document(),
            position: self.position,
            rotation: self.rotation,
            reflection: self.reflection,
        }))
    }

    pub fn normalize(&self) -> Value {
        serde_json::to_value(self.to_document()).unwrap_or(Value::Null)
    }

    pub fn from_document(doc: Document) -> Result<Self, ValidationError> {
        match doc {
            Document::Figure(data) => {
                let FigureData { shape, position, rotation, reflection } = *data;
                let shape = Shape::from_document(shape)?;
                Ok(Figure::with_transform(shape, position, rotation, reflection))
            }
            other => Err(ValidationError::UnexpectedType {
                expected: "figure",
                found: other.type_name().to_string(),
            }),
        }
    }

    pub fn denormalize(value: &Value) -> Result<Self, ValidationError> {
        expect_type(value, "figure")?;
        Self::from_document(Document::deserialize(value)?)
    }
}
