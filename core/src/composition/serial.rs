//! Composition wire format.
//!
//! `{ "type": "composition", "data": { "options": {...}, "figures": [{ "id", "figure" }] } }`

use super::{Composition, CompositionOptions, FigureId};
use crate::error::{CompositionError, CompositionResult, ValidationError};
use crate::figure::serial::expect_type;
use crate::figure::{Document, Figure};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureEntry {
    pub id: FigureId,
    pub figure: Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionData {
    pub options: CompositionOptions,
    pub figures: Vec<FigureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CompositionDocument {
    Composition(CompositionData),
}

impl Composition {
    pub fn to_document(&self) -> CompositionDocument {
        let options = CompositionOptions { bounds: self.bounds(), ..self.options.clone() };
        let figures = self
            .figures
            .iter()
            .map(|(id, figure)| FigureEntry { id: *id, figure: figure.to_document() })
            .collect();
        CompositionDocument::Composition(CompositionData { options, figures })
    }

    pub fn normalize(&self) -> Value {
        serde_json::to_value(self.to_document()).unwrap_or(Value::Null)
    }

    /// Rebuild a composition, keeping the serialized ids. Figures are
    /// re-inserted without snapping so they land exactly where they were.
    pub fn from_document(doc: CompositionDocument) -> CompositionResult<Self> {
        let CompositionDocument::Composition(data) = doc;

        let mut figures: Vec<(FigureId, Figure)> = Vec::with_capacity(data.figures.len());
        for entry in data.figures {
            if figures.iter().any(|(id, _)| *id == entry.id) {
                return Err(ValidationError::DuplicateId(entry.id).into());
            }
            figures.push((entry.id, Figure::from_document(entry.figure)?));
        }
        figures.sort_by_key(|(id, _)| *id);

        let mut composition = Composition::new(data.options);
        for (id, figure) in figures {
            composition.insert(id, figure, false)?;
            composition.count = composition.count.max(id.index() + 1);
        }
        debug!(figures = composition.len(), "Restored composition");
        Ok(composition)
    }

    pub fn denormalize(value: &Value) -> CompositionResult<Self> {
        expect_type(value, "composition")?;
        let doc = CompositionDocument::deserialize(value).map_err(ValidationError::from)?;
        Self::from_document(doc)
    }
}

impl TryFrom<&Value> for Composition {
    type Error = CompositionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::denormalize(value)
    }
}
