//! Resolved parameter document types.

use serde::{Serialize, Serializer};

use super::error::ResolutionError;
use crate::encoding::{self, Encoded};
use crate::report::{ParameterDeclaration, ScalarValue};

/// One candidate value of a parameter, ready for transport.
///
/// `value` and `label` are encoded independently; [`encoded`](Self::encoded)
/// reports whether either of them was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedValue {
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub value_encoded: bool,
    pub label_encoded: bool,
    /// The source cell was NULL; `value` and `label` are empty.
    pub is_null: bool,
}

impl ResolvedValue {
    /// Run `value` and `label` through the encoder.
    pub fn new(value: &str, label: &str, selected: bool) -> Self {
        let Encoded {
            text: value,
            encoded: value_encoded,
        } = encoding::encode(value);
        let Encoded {
            text: label,
            encoded: label_encoded,
        } = encoding::encode(label);

        Self {
            value,
            label,
            selected,
            value_encoded,
            label_encoded,
            is_null: false,
        }
    }

    /// Build a value from query cells.
    ///
    /// Binary cells are always encoded. A NULL value cell yields an empty,
    /// unselected value flagged `is_null`; a NULL label renders empty.
    pub fn from_cells(value: &ScalarValue, label: &ScalarValue, selected: bool) -> Self {
        let Encoded {
            text: label,
            encoded: label_encoded,
        } = transport(label);

        if value.is_null() {
            return Self {
                value: String::new(),
                label,
                selected: false,
                value_encoded: false,
                label_encoded,
                is_null: true,
            };
        }

        let Encoded {
            text: value,
            encoded: value_encoded,
        } = transport(value);

        Self {
            value,
            label,
            selected,
            value_encoded,
            label_encoded,
            is_null: false,
        }
    }

    /// A value for a NULL cell. Nulls are never selected.
    pub fn null(label: &str) -> Self {
        Self::from_cells(&ScalarValue::Null, &ScalarValue::from(label), false)
    }

    pub fn encoded(&self) -> bool {
        self.value_encoded || self.label_encoded
    }

    /// `value` and `label` as carried under a single `encoded` flag.
    ///
    /// When only one side was encoded, the other is encoded here as well so
    /// a client can decode both attributes unconditionally.
    pub fn transport_pair(&self) -> (String, String) {
        if !self.encoded() {
            return (self.value.clone(), self.label.clone());
        }
        let value = if self.value_encoded {
            self.value.clone()
        } else {
            encoding::force_encode(&self.value)
        };
        let label = if self.label_encoded {
            self.label.clone()
        } else {
            encoding::force_encode(&self.label)
        };
        (value, label)
    }
}

/// A parameter together with its resolution outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterEntry {
    pub declaration: ParameterDeclaration,
    pub values: Vec<ResolvedValue>,
    /// Raw (unencoded) selected values, passed to dependent parameters.
    pub selection: Vec<String>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ResolutionError>,
}

impl ParameterEntry {
    pub fn resolved(
        declaration: ParameterDeclaration,
        values: Vec<ResolvedValue>,
        selection: Vec<String>,
    ) -> Self {
        Self {
            declaration,
            values,
            selection,
            error: None,
        }
    }

    pub fn failed(declaration: ParameterDeclaration, error: ResolutionError) -> Self {
        Self {
            declaration,
            values: Vec::new(),
            selection: Vec::new(),
            error: Some(error),
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// A mandatory parameter without a selection still needs user input.
    pub fn needs_input(&self) -> bool {
        self.is_failed() || (self.declaration.mandatory && self.selection.is_empty())
    }
}

/// Resolved parameters of one report, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDocument {
    pub report: String,
    pub parameters: Vec<ParameterEntry>,
}

impl ParameterDocument {
    pub fn parameter(&self, name: &str) -> Option<&ParameterEntry> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Whether the prompt UI has to be shown before the report can run.
    pub fn is_prompt_needed(&self) -> bool {
        self.parameters.iter().any(ParameterEntry::needs_input)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.parameters.iter().filter(|p| p.is_failed())
    }
}

fn transport(cell: &ScalarValue) -> Encoded {
    match cell {
        ScalarValue::Binary(bytes) => encoding::encode_bytes(bytes),
        other => encoding::encode(&other.to_text().unwrap_or_default()),
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<ResolutionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
