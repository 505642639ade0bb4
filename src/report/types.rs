// src/report/types.rs
use std::fmt;

use serde::Serialize;

use crate::encoding;

/// Scalar type of a parameter's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
}

impl ScalarType {
    /// Parse a type name as written in a report definition.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" | "text" => Some(ScalarType::String),
            "integer" | "int" | "long" => Some(ScalarType::Integer),
            "decimal" | "number" | "double" => Some(ScalarType::Decimal),
            "boolean" | "bool" => Some(ScalarType::Boolean),
            "date" => Some(ScalarType::Date),
            _ => None,
        }
    }

    /// Name emitted in the `type` attribute of the parameter document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Decimal => "decimal",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically-typed cell of a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// BLOBs, and text columns whose bytes are not UTF-8.
    Binary(Vec<u8>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Textual form used for parameter values and labels.
    ///
    /// Returns `None` for `Null`. Binary cells render as their base64 form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Boolean(b) => Some(b.to_string()),
            ScalarValue::Integer(i) => Some(i.to_string()),
            ScalarValue::Decimal(d) if d.is_finite() => {
                let mut buf = ryu::Buffer::new();
                Some(buf.format_finite(*d).to_string())
            }
            ScalarValue::Decimal(d) => Some(d.to_string()),
            ScalarValue::Text(s) => Some(s.clone()),
            ScalarValue::Binary(bytes) => Some(encoding::encode_bytes(bytes).text),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Integer(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(d: f64) -> Self {
        ScalarValue::Decimal(d)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(bytes: Vec<u8>) -> Self {
        ScalarValue::Binary(bytes)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}
