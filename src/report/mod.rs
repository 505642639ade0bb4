//! Report definitions and their declared parameters.
//!
//! A [`ReportDefinition`] is loaded once per request (see [`load`]) and owns
//! the parameter and query declarations the resolver works from. Everything
//! here is immutable after loading.

mod loader;
pub mod types;

pub use loader::{load, parse, LoadError, LoadResult, FORMAT_VERSION};
pub use types::{ScalarType, ScalarValue};

use serde::Serialize;

use crate::query::QueryResult;

/// A loaded report definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub name: String,
    /// Declared parameters, in declaration order.
    pub parameters: Vec<ParameterDeclaration>,
    /// Declared data queries.
    pub queries: Vec<QueryDeclaration>,
}

impl ReportDefinition {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDeclaration> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn query(&self, name: &str) -> Option<&QueryDeclaration> {
        self.queries.iter().find(|q| q.name == name)
    }
}

/// Whether a parameter accepts one value or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    SingleValue,
    MultiValue,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::SingleValue => "single-value",
            ParameterKind::MultiValue => "multi-value",
        }
    }
}

/// Presentation hint passed through to the prompt UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderHint {
    DropDown,
    List,
    Radio,
    Checkbox,
    TextBox,
    DatePicker,
}

impl RenderHint {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dropdown" | "drop-down" => Some(RenderHint::DropDown),
            "list" => Some(RenderHint::List),
            "radio" => Some(RenderHint::Radio),
            "checkbox" => Some(RenderHint::Checkbox),
            "textbox" | "text" => Some(RenderHint::TextBox),
            "datepicker" | "date" => Some(RenderHint::DatePicker),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderHint::DropDown => "dropdown",
            RenderHint::List => "list",
            RenderHint::Radio => "radio",
            RenderHint::Checkbox => "checkbox",
            RenderHint::TextBox => "textbox",
            RenderHint::DatePicker => "datepicker",
        }
    }
}

/// Binds a list parameter to the query that supplies its candidate values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListBinding {
    /// Name of the backing query.
    pub query: String,
    /// Column holding the value. Defaults to the first column.
    pub value_column: Option<String>,
    /// Column holding the display label. Defaults to the value column.
    pub label_column: Option<String>,
}

/// A parameter declared by a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub kind: ParameterKind,
    pub value_type: ScalarType,
    /// Backing query for list parameters; `None` for plain inputs.
    pub list: Option<ListBinding>,
    pub mandatory: bool,
    /// Values used when the caller supplies no override.
    pub defaults: Vec<String>,
    /// Parameters whose resolved values this parameter's query consumes.
    pub depends_on: Vec<String>,
    pub label: Option<String>,
    pub render_hint: Option<RenderHint>,
}

impl ParameterDeclaration {
    /// A plain single-value string parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::SingleValue,
            value_type: ScalarType::String,
            list: None,
            mandatory: false,
            defaults: Vec::new(),
            depends_on: Vec::new(),
            label: None,
            render_hint: None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn is_multi_value(&self) -> bool {
        self.kind == ParameterKind::MultiValue
    }

    pub fn with_kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_type(mut self, value_type: ScalarType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.list = Some(ListBinding {
            query: query.into(),
            value_column: None,
            label_column: None,
        });
        self
    }

    pub fn with_columns(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        if let Some(list) = self.list.as_mut() {
            list.value_column = Some(value.into());
            list.label_column = Some(label.into());
        }
        self
    }

    pub fn with_defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = defaults.into_iter().map(Into::into).collect();
        self
    }

    pub fn depending_on<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

/// A named data query declared by a report.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDeclaration {
    pub name: String,
    pub source: QuerySource,
}

/// Where a query's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    /// Rows embedded in the definition itself.
    Static(QueryResult),
    /// A statement run against a configured connection.
    Connection {
        connection: String,
        statement: String,
    },
}
