//! TOML report definition loader.
//!
//! Definitions are deserialized into raw serde structs first and then
//! checked and converted into the immutable [`ReportDefinition`] model.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{
    ListBinding, ParameterDeclaration, ParameterKind, QueryDeclaration, QuerySource,
    RenderHint, ReportDefinition, ScalarType, ScalarValue,
};
use crate::query::QueryResult;

/// The only definition format version this loader understands.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while loading a report definition.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Report definition not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read report definition {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed report definition: {0}")]
    Malformed(#[from] toml::de::Error),

    #[error("Unsupported report definition version {found} (supported: {FORMAT_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error("Invalid report definition: {0}")]
    Invalid(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Read before the full definition so a newer format is reported as an
/// unsupported version.
#[derive(Debug, Deserialize)]
struct Header {
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    #[allow(dead_code)]
    version: u32,
    name: Option<String>,
    #[serde(default, rename = "query")]
    queries: Vec<RawQuery>,
    #[serde(default, rename = "parameter")]
    parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuery {
    name: String,
    columns: Option<Vec<String>>,
    rows: Option<Vec<Vec<toml::Value>>>,
    connection: Option<String>,
    statement: Option<String>,
}

/// Static cells: scalars as themselves, TOML dates and times as text.
fn convert_cell(query: &str, cell: toml::Value) -> LoadResult<ScalarValue> {
    match cell {
        toml::Value::Boolean(b) => Ok(ScalarValue::Boolean(b)),
        toml::Value::Integer(i) => Ok(ScalarValue::Integer(i)),
        toml::Value::Float(d) => Ok(ScalarValue::Decimal(d)),
        toml::Value::String(s) => Ok(ScalarValue::Text(s)),
        toml::Value::Datetime(dt) => Ok(ScalarValue::Text(dt.to_string())),
        other => Err(LoadError::Invalid(format!(
            "query '{}' has a non-scalar cell of type {}",
            query,
            other.type_str()
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameter {
    name: String,
    #[serde(default, rename = "type")]
    value_type: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    value_column: Option<String>,
    #[serde(default)]
    label_column: Option<String>,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    default: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    render: Option<String>,
}

/// Load a report definition from a file.
///
/// The report name defaults to the file stem when the definition omits it.
pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<ReportDefinition> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let fallback_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let report = parse_with_name(&source, &fallback_name)?;
    debug!(
        path = %path.display(),
        parameters = report.parameters.len(),
        queries = report.queries.len(),
        "loaded report definition"
    );
    Ok(report)
}

/// Parse a report definition from TOML text.
pub fn parse(source: &str) -> LoadResult<ReportDefinition> {
    parse_with_name(source, "report")
}

fn parse_with_name(source: &str, fallback_name: &str) -> LoadResult<ReportDefinition> {
    let header: Header = toml::from_str(source)?;
    if header.version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: header.version,
        });
    }

    let raw: RawReport = toml::from_str(source)?;

    let mut queries = Vec::with_capacity(raw.queries.len());
    let mut query_names = HashSet::new();
    for raw_query in raw.queries {
        if !query_names.insert(raw_query.name.clone()) {
            return Err(LoadError::Invalid(format!(
                "duplicate query '{}'",
                raw_query.name
            )));
        }
        queries.push(convert_query(raw_query)?);
    }

    let mut parameters = Vec::with_capacity(raw.parameters.len());
    let mut parameter_names = HashSet::new();
    for raw_param in raw.parameters {
        if !parameter_names.insert(raw_param.name.clone()) {
            return Err(LoadError::Invalid(format!(
                "duplicate parameter '{}'",
                raw_param.name
            )));
        }
        let param = convert_parameter(raw_param)?;
        if let Some(list) = &param.list {
            check_binding(&param.name, list, &queries)?;
        }
        parameters.push(param);
    }

    Ok(ReportDefinition {
        name: raw.name.unwrap_or_else(|| fallback_name.to_string()),
        parameters,
        queries,
    })
}

fn convert_query(raw: RawQuery) -> LoadResult<QueryDeclaration> {
    let source = match (raw.columns, raw.rows, raw.connection, raw.statement) {
        (Some(columns), rows, None, None) => {
            let mut table = QueryResult::new(columns);
            for (i, row) in rows.unwrap_or_default().into_iter().enumerate() {
                let cells = row
                    .into_iter()
                    .map(|cell| convert_cell(&raw.name, cell))
                    .collect::<LoadResult<Vec<_>>>()?;
                if cells.len() != table.column_count() {
                    return Err(LoadError::Invalid(format!(
                        "query '{}' row {} has {} cells, expected {}",
                        raw.name,
                        i + 1,
                        cells.len(),
                        table.column_count()
                    )));
                }
                table.push_row(cells);
            }
            QuerySource::Static(table)
        }
        (None, None, Some(connection), Some(statement)) => QuerySource::Connection {
            connection,
            statement,
        },
        _ => {
            return Err(LoadError::Invalid(format!(
                "query '{}' must declare either columns/rows or connection/statement",
                raw.name
            )))
        }
    };

    Ok(QueryDeclaration {
        name: raw.name,
        source,
    })
}

fn convert_parameter(raw: RawParameter) -> LoadResult<ParameterDeclaration> {
    let value_type = match raw.value_type.as_deref() {
        None => ScalarType::String,
        Some(t) => ScalarType::from_str(t).ok_or_else(|| {
            LoadError::Invalid(format!("parameter '{}' has unknown type '{}'", raw.name, t))
        })?,
    };

    let kind = match raw.kind.as_deref() {
        None | Some("single") | Some("single-value") => ParameterKind::SingleValue,
        Some("multi") | Some("multi-value") => ParameterKind::MultiValue,
        Some(other) => {
            return Err(LoadError::Invalid(format!(
                "parameter '{}' has unknown kind '{}'",
                raw.name, other
            )))
        }
    };

    let render_hint = match raw.render.as_deref() {
        None => None,
        Some(r) => Some(RenderHint::from_str(r).ok_or_else(|| {
            LoadError::Invalid(format!(
                "parameter '{}' has unknown render hint '{}'",
                raw.name, r
            ))
        })?),
    };

    let list = match raw.query {
        Some(query) => Some(ListBinding {
            query,
            value_column: raw.value_column,
            label_column: raw.label_column,
        }),
        None if raw.value_column.is_some() || raw.label_column.is_some() => {
            return Err(LoadError::Invalid(format!(
                "parameter '{}' names columns but no query",
                raw.name
            )))
        }
        None => None,
    };

    Ok(ParameterDeclaration {
        name: raw.name,
        kind,
        value_type,
        list,
        mandatory: raw.mandatory,
        defaults: raw.default,
        depends_on: raw.depends_on,
        label: raw.label,
        render_hint,
    })
}

/// Static tables are checked here; connection-backed columns only exist at
/// execution time.
fn check_binding(
    parameter: &str,
    binding: &ListBinding,
    queries: &[QueryDeclaration],
) -> LoadResult<()> {
    let query = queries
        .iter()
        .find(|q| q.name == binding.query)
        .ok_or_else(|| {
            LoadError::Invalid(format!(
                "parameter '{}' references undeclared query '{}'",
                parameter, binding.query
            ))
        })?;

    if let QuerySource::Static(table) = &query.source {
        for column in [&binding.value_column, &binding.label_column]
            .into_iter()
            .flatten()
        {
            if table.column_index(column).is_none() {
                return Err(LoadError::Invalid(format!(
                    "parameter '{}' references column '{}' missing from query '{}'",
                    parameter, column, query.name
                )));
            }
        }
    }

    Ok(())
}
