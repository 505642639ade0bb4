//! Resolution error types.

use thiserror::Error;

use crate::query::QueryError;

/// Result type for parameter resolution.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Errors raised while resolving a report's parameters.
///
/// Graph errors abort the whole request before any query runs. The others
/// are per-parameter and end up on that parameter's document entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("cyclic dependency among parameters: {}", .parameters.join(" -> "))]
    CyclicDependency { parameters: Vec<String> },

    #[error("parameter '{parameter}' depends on undeclared parameter '{dependency}'")]
    UnknownDependency {
        parameter: String,
        dependency: String,
    },

    #[error("parameter '{parameter}': {source}")]
    Query {
        parameter: String,
        #[source]
        source: QueryError,
    },

    #[error("parameter '{parameter}': column '{column}' not found in query '{query}'")]
    MissingColumn {
        parameter: String,
        query: String,
        column: String,
    },

    #[error("parameter '{parameter}': upstream parameter '{upstream}' failed")]
    UpstreamFailed { parameter: String, upstream: String },
}

impl ResolutionError {
    /// The parameter this error belongs to, if it is parameter-scoped.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::CyclicDependency { .. } => None,
            Self::UnknownDependency { parameter, .. }
            | Self::Query { parameter, .. }
            | Self::MissingColumn { parameter, .. }
            | Self::UpstreamFailed { parameter, .. } => Some(parameter),
        }
    }

    /// Whether this error aborts the request rather than a single parameter.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::CyclicDependency { .. } | Self::UnknownDependency { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Query { source, .. } if source.is_timeout())
    }
}
