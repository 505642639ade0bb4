//! Query execution error types.

use thiserror::Error;

/// Result type for query execution.
pub type QueryOutcome<T> = Result<T, QueryError>;

/// Errors that can occur while executing a report query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The report declares no query with this name.
    #[error("unknown query '{0}'")]
    UnknownQuery(String),

    /// The query names a connection that is not configured.
    #[error("unknown connection '{0}'")]
    UnknownConnection(String),

    /// The data source could not be reached.
    #[error("connection '{connection}' failed: {message}")]
    ConnectionFailed { connection: String, message: String },

    /// The statement ran but the data source rejected it.
    #[error("query '{query}' failed: {message}")]
    Execution { query: String, message: String },

    /// The query did not finish within the configured timeout.
    #[error("query '{query}' timed out after {millis} ms")]
    Timeout { query: String, millis: u64 },
}

impl QueryError {
    pub fn connection_failed(connection: impl Into<String>, message: impl ToString) -> Self {
        Self::ConnectionFailed {
            connection: connection.into(),
            message: message.to_string(),
        }
    }

    pub fn execution(query: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            query: query.into(),
            message: message.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
