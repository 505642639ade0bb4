//! Named query execution against registered data sources.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::context::ParameterContext;
use super::error::{QueryError, QueryOutcome};
use super::sqlite::SqliteDataSource;
use super::source::DataSource;
use super::table::QueryResult;
use crate::config::{Driver, Settings, SettingsError};
use crate::report::{QuerySource, ReportDefinition};

/// Default timeout for a single query (30 seconds).
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs report queries by name.
///
/// Static queries are answered from the definition. Connection-backed
/// queries are dispatched to the [`DataSource`] registered under the
/// connection name and bounded by the executor's timeout. Nothing is cached:
/// every call re-runs the query.
#[derive(Clone)]
pub struct QueryExecutor {
    sources: HashMap<String, Arc<dyn DataSource>>,
    timeout: Duration,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Build an executor with one data source per configured connection.
    ///
    /// Connections are opened lazily, so an unreachable database only fails
    /// the parameters that use it.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let mut executor = Self::new().with_timeout(settings.resolver.query_timeout()?);

        for (name, connection) in &settings.connections {
            let source: Arc<dyn DataSource> = match connection.driver_type()? {
                Driver::Sqlite => Arc::new(SqliteDataSource::open(
                    name.clone(),
                    connection.resolved_connection_string()?,
                )),
            };
            executor.register(name.clone(), source);
        }

        Ok(executor)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_source(mut self, connection: impl Into<String>, source: Arc<dyn DataSource>) -> Self {
        self.register(connection, source);
        self
    }

    pub fn register(&mut self, connection: impl Into<String>, source: Arc<dyn DataSource>) {
        self.sources.insert(connection.into(), source);
    }

    /// Execute the query named `query_name` declared by `report`.
    pub async fn execute(
        &self,
        query_name: &str,
        report: &ReportDefinition,
        context: &ParameterContext,
    ) -> QueryOutcome<QueryResult> {
        let query = report
            .query(query_name)
            .ok_or_else(|| QueryError::UnknownQuery(query_name.to_string()))?;

        match &query.source {
            QuerySource::Static(table) => {
                debug!(query = query_name, rows = table.row_count(), "static query");
                Ok(table.clone())
            }
            QuerySource::Connection {
                connection,
                statement,
            } => {
                let source = self
                    .sources
                    .get(connection)
                    .ok_or_else(|| QueryError::UnknownConnection(connection.clone()))?;

                debug!(query = query_name, connection = %connection, "executing query");

                let table = tokio::time::timeout(
                    self.timeout,
                    source.execute(query_name, statement, context),
                )
                .await
                .map_err(|_| QueryError::Timeout {
                    query: query_name.to_string(),
                    millis: self.timeout.as_millis() as u64,
                })??;

                debug!(query = query_name, rows = table.row_count(), "query finished");
                Ok(table)
            }
        }
    }
}
