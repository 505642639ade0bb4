//! SQLite-backed data source.
//!
//! Statements run on tokio's blocking pool. Named statement parameters
//! (`:name`, `@name`, `$name`) are bound from the [`ParameterContext`]; a
//! parameter the context lacks is bound as NULL. Multi-valued parameters bind
//! their first value.
//!
//! Dropping an execution future (for example when the executor's timeout
//! fires) interrupts the statement it started, so the connection and the
//! blocking thread are released promptly.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, InterruptHandle, OpenFlags};

use super::context::ParameterContext;
use super::error::{QueryError, QueryOutcome};
use super::source::DataSource;
use super::table::QueryResult;
use crate::report::ScalarValue;

enum Target {
    /// Opened read-only for every execution.
    Path(PathBuf),
    /// A connection shared by all executions (in-memory databases, tests).
    Shared(Arc<Mutex<Connection>>),
}

/// [`DataSource`] implementation over `rusqlite`.
pub struct SqliteDataSource {
    name: String,
    target: Target,
}

impl SqliteDataSource {
    /// A data source for the database file at `path`.
    ///
    /// Nothing is opened until the first execution.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target: Target::Path(path.into()),
        }
    }

    /// A data source over an existing connection.
    pub fn from_connection(name: impl Into<String>, connection: Connection) -> Self {
        Self {
            name: name.into(),
            target: Target::Shared(Arc::new(Mutex::new(connection))),
        }
    }
}

/// Shared between an execution future and its blocking task.
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    handle: Mutex<Option<InterruptHandle>>,
}

impl Cancellation {
    /// Publish the connection's interrupt handle. Returns false when the
    /// execution was already abandoned.
    fn register(&self, conn: &Connection) -> bool {
        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(conn.get_interrupt_handle());
        }
        !self.cancelled.load(Ordering::SeqCst)
    }

    /// Forget the handle once the statement is done; a shared connection
    /// may already be running someone else's query.
    fn unregister(&self) {
        if let Ok(mut slot) = self.handle.lock() {
            slot.take();
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.handle.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.interrupt();
            }
        }
    }
}

/// Cancels the execution unless disarmed first.
struct CancelOnDrop {
    cancellation: Arc<Cancellation>,
    armed: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.cancellation.cancel();
        }
    }
}

#[async_trait]
impl DataSource for SqliteDataSource {
    async fn execute(
        &self,
        query: &str,
        statement: &str,
        context: &ParameterContext,
    ) -> QueryOutcome<QueryResult> {
        let connection_name = self.name.clone();
        let query = query.to_string();
        let statement = statement.to_string();
        let context = context.clone();

        let cancellation = Arc::new(Cancellation::default());
        let mut guard = CancelOnDrop {
            cancellation: Arc::clone(&cancellation),
            armed: true,
        };

        let task = match &self.target {
            Target::Path(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || {
                    let conn = Connection::open_with_flags(
                        &path,
                        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                    )
                    .map_err(|e| QueryError::connection_failed(&connection_name, e))?;
                    run_cancellable(&conn, &cancellation, &query, &statement, &context)
                })
            }
            Target::Shared(conn) => {
                let conn = Arc::clone(conn);
                tokio::task::spawn_blocking(move || {
                    let conn = conn.lock().map_err(|_| {
                        QueryError::connection_failed(&connection_name, "connection lock poisoned")
                    })?;
                    run_cancellable(&conn, &cancellation, &query, &statement, &context)
                })
            }
        };

        let result = task
            .await
            .map_err(|e| QueryError::connection_failed(&self.name, e));
        guard.armed = false;
        result?
    }
}

fn run_cancellable(
    conn: &Connection,
    cancellation: &Cancellation,
    query: &str,
    statement: &str,
    context: &ParameterContext,
) -> QueryOutcome<QueryResult> {
    if !cancellation.register(conn) {
        cancellation.unregister();
        return Err(QueryError::execution(query, "cancelled before start"));
    }
    let result = run_statement(conn, query, statement, context);
    cancellation.unregister();
    result
}

fn run_statement(
    conn: &Connection,
    query: &str,
    statement: &str,
    context: &ParameterContext,
) -> QueryOutcome<QueryResult> {
    let mut stmt = conn
        .prepare(statement)
        .map_err(|e| QueryError::execution(query, e))?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let bindings: Vec<Option<String>> = (1..=stmt.parameter_count())
        .map(|idx| {
            stmt.parameter_name(idx)
                .map(|name| name.trim_start_matches([':', '@', '$']))
                .and_then(|name| context.first(name))
                .map(String::from)
        })
        .collect();

    for (offset, value) in bindings.iter().enumerate() {
        stmt.raw_bind_parameter(offset + 1, value.as_deref())
            .map_err(|e| QueryError::execution(query, e))?;
    }

    let mut table = QueryResult::new(columns);
    let width = table.column_count();
    let mut rows = stmt.raw_query();

    while let Some(row) = rows.next().map_err(|e| QueryError::execution(query, e))? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            let value = row.get_ref(idx).map_err(|e| QueryError::execution(query, e))?;
            cells.push(to_scalar(value));
        }
        table.push_row(cells);
    }

    Ok(table)
}

fn to_scalar(value: ValueRef<'_>) -> ScalarValue {
    match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(i) => ScalarValue::Integer(i),
        ValueRef::Real(f) => ScalarValue::Decimal(f),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(text) => ScalarValue::Text(text.to_string()),
            Err(_) => ScalarValue::Binary(t.to_vec()),
        },
        ValueRef::Blob(b) => ScalarValue::Binary(b.to_vec()),
    }
}
