//! Data query execution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        QueryExecutor                            │
//! │  execute(query_name, report, context)                           │
//! │    ├── QuerySource::Static      → rows from the definition      │
//! │    └── QuerySource::Connection  → registered DataSource          │
//! │                                   (bounded by timeout)          │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │               DataSource (SqliteDataSource, ...)                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod context;
mod error;
mod executor;
mod source;
mod sqlite;
mod table;

pub use context::ParameterContext;
pub use error::{QueryError, QueryOutcome};
pub use executor::{QueryExecutor, DEFAULT_QUERY_TIMEOUT};
pub use source::DataSource;
pub use sqlite::SqliteDataSource;
pub use table::QueryResult;
