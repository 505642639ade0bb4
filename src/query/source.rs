//! DataSource trait definition.
//!
//! A data source is anything that can turn a statement plus upstream
//! parameter values into a [`QueryResult`]. Implementations must be safe to
//! call concurrently; the resolver runs independent parameters in parallel.

use async_trait::async_trait;

use super::context::ParameterContext;
use super::error::QueryOutcome;
use super::table::QueryResult;

/// Capability interface for executing report queries.
///
/// # Example
///
/// ```ignore
/// use paramdoc::query::{DataSource, ParameterContext};
///
/// async fn example(source: &dyn DataSource) -> QueryOutcome<()> {
///     let context = ParameterContext::new().with("country", "DE");
///     let table = source
///         .execute("Cities", "SELECT city FROM customers WHERE country = :country", &context)
///         .await?;
///     println!("{} rows", table.row_count());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Run `statement` on behalf of the query named `query`.
    ///
    /// `query` is only used for error reporting.
    async fn execute(
        &self,
        query: &str,
        statement: &str,
        context: &ParameterContext,
    ) -> QueryOutcome<QueryResult>;
}
