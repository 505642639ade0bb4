#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use paramdoc::query::{
        DataSource, ParameterContext, QueryError, QueryExecutor, QueryOutcome, QueryResult,
        SqliteDataSource,
    };
    use paramdoc::report::{self, ReportDefinition, ScalarValue};

    /// Echoes the bound context back as a one-column table and counts calls.
    struct EchoSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl EchoSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl DataSource for EchoSource {
        async fn execute(
            &self,
            _query: &str,
            statement: &str,
            context: &ParameterContext,
        ) -> QueryOutcome<QueryResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let mut table = QueryResult::new(vec!["value".to_string()]);
            table.push_row(vec![ScalarValue::Text(statement.to_string())]);
            for (name, values) in context.iter() {
                table.push_row(vec![ScalarValue::Text(format!("{}={}", name, values.join("|")))]);
            }
            Ok(table)
        }
    }

    fn definition() -> ReportDefinition {
        report::parse(
            r#"
version = 1
name = "executor"

[[query]]
name = "Static"
columns = ["id", "name"]
rows = [[1, "one"], [2, "two"]]

[[query]]
name = "Live"
connection = "echo"
statement = "SELECT value FROM things"

[[query]]
name = "Orphan"
connection = "missing"
statement = "SELECT 1"
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_static_query_returns_declared_table() {
        let executor = QueryExecutor::new();
        let table = executor
            .execute("Static", &definition(), &ParameterContext::new())
            .await
            .unwrap();

        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 1), Some(&ScalarValue::Text("two".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_query() {
        let err = QueryExecutor::new()
            .execute("Nope", &definition(), &ParameterContext::new())
            .await
            .unwrap_err();

        assert_eq!(err, QueryError::UnknownQuery("Nope".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_connection() {
        let executor = QueryExecutor::new().with_source("echo", Arc::new(EchoSource::new()));
        let err = executor
            .execute("Orphan", &definition(), &ParameterContext::new())
            .await
            .unwrap_err();

        assert_eq!(err, QueryError::UnknownConnection("missing".to_string()));
    }

    #[tokio::test]
    async fn test_context_reaches_data_source() {
        let executor = QueryExecutor::new().with_source("echo", Arc::new(EchoSource::new()));
        let context = ParameterContext::new()
            .with("region", "EMEA")
            .with("region", "APAC");

        let table = executor.execute("Live", &definition(), &context).await.unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.cell(0, 0),
            Some(&ScalarValue::Text("SELECT value FROM things".to_string()))
        );
        assert_eq!(
            table.cell(1, 0),
            Some(&ScalarValue::Text("region=EMEA|APAC".to_string()))
        );
    }

    #[tokio::test]
    async fn test_every_call_reaches_the_source() {
        let source = Arc::new(EchoSource::new());
        let executor = QueryExecutor::new().with_source("echo", source.clone());
        let report = definition();

        for _ in 0..3 {
            executor
                .execute("Live", &report, &ParameterContext::new())
                .await
                .unwrap();
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_slow_query_times_out() {
        let executor = QueryExecutor::new()
            .with_timeout(Duration::from_millis(20))
            .with_source("echo", Arc::new(EchoSource::slow(Duration::from_secs(5))));

        let err = executor
            .execute("Live", &definition(), &ParameterContext::new())
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(
            err,
            QueryError::Timeout {
                query: "Live".to_string(),
                millis: 20,
            }
        );
    }

    #[tokio::test]
    async fn test_timed_out_sqlite_statement_is_interrupted() {
        let report = report::parse(
            r#"
version = 1

[[query]]
name = "Slow"
connection = "db"
statement = """
WITH RECURSIVE counter(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM counter WHERE x < 500000000)
SELECT count(*) FROM counter
"""

[[query]]
name = "Fast"
connection = "db"
statement = "SELECT 'a', 'a'"
"#,
        )
        .unwrap();

        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let executor = QueryExecutor::new()
            .with_timeout(Duration::from_millis(200))
            .with_source("db", Arc::new(SqliteDataSource::from_connection("db", conn)));

        let started = Instant::now();
        let slow = executor
            .execute("Slow", &report, &ParameterContext::new())
            .await
            .unwrap_err();
        assert!(slow.is_timeout());

        // The shared connection is free again well within the next timeout.
        let fast = executor
            .execute("Fast", &report, &ParameterContext::new())
            .await
            .unwrap();
        assert_eq!(fast.cell(0, 0), Some(&ScalarValue::Text("a".to_string())));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
