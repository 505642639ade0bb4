#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use paramdoc::config::{ConnectionSettings, Settings};
    use paramdoc::encoding;
    use paramdoc::query::QueryExecutor;
    use paramdoc::resolver::ResolutionError;
    use paramdoc::{GenerateError, OutputFormat, ParameterContentGenerator, ParameterOverrides};

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

    fn fixture(name: &str) -> String {
        format!("{}/{}", FIXTURES, name)
    }

    fn static_generator() -> ParameterContentGenerator {
        ParameterContentGenerator::with_executor(QueryExecutor::new())
    }

    async fn render(
        generator: &ParameterContentGenerator,
        report: &str,
        overrides: &ParameterOverrides,
    ) -> String {
        let mut out = Vec::new();
        generator
            .generate(report, overrides, OutputFormat::Xml, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    /// A throwaway sqlite database with a `products(region, line)` table.
    struct SalesDb {
        path: PathBuf,
    }

    impl SalesDb {
        fn create() -> Self {
            let path = std::env::temp_dir().join(format!("paramdoc-sales-{}.db", uuid::Uuid::new_v4()));
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE products (region TEXT NOT NULL, line TEXT NOT NULL);
                 INSERT INTO products VALUES
                     ('EMEA', 'Bikes'), ('EMEA', 'Cars'),
                     ('APAC', 'Boats'), ('AMER', 'Trucks');",
            )
            .unwrap();
            Self { path }
        }

        fn settings(&self) -> Settings {
            let mut settings = Settings::default();
            settings.connections.insert(
                "sales".to_string(),
                ConnectionSettings {
                    driver: "sqlite".to_string(),
                    connection_string: self.path.display().to_string(),
                },
            );
            settings.reports.search_paths = vec![FIXTURES.to_string()];
            settings
        }
    }

    impl Drop for SalesDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[tokio::test]
    async fn test_prd3882_values_are_readable() {
        let generator = static_generator();
        let xml = render(&generator, &fixture("prd3882.toml"), &ParameterOverrides::new()).await;

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("report"), Some("prd3882"));
        assert_eq!(root.attribute("is-prompt-needed"), Some("false"));

        let parameters: Vec<_> = root.children().filter(|n| n.has_tag_name("parameter")).collect();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].attribute("name"), Some("dropDown"));
        assert_eq!(parameters[0].attribute("render-type"), Some("dropdown"));
        assert_eq!(parameters[1].attribute("name"), Some("singleSelection"));
        assert_eq!(parameters[1].attribute("render-type"), Some("list"));

        let expected = ["1qA", "+ / : ; = ? [ ] ^ \\", "果物"];
        for parameter in parameters {
            let values: Vec<_> = parameter
                .children()
                .filter(|n| n.has_tag_name("value"))
                .collect();
            assert_eq!(values.len(), 3);

            for (value, raw) in values.iter().zip(expected) {
                assert_eq!(value.attribute("value"), Some(raw));
                assert_eq!(value.attribute("label"), value.attribute("value"));
                assert_eq!(value.attribute("encoded"), None);
                assert_eq!(value.attribute("selected"), Some("false"));
            }
        }
    }

    #[tokio::test]
    async fn test_control_characters_are_encoded() {
        let generator = static_generator();
        let xml = render(
            &generator,
            &fixture("control_chars.toml"),
            &ParameterOverrides::new(),
        )
        .await;

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let values: Vec<_> = doc
            .descendants()
            .filter(|n| n.has_tag_name("value"))
            .collect();
        assert_eq!(values.len(), 3);

        let substitute = values[0];
        assert_eq!(substitute.attribute("value"), Some("Gg=="));
        assert_eq!(substitute.attribute("encoded"), Some("true"));
        assert_eq!(substitute.attribute("selected"), Some("true"));
        assert_eq!(
            encoding::decode(substitute.attribute("label").unwrap()).unwrap(),
            "substitute"
        );

        let bell = values[1];
        assert_eq!(bell.attribute("encoded"), Some("true"));
        assert_eq!(
            encoding::decode(bell.attribute("value").unwrap()).unwrap(),
            "tab\there"
        );
        assert_eq!(
            encoding::decode(bell.attribute("label").unwrap()).unwrap(),
            "bell\u{7}"
        );

        let plain = values[2];
        assert_eq!(plain.attribute("value"), Some("plain"));
        assert_eq!(plain.attribute("encoded"), None);
    }

    #[tokio::test]
    async fn test_output_is_byte_identical_across_runs() {
        let generator = static_generator();
        let overrides = ParameterOverrides::new().set("dropDown", "果物");

        let first = render(&generator, &fixture("prd3882.toml"), &overrides).await;
        let second = render(&generator, &fixture("prd3882.toml"), &overrides).await;

        assert_eq!(first, second);
        assert!(first.contains("value=\"果物\" label=\"果物\" selected=\"true\""));
    }

    #[tokio::test]
    async fn test_sqlite_backed_cascade() {
        let db = SalesDb::create();
        let generator = ParameterContentGenerator::from_settings(db.settings()).unwrap();

        let document = generator
            .document("product_sales", &ParameterOverrides::new())
            .await
            .unwrap();

        assert_eq!(document.report, "Product Sales");

        let region = document.parameter("region").unwrap();
        let regions: Vec<&str> = region.values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(regions, vec!["AMER", "APAC", "EMEA"]);
        assert_eq!(region.selection, vec!["EMEA"]);

        let lines = document.parameter("lines").unwrap();
        let lines: Vec<&str> = lines.values.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(lines, vec!["Bikes", "Cars"]);

        let year = document.parameter("year").unwrap();
        assert_eq!(year.selection, vec!["2024"]);

        let title = document.parameter("title").unwrap();
        assert_eq!(title.selection, vec!["Sales by line"]);

        // The products table has no discontinued column.
        let discontinued = document.parameter("discontinued").unwrap();
        assert!(matches!(
            discontinued.error,
            Some(ResolutionError::Query { .. })
        ));
        assert!(document.is_prompt_needed());
    }

    #[tokio::test]
    async fn test_sqlite_override_reaches_dependent_query() {
        let db = SalesDb::create();
        let generator = ParameterContentGenerator::from_settings(db.settings()).unwrap();
        let overrides = ParameterOverrides::new()
            .set("region", "APAC")
            .set("lines", "Boats");

        let xml = render(&generator, "product_sales", &overrides).await;

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let lines = doc
            .descendants()
            .find(|n| n.has_tag_name("parameter") && n.attribute("name") == Some("lines"))
            .unwrap();
        assert_eq!(lines.attribute("depends-on"), Some("region"));
        assert_eq!(lines.attribute("kind"), Some("multi-value"));

        let values: Vec<_> = lines
            .children()
            .filter(|n| n.has_tag_name("value"))
            .map(|n| (n.attribute("value"), n.attribute("selected")))
            .collect();
        assert_eq!(values, vec![(Some("Boats"), Some("true"))]);
    }

    #[tokio::test]
    async fn test_json_output() {
        let generator = static_generator();
        let mut out = Vec::new();
        generator
            .generate(
                &fixture("prd3882.toml"),
                &ParameterOverrides::new(),
                OutputFormat::Json,
                &mut out,
            )
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["report"], "prd3882");
        assert_eq!(json["parameters"][0]["declaration"]["name"], "dropDown");
        assert_eq!(json["parameters"][0]["values"][2]["value"], "果物");
        assert_eq!(json["parameters"][0]["error"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_missing_report() {
        let generator = static_generator();
        let err = generator
            .document(&fixture("missing.toml"), &ParameterOverrides::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Load(_)));
    }

    #[tokio::test]
    async fn test_cyclic_report_fails_request() {
        let generator = static_generator();
        let err = generator
            .document(&fixture("cyclic.toml"), &ParameterOverrides::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Resolution(ResolutionError::CyclicDependency { .. })
        ));
    }
}
