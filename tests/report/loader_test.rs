#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use paramdoc::report::{
        self, LoadError, ParameterKind, QuerySource, RenderHint, ScalarType, ScalarValue,
    };

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_load_prd3882() {
        let report = report::load(fixture("prd3882.toml")).unwrap();

        assert_eq!(report.name, "prd3882");
        assert_eq!(report.parameters.len(), 2);
        assert_eq!(report.parameters[0].name, "dropDown");
        assert_eq!(report.parameters[1].name, "singleSelection");

        let query = report.query("Query 1").unwrap();
        let QuerySource::Static(table) = &query.source else {
            panic!("expected a static query");
        };
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.cell(1, 0),
            Some(&ScalarValue::Text("+ / : ; = ? [ ] ^ \\".to_string()))
        );
    }

    #[test]
    fn test_load_parameter_attributes() {
        let report = report::load(fixture("product_sales.toml")).unwrap();

        let region = report.parameter("region").unwrap();
        assert!(region.mandatory);
        assert_eq!(region.defaults, vec!["EMEA"]);
        assert_eq!(region.label.as_deref(), Some("Region"));
        assert_eq!(region.render_hint, Some(RenderHint::DropDown));

        let lines = report.parameter("lines").unwrap();
        assert_eq!(lines.kind, ParameterKind::MultiValue);
        assert_eq!(lines.depends_on, vec!["region"]);
        assert_eq!(lines.list.as_ref().unwrap().query, "Lines");

        let year = report.parameter("year").unwrap();
        assert_eq!(year.value_type, ScalarType::Integer);

        let title = report.parameter("title").unwrap();
        assert!(!title.is_list());
        assert_eq!(title.kind, ParameterKind::SingleValue);

        assert!(matches!(
            report.query("Lines").unwrap().source,
            QuerySource::Connection { ref connection, .. } if connection == "sales"
        ));
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let dir = std::env::temp_dir().join(format!("paramdoc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("unnamed_report.toml");
        std::fs::write(&path, "version = 1\n").unwrap();

        let report = report::load(&path).unwrap();
        assert_eq!(report.name, "unnamed_report");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = report::load(fixture("does_not_exist.toml")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_unsupported_version() {
        let err = report::parse("version = 2").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn test_newer_version_with_new_sections() {
        let err = report::parse(
            r#"
version = 2
name = "future"

[[filter]]
name = "region"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn test_malformed_definition() {
        assert!(matches!(
            report::parse("version = ").unwrap_err(),
            LoadError::Malformed(_)
        ));
        assert!(matches!(
            report::parse("name = \"no version\"").unwrap_err(),
            LoadError::Malformed(_)
        ));
    }

    #[test]
    fn test_undeclared_query() {
        let err = report::parse(
            r#"
version = 1

[[parameter]]
name = "p"
query = "Nowhere"
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("undeclared query 'Nowhere'"));
    }

    #[test]
    fn test_static_column_must_exist() {
        let err = report::parse(
            r#"
version = 1

[[query]]
name = "q"
columns = ["id"]
rows = [["a"]]

[[parameter]]
name = "p"
query = "q"
label_column = "caption"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::Invalid(ref m) if m.contains("caption")));
    }

    #[test]
    fn test_row_width_mismatch() {
        let err = report::parse(
            r#"
version = 1

[[query]]
name = "q"
columns = ["id", "name"]
rows = [["a", "A"], ["b"]]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::Invalid(ref m) if m.contains("row 2")));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = report::parse(
            r#"
version = 1

[[parameter]]
name = "p"

[[parameter]]
name = "p"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::Invalid(ref m) if m.contains("duplicate parameter")));
    }

    #[test]
    fn test_unknown_type_and_kind() {
        let bad_type = report::parse("version = 1\n[[parameter]]\nname = \"p\"\ntype = \"blob\"");
        assert!(matches!(bad_type, Err(LoadError::Invalid(_))));

        let bad_kind = report::parse("version = 1\n[[parameter]]\nname = \"p\"\nkind = \"many\"");
        assert!(matches!(bad_kind, Err(LoadError::Invalid(_))));
    }
}
