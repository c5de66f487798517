// tests/schema/schema_loader_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::schema::{JoinKind, Schema, SchemaError};
    use std::fs;

    const MOUNTAINS: &str = r#"
// climbers and the mountains they climbed
{
  "types": {"TEXT": 0, "NUMBER": 1},
  "ents": {
    "MOUNTAIN": {
      "MOUNTAIN_ID": {"type": "NUMBER", "index": true, "utt": "mountain id"},
      "NAME": {"type": "TEXT", "utt": "name"},
      "HEIGHT": {"type": "NUMBER", "utt": "height"}
    },
    "CLIMBER": {
      "CLIMBER_ID": {"type": "NUMBER", "index": true, "utt": "climber id"},
      "MOUNTAIN_ID": {"type": "NUMBER", "utt": "mountain id"},
      # surface form derived from the column name
      "COUNTRY_NAME": {"type": "TEXT"}
    }
  },
  "defaults": {
    "MOUNTAIN": {"utt": "mountain", "col": "NAME"},
    "CLIMBER": {"utt": "climber"}
  },
  "links": {
    "CLIMBER": {"MOUNTAIN": "MOUNTAIN_ID"},
    "MOUNTAIN": {"CLIMBER": "MOUNTAIN_ID"}
  }
}
"#;

    #[test]
    fn test_load_tables_and_columns() {
        let schema = Schema::from_json_str(MOUNTAINS).unwrap();

        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["CLIMBER", "MOUNTAIN"]);
        let height = schema.column("MOUNTAIN", "HEIGHT").unwrap();
        assert_eq!(height.type_tag, "NUMBER");
        assert!(height.is_numeric());
        assert!(schema.column("MOUNTAIN", "MOUNTAIN_ID").unwrap().indexed);
        assert_eq!(schema.column("CLIMBER", "COUNTRY_NAME").unwrap().surface, "country name");
    }

    #[test]
    fn test_types_follow_ordinals() {
        let schema = Schema::from_json_str(MOUNTAINS).unwrap();
        assert_eq!(schema.types(), &["TEXT".to_string(), "NUMBER".to_string()]);
        assert_eq!(schema.types_by_length(), vec!["NUMBER", "TEXT"]);
    }

    #[test]
    fn test_defaults() {
        let schema = Schema::from_json_str(MOUNTAINS).unwrap();
        assert_eq!(schema.table_surface("MOUNTAIN"), "mountain");
        assert_eq!(schema.defaults("MOUNTAIN").unwrap().column.as_deref(), Some("NAME"));
        assert_eq!(schema.defaults("CLIMBER").unwrap().column, None);
    }

    #[test]
    fn test_links() {
        let schema = Schema::from_json_str(MOUNTAINS).unwrap();
        assert_eq!(
            schema.links().join_path("CLIMBER", "MOUNTAIN", JoinKind::Where).as_deref(),
            Some("CLIMBER.MOUNTAIN_ID = MOUNTAIN.MOUNTAIN_ID")
        );
    }

    #[test]
    fn test_columns_of_type() {
        let schema = Schema::from_json_str(MOUNTAINS).unwrap();
        let text: Vec<_> = schema.columns_of_type("TEXT").to_vec();
        assert_eq!(text.len(), 2);
        assert!(text.contains(&("MOUNTAIN".to_string(), "NAME".to_string())));
        assert!(schema.columns_of_type("DATE").is_empty());
    }

    #[test]
    fn test_canonical_view() {
        let canonical = Schema::from_json_str(MOUNTAINS).unwrap().canonical();
        assert!(canonical.is_table("MOUNTAIN"));
        assert!(canonical.has_field("CLIMBER", "COUNTRY_NAME"));
        assert!(!canonical.has_field("MOUNTAIN", "COUNTRY_NAME"));
    }

    #[test]
    fn test_link_to_unknown_table() {
        let source = r#"{"ents": {"A": {"X": {"type": "TEXT"}}}, "links": {"A": {"B": "X"}}}"#;
        assert!(matches!(
            Schema::from_json_str(source),
            Err(SchemaError::UnknownLinkTable(t)) if t == "B"
        ));
    }

    #[test]
    fn test_unknown_default_column() {
        let source = r#"{"ents": {"A": {"X": {"type": "TEXT"}}}, "defaults": {"A": {"utt": "a", "col": "Y"}}}"#;
        assert!(matches!(
            Schema::from_json_str(source),
            Err(SchemaError::UnknownDefaultColumn { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Schema::from_json_str("{ents"), Err(SchemaError::Json(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mountain.json");
        fs::write(&path, MOUNTAINS).unwrap();

        let schema = Schema::from_file(&path).unwrap();
        assert!(schema.has_table("CLIMBER"));

        let missing = Schema::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SchemaError::FileNotFound(_))));
    }
}
