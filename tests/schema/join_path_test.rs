// tests/schema/join_path_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::schema::{find_join_path, join_column, JoinKind, Schema};

    fn concert_schema() -> Schema {
        Schema::new()
            .with_column("SINGER", "SINGER_ID", "NUMBER", "singer id")
            .with_column("SINGER", "NAME", "TEXT", "name")
            .with_column("CONCERT", "CONCERT_ID", "NUMBER", "concert id")
            .with_column("SINGER_IN_CONCERT", "SINGER_ID", "NUMBER", "singer id")
            .with_column("SINGER_IN_CONCERT", "CONCERT_ID", "NUMBER", "concert id")
            .with_link("SINGER_IN_CONCERT", "SINGER", "SINGER_ID", "SINGER_ID")
            .with_link("SINGER_IN_CONCERT", "CONCERT", "CONCERT_ID", "CONCERT_ID")
    }

    #[test]
    fn test_self_join_from_is_table() {
        let schema = concert_schema();
        assert_eq!(
            find_join_path("SINGER", "SINGER", &schema, JoinKind::From).as_deref(),
            Some("SINGER")
        );
    }

    #[test]
    fn test_self_join_where_is_empty() {
        let schema = concert_schema();
        assert_eq!(
            find_join_path("SINGER", "SINGER", &schema, JoinKind::Where).as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_linked_tables() {
        let schema = concert_schema();
        assert_eq!(
            find_join_path("SINGER", "SINGER_IN_CONCERT", &schema, JoinKind::From).as_deref(),
            Some("SINGER JOIN SINGER_IN_CONCERT")
        );
        assert_eq!(
            find_join_path("SINGER", "SINGER_IN_CONCERT", &schema, JoinKind::Where).as_deref(),
            Some("SINGER.SINGER_ID = SINGER_IN_CONCERT.SINGER_ID")
        );
    }

    #[test]
    fn test_unlinked_tables() {
        let schema = concert_schema();
        assert_eq!(find_join_path("SINGER", "CONCERT", &schema, JoinKind::Where), None);
        assert_eq!(find_join_path("SINGER", "CONCERT", &schema, JoinKind::From), None);
    }

    #[test]
    fn test_unknown_table() {
        let schema = concert_schema();
        assert_eq!(find_join_path("SINGER", "VENUE", &schema, JoinKind::From), None);
    }

    #[test]
    fn test_multi_hop_path_is_known_but_not_joined() {
        let schema = concert_schema();
        assert_eq!(
            schema.links().shortest_path("SINGER", "CONCERT"),
            Some(vec![
                "SINGER".to_string(),
                "SINGER_IN_CONCERT".to_string(),
                "CONCERT".to_string()
            ])
        );
        assert!(!schema.links().is_linked("SINGER", "CONCERT"));
    }

    #[test]
    fn test_join_column() {
        let schema = concert_schema();
        assert_eq!(
            join_column("SINGER_IN_CONCERT", "CONCERT", &schema).as_deref(),
            Some("SINGER_IN_CONCERT.CONCERT_ID")
        );
        assert_eq!(join_column("SINGER", "SINGER", &schema), None);
        assert_eq!(join_column("SINGER", "CONCERT", &schema), None);
    }
}
