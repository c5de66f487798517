// tests/canonical/canonical_test.rs
#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use sqlsynth::canonical::{canonicalize, Canonicalizer, Pass};
    use sqlsynth::schema::CanonicalSchema;
    use std::collections::BTreeMap;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new()
            .with_table("MOUNTAIN", ["MOUNTAIN_ID", "NAME", "HEIGHT", "COUNTRY"])
            .with_table("CLIMBER", ["CLIMBER_ID", "NAME", "MOUNTAIN_ID", "POINTS"])
            .with_table("SINGER", ["SINGER_ID", "SINGER", "AGE"])
    }

    fn canon(sql: &str) -> String {
        canonicalize(sql, &schema(), &BTreeMap::new())
    }

    #[test]
    fn test_single_table_select() {
        assert_snapshot!(
            canon("select height from mountain"),
            @"SELECT MOUNTAINalias0.HEIGHT FROM MOUNTAIN AS MOUNTAINalias0 ;"
        );
    }

    #[test]
    fn test_select_items_sorted() {
        assert_snapshot!(
            canon("select name, height from mountain where height > 5000"),
            @"SELECT MOUNTAINalias0.HEIGHT , MOUNTAINalias0.NAME FROM MOUNTAIN AS MOUNTAINalias0 WHERE MOUNTAINalias0.HEIGHT > 5000 ;"
        );
    }

    #[test]
    fn test_alias_and_spacing_equivalence() {
        assert_eq!(
            canon("SELECT T1.NAME FROM MOUNTAIN AS T1 WHERE T1.HEIGHT > 5"),
            canon("select name   from mountain where height>5;")
        );
    }

    #[test]
    fn test_quote_style_equivalence() {
        assert_eq!(
            canon("SELECT name FROM mountain WHERE country = 'Nepal'"),
            canon("SELECT name FROM mountain WHERE country = \"Nepal\"")
        );
    }

    #[test]
    fn test_predicate_order_equivalence() {
        assert_eq!(
            canon("SELECT name FROM mountain WHERE height > 8000 AND country = \"Nepal\""),
            canon("SELECT name FROM mountain WHERE country = \"Nepal\" AND height > 8000")
        );
    }

    #[test]
    fn test_different_queries_stay_different() {
        assert_ne!(
            canon("SELECT name FROM mountain WHERE height > 8000"),
            canon("SELECT name FROM mountain WHERE height < 8000")
        );
    }

    #[test]
    fn test_set_operator_survives() {
        assert_snapshot!(
            canon("SELECT name FROM mountain EXCEPT SELECT name FROM climber"),
            @"SELECT MOUNTAINalias0.NAME FROM MOUNTAIN AS MOUNTAINalias0 EXCEPT SELECT CLIMBERalias0.NAME FROM CLIMBER AS CLIMBERalias0 ;"
        );
    }

    #[test]
    fn test_set_operators_stay_different() {
        let except = canon("SELECT name FROM mountain EXCEPT SELECT name FROM climber");
        let intersect = canon("SELECT name FROM mountain INTERSECT SELECT name FROM climber");
        let union = canon("SELECT name FROM mountain UNION SELECT name FROM climber");
        assert_ne!(except, intersect);
        assert_ne!(except, union);
        assert_ne!(intersect, union);
        assert!(intersect.contains(" INTERSECT SELECT "), "{intersect}");
    }

    #[test]
    fn test_compound_halves_ordered_independently() {
        assert_eq!(
            canon("SELECT name FROM climber WHERE points > 3 AND climber_id = 2 UNION SELECT name FROM mountain"),
            canon("SELECT T1.name FROM climber AS T1 WHERE T1.climber_id = 2 AND T1.points > 3 UNION SELECT name FROM mountain")
        );
    }

    #[test]
    fn test_column_named_like_its_table() {
        assert_snapshot!(
            canon("select singer from singer where age > 30"),
            @"SELECT SINGERalias0.SINGER FROM SINGER AS SINGERalias0 WHERE SINGERalias0.AGE > 30 ;"
        );
        assert_eq!(
            canon("select singer from singer where age > 30"),
            canon("SELECT T1.singer FROM singer AS T1 WHERE T1.age > 30")
        );
    }

    #[test]
    fn test_idempotent() {
        let queries = [
            "select name, height from mountain where height > 5000",
            "SELECT T1.NAME FROM MOUNTAIN AS T1 WHERE T1.HEIGHT > 5",
            "SELECT count(*) FROM climber WHERE points = 3 AND mountain_id = 1",
            "SELECT name FROM mountain WHERE country = 'Nepal'",
            "SELECT name FROM mountain EXCEPT SELECT name FROM climber",
            "SELECT name FROM climber WHERE points > 3 UNION SELECT name FROM mountain WHERE height > 8000",
            "select singer from singer where age > 30",
        ];
        for sql in queries {
            let once = canon(sql);
            assert_eq!(canon(&once), once, "not a fixed point: {sql}");
        }
    }

    #[test]
    fn test_literal_case_preserved() {
        let sql = canon("SELECT name FROM mountain WHERE country = 'Nepal'");
        assert!(sql.contains("\"Nepal\""), "{sql}");
    }

    #[test]
    fn test_variables_preserved() {
        let vars = BTreeMap::from([("var0".to_string(), "Everest".to_string())]);
        let sql = canonicalize("select height from mountain where name = var0", &schema(), &vars);
        assert!(sql.ends_with("= var0 ;"), "{sql}");
    }

    #[test]
    fn test_only_whitespace_passes() {
        let schema = schema();
        let canonicalizer = Canonicalizer::new(&schema)
            .skip(Pass::Case)
            .skip(Pass::Aliases)
            .skip(Pass::Order);
        assert_eq!(
            canonicalizer.canonicalize("select a,b from t", &BTreeMap::new()),
            "select a , b from t ;"
        );
    }

    #[test]
    fn test_all_passes_enabled_by_default() {
        let schema = schema();
        let canonicalizer = Canonicalizer::new(&schema);
        assert!(Pass::ALL.iter().all(|p| canonicalizer.is_enabled(*p)));
    }
}
