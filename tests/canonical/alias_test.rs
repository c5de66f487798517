// tests/canonical/alias_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::canonical::standardize_aliases;
    use sqlsynth::schema::CanonicalSchema;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new()
            .with_table("SINGER", ["SINGER_ID", "NAME", "AGE"])
            .with_table("CONCERT", ["CONCERT_ID", "CONCERT_NAME", "YEAR"])
            .with_table("SINGER_IN_CONCERT", ["SINGER_ID", "CONCERT_ID"])
    }

    #[test]
    fn test_join_aliases() {
        assert_eq!(
            standardize_aliases(
                "SELECT T1.NAME FROM SINGER AS T1 JOIN SINGER_IN_CONCERT AS T2 ON T1.SINGER_ID = T2.SINGER_ID ;",
                &schema()
            ),
            "SELECT SINGERalias0.NAME FROM SINGER AS SINGERalias0 JOIN SINGER_IN_CONCERT AS SINGER_IN_CONCERTalias0 ON SINGERalias0.SINGER_ID = SINGER_IN_CONCERTalias0.SINGER_ID ;"
        );
    }

    #[test]
    fn test_alias_without_as() {
        assert_eq!(
            standardize_aliases("SELECT S.AGE FROM SINGER S ;", &schema()),
            "SELECT SINGERalias0.AGE FROM SINGER AS SINGERalias0 ;"
        );
    }

    #[test]
    fn test_same_table_twice_counts_up() {
        assert_eq!(
            standardize_aliases(
                "SELECT A.NAME FROM SINGER AS A , SINGER AS B WHERE A.AGE > B.AGE ;",
                &schema()
            ),
            "SELECT SINGERalias0.NAME FROM SINGER AS SINGERalias0 , SINGER AS SINGERalias1 WHERE SINGERalias0.AGE > SINGERalias1.AGE ;"
        );
    }

    #[test]
    fn test_table_qualified_reference() {
        assert_eq!(
            standardize_aliases("SELECT SINGER.NAME FROM SINGER ;", &schema()),
            "SELECT SINGERalias0.NAME FROM SINGER AS SINGERalias0 ;"
        );
    }

    #[test]
    fn test_unique_bare_column_in_join() {
        assert_eq!(
            standardize_aliases("SELECT YEAR FROM CONCERT , SINGER ;", &schema()),
            "SELECT CONCERTalias0.YEAR FROM CONCERT AS CONCERTalias0 , SINGER AS SINGERalias0 ;"
        );
    }

    #[test]
    fn test_fixed_point() {
        let sql = "SELECT T1.NAME FROM SINGER AS T1 WHERE T1.AGE > 30 ;";
        let once = standardize_aliases(sql, &schema());
        assert_eq!(standardize_aliases(&once, &schema()), once);
    }

    #[test]
    fn test_union_halves_scoped_separately() {
        assert_eq!(
            standardize_aliases("SELECT NAME FROM SINGER UNION SELECT NAME FROM SINGER ;", &schema()),
            "SELECT SINGERalias0.NAME FROM SINGER AS SINGERalias0 UNION SELECT SINGERalias1.NAME FROM SINGER AS SINGERalias1 ;"
        );
    }

    #[test]
    fn test_intersect_not_taken_as_alias() {
        assert_eq!(
            standardize_aliases(
                "SELECT SINGER_ID FROM SINGER INTERSECT SELECT SINGER_ID FROM SINGER_IN_CONCERT ;",
                &schema()
            ),
            "SELECT SINGERalias0.SINGER_ID FROM SINGER AS SINGERalias0 INTERSECT SELECT SINGER_IN_CONCERTalias0.SINGER_ID FROM SINGER_IN_CONCERT AS SINGER_IN_CONCERTalias0 ;"
        );
    }
}
