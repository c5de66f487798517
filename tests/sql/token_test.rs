// tests/sql/token_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::sql::{is_groupable, join_tokens, replace_in_tokens, tokenize_nl, tokenize_sql};

    #[test]
    fn test_template_sql_tokens_rejoin() {
        let sql = "SELECT {ENT1}.{COL1} FROM {ENT1} WHERE {ENT1}.{COL2} {COMP1} {LITERAL1}";
        let tokens = tokenize_sql(sql);
        assert_eq!(join_tokens(&tokens), sql);
    }

    #[test]
    fn test_sql_tokens_isolate_calls() {
        let tokens = tokenize_sql("SELECT count(*) FROM t WHERE a<>b AND c<=d");
        assert_eq!(
            tokens,
            vec![
                "SELECT", "count", "(", "*", ")", "FROM", "t", "WHERE", "a", "<", ">", "b", "AND",
                "c", "<=", "d"
            ]
        );
    }

    #[test]
    fn test_sql_tokens_keep_spaced_operators_together() {
        assert_eq!(tokenize_sql("a ! = b"), vec!["a", "!=", "b"]);
        assert_eq!(tokenize_sql("a > = b"), vec!["a", ">=", "b"]);
    }

    #[test]
    fn test_nl_tokens_keep_slots_intact() {
        let tokens = tokenize_nl("{findToken} {ENT1}.{COL1} of each {ENT1} ?");
        assert_eq!(
            tokens,
            vec!["{findToken}", "{ENT1}.{COL1}", "of", "each", "{ENT1}", "?"]
        );
    }

    #[test]
    fn test_nl_tokens_split_possessive() {
        assert_eq!(tokenize_nl("the singer's name"), vec!["the", "singer", "'s", "name"]);
    }

    #[test]
    fn test_nl_tokens_ignore_decimal_points() {
        assert_eq!(tokenize_nl("more than 2.5 meters."), vec!["more", "than", "2.5", "meters", "."]);
    }

    #[test]
    fn test_replace_leaves_other_tokens() {
        let mut tokens = tokenize_sql("SELECT {ENT1}.{COL1} FROM {ENT1} , {ENT2}");
        replace_in_tokens(&mut tokens, "{ENT1}", "SINGER", "SINGER");
        assert_eq!(join_tokens(&tokens), "SELECT SINGER.{COL1} FROM SINGER , {ENT2}");
    }

    #[test]
    fn test_groupable_needs_aggregate() {
        assert!(is_groupable("SELECT avg ( {ENT1}.{COL1} ) FROM {ENT1}"));
        assert!(!is_groupable("SELECT argmax ( {ENT1}.{COL1} $ {ENT1} $ ) FROM {ENT1}"));
        assert!(!is_groupable("SELECT COUNT_COND ( * ) FROM {ENT1}"));
    }
}
