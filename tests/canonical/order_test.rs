// tests/canonical/order_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::canonical::order_query;
    use std::collections::BTreeSet;

    fn order(sql: &str) -> String {
        order_query(sql, &BTreeSet::new())
    }

    #[test]
    fn test_three_and_predicates() {
        assert_eq!(
            order("SELECT * FROM T WHERE T.C = 3 AND T.A = 1 AND T.B = 2 ;"),
            "SELECT * FROM T WHERE T.A = 1 AND T.B = 2 AND T.C = 3 ;"
        );
    }

    #[test]
    fn test_or_predicates() {
        assert_eq!(
            order("SELECT * FROM T WHERE T.Y = 2 OR T.X = 1 ;"),
            "SELECT * FROM T WHERE T.X = 1 OR T.Y = 2 ;"
        );
    }

    #[test]
    fn test_from_items_sorted() {
        assert_eq!(
            order("SELECT * FROM B AS B0 , A AS A0 ;"),
            "SELECT * FROM A AS A0 , B AS B0 ;"
        );
    }

    #[test]
    fn test_not_equal_orientation() {
        assert_eq!(
            order("SELECT * FROM A WHERE 3 != A.X ;"),
            "SELECT * FROM A WHERE A.X != 3 ;"
        );
    }

    #[test]
    fn test_variable_stays_right() {
        let vars = BTreeSet::from(["var0".to_string()]);
        assert_eq!(
            order_query("SELECT * FROM A WHERE var0 = A.X ;", &vars),
            "SELECT * FROM A WHERE A.X = var0 ;"
        );
    }

    #[test]
    fn test_subquery_ordered_independently() {
        assert_eq!(
            order("SELECT T.B , T.A FROM T WHERE T.H = ( SELECT MAX( T.H ) FROM T ) ;"),
            "SELECT T.A , T.B FROM T WHERE T.H = ( SELECT MAX( T.H ) FROM T ) ;"
        );
    }

    #[test]
    fn test_order_by_untouched() {
        let sql = "SELECT T.A FROM T ORDER BY T.B DESC , T.A ;";
        assert_eq!(order(sql), sql);
    }

    #[test]
    fn test_permutations_agree() {
        let a = order("SELECT T.B , T.A FROM T WHERE T.Y = 2 AND T.X = 1 ;");
        let b = order("SELECT T.A , T.B FROM T WHERE T.X = 1 AND T.Y = 2 ;");
        assert_eq!(a, b);
    }
}
