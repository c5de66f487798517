// tests/query/resolve_test.rs
#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sqlsynth::config::GenerationSettings;
    use sqlsynth::query::{has_slot, FillContext, PhraseTables, Query, Rejection, Resolution, SlotDictionary};
    use sqlsynth::schema::Schema;

    fn schema() -> Schema {
        Schema::new()
            .with_table("MOUNTAIN", "mountain", None)
            .with_column("MOUNTAIN", "RANGE_ID", "NUMBER", "range id")
            .with_column("MOUNTAIN", "HEIGHT", "NUMBER", "height")
            .with_table("RANGE", "range", None)
            .with_column("RANGE", "ID", "NUMBER", "id")
            .with_column("RANGE", "NAME", "TEXT", "name")
            .with_table("LAKE", "lake", None)
            .with_column("LAKE", "AREA", "NUMBER", "area")
            .with_link("MOUNTAIN", "RANGE", "RANGE_ID", "ID")
    }

    /// Fill every slot exhaustively, leftmost fillable slot first.
    fn fill_all(query: Query, ctx: &FillContext<'_>, rng: &mut StdRng) -> Vec<Query> {
        let tokens: Vec<String> = query.nl_tokens.iter().filter(|t| has_slot(t)).cloned().collect();
        if tokens.is_empty() {
            return vec![query];
        }
        let mut query = query;
        for token in tokens {
            match query.fill_slot(&token, ctx, rng) {
                Ok(Resolution::Expanded(children)) => {
                    return children.into_iter().flat_map(|c| fill_all(c, ctx, rng)).collect();
                }
                Ok(Resolution::Deferred(unchanged)) => query = unchanged,
                Err(_) => return Vec::new(),
            }
        }
        Vec::new()
    }

    #[test]
    fn test_join_variant_end_to_end() {
        let schema = schema();
        let settings = GenerationSettings {
            no_filter: true,
            ..GenerationSettings::default()
        };
        let dictionary = SlotDictionary::new();
        let phrases = PhraseTables::default();
        let ctx = FillContext {
            schema: &schema,
            settings: &settings,
            dictionary: &dictionary,
            phrases: &phrases,
        };
        let mut rng = StdRng::seed_from_u64(5);

        let mut query = Query::new("{ENTa}.{COL1} of {ENTb}", "SELECT {ENTa}.{COL1} FROM {ENT1}");
        let variants = query.create_join_placeholders(&settings, 3);
        let filled: Vec<Query> = variants
            .into_iter()
            .flat_map(|v| fill_all(v, &ctx, &mut rng))
            .collect();
        assert!(!filled.is_empty());

        let mut resolved = Vec::new();
        let mut unlinked = 0;
        for mut q in filled {
            match q.resolve(&schema) {
                Ok(()) => resolved.push(q.sql()),
                Err(Rejection::NoJoinPath { .. }) => unlinked += 1,
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }

        assert!(resolved.contains(
            &"SELECT MOUNTAIN.HEIGHT FROM MOUNTAIN JOIN RANGE WHERE MOUNTAIN.RANGE_ID = RANGE.ID"
                .to_string()
        ));
        assert!(resolved.contains(
            &"SELECT RANGE.NAME FROM RANGE JOIN MOUNTAIN WHERE RANGE.ID = MOUNTAIN.RANGE_ID"
                .to_string()
        ));
        assert!(resolved.iter().all(|sql| !sql.contains("LAKE")));
        assert!(unlinked > 0);
    }

    #[test]
    fn test_join_where_before_condition() {
        let mut query = Query::new(
            "x",
            "SELECT * FROM JOIN_FROM ( RANGE $ MOUNTAIN ) WHERE JOIN_WHERE ( RANGE $ MOUNTAIN ) AND MOUNTAIN.HEIGHT > 3000",
        );
        query.resolve(&schema()).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT * FROM RANGE JOIN MOUNTAIN WHERE RANGE.ID = MOUNTAIN.RANGE_ID AND MOUNTAIN.HEIGHT > 3000"
        );
    }

    #[test]
    fn test_self_join_drops_trailing_and() {
        let mut query = Query::new(
            "x",
            "SELECT * FROM JOIN_FROM ( LAKE $ LAKE ) WHERE LAKE.AREA > 3 AND JOIN_WHERE ( LAKE $ LAKE )",
        );
        query.resolve(&schema()).unwrap();
        assert_eq!(query.sql(), "SELECT * FROM LAKE WHERE LAKE.AREA > 3");
    }

    #[test]
    fn test_join_col_unlinked() {
        let mut query = Query::new("x", "SELECT JOIN_COL ( LAKE $ RANGE ) FROM LAKE");
        assert_eq!(
            query.resolve(&schema()).unwrap_err(),
            Rejection::NoJoinPath {
                from: "LAKE".to_string(),
                to: "RANGE".to_string()
            }
        );
    }

    #[test]
    fn test_count_cond_without_condition() {
        let mut query = Query::new(
            "x",
            "SELECT RANGE.NAME FROM RANGE WHERE COUNT_COND ( MOUNTAIN $ RANGE $ )",
        );
        query.resolve(&schema()).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT RANGE.NAME FROM RANGE WHERE RANGE.ID = ( SELECT MOUNTAIN.RANGE_ID FROM MOUNTAIN GROUP BY MOUNTAIN.RANGE_ID ORDER BY count ( * ) desc limit 1 )"
        );
    }

    #[test]
    fn test_argmin_with_condition() {
        let mut query = Query::new(
            "x",
            "SELECT MOUNTAIN.HEIGHT FROM MOUNTAIN WHERE argmin ( MOUNTAIN.HEIGHT $ MOUNTAIN $ MOUNTAIN.RANGE_ID = 2 )",
        );
        query.resolve(&schema()).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT MOUNTAIN.HEIGHT FROM MOUNTAIN WHERE MOUNTAIN.HEIGHT = (SELECT MIN(MOUNTAIN.HEIGHT) FROM MOUNTAIN WHERE MOUNTAIN.RANGE_ID = 2) AND MOUNTAIN.RANGE_ID = 2"
        );
    }

    #[test]
    fn test_argmax_missing_arguments() {
        let mut query = Query::new("x", "SELECT * FROM LAKE WHERE argmax ( LAKE.AREA )");
        assert!(matches!(
            query.resolve(&schema()),
            Err(Rejection::ArgumentCount(_))
        ));
    }
}
