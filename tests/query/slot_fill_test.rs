// tests/query/slot_fill_test.rs
#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sqlsynth::config::GenerationSettings;
    use sqlsynth::query::{FillContext, PhraseTables, Query, Rejection, Resolution, SlotDictionary};
    use sqlsynth::schema::Schema;

    fn schema() -> Schema {
        Schema::new()
            .with_table("MOUNTAIN", "mountain", Some("MOUNTAIN_ID".to_string()))
            .with_column("MOUNTAIN", "MOUNTAIN_ID", "NUMBER", "mountain id")
            .with_column("MOUNTAIN", "HEIGHT", "NUMBER", "height")
            .with_column("MOUNTAIN", "NAME", "TEXT", "name")
            .with_table("CLIMBER", "climber", None)
            .with_column("CLIMBER", "NAME", "TEXT", "climber name")
    }

    fn unfiltered() -> GenerationSettings {
        GenerationSettings {
            no_filter: true,
            ..GenerationSettings::default()
        }
    }

    fn fill(
        query: Query,
        token: &str,
        settings: &GenerationSettings,
        dictionary: &SlotDictionary,
    ) -> Result<Resolution, Rejection> {
        let schema = schema();
        let phrases = PhraseTables::default();
        let ctx = FillContext {
            schema: &schema,
            settings,
            dictionary,
            phrases: &phrases,
        };
        let mut rng = StdRng::seed_from_u64(42);
        query.fill_slot(token, &ctx, &mut rng)
    }

    fn expanded(resolution: Result<Resolution, Rejection>) -> Vec<Query> {
        match resolution.unwrap() {
            Resolution::Expanded(queries) => queries,
            Resolution::Deferred(query) => panic!("unexpected deferral: {query:?}"),
        }
    }

    #[test]
    fn test_entity_skips_tables_in_use() {
        let query = Query::new("{ENT1} near MOUNTAIN", "SELECT * FROM {ENT1} , MOUNTAIN");
        let out = expanded(fill(query, "{ENT1}", &unfiltered(), &SlotDictionary::new()));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].nl(), "climber near MOUNTAIN");
        assert_eq!(out[0].sql(), "SELECT * FROM CLIMBER , MOUNTAIN");
    }

    #[test]
    fn test_column_of_unknown_table() {
        let query = Query::new("LAKE.{COL1}", "SELECT LAKE.{COL1} FROM LAKE");
        let err = fill(query, "LAKE.{COL1}", &unfiltered(), &SlotDictionary::new()).unwrap_err();
        assert_eq!(err, Rejection::UnknownTable("LAKE".to_string()));
    }

    #[test]
    fn test_every_column_without_pruning() {
        let query = Query::new("MOUNTAIN.{COL1}", "SELECT MOUNTAIN.{COL1} FROM MOUNTAIN");
        let out = expanded(fill(query, "MOUNTAIN.{COL1}", &unfiltered(), &SlotDictionary::new()));
        let mut sql: Vec<String> = out.iter().map(Query::sql).collect();
        sql.sort();

        assert_eq!(
            sql,
            vec![
                "SELECT MOUNTAIN.HEIGHT FROM MOUNTAIN",
                "SELECT MOUNTAIN.MOUNTAIN_ID FROM MOUNTAIN",
                "SELECT MOUNTAIN.NAME FROM MOUNTAIN",
            ]
        );
    }

    #[test]
    fn test_function_slot() {
        let query = Query::new("{FUNC1} MOUNTAIN.HEIGHT", "SELECT {FUNC1} ( MOUNTAIN.HEIGHT ) FROM MOUNTAIN");
        let settings = unfiltered();
        let out = expanded(fill(query, "{FUNC1}", &settings, &SlotDictionary::new()));

        assert_eq!(out.len(), 4);
        let max = out
            .iter()
            .find(|q| q.sql().starts_with("SELECT max"))
            .unwrap();
        assert_eq!(max.nl(), "{functionToken.maxToken} MOUNTAIN.HEIGHT");
        assert_eq!(max.layer, 1.0 + settings.func_boost);
    }

    #[test]
    fn test_function_command_slot() {
        let query = Query::new("{funcCommand1} it", "SELECT {funcCommand1} ( x ) FROM t");
        let out = expanded(fill(query, "{funcCommand1}", &unfiltered(), &SlotDictionary::new()));
        let nl: Vec<String> = out.iter().map(Query::nl).collect();
        assert!(nl.contains(&"summate it".to_string()));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_argument_slot() {
        let query = Query::new("the {ARG1} one", "SELECT x FROM t WHERE {ARG1} ( x $ t $ )");
        let mut out = expanded(fill(query, "{ARG1}", &unfiltered(), &SlotDictionary::new()));
        out.sort_by_key(|q| q.sql());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].sql(), "SELECT x FROM t WHERE argmax ( x $ t $ )");
        assert_eq!(out[0].nl(), "the {functionToken.maxToken} one");
        assert_eq!(out[1].sql(), "SELECT x FROM t WHERE argmin ( x $ t $ )");
    }

    #[test]
    fn test_scaled_adjective_sampled() {
        let query = Query::new("the {greatToken} peak", "SELECT x FROM t");
        let settings = unfiltered();
        let out = expanded(fill(query, "{greatToken}", &settings, &SlotDictionary::new()));

        assert_eq!(out.len(), settings.adjective_scale as usize);
        let words = PhraseTables::default();
        let allowed = words.adjectives("{greatToken}").unwrap();
        for q in &out {
            let word = q.nl_tokens[1].clone();
            assert!(allowed.contains(&word), "{word}");
            assert_eq!(q.sql(), "SELECT x FROM t");
        }
    }

    #[test]
    fn test_plain_adjective_single_word() {
        let query = Query::new("{greaterToken} than", "SELECT x FROM t");
        let out = expanded(fill(query, "{greaterToken}", &unfiltered(), &SlotDictionary::new()));
        assert_eq!(out.len(), 1);
        assert!(!out[0].has_slots());
    }

    #[test]
    fn test_and_or() {
        let always_or = GenerationSettings {
            or_p: 1.0,
            ..unfiltered()
        };
        let query = Query::new("a {andOrToken1} b", "WHERE a {andOrToken1} b");
        let mut out = expanded(fill(query.clone(), "{andOrToken1}", &always_or, &SlotDictionary::new()));
        out.sort_by_key(|q| q.sql());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].sql(), "WHERE a AND b");
        assert_eq!(out[1].nl(), "a or b");

        let never_or = GenerationSettings {
            or_p: 0.0,
            ..unfiltered()
        };
        let out = expanded(fill(query, "{andOrToken1}", &never_or, &SlotDictionary::new()));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sql(), "WHERE a AND b");
    }

    #[test]
    fn test_dictionary_takes_precedence_over_adjectives() {
        let dictionary = SlotDictionary::new().with_entry("{greatToken}", ["greatest"]);
        let query = Query::new("find {greatToken} MOUNTAIN.HEIGHT", "SELECT MOUNTAIN.HEIGHT FROM MOUNTAIN");
        let out = expanded(fill(query, "{greatToken}", &unfiltered(), &dictionary));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].nl(), "find greatest MOUNTAIN.HEIGHT");
    }

    #[test]
    fn test_dictionary_from_text() {
        let dictionary = SlotDictionary::parse(
            "# finders\n{findToken} => find | list | show\n{withToken} => with\n",
        )
        .unwrap();
        assert_eq!(dictionary.len(), 2);

        let query = Query::new("{findToken} all", "SELECT * FROM t");
        let out = expanded(fill(query, "{findToken}", &unfiltered(), &dictionary));
        let mut nl: Vec<String> = out.iter().map(Query::nl).collect();
        nl.sort();
        assert_eq!(nl, vec!["find all", "list all", "show all"]);
    }

    #[test]
    fn test_literal_placeholder_with_fill_literals() {
        let settings = GenerationSettings {
            fill_literals: true,
            ..unfiltered()
        };
        let query = Query::new(
            "named MOUNTAIN.NAME.{LITERAL1}",
            "SELECT * FROM MOUNTAIN WHERE MOUNTAIN.NAME = MOUNTAIN.NAME.{LITERAL1}",
        );
        let out = expanded(fill(query, "MOUNTAIN.NAME.{LITERAL1}", &settings, &SlotDictionary::new()));
        assert_eq!(
            out[0].sql(),
            "SELECT * FROM MOUNTAIN WHERE MOUNTAIN.NAME = MOUNTAIN.NAME.TEXT@1"
        );
        assert_eq!(out[0].nl(), "named MOUNTAIN.NAME.TEXT@1");
    }
}
