// tests/query/structure_test.rs
#[cfg(test)]
mod tests {
    use sqlsynth::config::GenerationSettings;
    use sqlsynth::query::Query;

    #[test]
    fn test_three_letter_slots() {
        let settings = GenerationSettings::default();
        let mut query = Query::new("{ENTa} {ENTb} {ENTc}", "SELECT * FROM {ENT1}");
        let variants = query.create_join_placeholders(&settings, 3);

        assert_eq!(variants.len(), 6);
        for variant in &variants {
            assert!(variant.sql().contains("JOIN_FROM ( {ENT1} $ {ENT2} )"), "{}", variant.sql());
            assert!(variant.sql().contains("WHERE JOIN_WHERE ( {ENT1} $ {ENT2} )"));
            assert_eq!(variant.layer, 1.0 + settings.join_boost + 3.0);
            assert!(variant.nl().contains("{ENT1}") && variant.nl().contains("{ENT2}"));
        }
        assert_eq!(query.nl(), "{ENT1} {ENT1} {ENT1}");
    }

    #[test]
    fn test_repeated_letter_counts_once() {
        let settings = GenerationSettings::default();
        let mut query = Query::new("{ENTa} and {ENTa} with {ENTb}", "SELECT * FROM {ENT1}");
        let variants = query.create_join_placeholders(&settings, 2);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].nl(), "{ENT1} and {ENT1} with {ENT2}");
    }

    #[test]
    fn test_without_letter_slots() {
        let settings = GenerationSettings::default();
        let mut query = Query::new("all {ENT1}", "SELECT * FROM {ENT1}");
        let before = query.clone();
        assert!(query.create_join_placeholders(&settings, 5).is_empty());
        assert_eq!(query, before);
    }

    #[test]
    fn test_argmax_variant_first() {
        let settings = GenerationSettings::default();
        let query = Query::new("list {ENT1}.{FROM}", "SELECT {ENT1}.{COL1} FROM {ENT1}.{FROM}");
        let out = query.create_argmin_max(&settings);

        assert_eq!(out.len(), 2);
        assert!(out[0].sql().contains("{ARG1} ("));
        assert!(out[0].nl().contains("{withToken} the {ARG1}"));
        assert_eq!(out[1].sql(), "SELECT {ENT1}.{COL1} FROM {ENT1}");
        assert!(out[0].layer > out[1].layer);
    }

    #[test]
    fn test_variants_inherit_groupability() {
        let settings = GenerationSettings::default();
        let mut query = Query::new("count {ENTa} per {ENTb}", "SELECT count ( * ) FROM {ENT1}");
        assert!(query.groupable);
        let variants = query.create_join_placeholders(&settings, 2);
        assert!(variants.iter().all(|v| v.groupable));
    }
}
