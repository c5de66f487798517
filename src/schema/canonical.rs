//! Uppercased identifier view of a schema for the canonicalizer.

use std::collections::{BTreeMap, BTreeSet};

use super::Schema;

/// Table → field sets and the set of every table and field word, all uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalSchema {
    tables: BTreeMap<String, BTreeSet<String>>,
    words: BTreeSet<String>,
}

impl CanonicalSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_schema(schema: &Schema) -> Self {
        let mut canonical = Self::new();
        for (table, columns) in schema.tables() {
            canonical = canonical.with_table(table, columns.keys().map(String::as_str));
        }
        canonical
    }

    /// Add a table and its fields.
    pub fn with_table<'a>(mut self, table: &str, fields: impl IntoIterator<Item = &'a str>) -> Self {
        let table = table.to_uppercase();
        self.words.insert(table.clone());
        let entry = self.tables.entry(table).or_default();
        for field in fields {
            let field = field.to_uppercase();
            self.words.insert(field.clone());
            entry.insert(field);
        }
        self
    }

    pub fn is_table(&self, word: &str) -> bool {
        self.tables.contains_key(word)
    }

    pub fn is_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Tables in name order with their fields.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.tables.iter().map(|(t, f)| (t.as_str(), f))
    }

    pub fn has_field(&self, table: &str, field: &str) -> bool {
        self.tables.get(table).is_some_and(|f| f.contains(field))
    }
}
