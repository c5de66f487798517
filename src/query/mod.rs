//! NL/SQL template pairs under progressive instantiation.
//!
//! A [`Query`] owns the token streams of one template pair. Slots are filled
//! one at a time by [`Query::fill_slot`], each call producing the sibling
//! queries to recurse into. Before expansion, [`Query::create_join_placeholders`]
//! and [`Query::create_argmin_max`] derive structural variants; after the last
//! slot is filled, [`Query::resolve`] turns the marker functions
//! (`COUNT_COND`, `JOIN_COL`, `JOIN_FROM`, `JOIN_WHERE`, `argmax`, `argmin`)
//! into plain SQL.
//!
//! Branches are independent values: a sibling is a clone of its parent's
//! token streams and variables, while the schema and settings are borrowed
//! through a [`FillContext`].

mod dictionary;
mod error;
mod fill;
mod literals;
mod phrases;
mod resolve;
mod slot;
mod structure;

pub use dictionary::{DictionaryError, SlotDictionary};
pub use error::Rejection;
pub use fill::{FillContext, Resolution};
pub use literals::compares_non_numeric_literal;
pub use phrases::{PhraseError, PhraseTables, ARG_FUNCTIONS, FUNCTIONS, OPERATORS};
pub use slot::{first_slot, has_slot, SlotKind};

use std::collections::BTreeMap;

use crate::sql::{is_groupable, parens_balanced, replace_in_tokens, tokenize_nl, tokenize_sql};

/// One NL/SQL template pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub nl_tokens: Vec<String>,
    pub sql_tokens: Vec<String>,

    /// Expansion depth used for pruning. Only ever increases.
    pub layer: f64,

    /// Whether a GROUP BY variant may be derived from this query.
    pub groupable: bool,

    /// Table bound to the first filled `{ENT}` slot.
    pub main_entity: Option<String>,

    /// Token streams with literal values, set by literal substitution.
    pub nl_tokens_filled: Option<Vec<String>>,
    pub sql_tokens_filled: Option<Vec<String>>,

    /// Placeholder name to literal, e.g. `var1` → `Everest`.
    pub variables: BTreeMap<String, String>,
}

impl Query {
    pub fn new(nl: &str, sql: &str) -> Self {
        Self {
            nl_tokens: tokenize_nl(nl),
            sql_tokens: tokenize_sql(sql),
            layer: 1.0,
            groupable: is_groupable(sql),
            main_entity: None,
            nl_tokens_filled: None,
            sql_tokens_filled: None,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_layer(mut self, layer: f64) -> Self {
        self.layer = layer;
        self
    }

    /// NL text; underscores render as spaces.
    pub fn nl(&self) -> String {
        self.nl_tokens.join(" ").replace('_', " ")
    }

    pub fn sql(&self) -> String {
        self.sql_tokens.join(" ")
    }

    pub fn filled_nl(&self) -> Option<String> {
        self.nl_tokens_filled
            .as_ref()
            .map(|tokens| tokens.join(" ").replace('_', " "))
    }

    pub fn filled_sql(&self) -> Option<String> {
        self.sql_tokens_filled.as_ref().map(|tokens| tokens.join(" "))
    }

    /// Whether any slot remains in either token stream.
    pub fn has_slots(&self) -> bool {
        self.nl_tokens.iter().chain(&self.sql_tokens).any(|t| has_slot(t))
    }

    /// Checks a query must pass before post-processing.
    pub fn check_terminal(&self) -> Result<(), Rejection> {
        if self.has_slots() {
            return Err(Rejection::UnresolvedSlots(format!(
                "{} | {}",
                self.nl(),
                self.sql()
            )));
        }
        let (nl, sql) = (self.nl(), self.sql());
        if !parens_balanced(&nl) || !parens_balanced(&sql) {
            return Err(Rejection::MalformedTemplate(format!(
                "unbalanced parentheses in: {nl} | {sql}"
            )));
        }
        Ok(())
    }

    /// Whether `table` already occurs in the SQL, bare or as a qualifier.
    pub fn uses_table(&self, table: &str) -> bool {
        let qualified = format!("{table}.");
        self.sql_tokens
            .iter()
            .any(|t| t == table || t.starts_with(&qualified))
    }

    pub(crate) fn replace_nl(&mut self, needle: &str, substring: &str, standalone: &str) {
        replace_in_tokens(&mut self.nl_tokens, needle, substring, standalone);
    }

    pub(crate) fn replace_sql(&mut self, needle: &str, substring: &str, standalone: &str) {
        replace_in_tokens(&mut self.sql_tokens, needle, substring, standalone);
    }

    /// Replace `needle` by the same text in both streams.
    pub(crate) fn replace_both(&mut self, needle: &str, value: &str) {
        self.replace_nl(needle, value, value);
        self.replace_sql(needle, value, value);
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql())
    }
}
