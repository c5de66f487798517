//! SQL canonicalization.
//!
//! Maps a SQL string to a normal form under which queries that differ only
//! in spacing, quoting, case, aliases, or the order of SELECT items, FROM
//! items and homogeneous WHERE predicates compare equal.
//!
//! Five passes run in a fixed order; any of them can be skipped:
//!
//! ```text
//! Semicolon ─▶ Whitespace ─▶ Case ─▶ Aliases ─▶ Order
//! ```
//!
//! # Example
//!
//! ```
//! use sqlsynth::canonical::canonicalize;
//! use sqlsynth::schema::CanonicalSchema;
//! use std::collections::BTreeMap;
//!
//! let schema = CanonicalSchema::new().with_table("T", ["A", "B"]);
//! let a = canonicalize("select b, a from t", &schema, &BTreeMap::new());
//! let b = canonicalize("SELECT a ,b FROM t;", &schema, &BTreeMap::new());
//! assert_eq!(a, b);
//! ```

mod alias;
mod case;
mod chunk;
mod keywords;
mod order;
mod quote;
mod whitespace;

pub use alias::standardize_aliases;
pub use case::{uppercase_outside_quotes, VALUE_PLACEHOLDER};
pub use keywords::{is_reserved, SET_OPERATORS};
pub use order::order_query;
pub use quote::QuoteState;
pub use whitespace::{add_semicolon, standardize_whitespace};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::schema::CanonicalSchema;

/// One canonicalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Semicolon,
    Whitespace,
    Case,
    Aliases,
    Order,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Semicolon,
        Pass::Whitespace,
        Pass::Case,
        Pass::Aliases,
        Pass::Order,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pass::Semicolon => "semicolon",
            Pass::Whitespace => "whitespace",
            Pass::Case => "case",
            Pass::Aliases => "aliases",
            Pass::Order => "order",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pass::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown pass '{}', expected one of: {}",
                    s,
                    Pass::ALL.map(|p| p.name()).join(", ")
                )
            })
    }
}

/// Configurable canonicalizer bound to one schema.
#[derive(Debug, Clone)]
pub struct Canonicalizer<'a> {
    schema: &'a CanonicalSchema,
    skipped: BTreeSet<Pass>,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(schema: &'a CanonicalSchema) -> Self {
        Self {
            schema,
            skipped: BTreeSet::new(),
        }
    }

    /// Disable a pass.
    pub fn skip(mut self, pass: Pass) -> Self {
        self.skipped.insert(pass);
        self
    }

    pub fn is_enabled(&self, pass: Pass) -> bool {
        !self.skipped.contains(&pass)
    }

    /// Canonicalize `sql`. The keys of `variables` are placeholder names that
    /// keep their case and count as literals when orienting comparisons.
    pub fn canonicalize(&self, sql: &str, variables: &BTreeMap<String, String>) -> String {
        let names: BTreeSet<String> = variables.keys().cloned().collect();
        let mut sql = sql.to_string();

        for pass in Pass::ALL {
            if !self.is_enabled(pass) {
                continue;
            }
            sql = match pass {
                Pass::Semicolon => add_semicolon(&sql),
                Pass::Whitespace => standardize_whitespace(&sql),
                Pass::Case => uppercase_outside_quotes(&sql, &names),
                Pass::Aliases => standardize_aliases(&sql, self.schema),
                Pass::Order => order_query(&sql, &names),
            };
        }
        sql
    }
}

/// Run every pass over `sql`.
pub fn canonicalize(
    sql: &str,
    schema: &CanonicalSchema,
    variables: &BTreeMap<String, String>,
) -> String {
    Canonicalizer::new(schema).canonicalize(sql, variables)
}
