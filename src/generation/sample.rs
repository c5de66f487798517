//! Emitted samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `(NL, SQL)` training pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sample {
    pub nl: String,
    pub sql: String,
}

impl Sample {
    pub fn new(nl: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            nl: nl.into(),
            sql: sql.into(),
        }
    }
}

/// Spider-style JSON record of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub db_id: String,
    pub query: String,
    pub query_no_value: String,
    pub query_toks: Vec<String>,
    pub query_toks_no_value: Vec<String>,
    pub question: String,
    pub question_toks: Vec<String>,
    /// Serialized statement AST.
    pub sql: serde_json::Value,
    pub variables: BTreeMap<String, String>,
}
