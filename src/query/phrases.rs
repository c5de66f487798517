//! Fixed NL phrasings of operators, functions and adjectives.
//!
//! The tables are plain configuration handed to the expansion engine. The
//! adjective table can be replaced from a JSON file mapping a slot to its
//! candidate words, e.g. `{"{greatToken}": ["greatest", "largest"]}`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Comparison operators a `{COMP}` slot can take.
pub const OPERATORS: [&str; 6] = ["=", "!=", "<", ">", "<=", ">="];

/// Aggregate functions for `{FUNC}`, `{funcCommand}` and `{funcParticiple}`.
pub const FUNCTIONS: [&str; 4] = ["max", "min", "avg", "sum"];

/// Template functions for `{ARG}` slots.
pub const ARG_FUNCTIONS: [&str; 2] = ["argmax", "argmin"];

/// Adjective slots sampled `adjective_scale` times instead of once.
pub const SCALED_ADJECTIVES: [&str; 2] = ["{greatToken}", "{smallToken}"];

#[derive(Debug, thiserror::Error)]
pub enum PhraseError {
    #[error("Failed to read adjective file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse adjective file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
struct AdjectiveFile(BTreeMap<String, Vec<String>>);

/// NL phrase tables used while filling slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTables {
    comparisons: BTreeMap<String, String>,
    functions: BTreeMap<String, String>,
    commands: BTreeMap<String, String>,
    participles: BTreeMap<String, String>,
    arguments: BTreeMap<String, String>,
    adjectives: BTreeMap<String, Vec<String>>,
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn word_lists(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(k, words)| (k.to_string(), words.iter().map(|w| w.to_string()).collect()))
        .collect()
}

impl Default for PhraseTables {
    fn default() -> Self {
        Self {
            comparisons: table(&[
                ("=", "{logicToken.equalToken}"),
                ("!=", "{logicToken.notEqualToken}"),
                (">", "{logicToken.strictlyGreaterToken}"),
                ("<", "{logicToken.strictlySmallerToken}"),
                (">=", "{logicToken.greaterToken}"),
                ("<=", "{logicToken.smallerToken}"),
            ]),
            functions: table(&[
                ("max", "{functionToken.maxToken}"),
                ("min", "{functionToken.minToken}"),
                ("avg", "{functionToken.avgToken}"),
                ("sum", "{functionToken.sumToken}"),
            ]),
            commands: table(&[
                ("max", "maximize"),
                ("min", "minimize"),
                ("avg", "average"),
                ("sum", "summate"),
            ]),
            participles: table(&[
                ("max", "maximizing"),
                ("min", "minimizing"),
                ("avg", "averaging"),
                ("sum", "summating"),
            ]),
            arguments: table(&[
                ("argmax", "{functionToken.maxToken}"),
                ("argmin", "{functionToken.minToken}"),
            ]),
            adjectives: word_lists(&[
                (
                    "{greatToken}",
                    &["greatest", "largest", "biggest", "highest", "most"][..],
                ),
                (
                    "{smallToken}",
                    &["smallest", "lowest", "least", "fewest", "minimal"][..],
                ),
                (
                    "{greaterToken}",
                    &["greater", "larger", "bigger", "higher", "more"][..],
                ),
                (
                    "{smallerToken}",
                    &["smaller", "lower", "less", "fewer"][..],
                ),
            ]),
        }
    }
}

impl PhraseTables {
    /// Replace the adjective table with the contents of a JSON file.
    pub fn with_adjectives_from_file<P: AsRef<Path>>(self, path: P) -> Result<Self, PhraseError> {
        let source = fs::read_to_string(path)?;
        let AdjectiveFile(adjectives) = serde_json::from_str(&source)?;
        Ok(self.with_adjectives(adjectives))
    }

    pub fn with_adjectives(mut self, adjectives: BTreeMap<String, Vec<String>>) -> Self {
        self.adjectives = adjectives;
        self
    }

    pub fn comparison<'a>(&'a self, operator: &'a str) -> &'a str {
        lookup(&self.comparisons, operator)
    }

    pub fn function<'a>(&'a self, function: &'a str) -> &'a str {
        lookup(&self.functions, function)
    }

    pub fn command<'a>(&'a self, function: &'a str) -> &'a str {
        lookup(&self.commands, function)
    }

    pub fn participle<'a>(&'a self, function: &'a str) -> &'a str {
        lookup(&self.participles, function)
    }

    pub fn argument<'a>(&'a self, function: &'a str) -> &'a str {
        lookup(&self.arguments, function)
    }

    /// Candidate words for an adjective slot such as `{greatToken}`.
    pub fn adjectives(&self, slot: &str) -> Option<&[String]> {
        self.adjectives.get(slot).map(Vec::as_slice)
    }

    pub fn is_adjective(&self, slot: &str) -> bool {
        self.adjectives.contains_key(slot)
    }
}

/// Unknown keys render as themselves.
fn lookup<'a>(table: &'a BTreeMap<String, String>, key: &'a str) -> &'a str {
    table.get(key).map(String::as_str).unwrap_or(key)
}
