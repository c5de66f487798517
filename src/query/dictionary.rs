//! Slot-filling dictionary.
//!
//! One mapping per line, `key => value | value | …`. Blank lines and lines
//! starting with `#` are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dictionary line {line}, no '=>' in: {text}")]
    Malformed { line: usize, text: String },
}

/// Candidate NL values per slot, e.g. `{withToken}` → `["with", "having"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl SlotDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Result<Self, DictionaryError> {
        let mut entries = BTreeMap::new();
        for (idx, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, values)) = line.split_once("=>") else {
                return Err(DictionaryError::Malformed {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            let values: Vec<String> = values
                .split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            entries.insert(key.trim().to_string(), values);
        }
        Ok(Self { entries })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn with_entry<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(key.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
