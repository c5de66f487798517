//! Static database schema model.
//!
//! A [`Schema`] holds the tables of one database with their typed columns and
//! surface forms, per-table defaults, and the foreign-key link graph used to
//! synthesize joins. It is loaded once per run and only read afterwards.
//!
//! Schema files are JSON documents:
//!
//! ```text
//! {
//!   "types": ["TEXT", "NUMBER"],
//!   "ents": {"MOUNTAIN": {"HEIGHT": {"type": "NUMBER", "index": false, "utt": "height"}}},
//!   "defaults": {"MOUNTAIN": {"utt": "mountain", "col": "MOUNTAIN_ID"}},
//!   "links": {"CLIMBER": {"MOUNTAIN": "MOUNTAIN_ID"}, "MOUNTAIN": {"CLIMBER": "MOUNTAIN_ID"}}
//! }
//! ```
//!
//! Full-line `//` and `#` comments are allowed.

mod canonical;
mod links;

pub use canonical::CanonicalSchema;
pub use links::{JoinKind, LinkGraph};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Link references unknown table '{0}'")]
    UnknownLinkTable(String),

    #[error("Default column '{column}' is not a column of table '{table}'")]
    UnknownDefaultColumn { table: String, column: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Type tag, e.g. `TEXT` or `NUMBER`.
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(rename = "index", default)]
    pub indexed: bool,

    /// Natural-language rendering of the column.
    #[serde(rename = "utt", default)]
    pub surface: String,
}

impl ColumnInfo {
    pub fn new(type_tag: impl Into<String>, surface: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            indexed: false,
            surface: surface.into(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        is_numeric_type(&self.type_tag)
    }
}

/// Per-table defaults: the NL surface form and the column used by `{DEF}` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefaults {
    #[serde(rename = "utt", default)]
    pub surface: String,

    #[serde(rename = "col", default)]
    pub column: Option<String>,
}

/// Whether a type tag denotes a numeric column.
pub fn is_numeric_type(type_tag: &str) -> bool {
    matches!(
        type_tag.to_ascii_uppercase().as_str(),
        "NUMBER" | "INTEGER" | "INT" | "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC"
    )
}

/// Static view of one database.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: BTreeMap<String, BTreeMap<String, ColumnInfo>>,
    types: Vec<String>,
    defaults: BTreeMap<String, TableDefaults>,
    links: LinkGraph,
    type_index: BTreeMap<String, Vec<(String, String)>>,
}

// ============================================================================
// Loading
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeList {
    List(Vec<String>),
    Ordinals(BTreeMap<String, i64>),
}

impl TypeList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TypeList::List(types) => types,
            TypeList::Ordinals(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                entries.into_iter().map(|(t, _)| t).collect()
            }
        }
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    ents: BTreeMap<String, BTreeMap<String, ColumnInfo>>,
    #[serde(default)]
    types: Option<TypeList>,
    #[serde(default)]
    defaults: BTreeMap<String, TableDefaults>,
    #[serde(default)]
    links: BTreeMap<String, BTreeMap<String, String>>,
}

/// Drop full-line `//` and `#` comments.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !(trimmed.starts_with("//") || trimmed.starts_with('#'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_surface(name: &str) -> String {
    name.to_lowercase().replace('_', " ")
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema document.
    pub fn from_json_str(source: &str) -> SchemaResult<Self> {
        let doc: SchemaDocument = serde_json::from_str(&strip_comments(source))?;

        let mut schema = Schema::new();
        if let Some(types) = doc.types {
            schema.types = types.into_vec();
        }
        for (table, columns) in doc.ents {
            let defaults = doc.defaults.get(&table).cloned();
            let surface = defaults
                .as_ref()
                .map(|d| d.surface.clone())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default_surface(&table));
            let column = defaults.and_then(|d| d.column);
            schema = schema.with_table(&table, surface, column);
            for (name, mut info) in columns {
                if info.surface.is_empty() {
                    info.surface = default_surface(&name);
                }
                schema.insert_column(&table, &name, info);
            }
        }

        for (from, targets) in doc.links {
            if !schema.tables.contains_key(&from) {
                return Err(SchemaError::UnknownLinkTable(from));
            }
            for (to, column) in targets {
                if !schema.tables.contains_key(&to) {
                    return Err(SchemaError::UnknownLinkTable(to));
                }
                schema.links.add_link(&from, &to, &column);
            }
        }

        for (table, defaults) in &schema.defaults {
            if let Some(column) = &defaults.column {
                let known = schema
                    .tables
                    .get(table)
                    .is_some_and(|cols| cols.contains_key(column));
                if !known {
                    return Err(SchemaError::UnknownDefaultColumn {
                        table: table.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        Ok(schema)
    }

    /// Load a schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SchemaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SchemaError::FileNotFound(path.to_path_buf()));
        }
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Add a table with its NL surface form and optional default column.
    pub fn with_table(
        mut self,
        table: &str,
        surface: impl Into<String>,
        default_column: Option<String>,
    ) -> Self {
        self.tables.entry(table.to_string()).or_default();
        self.defaults.insert(
            table.to_string(),
            TableDefaults {
                surface: surface.into(),
                column: default_column,
            },
        );
        self.links.add_table(table);
        self
    }

    /// Add a column; the table is created with a derived surface form if missing.
    pub fn with_column(mut self, table: &str, column: &str, type_tag: &str, surface: &str) -> Self {
        if !self.tables.contains_key(table) {
            self = self.with_table(table, default_surface(table), None);
        }
        self.insert_column(table, column, ColumnInfo::new(type_tag, surface));
        self
    }

    /// Link two tables: `from_column` in `from` joins `to_column` in `to`.
    pub fn with_link(mut self, from: &str, to: &str, from_column: &str, to_column: &str) -> Self {
        self.links.add_link(from, to, from_column);
        self.links.add_link(to, from, to_column);
        self
    }

    fn insert_column(&mut self, table: &str, column: &str, info: ColumnInfo) {
        if !self.types.contains(&info.type_tag) {
            self.types.push(info.type_tag.clone());
        }
        self.type_index
            .entry(info.type_tag.clone())
            .or_default()
            .push((table.to_string(), column.to_string()));
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string(), info);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn tables(&self) -> &BTreeMap<String, BTreeMap<String, ColumnInfo>> {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn columns(&self, table: &str) -> Option<&BTreeMap<String, ColumnInfo>> {
        self.tables.get(table)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnInfo> {
        self.tables.get(table).and_then(|cols| cols.get(column))
    }

    /// Type tags in declaration order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Type tags, longest first, for placeholder substitution.
    pub fn types_by_length(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        types.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        types
    }

    pub fn defaults(&self, table: &str) -> Option<&TableDefaults> {
        self.defaults.get(table)
    }

    /// NL surface form of a table.
    pub fn table_surface(&self, table: &str) -> String {
        self.defaults
            .get(table)
            .map(|d| d.surface.clone())
            .unwrap_or_else(|| default_surface(table))
    }

    /// All `(table, column)` pairs of a type, in insertion order.
    pub fn columns_of_type(&self, type_tag: &str) -> &[(String, String)] {
        self.type_index
            .get(type_tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn links(&self) -> &LinkGraph {
        &self.links
    }

    /// Identifier view used by the canonicalizer.
    pub fn canonical(&self) -> CanonicalSchema {
        CanonicalSchema::from_schema(self)
    }
}

/// Join expression between two tables over a direct link, see [`LinkGraph::join_path`].
pub fn find_join_path(from: &str, to: &str, schema: &Schema, kind: JoinKind) -> Option<String> {
    schema.links().join_path(from, to, kind)
}

/// Qualified join column of `from` towards `to`, see [`LinkGraph::join_column`].
pub fn join_column(from: &str, to: &str, schema: &Schema) -> Option<String> {
    schema.links().join_column(from, to)
}
