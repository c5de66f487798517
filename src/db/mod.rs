//! Database collaborators: literal pools and query validation.
//!
//! [`SqliteDatabase`] backs both with a SQLite file; [`InMemoryDatabase`]
//! holds fixed pools and accepts every query.

mod sqlite;

pub use sqlite::SqliteDatabase;

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Errors from opening or querying a database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No .sqlite file in {0}")]
    NotFound(PathBuf),

    #[error("Multiple .sqlite files in {0}")]
    Ambiguous(PathBuf),

    #[error("Query rejected: {0}")]
    Invalid(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Values observed per `(table, column)`.
pub trait LiteralSource {
    fn literals(&self, table: &str, column: &str) -> Option<&[String]>;
}

/// Executes candidate SQL to check that it runs.
pub trait QueryValidator {
    fn validate(&self, sql: &str) -> DatabaseResult<()>;
}

pub trait Database: LiteralSource + QueryValidator {}

impl<T: LiteralSource + QueryValidator> Database for T {}

type LiteralPools = BTreeMap<(String, String), Vec<String>>;

/// Fixed literal pools; every query validates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    literals: LiteralPools,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_literals<I, S>(mut self, table: &str, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.literals.insert(
            (table.to_string(), column.to_string()),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl LiteralSource for InMemoryDatabase {
    fn literals(&self, table: &str, column: &str) -> Option<&[String]> {
        lookup(&self.literals, table, column)
    }
}

impl QueryValidator for InMemoryDatabase {
    fn validate(&self, _sql: &str) -> DatabaseResult<()> {
        Ok(())
    }
}

/// Non-empty pool for a column.
fn lookup<'a>(pools: &'a LiteralPools, table: &str, column: &str) -> Option<&'a [String]> {
    pools
        .get(&(table.to_string(), column.to_string()))
        .map(Vec::as_slice)
        .filter(|pool| !pool.is_empty())
}
