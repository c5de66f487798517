//! SQLite-backed literal pools and validation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{lookup, DatabaseError, DatabaseResult, LiteralPools, LiteralSource, QueryValidator};
use crate::schema::Schema;

/// A SQLite database with the literal pools of every schema column.
pub struct SqliteDatabase {
    conn: Connection,
    literals: LiteralPools,
}

impl SqliteDatabase {
    /// Open the single `.sqlite` file inside `dir`.
    pub fn open_dir<P: AsRef<Path>>(dir: P, schema: &Schema) -> DatabaseResult<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "sqlite") {
                files.push(path);
            }
        }
        match files.as_slice() {
            [] => Err(DatabaseError::NotFound(dir.to_path_buf())),
            [file] => Self::open(file, schema),
            _ => Err(DatabaseError::Ambiguous(dir.to_path_buf())),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P, schema: &Schema) -> DatabaseResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "connected to database");
        Self::from_connection(conn, schema)
    }

    /// Wrap an open connection and load the literal pools.
    ///
    /// Schema columns missing from the database get an empty pool.
    pub fn from_connection(conn: Connection, schema: &Schema) -> DatabaseResult<Self> {
        let mut db = Self {
            conn,
            literals: LiteralPools::new(),
        };
        for (table, columns) in schema.tables() {
            for column in columns.keys() {
                let values = match db.column_values(table, column) {
                    Ok(values) => values,
                    Err(e) => {
                        tracing::warn!(table, column, error = %e, "column not readable, literal pool left empty");
                        Vec::new()
                    }
                };
                db.literals.insert((table.clone(), column.clone()), values);
            }
        }
        if db.literals.values().all(Vec::is_empty) {
            tracing::warn!("no literal values found in database");
        }
        Ok(db)
    }

    /// Distinct non-null values of a column, rendered as text.
    fn column_values(&self, table: &str, column: &str) -> DatabaseResult<Vec<String>> {
        let sql = format!("SELECT \"{column}\" FROM \"{table}\"");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut values = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let text = match row.get_ref(0)? {
                ValueRef::Null => continue,
                ValueRef::Integer(i) => i.to_string(),
                ValueRef::Real(f) => f.to_string(),
                ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
            };
            values.insert(text);
        }
        Ok(values.into_iter().collect())
    }
}

impl LiteralSource for SqliteDatabase {
    fn literals(&self, table: &str, column: &str) -> Option<&[String]> {
        lookup(&self.literals, table, column)
    }
}

impl QueryValidator for SqliteDatabase {
    fn validate(&self, sql: &str) -> DatabaseResult<()> {
        tracing::debug!(sql, "executing query");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DatabaseError::Invalid(e.to_string()))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| DatabaseError::Invalid(e.to_string()))?;
        rows.next()
            .map_err(|e| DatabaseError::Invalid(e.to_string()))?;
        Ok(())
    }
}
