//! Structured SQL labels.
//!
//! The label of an emitted query is the sqlparser AST of its statement,
//! serialized to JSON. A query that does not parse has no label and is
//! not emitted.

use serde_json::Value;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::{SqlError, SqlResult};

/// Parse `sql` (a single statement) and serialize its AST.
pub fn sql_label(sql: &str) -> SqlResult<Value> {
    let mut statements = Parser::parse_sql(&GenericDialect {}, sql)?;
    if statements.len() != 1 {
        return Err(SqlError::StatementCount(statements.len()));
    }
    Ok(serde_json::to_value(statements.remove(0))?)
}
