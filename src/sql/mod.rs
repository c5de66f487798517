//! SQL template utilities.
//!
//! - [`token`] - NL/SQL tokenizers and token-level replacement
//! - [`argmax`] - expansion of `argmax`/`argmin` template functions
//! - [`label`] - structured labels via sqlparser

pub mod argmax;
pub mod label;
pub mod token;

pub use argmax::resolve_arg_min_max;
pub use label::sql_label;
pub use token::{
    is_groupable, join_tokens, parens_balanced, replace_in_tokens, tokenize_nl, tokenize_sql,
    MAIN_ENT, SEP,
};

/// Errors from SQL template rewriting and labeling.
#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    #[error("expected at least {expected} arguments, found {found} in: {sql}")]
    ArgumentCount {
        expected: usize,
        found: usize,
        sql: String,
    },

    #[error("unclosed argmin/argmax call in: {0}")]
    UnclosedCall(String),

    #[error("SQL parse error: {0}")]
    Parse(#[from] sqlparser::parser::ParserError),

    #[error("expected exactly one statement, found {0}")]
    StatementCount(usize),

    #[error("label serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SqlResult<T> = Result<T, SqlError>;
