//! Textual expansion of `argmax`/`argmin` template functions.
//!
//! `argmax ( col $ table $ cond )` selects the rows whose `col` equals the
//! maximum of `col` over `table` restricted by `cond`:
//!
//! ```text
//! col = (SELECT MAX(col) FROM table WHERE cond) AND cond
//! ```

use regex::Regex;
use std::sync::LazyLock;

use super::token::SEP;
use super::{SqlError, SqlResult};

static ARG_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"argmin \(|argmax \(").unwrap());

/// Expand every `argmin`/`argmax` call in `sql`, innermost conditions first.
pub fn resolve_arg_min_max(sql: &str) -> SqlResult<String> {
    let mut sql = sql.replace("argmax(", "argmax (").replace("argmin(", "argmin (");

    while let Some(call) = ARG_CALL.find(&sql) {
        let aggregate = if call.as_str().contains("min") { "MIN" } else { "MAX" };

        let mut depth = 1usize;
        let mut close = None;
        for (offset, ch) in sql[call.end()..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(call.end() + offset);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| SqlError::UnclosedCall(sql.clone()))?;

        let args: Vec<&str> = sql[call.end()..close].split(SEP).collect();
        if args.len() < 3 {
            return Err(SqlError::ArgumentCount {
                expected: 3,
                found: args.len(),
                sql: sql.clone(),
            });
        }
        let column = args[0].trim();
        let table = args[1].trim();
        let condition = if args.len() == 3 {
            args[2].trim().to_string()
        } else {
            resolve_arg_min_max(args[2..].join(SEP).trim())?
        };

        let mut clause = format!("{column} = (SELECT {aggregate}({column}) FROM {table}");
        if condition.is_empty() {
            clause.push(')');
        } else {
            clause.push_str(&format!(" WHERE {condition}) AND {condition}"));
        }

        sql.replace_range(call.start()..=close, &clause);
    }

    Ok(sql)
}
