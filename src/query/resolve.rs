//! Resolution of template marker functions into plain SQL.
//!
//! Markers take their arguments as `MARKER ( a $ b … )` token runs:
//!
//! | marker       | becomes                                            |
//! |--------------|----------------------------------------------------|
//! | `COUNT_COND` | a `GROUP BY … ORDER BY count ( * ) desc limit 1` subquery |
//! | `JOIN_COL`   | the join column of the first table towards the second |
//! | `JOIN_FROM`  | `A JOIN B`                                         |
//! | `JOIN_WHERE` | `A.x = B.y`                                        |
//! | `argmax`/`argmin` | see [`resolve_arg_min_max`]                   |

use super::error::Rejection;
use super::Query;
use crate::schema::{find_join_path, join_column, JoinKind, Schema};
use crate::sql::resolve_arg_min_max;

/// Tokens covered by a two-table marker call: `MARKER ( A $ B )`.
const CALL_WIDTH: usize = 6;

fn arg(tokens: &[String], at: usize, sql: &[String]) -> Result<String, Rejection> {
    tokens
        .get(at)
        .cloned()
        .ok_or_else(|| Rejection::MalformedTemplate(sql.join(" ")))
}

impl Query {
    /// Resolve every marker of a fully filled query, in dependency order.
    pub fn resolve(&mut self, schema: &Schema) -> Result<(), Rejection> {
        self.resolve_aggregation_over_join(schema)?;
        self.resolve_join_columns(schema)?;
        self.resolve_joins(schema)?;

        let sql = resolve_arg_min_max(&self.sql())
            .map_err(|e| Rejection::ArgumentCount(e.to_string()))?;
        self.sql_tokens = sql.split_whitespace().map(str::to_string).collect();
        Ok(())
    }

    /// `COUNT_COND ( T1 $ T2 $ cond )`: the row of `T2` linked to the most
    /// rows of `T1` satisfying `cond`.
    fn resolve_aggregation_over_join(&mut self, schema: &Schema) -> Result<(), Rejection> {
        while let Some(i) = self.sql_tokens.iter().position(|t| t == "COUNT_COND") {
            let tokens = &self.sql_tokens;
            let first = arg(tokens, i + 2, tokens)?;
            let second = arg(tokens, i + 4, tokens)?;
            if first == second {
                return Err(Rejection::SingleTableAggregation(self.sql()));
            }

            let cond_start = i + CALL_WIDTH;
            let close = tokens
                .iter()
                .skip(cond_start)
                .position(|t| t == ")")
                .map(|offset| cond_start + offset)
                .ok_or_else(|| Rejection::MalformedTemplate(self.sql()))?;
            let condition = &tokens[cond_start..close];

            let join = find_join_path(&second, &first, schema, JoinKind::Where).ok_or_else(|| {
                Rejection::NoJoinPath {
                    from: second.clone(),
                    to: first.clone(),
                }
            })?;
            let Some((outer, inner)) = join.split_once(" = ") else {
                return Err(Rejection::NoJoinPath {
                    from: second,
                    to: first,
                });
            };

            let mut sql: Vec<String> = tokens[..i].to_vec();
            sql.extend(
                [outer, "=", "(", "SELECT", inner, "FROM", first.as_str()]
                    .iter()
                    .map(|t| t.to_string()),
            );
            if !condition.is_empty() {
                sql.push("WHERE".to_string());
                sql.extend_from_slice(condition);
            }
            sql.extend(
                ["GROUP", "BY", inner, "ORDER", "BY", "count", "(", "*", ")", "desc", "limit", "1"]
                    .iter()
                    .map(|t| t.to_string()),
            );
            sql.extend_from_slice(&tokens[close..]);
            self.sql_tokens = sql;
        }
        Ok(())
    }

    /// `JOIN_COL ( T1 $ T2 )`: the column of `T1` linking it to `T2`.
    fn resolve_join_columns(&mut self, schema: &Schema) -> Result<(), Rejection> {
        let tokens = &self.sql_tokens;
        let mut sql = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i] != "JOIN_COL" {
                sql.push(tokens[i].clone());
                i += 1;
                continue;
            }
            let from = arg(tokens, i + 2, tokens)?;
            let to = arg(tokens, i + 4, tokens)?;
            let column = join_column(&from, &to, schema)
                .ok_or(Rejection::NoJoinPath { from, to })?;
            sql.push(column);
            i += CALL_WIDTH;
        }
        self.sql_tokens = sql;
        Ok(())
    }

    /// `JOIN_FROM ( T1 $ T2 )` and `JOIN_WHERE ( T1 $ T2 )`.
    ///
    /// A table joined with itself has an empty WHERE join; its connective
    /// `AND`, or the bare `WHERE` it would leave behind, is dropped with it.
    fn resolve_joins(&mut self, schema: &Schema) -> Result<(), Rejection> {
        let tokens = &self.sql_tokens;
        let mut sql: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let Some(kind) = JoinKind::from_marker(&tokens[i]) else {
                sql.push(tokens[i].clone());
                i += 1;
                continue;
            };
            let from = arg(tokens, i + 2, tokens)?;
            let to = arg(tokens, i + 4, tokens)?;
            let join = find_join_path(&from, &to, schema, kind)
                .ok_or(Rejection::NoJoinPath { from, to })?;
            i += CALL_WIDTH;

            if !join.is_empty() {
                sql.push(join);
            } else if tokens.get(i).is_some_and(|t| t == "AND") {
                i += 1;
            } else if sql.last().is_some_and(|t| t == "WHERE" || t == "AND") {
                sql.pop();
            }
        }
        self.sql_tokens = sql;
        Ok(())
    }
}
