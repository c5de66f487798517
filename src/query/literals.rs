//! Literal placeholders: `TYPE@n` or `TABLE.COLUMN.TYPE@n` tokens.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeSet;

use super::error::Rejection;
use super::Query;
use crate::db::LiteralSource;
use crate::schema::is_numeric_type;
use crate::sql::replace_in_tokens;

const ORDERING: [&str; 4] = ["<", ">", "<=", ">="];

/// Type tag of a placeholder token, e.g. `TEXT` for `SINGER.NAME.TEXT@1`.
fn placeholder_type(token: &str) -> Option<&str> {
    let (head, _) = token.split_once('@')?;
    Some(head.rsplit('.').next().unwrap_or(head))
}

/// Whether an ordering operator is applied to a non-numeric literal placeholder.
pub fn compares_non_numeric_literal(tokens: &[String]) -> bool {
    tokens.windows(2).any(|pair| {
        ORDERING.contains(&pair[0].as_str())
            && placeholder_type(&pair[1]).is_some_and(|t| !is_numeric_type(t))
    })
}

impl Query {
    /// Substitute literal placeholders with values drawn from `source`.
    ///
    /// The SQL keeps a quoted variable (`"var1"`), the filled streams carry
    /// the literal, and [`Query::variables`] records the mapping.
    pub fn replace_values<L, R>(&mut self, source: &L, rng: &mut R) -> Result<(), Rejection>
    where
        L: LiteralSource + ?Sized,
        R: Rng,
    {
        let mut nl_filled = self.nl_tokens.clone();
        let mut sql_filled = self.sql_tokens.clone();
        self.variables.clear();

        let placeholders: BTreeSet<String> = self
            .sql_tokens
            .iter()
            .filter(|t| t.contains('@'))
            .cloned()
            .collect();

        for token in &placeholders {
            let literal = draw_literal(token, source, rng)?;
            let index = token.rsplit('@').next().unwrap_or_default();
            let variable = format!("var{index}");
            let quoted_variable = format!("\"{variable}\"");
            let quoted_literal = format!("\"{literal}\"");

            replace_in_tokens(&mut self.sql_tokens, token, &quoted_variable, &quoted_variable);
            replace_in_tokens(&mut sql_filled, token, &quoted_literal, &quoted_literal);
            replace_in_tokens(&mut nl_filled, token, &literal, &literal);
            replace_in_tokens(&mut self.nl_tokens, token, &variable, &variable);
            self.variables.insert(variable, literal);
        }

        // Placeholders mentioned only in the NL.
        let remaining: BTreeSet<String> =
            nl_filled.iter().filter(|t| t.contains('@')).cloned().collect();
        for token in &remaining {
            let literal = draw_literal(token, source, rng)?;
            replace_in_tokens(&mut nl_filled, token, &literal, &literal);
        }

        self.nl_tokens_filled = Some(nl_filled);
        self.sql_tokens_filled = Some(sql_filled);
        Ok(())
    }
}

fn draw_literal<L, R>(token: &str, source: &L, rng: &mut R) -> Result<String, Rejection>
where
    L: LiteralSource + ?Sized,
    R: Rng,
{
    let parts: Vec<&str> = token.split('.').collect();
    let &[table, column, _] = parts.as_slice() else {
        return Err(Rejection::MalformedSlot(token.to_string()));
    };
    let value = source
        .literals(table, column)
        .and_then(|pool| pool.choose(rng))
        .ok_or_else(|| Rejection::EmptyLiteralPool {
            table: table.to_string(),
            column: column.to_string(),
        })?;
    Ok(value.split('(').next().unwrap_or_default().trim().to_string())
}
