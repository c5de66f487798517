//! Case canonicalization.

use std::collections::BTreeSet;

use super::quote::QuoteState;

/// Placeholder written for literal values; never uppercased.
pub const VALUE_PLACEHOLDER: &str = "value";

/// Uppercase everything outside quoted literals, leaving variable names and
/// the `value` placeholder untouched.
pub fn uppercase_outside_quotes(sql: &str, variables: &BTreeSet<String>) -> String {
    let mut state = QuoteState::default();
    sql.split_whitespace()
        .map(|token| {
            if token == VALUE_PLACEHOLDER || variables.contains(token) {
                return token.to_string();
            }
            let mut out = String::with_capacity(token.len());
            for ch in token.chars() {
                if state.in_quote() {
                    out.push(ch);
                } else {
                    out.extend(ch.to_uppercase());
                }
                state.update(ch);
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}
