//! Clause and operand reordering.
//!
//! Within every (sub)query: SELECT items are sorted, `=`/`!=` operands are
//! put in a fixed orientation, FROM items are sorted, and WHERE predicates
//! are sorted when they are joined only by `AND` or only by `OR`.

use std::collections::BTreeSet;

use super::chunk::{chunk_tokens, find_any, find_chunk, Chunk};
use super::keywords::SET_OPERATORS;

const FROM_END: [&str; 7] = ["WHERE", "JOIN", "GROUP", "HAVING", "LIMIT", "ORDER", ";"];
const JOIN_END: [&str; 6] = ["WHERE", "GROUP", "HAVING", "LIMIT", "ORDER", ";"];
const WHERE_END: [&str; 5] = ["GROUP", "HAVING", "LIMIT", "ORDER", ";"];
const JOIN_QUALIFIERS: [&str; 10] = [
    "ON", "USING", "LEFT", "RIGHT", "INNER", "OUTER", "CROSS", "NATURAL", "FULL", ",",
];

/// Reorder a whitespace-normalized statement. The last token (`;`) stays last.
pub fn order_query(sql: &str, variables: &BTreeSet<String>) -> String {
    let tokens: Vec<String> = sql.split_whitespace().map(str::to_string).collect();
    order_sequence(tokens, variables).join(" ")
}

fn order_sequence(tokens: Vec<String>, variables: &BTreeSet<String>) -> Vec<String> {
    if tokens.len() < 2 {
        return tokens;
    }
    let (body, last) = tokens.split_at(tokens.len() - 1);
    let mut chunks = chunk_tokens(body, |group| order_sequence(group, variables));

    order_select_list(&mut chunks);
    order_comparisons(&mut chunks, variables);
    order_from(&mut chunks);
    order_where(&mut chunks);

    let mut out: Vec<String> = chunks.into_iter().flat_map(Chunk::into_tokens).collect();
    out.extend_from_slice(last);
    out
}

/// Sort the `separator`-delimited items of `chunks[start..end]`.
///
/// Left untouched when an item would be empty.
fn sort_items(chunks: &mut Vec<Chunk>, start: usize, end: usize, separator: &str) {
    let end = end.min(chunks.len());
    if start >= end || chunks[start].is(separator) {
        return;
    }

    let mut items: Vec<Vec<Chunk>> = Vec::new();
    let mut pos = start;
    while pos < end {
        match find_chunk(chunks, pos + 1, separator).filter(|&n| n < end) {
            Some(n) => {
                items.push(chunks[pos..n].to_vec());
                pos = n + 1;
                if pos >= end || chunks[pos].is(separator) {
                    return;
                }
            }
            None => {
                items.push(chunks[pos..end].to_vec());
                pos = end;
            }
        }
    }
    if items.len() < 2 {
        return;
    }

    items.sort_by_cached_key(|item| {
        item.iter()
            .map(Chunk::text)
            .collect::<Vec<_>>()
            .join(" ")
    });

    let mut rebuilt = Vec::with_capacity(end - start);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            rebuilt.push(Chunk::single(separator));
        }
        rebuilt.extend(item);
    }
    chunks.splice(start..end, rebuilt);
}

/// First clause boundary at or after `pos`; a set operator ends every clause.
fn clause_end(chunks: &[Chunk], pos: usize, ends: &[&str]) -> usize {
    find_any(chunks, pos, ends).min(find_any(chunks, pos, &SET_OPERATORS))
}

fn order_select_list(chunks: &mut Vec<Chunk>) {
    let mut cur = 0;
    while let Some(mut select) = find_chunk(chunks, cur, "SELECT") {
        if chunks
            .get(select + 1)
            .is_some_and(|c| c.is("DISTINCT") || c.is("ALL"))
        {
            select += 1;
        }
        let from = find_chunk(chunks, select, "FROM").unwrap_or(chunks.len());
        sort_items(chunks, select + 1, from, ",");
        cur = from;
    }
}

/// Operands that stay on the right: variables, numbers, literals, groups,
/// multi-token spans and unqualified names.
fn is_fixed_operand(text: &str, variables: &BTreeSet<String>) -> bool {
    variables.contains(text)
        || text.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '"' | '\'' | '('))
        || text.contains(' ')
        || !text.contains('.')
}

fn order_comparisons(chunks: &mut [Chunk], variables: &BTreeSet<String>) {
    for symbol in ["=", "!="] {
        let mut cur = 0;
        while let Some(op) = find_chunk(chunks, cur, symbol) {
            if op > 0 && op + 1 < chunks.len() {
                let left = chunks[op - 1].text();
                let right = chunks[op + 1].text();
                let swap = (left < right || is_fixed_operand(&left, variables))
                    && !is_fixed_operand(&right, variables);
                if swap {
                    chunks.swap(op - 1, op + 1);
                }
            }
            cur = op + 2;
        }
    }
}

fn plain_joins(chunks: &[Chunk]) -> bool {
    !chunks
        .iter()
        .any(|c| JOIN_QUALIFIERS.iter().any(|q| c.is(q)))
}

fn order_from(chunks: &mut Vec<Chunk>) {
    let mut cur = 0;
    while let Some(from) = find_chunk(chunks, cur, "FROM") {
        let next = clause_end(chunks, from, &FROM_END);
        sort_items(chunks, from + 1, next, ",");

        let join_end = clause_end(chunks, from, &JOIN_END);
        if next < join_end && chunks[next].is("JOIN") && plain_joins(&chunks[from + 1..join_end])
        {
            sort_items(chunks, from + 1, join_end, "JOIN");
        }
        cur = next.max(from + 1);
    }
}

/// A parenthesized sequence that is not a subquery is a predicate list.
fn is_predicate_group(chunks: &[Chunk]) -> bool {
    let first_is_select = chunks.first().is_some_and(|c| c.is("SELECT"));
    let second_is_select = chunks
        .get(1)
        .and_then(|c| c.tokens().last())
        .is_some_and(|t| t == "SELECT");
    !first_is_select && !second_is_select
}

fn order_where(chunks: &mut Vec<Chunk>) {
    let mut cur = 0;
    loop {
        let start = match find_chunk(chunks, cur, "WHERE") {
            Some(w) => w,
            None if cur == 0 && is_predicate_group(chunks) => 0,
            None => break,
        };
        let end = clause_end(chunks, start, &WHERE_END);

        let mut has_and = false;
        let mut has_or = false;
        let mut saw_between = false;
        for chunk in chunks.iter().take(end).skip(start + 1) {
            if chunk.first() == "BETWEEN" {
                saw_between = true;
            }
            if chunk.is("AND") {
                if saw_between {
                    saw_between = false;
                } else {
                    has_and = true;
                }
            }
            if chunk.is("OR") {
                has_or = true;
            }
        }

        if !(has_and && has_or) {
            sort_items(chunks, start + 1, end, "AND");
            sort_items(chunks, start + 1, end, "OR");
        }

        cur = end.max(start + 1);
        if cur >= chunks.len() {
            break;
        }
    }
}
