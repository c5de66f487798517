//! Statement termination and whitespace/quote normalization.

use super::quote::QuoteState;

const SPACED: &str = "!=<>,;()[]{}+*/\\#";
const OPERATOR: &str = "!=<>+*";

/// Append a trailing `;` unless present.
pub fn add_semicolon(sql: &str) -> String {
    let sql = sql.trim();
    if !sql.is_empty() && !sql.ends_with(';') {
        format!("{sql};")
    } else {
        sql.to_string()
    }
}

/// Normalize spacing and quoting.
///
/// Special characters outside literals are surrounded by exactly one space
/// (operator runs such as `>=` stay together), blanks just inside quotes are
/// removed, `'…'` literals become `"…"` unless they contain a `"`, and
/// aggregate calls are written `COUNT(` etc.
pub fn standardize_whitespace(sql: &str) -> String {
    let spaced = space_special_chars(sql);
    let trimmed = trim_inside_quotes(&spaced);
    let quoted = prefer_double_quotes(&trimmed);
    let collapsed = quoted.split_whitespace().collect::<Vec<_>>().join(" ");
    merge_function_calls(&collapsed)
}

fn space_special_chars(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() * 2);
    let mut state = QuoteState::default();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        pos += 1;
        if ch == '\'' || ch == '"' {
            if !state.in_quote() {
                out.push(' ');
            }
            state.update(ch);
            out.push(ch);
            if !state.in_quote() {
                out.push(' ');
            }
        } else if state.in_quote() {
            out.push(ch);
        } else if SPACED.contains(ch) {
            out.push(' ');
            out.push(ch);
            if OPERATOR.contains(ch) {
                while pos < chars.len() && OPERATOR.contains(chars[pos]) {
                    out.push(chars[pos]);
                    pos += 1;
                }
            }
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

fn is_blank(ch: Option<char>) -> bool {
    matches!(ch, Some(' ') | Some('\n'))
}

/// Remove blanks directly after an opening or before a closing quote,
/// also across a `%` wildcard next to the quote.
fn trim_inside_quotes(sql: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(sql.len());
    let mut state = QuoteState::default();
    let mut prev: Option<char> = None;
    let mut prev2: Option<char> = None;

    for ch in sql.chars() {
        let mut skip = false;
        for (active, symbol) in [(state.in_single(), '\''), (state.in_double(), '"')] {
            if !active {
                continue;
            }
            let blank = ch == ' ' || ch == '\n';
            if blank && prev == Some(symbol) {
                skip = true;
                break;
            }
            if blank && prev == Some('%') && prev2 == Some(symbol) {
                skip = true;
                break;
            } else if ch == symbol && is_blank(prev) {
                out.pop();
            } else if ch == symbol && prev == Some('%') && is_blank(prev2) && out.len() >= 2 {
                out.remove(out.len() - 2);
            }
        }
        if skip {
            continue;
        }

        state.update(ch);
        out.push(ch);
        prev2 = prev;
        prev = Some(ch);
    }
    out.into_iter().collect()
}

fn prefer_double_quotes(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut state = QuoteState::default();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        if !state.in_quote() && ch == '\'' {
            let mut literal = vec![ch];
            let mut saw_double = false;
            let mut closed = false;
            pos += 1;
            while pos < chars.len() {
                let inner = chars[pos];
                literal.push(inner);
                if inner == '"' {
                    saw_double = true;
                }
                if inner == '\'' {
                    closed = true;
                    break;
                }
                pos += 1;
            }
            if closed && !saw_double {
                let last = literal.len() - 1;
                literal[0] = '"';
                literal[last] = '"';
            }
            if !closed {
                state.update(ch);
            }
            out.extend(literal);
        } else {
            state.update(ch);
            out.push(ch);
        }
        pos += 1;
    }
    out
}

fn merge_function_calls(sql: &str) -> String {
    let mut sql = sql.to_string();
    for (from, to) in [
        ("count (", "COUNT("),
        ("lower (", "LOWER("),
        ("max (", "MAX("),
        ("min (", "MIN("),
        ("sum (", "SUM("),
        ("COUNT (", "COUNT("),
        ("LOWER (", "LOWER("),
        ("MAX (", "MAX("),
        ("MIN (", "MIN("),
        ("SUM (", "SUM("),
        ("COUNT(*", "COUNT( *"),
        ("YEAR ( CURDATE ( ) )", "YEAR(CURDATE())"),
    ] {
        sql = sql.replace(from, to);
    }
    sql
}
