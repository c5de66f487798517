//! Template files.
//!
//! One template per line: NL variants and the SQL template separated by
//! tabs, SQL last. Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use crate::query::Rejection;
use crate::sql::{parens_balanced, tokenize_nl, tokenize_sql};

/// Read the template lines of a file.
pub fn read_templates<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Split a template line into its NL variants and the SQL template.
pub fn split_template(line: &str) -> Option<(Vec<&str>, &str)> {
    let mut parts: Vec<&str> = line.split('\t').collect();
    let sql = parts.pop()?;
    if parts.is_empty() {
        return None;
    }
    Some((parts, sql))
}

/// Structural checks on one template line.
pub fn verify_template(line: &str) -> Result<(), Rejection> {
    let malformed = |reason: &str| Rejection::MalformedTemplate(format!("{reason}: {line}"));

    let (nl_parts, sql) = split_template(line).ok_or_else(|| malformed("no tab separator"))?;

    if !parens_balanced(sql) || nl_parts.iter().any(|nl| !parens_balanced(nl)) {
        return Err(malformed("unbalanced parentheses"));
    }
    if !tokenize_sql(sql).iter().any(|t| t == "SELECT") {
        return Err(malformed("no SELECT in SQL"));
    }
    if nl_parts
        .iter()
        .any(|nl| tokenize_nl(nl).iter().any(|t| t == "SELECT"))
    {
        return Err(malformed("SELECT in NL"));
    }
    Ok(())
}
