//! Alias standardization.
//!
//! Every table in a FROM region is rewritten to `TABLE AS TABLEalias<n>`,
//! replacing whatever alias the query used, and every column reference is
//! rewritten to go through the new alias. Derived tables and fields named
//! with `AS` become `DERIVED_TABLEalias<n>` / `DERIVED_FIELDalias<n>`.
//!
//! Scopes follow bare `(` groups and each SELECT of a compound statement. A qualified reference resolves through the
//! innermost scope defining its qualifier; a bare column resolves to the
//! only aliased table owning that column, innermost scope first.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::keywords::is_reserved;
use super::quote::QuoteState;
use crate::schema::CanonicalSchema;

static ALIAS_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

const DERIVED_TABLE: &str = "DERIVED_TABLE";
const DERIVED_FIELD: &str = "DERIVED_FIELD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Before FROM.
    Select,
    /// Between FROM and the first WHERE/GROUP/HAVING/ORDER/LIMIT.
    From,
    /// After the FROM region.
    Tail,
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    id: usize,
    region: Region,
}

#[derive(Debug, Clone)]
struct AliasEntry {
    /// Name used by the query, either the table or its original alias.
    name: String,
    alias: String,
    /// Aliased table; `None` for derived tables.
    table: Option<String>,
}

/// Follows bare-parenthesis scopes and the clause region of each.
struct ScopeTracker {
    stack: Vec<Scope>,
    parens: Vec<bool>,
    next_id: usize,
    quote: QuoteState,
}

impl ScopeTracker {
    fn new() -> Self {
        Self {
            stack: vec![Scope {
                id: 0,
                region: Region::Select,
            }],
            parens: Vec::new(),
            next_id: 1,
            quote: QuoteState::default(),
        }
    }

    /// Consume a token. Returns true if the token is part of a quoted literal.
    fn advance(&mut self, token: &str) -> bool {
        if self.quote.in_quote() {
            self.quote.update_token(token);
            return true;
        }
        let quoted = token.starts_with('"') || token.starts_with('\'');

        for ch in token.chars() {
            let was_quoted = self.quote.in_quote();
            self.quote.update(ch);
            if was_quoted || self.quote.in_quote() {
                continue;
            }
            match ch {
                '(' if token == "(" => {
                    self.parens.push(true);
                    self.stack.push(Scope {
                        id: self.next_id,
                        region: Region::Select,
                    });
                    self.next_id += 1;
                }
                '(' => self.parens.push(false),
                ')' => {
                    if self.parens.pop() == Some(true) && self.stack.len() > 1 {
                        self.stack.pop();
                    }
                }
                _ => {}
            }
        }

        if !quoted {
            self.mark_keyword(token);
        }
        quoted
    }

    fn mark_keyword(&mut self, token: &str) {
        let Some(scope) = self.stack.last_mut() else {
            return;
        };
        match token {
            "FROM" => scope.region = Region::From,
            // A SELECT after a set operator starts a sibling statement.
            "SELECT" if scope.region != Region::Select => {
                scope.id = self.next_id;
                scope.region = Region::Select;
                self.next_id += 1;
            }
            "WHERE" | "GROUP" | "HAVING" | "ORDER" | "LIMIT" => {
                if scope.region == Region::From {
                    scope.region = Region::Tail;
                }
            }
            _ => {}
        }
    }

    fn current(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope {
            id: 0,
            region: Region::Select,
        })
    }

    /// Scope ids from innermost to outermost.
    fn enclosing(&self) -> impl Iterator<Item = usize> + '_ {
        self.stack.iter().rev().map(|s| s.id)
    }
}

fn next_count(counters: &mut HashMap<String, usize>, key: &str) -> usize {
    let counter = counters.entry(key.to_string()).or_insert(0);
    let n = *counter;
    *counter += 1;
    n
}

fn is_alias_name(token: &str) -> bool {
    !is_reserved(&token.to_uppercase()) && ALIAS_NAME.is_match(token)
}

#[derive(Default)]
struct AliasMap {
    scopes: HashMap<usize, Vec<AliasEntry>>,
    fields: HashMap<String, String>,
}

impl AliasMap {
    fn local(&self, scope: usize, name: &str) -> Option<&AliasEntry> {
        self.scopes
            .get(&scope)
            .and_then(|entries| entries.iter().find(|e| e.name == name))
    }

    fn qualifier(&self, tracker: &ScopeTracker, name: &str) -> Option<&AliasEntry> {
        tracker.enclosing().find_map(|scope| self.local(scope, name))
    }

    fn owner_of(
        &self,
        tracker: &ScopeTracker,
        schema: &CanonicalSchema,
        column: &str,
    ) -> Option<&str> {
        if !schema.is_word(column) {
            return None;
        }
        for scope in tracker.enclosing() {
            let Some(entries) = self.scopes.get(&scope) else {
                continue;
            };
            let owners: Vec<&AliasEntry> = entries
                .iter()
                .filter(|e| {
                    e.table
                        .as_deref()
                        .is_some_and(|t| schema.has_field(t, column))
                })
                .collect();
            match owners.as_slice() {
                [] => continue,
                [only] => return Some(only.alias.as_str()),
                _ => return None,
            }
        }
        None
    }
}

/// Rewrite table aliases and column references into the standard form.
pub fn standardize_aliases(sql: &str, schema: &CanonicalSchema) -> String {
    let tokens: Vec<&str> = sql.split_whitespace().collect();
    let mut aliases = AliasMap::default();
    let out = assign_aliases(&tokens, schema, &mut aliases);
    rewrite_references(&out, schema, &aliases).join(" ")
}

fn assign_aliases(tokens: &[&str], schema: &CanonicalSchema, aliases: &mut AliasMap) -> Vec<String> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut tracker = ScopeTracker::new();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len() + 8);
    let mut i = 0;

    while i < tokens.len() {
        let word = tokens[i];
        if tracker.advance(word) {
            out.push(word.to_string());
            i += 1;
            continue;
        }
        let scope = tracker.current();

        if schema.is_table(word) && scope.region == Region::From {
            let alias = format!("{word}alias{}", next_count(&mut counters, word));
            let mut next = i + 1;
            if tokens.get(next) == Some(&"AS") {
                next += 1;
            }
            let name = match tokens.get(next).filter(|t| is_alias_name(t)) {
                Some(existing) => {
                    next += 1;
                    existing.to_string()
                }
                None => word.to_string(),
            };
            out.push(word.to_string());
            out.push("AS".to_string());
            out.push(alias.clone());
            aliases.scopes.entry(scope.id).or_default().push(AliasEntry {
                name,
                alias,
                table: Some(word.to_string()),
            });
            i = next;
            continue;
        }

        let after_as = out.len() >= 2 && out[out.len() - 1] == "AS";
        if after_as && !schema.is_table(&out[out.len() - 2]) && is_alias_name(word) {
            let kind = if scope.region == Region::Select {
                DERIVED_FIELD
            } else {
                DERIVED_TABLE
            };
            let alias = format!("{kind}alias{}", next_count(&mut counters, kind));
            if kind == DERIVED_FIELD {
                aliases.fields.insert(word.to_string(), alias.clone());
            } else {
                aliases.scopes.entry(scope.id).or_default().push(AliasEntry {
                    name: word.to_string(),
                    alias: alias.clone(),
                    table: None,
                });
            }
            out.push(alias);
            i += 1;
            continue;
        }

        out.push(word.to_string());
        i += 1;
    }
    out
}

fn rewrite_references(tokens: &[String], schema: &CanonicalSchema, aliases: &AliasMap) -> Vec<String> {
    let mut tracker = ScopeTracker::new();
    let mut out = Vec::with_capacity(tokens.len());

    for (i, word) in tokens.iter().enumerate() {
        if tracker.advance(word) {
            out.push(word.clone());
            continue;
        }
        let scope = tracker.current();

        // Outside FROM a bare name owned by a table in scope is a column,
        // even when it also names its table.
        if scope.region != Region::From && !word.contains('.') && schema.is_table(word) {
            if let Some(alias) = aliases.owner_of(&tracker, schema, word) {
                out.push(format!("{alias}.{word}"));
                continue;
            }
        }

        let next_is_as = tokens.get(i + 1).is_some_and(|t| t == "AS");
        if !next_is_as {
            if let Some(entry) = aliases.local(scope.id, word) {
                out.push(entry.alias.clone());
                continue;
            }
        }

        if is_reserved(word) && !schema.is_word(word) {
            out.push(word.clone());
            continue;
        }

        let parts: Vec<&str> = word.split('.').collect();
        match parts.as_slice() {
            [qualifier, field] => {
                if let Some(entry) = aliases.qualifier(&tracker, qualifier) {
                    let field = match aliases.fields.get(*field) {
                        Some(derived) if entry.alias.contains("DERIVED") => derived.as_str(),
                        _ => field,
                    };
                    out.push(format!("{}.{}", entry.alias, field));
                    continue;
                }
            }
            [column] => {
                if scope.region != Region::From {
                    if let Some(alias) = aliases.owner_of(&tracker, schema, column) {
                        out.push(format!("{alias}.{column}"));
                        continue;
                    }
                }
                if let Some(derived) = aliases.fields.get(*column) {
                    out.push(derived.clone());
                    continue;
                }
            }
            _ => {}
        }
        out.push(word.clone());
    }
    out
}
