//! Chunking of a token stream for clause reordering.
//!
//! A chunk is either a single token, a bare `( … )` group, or a function
//! call span such as `COUNT( * )`. Groups are reordered recursively before
//! the enclosing sequence sees them; call spans are kept as they are.

use super::quote::{matching_close, QuoteState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    tokens: Vec<String>,
}

impl Chunk {
    pub fn single(token: impl Into<String>) -> Self {
        Self {
            tokens: vec![token.into()],
        }
    }

    pub fn span(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Whether this is the single token `word`.
    pub fn is(&self, word: &str) -> bool {
        self.tokens.len() == 1 && self.tokens[0] == word
    }

    pub fn first(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

/// Split `tokens` into chunks, passing every bare group through `order_group`.
///
/// The first token is always a chunk of its own.
pub fn chunk_tokens<F>(tokens: &[String], mut order_group: F) -> Vec<Chunk>
where
    F: FnMut(Vec<String>) -> Vec<String>,
{
    let mut chunks = Vec::with_capacity(tokens.len());
    let Some(first) = tokens.first() else {
        return chunks;
    };
    chunks.push(Chunk::single(first.clone()));

    let mut state = QuoteState::default();
    state.update_token(first);
    let mut pos = 1;
    while pos < tokens.len() {
        let token = &tokens[pos];
        state.update_token(token);
        let opens_group = !state.in_quote() && token == "(";
        let opens_call = !state.in_quote() && token.len() > 1 && token.ends_with('(');

        if opens_group || opens_call {
            let close = matching_close(tokens, pos);
            let span = tokens[pos..=close].to_vec();
            if opens_group {
                chunks.push(Chunk::span(order_group(span)));
            } else {
                chunks.push(Chunk::span(span));
            }
            pos = close + 1;
        } else {
            chunks.push(Chunk::single(token.clone()));
            pos += 1;
        }
    }
    chunks
}

/// Position of the next single-token chunk equal to `target`, starting at `pos`.
///
/// An `AND` belonging to `BETWEEN … AND …` does not match.
pub fn find_chunk(chunks: &[Chunk], pos: usize, target: &str) -> Option<usize> {
    let mut saw_between = false;
    for (idx, chunk) in chunks.iter().enumerate().skip(pos) {
        if chunk.first().eq_ignore_ascii_case("BETWEEN") {
            saw_between = true;
        }
        if chunk.is(target) && (target != "AND" || !saw_between) {
            return Some(idx);
        }
        if saw_between && chunk.first().eq_ignore_ascii_case("AND") {
            saw_between = false;
        }
    }
    None
}

/// Position of the nearest of several keywords, or `chunks.len()`.
pub fn find_any(chunks: &[Chunk], pos: usize, targets: &[&str]) -> usize {
    targets
        .iter()
        .filter_map(|t| find_chunk(chunks, pos, t))
        .min()
        .unwrap_or(chunks.len())
}
