//! Quote and parenthesis tracking shared by the canonicalizer passes.
//!
//! Literals use single-level quoting: a `'` inside a `"…"` literal (or the
//! reverse) does not toggle quoting.

/// Whether the scan is inside a single- or double-quoted literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteState {
    single: bool,
    double: bool,
}

impl QuoteState {
    pub fn update(&mut self, ch: char) {
        if ch == '"' && !self.single {
            self.double = !self.double;
        } else if ch == '\'' && !self.double {
            self.single = !self.single;
        }
    }

    /// Update with every character of a token.
    pub fn update_token(&mut self, token: &str) {
        token.chars().for_each(|ch| self.update(ch));
    }

    pub fn in_single(&self) -> bool {
        self.single
    }

    pub fn in_double(&self) -> bool {
        self.double
    }

    pub fn in_quote(&self) -> bool {
        self.single || self.double
    }
}

/// Net parenthesis depth change of a token, ignoring quoted characters.
pub fn paren_delta(token: &str) -> isize {
    let mut state = QuoteState::default();
    let mut delta = 0;
    for ch in token.chars() {
        let quoted = state.in_quote();
        state.update(ch);
        if quoted || state.in_quote() {
            continue;
        }
        match ch {
            '(' => delta += 1,
            ')' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Index of the token closing the parenthesis opened by `tokens[open]`.
///
/// Quote-aware across tokens. Returns the last index when the group is
/// never closed.
pub fn matching_close(tokens: &[String], open: usize) -> usize {
    let mut depth = paren_delta(&tokens[open]);
    let mut state = QuoteState::default();
    for (idx, token) in tokens.iter().enumerate().skip(open + 1) {
        if state.in_quote() {
            state.update_token(token);
            continue;
        }
        depth += paren_delta(token);
        state.update_token(token);
        if depth <= 0 {
            return idx;
        }
    }
    tokens.len().saturating_sub(1)
}
