//! Tokenization and token-level rewriting of NL and SQL templates.
//!
//! Templates are manipulated as whitespace-separated token streams. Both
//! tokenizers isolate punctuation so that slots, operators and parentheses
//! can be located and replaced token by token.

use regex::Regex;
use std::sync::LazyLock;

static NL_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([,!?()])").unwrap());
static NL_APOSTROPHE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'([a-zA-Z]+)\s").unwrap());
static NL_FULL_STOP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(\s|$)").unwrap());

static SQL_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\\,!?;+*<>()=/-])").unwrap());
static SQL_OPERATOR_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([<>!])\s+(=)").unwrap());

/// Separator between the arguments of template functions such as `argmax`.
pub const SEP: &str = "$";

/// Table slot bound to the main entity of a query.
pub const MAIN_ENT: &str = "{ENT1}";

/// Split an NL string into tokens.
///
/// `, ! ? ( )`, leading-apostrophe suffixes (`'s`) and sentence-final periods
/// become tokens of their own; everything else splits on whitespace.
pub fn tokenize_nl(text: &str) -> Vec<String> {
    let text = NL_PUNCTUATION.replace_all(text, " $1 ");
    let text = NL_APOSTROPHE.replace_all(&text, " '$1 ");
    let text = NL_FULL_STOP.replace_all(&text, " .$1");
    text.split_whitespace().map(str::to_string).collect()
}

/// Split a SQL template into tokens.
///
/// Each of `\ , ! ? ; + * < > ( ) = / -` becomes a token, except that `!=`,
/// `<=` and `>=` stay together.
pub fn tokenize_sql(text: &str) -> Vec<String> {
    let text = SQL_SPECIAL.replace_all(text, " $1 ");
    let text = SQL_OPERATOR_SPACE.replace_all(&text, "$1$2");
    text.split_whitespace().map(str::to_string).collect()
}

/// Replace `needle` in every token.
///
/// A token equal to `needle` (ignoring surrounding whitespace) is replaced
/// wholesale by `standalone`; a token merely containing it has each
/// occurrence replaced by `substring`.
pub fn replace_in_tokens(tokens: &mut [String], needle: &str, substring: &str, standalone: &str) {
    for token in tokens.iter_mut() {
        if token.trim() == needle {
            *token = standalone.to_string();
        } else if token.contains(needle) {
            *token = token.replace(needle, substring);
        }
    }
}

/// Whether a GROUP BY variant can be derived from this SQL template.
pub fn is_groupable(sql: &str) -> bool {
    const BLOCKED: [&str; 4] = ["GROUP BY", "ARG", "COUNT_COND", "NOT"];
    const AGGREGATES: [&str; 12] = [
        "MAX",
        "MIN",
        "SUM",
        "COUNT",
        "AVG",
        "min",
        "max",
        "sum",
        "count",
        "avg",
        "FUNC",
        "funcCommand",
    ];
    if BLOCKED.iter().any(|b| sql.contains(b)) {
        return false;
    }
    AGGREGATES.iter().any(|a| sql.contains(a))
}

/// Equal number of opening and closing parentheses.
pub fn parens_balanced(text: &str) -> bool {
    text.matches('(').count() == text.matches(')').count()
}

/// Join tokens with single spaces.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}
