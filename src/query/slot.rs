//! Slot classification.

use regex::Regex;
use std::sync::LazyLock;

use super::dictionary::SlotDictionary;
use super::phrases::{PhraseTables, SCALED_ADJECTIVES};

static SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{.*?\}").unwrap());

/// First `{…}` slot in a token.
pub fn first_slot(token: &str) -> Option<&str> {
    SLOT.find(token).map(|m| m.as_str())
}

/// Whether a token still holds a slot.
pub fn has_slot(token: &str) -> bool {
    token.contains('{')
}

/// The kind of a template slot, decided by its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKind {
    /// Key of the slot-filling dictionary.
    Dictionary,
    /// `{ENT…}`: a table.
    Entity,
    /// `{COL…}`: a column of the table in front of the slot. `suffix` is the
    /// text after `COL`; a trailing `f` restricts to numeric columns.
    Column { suffix: String },
    /// `{LITERAL…}`: a typed value placeholder.
    Literal,
    /// `{MATCHFILL…}`: a column of the same type as the one in front.
    MatchFill,
    /// `{DEF…}`: the default column of a table.
    Default,
    /// `{COMP…}`: a comparison operator, paired with `{COL<suffix>}`.
    Comparison { suffix: String },
    Function,
    FunctionCommand,
    FunctionParticiple,
    /// `{ARG…}`: argmax or argmin.
    Argument,
    /// `{greatToken}` / `{smallToken}`, sampled several times.
    ScaledAdjective,
    /// Any other adjective slot, filled with one random word.
    Adjective,
    /// `{andOrToken…}`.
    AndOr,
    Unknown,
}

fn suffix_after<'a>(slot: &'a str, tag: &str) -> &'a str {
    slot.find(tag)
        .map(|pos| &slot[pos + tag.len()..])
        .map(|rest| rest.trim_end_matches('}'))
        .unwrap_or("")
}

impl SlotKind {
    /// Classify a slot such as `{COL1f}`.
    pub fn classify(slot: &str, dictionary: &SlotDictionary, phrases: &PhraseTables) -> Self {
        if dictionary.contains(slot) {
            SlotKind::Dictionary
        } else if slot.contains("{ENT") {
            SlotKind::Entity
        } else if slot.contains("{COL") {
            SlotKind::Column {
                suffix: suffix_after(slot, "{COL").to_string(),
            }
        } else if slot.contains("{LITERAL") {
            SlotKind::Literal
        } else if slot.contains("{MATCHFILL") {
            SlotKind::MatchFill
        } else if slot.contains("{DEF") {
            SlotKind::Default
        } else if slot.contains("{COMP") {
            SlotKind::Comparison {
                suffix: suffix_after(slot, "{COMP").to_string(),
            }
        } else if slot.contains("{FUNC") {
            SlotKind::Function
        } else if slot.contains("{funcCommand") {
            SlotKind::FunctionCommand
        } else if slot.contains("{funcParticiple") {
            SlotKind::FunctionParticiple
        } else if slot.contains("{ARG") {
            SlotKind::Argument
        } else if SCALED_ADJECTIVES.contains(&slot) && phrases.is_adjective(slot) {
            SlotKind::ScaledAdjective
        } else if phrases.is_adjective(slot) {
            SlotKind::Adjective
        } else if slot.contains("{andOrToken") {
            SlotKind::AndOr
        } else {
            SlotKind::Unknown
        }
    }
}
