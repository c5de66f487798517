//! Structural variants derived from a template before slot filling.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::Query;
use crate::config::GenerationSettings;
use crate::sql::{parens_balanced, tokenize_nl, tokenize_sql, MAIN_ENT, SEP};

static ENT_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{ENT[a-z]\}").unwrap());

const ARG_NL: &str = "{ENT1} {withToken} the {ARG1} {ENT1}.{COL2f}";
const ARG_COLUMN: &str = "{ENT1}.{COL2f}";

impl Query {
    /// Derive join variants from letter entity slots (`{ENTa}`, `{ENTb}`, …).
    ///
    /// Every assignment of `{ENT1}`/`{ENT2}` to the letter slots, except
    /// all-`{ENT1}` and all-`{ENT2}`, becomes a variant joining the main table
    /// with a second one. Afterwards `self` has every letter slot rebound to
    /// the main entity; it is not part of the returned list.
    pub fn create_join_placeholders(
        &mut self,
        settings: &GenerationSettings,
        table_count: usize,
    ) -> Vec<Query> {
        let text = format!("{} {}", self.nl(), self.sql());
        let slots: Vec<String> = ENT_LETTER
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut variants = Vec::new();
        if !settings.no_join && !slots.is_empty() && table_count > 1 {
            let main_token = if self.sql_tokens.iter().any(|t| t.contains("{FROM}")) {
                format!("{MAIN_ENT}.{{FROM}}")
            } else {
                MAIN_ENT.to_string()
            };
            let n = slots.len();
            for assignment in 1..(1usize << n) - 1 {
                let digits = (0..n).map(|i| 1 + ((assignment >> (n - 1 - i)) & 1));
                if let Some(variant) = self.join_variant(&slots, digits, &main_token, settings) {
                    variants.push(variant);
                }
            }
        }

        for slot in &slots {
            self.replace_both(slot, MAIN_ENT);
        }
        variants
    }

    fn join_variant(
        &self,
        slots: &[String],
        digits: impl Iterator<Item = usize>,
        main_token: &str,
        settings: &GenerationSettings,
    ) -> Option<Query> {
        let mut q = self.clone();
        for (slot, digit) in slots.iter().zip(digits) {
            q.replace_both(slot, &format!("{{ENT{digit}}}"));
        }
        q.replace_nl(main_token, MAIN_ENT, MAIN_ENT);

        let join_from = format!("JOIN_FROM( {MAIN_ENT} {SEP} {{ENT2}} )");
        q.replace_sql(main_token, main_token, &join_from);

        let from = q.sql_tokens.iter().position(|t| t == "FROM")?;
        if q.sql_tokens.iter().any(|t| t == "WHERE") {
            let at = (from + 3).min(q.sql_tokens.len());
            q.sql_tokens
                .insert(at, format!("JOIN_WHERE( {MAIN_ENT} {SEP} {{ENT2}} ) AND"));
        } else {
            let at = (from + 2).min(q.sql_tokens.len());
            q.sql_tokens
                .insert(at, format!("WHERE JOIN_WHERE( {MAIN_ENT} {SEP} {{ENT2}} )"));
        }
        q.sql_tokens = tokenize_sql(&q.sql());
        q.layer += settings.join_boost + slots.len() as f64;
        Some(q)
    }

    /// Derive the argmin/argmax variant of a template with a `{FROM}` slot.
    ///
    /// Returns the variant (when it is well formed) followed by `self` with
    /// the `{FROM}` slot rebound to the main entity. Without a `{FROM}` slot
    /// only `self` is returned.
    pub fn create_argmin_max(mut self, settings: &GenerationSettings) -> Vec<Query> {
        let Some(from_slot) = self.nl_tokens.iter().find(|t| t.contains("{FROM")).cloned() else {
            return vec![self];
        };

        let variant = self.argmax_variant(&from_slot, settings);

        self.replace_both(&from_slot, MAIN_ENT);
        self.layer += 1.0;

        match variant {
            Some(variant) => vec![variant, self],
            None => {
                tracing::debug!(sql = %self.sql(), "argmin/argmax variant is malformed");
                vec![self]
            }
        }
    }

    fn argmax_variant(&self, from_slot: &str, settings: &GenerationSettings) -> Option<Query> {
        let mut q = self.clone();

        let i = q.nl_tokens.iter().position(|t| t == from_slot)?;
        q.nl_tokens[i] = ARG_NL.to_string();
        q.nl_tokens = tokenize_nl(&q.nl_tokens.join(" "));

        let i = q.sql_tokens.iter().position(|t| t == from_slot)?;
        q.sql_tokens[i] = MAIN_ENT.to_string();
        let call = [
            "{ARG1}", "(", ARG_COLUMN, SEP, MAIN_ENT, SEP,
        ]
        .map(str::to_string);
        if q.sql_tokens.len() > i + 1 {
            let at = (i + 2).min(q.sql_tokens.len());
            q.sql_tokens.splice(at..at, call);
        } else {
            q.sql_tokens.push("WHERE".to_string());
            q.sql_tokens.extend(call);
        }
        q.sql_tokens.push(")".to_string());

        let sql = q.sql();
        if !parens_balanced(&sql) || !q.sql_tokens.iter().any(|t| t == "WHERE") {
            return None;
        }
        q.layer += settings.argmax_boost;
        Some(q)
    }
}
