//! Slot filling.
//!
//! Every slot kind has its own rule for where candidate values come from.
//! Multi-valued kinds keep `ceil(k * keep_probability(layer))` of their `k`
//! candidates, sampled without replacement.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::dictionary::SlotDictionary;
use super::error::Rejection;
use super::literals::compares_non_numeric_literal;
use super::phrases::{PhraseTables, ARG_FUNCTIONS, FUNCTIONS, OPERATORS};
use super::slot::{first_slot, has_slot, SlotKind};
use super::Query;
use crate::config::{scaled_count, GenerationSettings};
use crate::schema::{ColumnInfo, Schema};

/// Read-only inputs shared by every branch of one run.
#[derive(Debug, Clone, Copy)]
pub struct FillContext<'a> {
    pub schema: &'a Schema,
    pub settings: &'a GenerationSettings,
    pub dictionary: &'a SlotDictionary,
    pub phrases: &'a PhraseTables,
}

/// Outcome of filling one slot.
#[derive(Debug)]
pub enum Resolution {
    /// Sibling queries, each with the slot instantiated. May be empty.
    Expanded(Vec<Query>),
    /// The slot depends on another unfilled slot; the query is returned unchanged.
    Deferred(Query),
}

/// Apply `apply` to one copy of `query` per value. The last value reuses
/// `query` itself.
fn fork<T>(query: Query, mut values: Vec<T>, mut apply: impl FnMut(Query, T) -> Vec<Query>) -> Vec<Query> {
    let Some(last) = values.pop() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(values.len() + 1);
    for value in values {
        out.extend(apply(query.clone(), value));
    }
    out.extend(apply(query, last));
    out
}

fn branch<T>(query: Query, values: Vec<T>, mut apply: impl FnMut(&mut Query, T)) -> Vec<Query> {
    fork(query, values, |mut q, value| {
        apply(&mut q, value);
        vec![q]
    })
}

impl Query {
    /// Fill the first slot of `token`, an NL token of this query.
    pub fn fill_slot<R: Rng>(
        self,
        token: &str,
        ctx: &FillContext<'_>,
        rng: &mut R,
    ) -> Result<Resolution, Rejection> {
        let slot = first_slot(token)
            .ok_or_else(|| Rejection::MalformedSlot(token.to_string()))?
            .to_string();

        match SlotKind::classify(&slot, ctx.dictionary, ctx.phrases) {
            SlotKind::Dictionary => Ok(self.fill_dictionary(&slot, ctx, rng)),
            SlotKind::Entity => Ok(self.fill_entity(&slot, ctx, rng)),
            SlotKind::Column { suffix } => self.fill_column(token, &slot, &suffix, ctx, rng),
            SlotKind::Literal => self.fill_literal(token, &slot, ctx),
            SlotKind::MatchFill => self.fill_match(token, &slot, ctx, rng),
            SlotKind::Default => self.fill_default(token, &slot, ctx),
            SlotKind::Comparison { suffix } => Ok(self.fill_comparison(&slot, &suffix, ctx, rng)),
            SlotKind::Function => {
                let boost = ctx.settings.func_boost;
                Ok(self.fill_function(&slot, ctx, rng, boost, PhraseTables::function))
            }
            SlotKind::FunctionCommand => {
                Ok(self.fill_function(&slot, ctx, rng, 1.0, PhraseTables::command))
            }
            SlotKind::FunctionParticiple => {
                Ok(self.fill_function(&slot, ctx, rng, 1.0, PhraseTables::participle))
            }
            SlotKind::Argument => Ok(self.fill_argument(&slot, ctx, rng)),
            SlotKind::ScaledAdjective => Ok(self.fill_scaled_adjective(&slot, ctx, rng)),
            SlotKind::Adjective => Ok(self.fill_adjective(&slot, ctx, rng)),
            SlotKind::AndOr => Ok(self.fill_and_or(&slot, ctx, rng)),
            SlotKind::Unknown => Err(Rejection::UnknownSlot(slot)),
        }
    }

    fn sample_count(&self, ctx: &FillContext<'_>, candidates: usize) -> usize {
        ctx.settings.sample_count(candidates, self.layer)
    }

    fn fill_dictionary<R: Rng>(self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let values = ctx.dictionary.get(slot).unwrap_or(&[]);
        let n = self.sample_count(ctx, values.len());
        let chosen: Vec<&String> = values.choose_multiple(rng, n).collect();

        Resolution::Expanded(branch(self, chosen, |q, value| {
            let upper = value.to_uppercase();
            q.replace_nl(slot, value, value);
            q.replace_sql(slot, &upper, &upper);
            q.layer += 1.0;
        }))
    }

    fn fill_entity<R: Rng>(self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let tables: Vec<&str> = ctx
            .schema
            .table_names()
            .filter(|t| !self.uses_table(t))
            .collect();
        let n = self.sample_count(ctx, tables.len());
        let chosen: Vec<&str> = tables.choose_multiple(rng, n).copied().collect();

        Resolution::Expanded(branch(self, chosen, |q, table| {
            let surface = ctx.schema.table_surface(table);
            q.replace_nl(slot, table, &surface);
            q.replace_sql(slot, table, table);
            if q.main_entity.is_none() {
                q.main_entity = Some(table.to_string());
            }
            q.layer += 1.0;
        }))
    }

    fn fill_column<R: Rng>(
        self,
        token: &str,
        slot: &str,
        suffix: &str,
        ctx: &FillContext<'_>,
        rng: &mut R,
    ) -> Result<Resolution, Rejection> {
        let table = token.split('.').next().unwrap_or_default();
        if has_slot(table) {
            return Ok(Resolution::Deferred(self));
        }
        let columns = ctx
            .schema
            .columns(table)
            .ok_or_else(|| Rejection::UnknownTable(table.to_string()))?;

        let names: Vec<(&String, &ColumnInfo)> = columns.iter().collect();
        let n = self.sample_count(ctx, names.len());
        let numeric_only = suffix.ends_with('f');
        let chosen: Vec<(&String, &ColumnInfo)> = names
            .choose_multiple(rng, n)
            .copied()
            .filter(|(_, info)| !numeric_only || info.is_numeric())
            .collect();

        let needle = format!("{table}.{slot}");
        let comp_slot = format!("{{COMP{suffix}}}");

        Ok(Resolution::Expanded(fork(self, chosen, |mut q, (column, info)| {
            let qualified = format!("{table}.{column}");
            q.replace_nl(&needle, &qualified, &info.surface);
            q.replace_sql(&needle, &qualified, &qualified);
            q.layer += 1.0;

            // Only text columns negotiate their paired comparison.
            if info.is_numeric() || !q.nl_tokens.iter().any(|t| *t == comp_slot) {
                return vec![q];
            }
            let mut out = Vec::with_capacity(2);
            if rng.random::<f64>() < ctx.settings.unequal_p {
                let mut unequal = q.clone();
                unequal.set_comparison(&comp_slot, "!=", ctx.phrases);
                out.push(unequal);
            }
            q.set_comparison(&comp_slot, "=", ctx.phrases);
            out.push(q);
            out
        })))
    }

    fn set_comparison(&mut self, slot: &str, operator: &str, phrases: &PhraseTables) {
        let phrase = phrases.comparison(operator);
        self.replace_nl(slot, phrase, phrase);
        self.replace_sql(slot, operator, operator);
        self.layer += 1.0;
    }

    fn fill_literal(mut self, token: &str, slot: &str, ctx: &FillContext<'_>) -> Result<Resolution, Rejection> {
        let mut parts = token.split('.');
        let (Some(table), Some(column)) = (parts.next(), parts.next()) else {
            return Err(Rejection::MalformedSlot(token.to_string()));
        };
        if has_slot(table) || has_slot(column) {
            return Ok(Resolution::Deferred(self));
        }
        let info = ctx
            .schema
            .column(table, column)
            .ok_or_else(|| Rejection::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;

        let index = slot.trim_start_matches("{LITERAL").trim_end_matches('}');
        let value = if ctx.settings.fill_literals {
            format!("{table}.{column}.{}@{index}", info.type_tag)
        } else {
            format!("{}@{index}", info.type_tag)
        };
        self.replace_both(&format!("{table}.{column}.{slot}"), &value);
        self.layer += 1.0;

        if compares_non_numeric_literal(&self.sql_tokens) {
            return Err(Rejection::NumericComparison(self.sql()));
        }
        Ok(Resolution::Expanded(vec![self]))
    }

    fn fill_match<R: Rng>(
        self,
        token: &str,
        slot: &str,
        ctx: &FillContext<'_>,
        rng: &mut R,
    ) -> Result<Resolution, Rejection> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() < 3 || has_slot(parts[0]) || has_slot(parts[1]) {
            return Ok(Resolution::Deferred(self));
        }
        let (table, column) = (parts[0], parts[1]);
        let info = ctx
            .schema
            .column(table, column)
            .ok_or_else(|| Rejection::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;

        let candidates = ctx.schema.columns_of_type(&info.type_tag);
        let keep = ctx.settings.keep_probability(self.layer);
        let n = scaled_count(ctx.settings.in_boost, keep).min(candidates.len());

        let index = slot.trim_start_matches("{MATCHFILL").trim_end_matches('}');
        let needle = format!("{table}.{column}.{slot}");
        let table_slot = format!("{{MATCHFILLTABLE{index}}}");

        let mut out = Vec::with_capacity(n);
        for (new_table, new_column) in candidates.choose_multiple(rng, n) {
            if new_table == table && new_column == column {
                continue;
            }
            let mut q = self.clone();
            let qualified = format!("{new_table}.{new_column}");
            let surface = ctx
                .schema
                .column(new_table, new_column)
                .map(|c| c.surface.clone())
                .unwrap_or_else(|| qualified.clone());
            q.replace_nl(&needle, &qualified, &surface);
            q.replace_sql(&needle, &qualified, &qualified);

            let table_surface = ctx.schema.table_surface(new_table);
            q.replace_nl(&table_slot, new_table, &table_surface);
            q.replace_sql(&table_slot, new_table, new_table);

            q.layer += ctx.settings.in_boost;
            out.push(q);
        }
        Ok(Resolution::Expanded(out))
    }

    fn fill_default(mut self, token: &str, slot: &str, ctx: &FillContext<'_>) -> Result<Resolution, Rejection> {
        let table = token.split('.').next().unwrap_or_default();
        if has_slot(table) {
            return Ok(Resolution::Deferred(self));
        }
        let defaults = ctx
            .schema
            .defaults(table)
            .ok_or_else(|| Rejection::UnknownTable(table.to_string()))?;
        let column = defaults
            .column
            .as_deref()
            .ok_or_else(|| Rejection::MissingDefaultColumn(table.to_string()))?;

        let needle = format!("{table}.{slot}");
        let qualified = format!("{table}.{column}");
        self.replace_nl(&needle, "", "");
        self.nl_tokens.retain(|t| !t.is_empty());
        self.replace_sql(&needle, &qualified, &qualified);
        self.layer += 1.0;
        Ok(Resolution::Expanded(vec![self]))
    }

    fn fill_comparison<R: Rng>(
        self,
        slot: &str,
        suffix: &str,
        ctx: &FillContext<'_>,
        rng: &mut R,
    ) -> Resolution {
        // The paired column decides the operator for text columns.
        let column_slot = format!("{{COL{suffix}}}");
        if self.nl_tokens.iter().any(|t| t.contains(&column_slot)) {
            return Resolution::Deferred(self);
        }
        let n = self.sample_count(ctx, OPERATORS.len());
        let chosen: Vec<&str> = OPERATORS.choose_multiple(rng, n).copied().collect();
        Resolution::Expanded(branch(self, chosen, |q, operator| {
            q.set_comparison(slot, operator, ctx.phrases);
        }))
    }

    fn fill_function<R: Rng>(
        self,
        slot: &str,
        ctx: &FillContext<'_>,
        rng: &mut R,
        boost: f64,
        phrase: for<'p> fn(&'p PhraseTables, &'p str) -> &'p str,
    ) -> Resolution {
        let n = self.sample_count(ctx, FUNCTIONS.len());
        let chosen: Vec<&str> = FUNCTIONS.choose_multiple(rng, n).copied().collect();
        Resolution::Expanded(branch(self, chosen, |q, function| {
            let text = phrase(ctx.phrases, function);
            q.replace_nl(slot, text, text);
            q.replace_sql(slot, function, function);
            q.layer += boost;
        }))
    }

    fn fill_argument<R: Rng>(self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let n = self.sample_count(ctx, ARG_FUNCTIONS.len());
        let chosen: Vec<&str> = ARG_FUNCTIONS.choose_multiple(rng, n).copied().collect();
        Resolution::Expanded(branch(self, chosen, |q, function| {
            let text = ctx.phrases.argument(function);
            q.replace_nl(slot, text, text);
            q.replace_sql(slot, function, function);
            q.layer += 1.0;
        }))
    }

    fn fill_scaled_adjective<R: Rng>(self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let words = ctx.phrases.adjectives(slot).unwrap_or(&[]);
        let keep = ctx.settings.keep_probability(self.layer);
        let n = scaled_count(ctx.settings.adjective_scale, keep).min(words.len());
        let chosen: Vec<&String> = words.choose_multiple(rng, n).collect();
        Resolution::Expanded(branch(self, chosen, |q, word| {
            q.replace_nl(slot, word, word);
            q.layer += 1.0;
        }))
    }

    fn fill_adjective<R: Rng>(mut self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let Some(word) = ctx.phrases.adjectives(slot).and_then(|w| w.choose(rng)) else {
            return Resolution::Expanded(Vec::new());
        };
        self.replace_nl(slot, word, word);
        self.layer += 1.0;
        Resolution::Expanded(vec![self])
    }

    fn fill_and_or<R: Rng>(self, slot: &str, ctx: &FillContext<'_>, rng: &mut R) -> Resolution {
        let words: Vec<&str> = if rng.random::<f64>() < ctx.settings.or_p {
            vec!["and", "or"]
        } else {
            vec!["and"]
        };
        Resolution::Expanded(branch(self, words, |q, word| {
            let upper = word.to_uppercase();
            q.replace_nl(slot, word, word);
            q.replace_sql(slot, &upper, &upper);
            q.layer += 1.0;
        }))
    }
}
