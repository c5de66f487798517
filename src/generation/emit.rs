//! Post-processing of terminal queries into samples.

use super::{Generator, Sample, SampleRecord};
use crate::canonical::canonicalize;
use crate::query::{Query, Rejection};
use crate::sql::{sql_label, tokenize_nl, tokenize_sql};

impl Generator {
    /// Resolve, fill, validate, paraphrase and canonicalize one terminal
    /// query, appending one sample per paraphrase.
    pub(super) fn emit(&mut self, mut query: Query, samples: &mut Vec<Sample>) -> Result<(), Rejection> {
        query.check_terminal()?;
        query.resolve(&self.schema)?;

        if self.settings.fill_literals {
            let database = self.database.as_deref().ok_or(Rejection::NoLiteralSource)?;
            query.replace_values(database, &mut self.rng)?;
        }

        if self.settings.validate {
            let sql = self
                .placeholders
                .replace_all(&query.sql(), "\"placeholder\"")
                .into_owned();
            match self.database.as_deref() {
                Some(database) => database
                    .validate(&sql)
                    .map_err(|e| Rejection::ValidationFailed(format!("{sql}: {e}")))?,
                None => tracing::warn!("validation requested without a database"),
            }
        }

        let (nl_tokens, sql) = match (&query.nl_tokens_filled, query.filled_sql()) {
            (Some(nl), Some(sql)) if self.settings.fill_literals => (nl.clone(), sql),
            _ => (query.nl_tokens.clone(), query.sql()),
        };
        let paraphrases = self.paraphraser.paraphrases(&nl_tokens, &mut self.rng);

        let sql = if self.settings.no_canonical {
            sql
        } else {
            canonicalize(&sql, &self.canonical, &query.variables)
        };
        let sql = self.placeholders.replace_all(&sql, "\"value\"").into_owned();

        let label_sql = sql.replace('\'', "");
        let label = sql_label(&label_sql).map_err(|e| Rejection::Unlabelable {
            sql: label_sql.clone(),
            reason: e.to_string(),
        })?;

        let mut query_no_value = sql.clone();
        for value in query.variables.values().filter(|v| !v.is_empty()) {
            query_no_value = query_no_value.replace(value.as_str(), "value");
        }
        let query_no_value = query_no_value.replace("\"value\"", "value");

        for paraphrase in paraphrases {
            let question = self.placeholders.replace_all(&paraphrase, "value").into_owned();
            self.records.push(SampleRecord {
                db_id: self.settings.db.clone(),
                query: sql.clone(),
                query_no_value: query_no_value.clone(),
                query_toks: tokenize_sql(&sql),
                query_toks_no_value: tokenize_sql(&query_no_value),
                question_toks: tokenize_nl(&question),
                question: question.clone(),
                sql: label.clone(),
                variables: query.variables.clone(),
            });
            samples.push(Sample::new(question, sql.clone()));
        }
        Ok(())
    }
}
