//! Corpus generation: the recursive expansion driver.
//!
//! ```text
//! template line ──► Query ──► join / argmax variants
//!                               │
//!                               ▼
//!                  expand: fill one slot, recurse per sibling
//!                               │ (no slot left)
//!                               ▼
//!     emit: resolve ─► literals ─► validate ─► paraphrase ─► canonicalize ─► label
//! ```
//!
//! Every failure below the template level is a [`Rejection`]: logged, and
//! the branch contributes no samples.

mod emit;
mod output;
mod sample;
mod template;

pub use output::OutputFiles;
pub use sample::{Sample, SampleRecord};
pub use template::{read_templates, split_template, verify_template};

use std::collections::BTreeSet;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::config::{GenerationSettings, Settings, SettingsError};
use crate::db::{Database, DatabaseError, SqliteDatabase};
use crate::paraphrase::{NoParaphrase, ParaphraseError, Paraphraser, PpdbParaphraser};
use crate::query::{
    has_slot, DictionaryError, FillContext, PhraseError, PhraseTables, Query, Rejection,
    Resolution, SlotDictionary,
};
use crate::schema::{CanonicalSchema, Schema, SchemaError};
use crate::sql::{tokenize_nl, tokenize_sql};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Phrase table error: {0}")]
    Phrase(#[from] PhraseError),

    #[error("Paraphraser error: {0}")]
    Paraphrase(#[from] ParaphraseError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid type tag pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to write: no samples generated")]
    Empty,
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Owns the inputs of one run and accumulates its corpus.
pub struct Generator {
    settings: GenerationSettings,
    schema: Schema,
    canonical: CanonicalSchema,
    dictionary: SlotDictionary,
    phrases: PhraseTables,
    paraphraser: Box<dyn Paraphraser>,
    database: Option<Box<dyn Database>>,
    rng: StdRng,
    /// Matches `TYPE@n` literal placeholders, longest type tag first.
    placeholders: Regex,
    samples: Vec<Sample>,
    records: Vec<SampleRecord>,
}

impl Generator {
    pub fn new(
        settings: GenerationSettings,
        schema: Schema,
        dictionary: SlotDictionary,
    ) -> GenerationResult<Self> {
        let placeholders = placeholder_pattern(&schema.types_by_length())?;
        Ok(Self {
            rng: StdRng::seed_from_u64(settings.seed),
            canonical: schema.canonical(),
            settings,
            schema,
            dictionary,
            phrases: PhraseTables::default(),
            paraphraser: Box::new(NoParaphrase),
            database: None,
            placeholders,
            samples: Vec::new(),
            records: Vec::new(),
        })
    }

    /// Load schema, dictionary, phrase tables, paraphraser and database as
    /// configured.
    pub fn from_settings(settings: &Settings) -> GenerationResult<Self> {
        let mut generation = settings.generation.clone();
        generation.apply_toy_mode();
        generation.validate()?;
        let db = generation.db.clone();

        let schema = Schema::from_file(settings.paths.schema_path(&db)?)?;
        let dictionary = match settings.paths.dictionary_path()? {
            Some(path) => SlotDictionary::from_file(path)?,
            None => SlotDictionary::new(),
        };
        let mut phrases = PhraseTables::default();
        if let Some(path) = settings.paths.adjectives_path()? {
            phrases = phrases.with_adjectives_from_file(path)?;
        }

        let needs_database = generation.fill_literals || generation.validate;
        let database = if needs_database {
            let db_dir = settings.paths.db_dir(&db)?;
            Some(SqliteDatabase::open_dir(db_dir, &schema)?)
        } else {
            None
        };

        let mut generator = Self::new(generation, schema, dictionary)?.with_phrases(phrases);
        if let Some(path) = settings.ppdb_path()? {
            generator = generator.with_paraphraser(PpdbParaphraser::from_file(path, &settings.paraphrase)?);
        }
        if let Some(database) = database {
            generator = generator.with_database(database);
        }
        Ok(generator)
    }

    pub fn with_phrases(mut self, phrases: PhraseTables) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_paraphraser(mut self, paraphraser: impl Paraphraser + 'static) -> Self {
        self.paraphraser = Box::new(paraphraser);
        self
    }

    pub fn with_database(mut self, database: impl Database + 'static) -> Self {
        self.database = Some(Box::new(database));
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// De-duplicated, sorted samples of the last run.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// JSON records, one per emitted paraphrase.
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Expand every template line into the corpus.
    ///
    /// Lines failing [`verify_template`] are logged and skipped. Returns the
    /// number of unique samples.
    pub fn generate_from_input<'l>(&mut self, lines: impl IntoIterator<Item = &'l str>) -> usize {
        self.samples.clear();
        self.records.clear();
        let table_count = self.schema.tables().len();

        for line in lines {
            if let Err(rejection) = verify_template(line) {
                rejection.log("template skipped");
                continue;
            }
            let Some((nl_parts, sql)) = split_template(line) else {
                continue;
            };
            let before = self.samples.len();

            for nl in nl_parts {
                let mut original = Query::new(nl, sql);
                tracing::debug!(nl = %original.nl(), "generating from template");

                let mut queries = original.create_join_placeholders(&self.settings, table_count);
                queries.extend(original.create_argmin_max(&self.settings));

                for query in queries {
                    let mut samples = Vec::new();
                    self.expand(query, &mut samples, 0);
                    tracing::debug!(count = samples.len(), total = self.samples.len() + samples.len(), "expanded");
                    self.samples.extend(samples);
                }
            }
            tracing::info!(count = self.samples.len() - before, "total count for template");
        }

        self.finish();
        self.samples.len()
    }

    /// Expand the templates of every configured template file.
    pub fn generate_from_files(&mut self, paths: &[PathBuf]) -> GenerationResult<usize> {
        let mut lines = Vec::new();
        for path in paths {
            tracing::info!(path = %path.display(), "reading templates");
            lines.extend(read_templates(path).map_err(|source| GenerationError::Io {
                path: path.clone(),
                source,
            })?);
        }
        Ok(self.generate_from_input(lines.iter().map(String::as_str)))
    }

    /// Fill one slot and recurse into every sibling, depth first.
    fn expand(&mut self, query: Query, samples: &mut Vec<Sample>, depth: usize) {
        if samples.len() >= self.settings.query_bound {
            return;
        }
        if depth > self.settings.max_depth {
            Rejection::DepthExceeded(self.settings.max_depth).log(&query.nl());
            return;
        }

        let mut order: Vec<usize> = query
            .nl_tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| has_slot(t))
            .map(|(i, _)| i)
            .collect();
        if order.is_empty() {
            self.finish_query(query, samples, depth);
            return;
        }
        order.shuffle(&mut self.rng);

        let mut query = query;
        for idx in order {
            let token = query.nl_tokens[idx].clone();
            let ctx = FillContext {
                schema: &self.schema,
                settings: &self.settings,
                dictionary: &self.dictionary,
                phrases: &self.phrases,
            };
            match query.fill_slot(&token, &ctx, &mut self.rng) {
                Ok(Resolution::Expanded(children)) => {
                    for child in children {
                        self.expand(child, samples, depth + 1);
                    }
                    return;
                }
                Ok(Resolution::Deferred(unchanged)) => query = unchanged,
                Err(rejection) => {
                    rejection.log(&token);
                    return;
                }
            }
        }
        Rejection::Stalled(query.nl()).log(&query.sql());
    }

    /// Emit a terminal query, then maybe derive its GROUP BY variant.
    fn finish_query(&mut self, query: Query, samples: &mut Vec<Sample>, depth: usize) {
        let group_by = match (&query.main_entity, query.groupable) {
            (Some(entity), true) => Some(group_by_variant(&query, entity)),
            _ => None,
        };

        let context = query.sql();
        if let Err(rejection) = self.emit(query, samples) {
            rejection.log(&context);
        }

        if let Some(variant) = group_by {
            if self.rng.random::<f64>() < self.settings.group_by_probability() {
                self.expand(variant, samples, depth + 1);
            }
        }
    }

    fn finish(&mut self) {
        let generated = self.samples.len();
        tracing::info!(generated, "total count generated from all templates");

        self.samples.sort();
        self.samples.dedup();
        tracing::info!(removed = generated - self.samples.len(), "removed duplicates");

        let nl: BTreeSet<&str> = self.samples.iter().map(|s| s.nl.as_str()).collect();
        let sql: BTreeSet<&str> = self.samples.iter().map(|s| s.sql.as_str()).collect();
        tracing::info!(unique_nl = nl.len(), unique_sql = sql.len(), "unique queries");
        if !sql.is_empty() {
            let average = nl.len() as f64 / sql.len() as f64;
            tracing::info!(average, "paraphrases on average for each SQL query");
        }
    }
}

/// `{groupByToken} E.{COL4} <nl>` / `SELECT E.{COL4} , <select list…> GROUP BY E.{COL4}`.
fn group_by_variant(query: &Query, entity: &str) -> Query {
    let sql = query.sql();
    let rest = sql.strip_prefix("SELECT ").unwrap_or(&sql);
    let nl = format!("{{groupByToken}} {entity}.{{COL4}} {}", query.nl());
    let sql = format!("SELECT {entity}.{{COL4}} , {rest} GROUP BY {entity}.{{COL4}}");

    let mut variant = query.clone();
    variant.nl_tokens = tokenize_nl(&nl);
    variant.sql_tokens = tokenize_sql(&sql);
    variant.groupable = false;
    variant
}

/// Regex matching `TYPE@n` for the given type tags, in the order given.
fn placeholder_pattern(types: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = types.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"(?:{})@\d+", alternatives.join("|")))
}
