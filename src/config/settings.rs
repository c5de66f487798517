//! TOML-based configuration for sqlsynth.
//!
//! Supports a config file (sqlsynth.toml) with environment variable expansion
//! in path values.
//!
//! Example configuration:
//! ```toml
//! [generation]
//! db = "mountain_climber"
//! query_bound = 5000
//! threshold = 6
//! a = 0.081
//! b = 0.767
//! fill_literals = true
//!
//! [paths]
//! templates = "data/templates/*.txt"
//! dictionary = "data/slot_fill_dict.txt"
//! db_dir = "${SPIDER_HOME}/database/mountain_climber"
//!
//! [paraphrase]
//! ppdb = "data/ppdb_dict.json"
//! pp_scale = 1
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Expansion and emission parameters.
    pub generation: GenerationSettings,

    /// Input and output locations.
    pub paths: PathSettings,

    /// Paraphraser configuration.
    pub paraphrase: ParaphraseSettings,
}

/// Parameters steering the template expansion search.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Database identifier, used for default paths and output names.
    pub db: String,

    /// Soft cap on emitted samples per template.
    pub query_bound: usize,

    /// Layer below which every candidate is kept.
    pub threshold: f64,

    /// Constant term of the keep probability `a + b / layer`.
    pub a: f64,

    /// Decay term of the keep probability `a + b / layer`.
    pub b: f64,

    pub func_boost: f64,
    pub argmax_boost: f64,
    pub join_boost: f64,

    /// Layer boost for MATCHFILL and the cap on its sampled alternatives.
    pub in_boost: f64,

    /// Probability of synthesizing a GROUP BY variant for a groupable query.
    pub group_by_p: f64,

    /// Probability of forking a `!=` variant for a non-numeric column comparison.
    pub unequal_p: f64,

    /// Probability that an `{andOrToken}` slot offers `or` as well as `and`.
    pub or_p: f64,

    /// Number of adjectives sampled for `{greatToken}`/`{smallToken}` at full keep probability.
    pub adjective_scale: f64,

    pub no_filter: bool,
    pub no_join: bool,
    pub no_group_by: bool,
    pub no_canonical: bool,

    /// Validate every emitted query against the SQLite database.
    pub validate: bool,

    /// Replace literal placeholders with values observed in the database.
    pub fill_literals: bool,

    /// Fraction of the corpus written to the validation split.
    pub validation_split: f64,

    pub seed: u64,

    /// Maximum recursion depth of the expansion search.
    pub max_depth: usize,

    /// Small run for debugging: low query bound and threshold, verbose logging.
    pub toy: bool,

    pub verbose: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            db: String::new(),
            query_bound: 5000,
            threshold: 6.0,
            a: 0.081,
            b: 0.767,
            func_boost: 3.0,
            argmax_boost: 3.0,
            join_boost: 2.0,
            in_boost: 3.0,
            group_by_p: 0.292,
            unequal_p: 0.2,
            or_p: 0.2,
            adjective_scale: 3.0,
            no_filter: false,
            no_join: false,
            no_group_by: false,
            no_canonical: false,
            validate: false,
            fill_literals: false,
            validation_split: 0.0,
            seed: 42,
            max_depth: 512,
            toy: false,
            verbose: false,
        }
    }
}

impl GenerationSettings {
    /// Apply toy-mode overrides if requested.
    pub fn apply_toy_mode(&mut self) {
        if self.toy {
            self.query_bound = 5;
            self.threshold = 3.0;
            self.verbose = true;
        }
    }

    /// Probability that a candidate of a slot survives pruning at `layer`.
    pub fn keep_probability(&self, layer: f64) -> f64 {
        if self.no_filter || layer < self.threshold {
            1.0
        } else {
            self.a + self.b / layer
        }
    }

    /// Number of candidates kept out of `candidates` at `layer`.
    pub fn sample_count(&self, candidates: usize, layer: f64) -> usize {
        scaled_count(candidates as f64, self.keep_probability(layer)).min(candidates)
    }

    /// Effective GROUP BY probability, zero when GROUP BY variants are disabled.
    pub fn group_by_probability(&self) -> f64 {
        if self.no_group_by {
            0.0
        } else {
            self.group_by_p
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, p) in [
            ("group_by_p", self.group_by_p),
            ("unequal_p", self.unequal_p),
            ("or_p", self.or_p),
            ("validation_split", self.validation_split),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SettingsError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if self.max_depth == 0 {
            return Err(SettingsError::InvalidConfig(
                "max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `ceil(scale * probability)` as a count.
pub fn scaled_count(scale: f64, probability: f64) -> usize {
    let n = (scale * probability).ceil();
    if n <= 0.0 {
        0
    } else {
        n as usize
    }
}

/// Input and output locations. Unset paths are derived from the database id.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Root of the Spider-style data layout.
    pub data_root: String,

    /// Template files (glob patterns allowed in the final path component).
    pub templates: Vec<String>,

    pub dictionary: Option<String>,

    /// Comparative/superlative adjective table (JSON); built-in table if unset.
    pub adjectives: Option<String>,

    pub schema: Option<String>,
    pub db_dir: Option<String>,
    pub out_dir: Option<String>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_root: "data/spider".to_string(),
            templates: vec!["data/templates/*.txt".to_string()],
            dictionary: Some("data/slot_fill_dict.txt".to_string()),
            adjectives: None,
            schema: None,
            db_dir: None,
            out_dir: None,
        }
    }
}

impl PathSettings {
    pub fn schema_path(&self, db: &str) -> Result<PathBuf, SettingsError> {
        match &self.schema {
            Some(p) => Ok(PathBuf::from(expand_env_vars(p)?)),
            None => Ok(self
                .root()?
                .join("schemas")
                .join(db)
                .join(format!("{db}.schema"))),
        }
    }

    pub fn db_dir(&self, db: &str) -> Result<PathBuf, SettingsError> {
        match &self.db_dir {
            Some(p) => Ok(PathBuf::from(expand_env_vars(p)?)),
            None => Ok(self.root()?.join("database").join(db)),
        }
    }

    pub fn out_dir(&self, db: &str) -> Result<PathBuf, SettingsError> {
        match &self.out_dir {
            Some(p) => Ok(PathBuf::from(expand_env_vars(p)?)),
            None => Ok(self.root()?.join("synthetic").join(db)),
        }
    }

    pub fn dictionary_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.dictionary
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    pub fn adjectives_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.adjectives
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Expand the template patterns into concrete, sorted file paths.
    pub fn template_files(&self) -> Result<Vec<PathBuf>, SettingsError> {
        let mut files = Vec::new();
        for pattern in &self.templates {
            let pattern = PathBuf::from(expand_env_vars(pattern)?);
            let name = pattern
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match name.split_once('*') {
                Some((prefix, suffix)) => {
                    let dir = pattern
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from("."));
                    for entry in fs::read_dir(&dir)? {
                        let path = entry?.path();
                        let file = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        if path.is_file()
                            && file.len() >= prefix.len() + suffix.len()
                            && file.starts_with(prefix)
                            && file.ends_with(suffix)
                        {
                            files.push(path);
                        }
                    }
                }
                None => files.push(pattern),
            }
        }
        files.sort();
        Ok(files)
    }

    fn root(&self) -> Result<PathBuf, SettingsError> {
        Ok(PathBuf::from(expand_env_vars(&self.data_root)?))
    }
}

/// Paraphraser configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParaphraseSettings {
    /// PPDB paraphrase dictionary (JSON); paraphrasing is disabled if unset.
    pub ppdb: Option<String>,

    /// Number of substitution paraphrases per query.
    pub pp_scale: usize,

    /// Number of random-drop paraphrases per query.
    pub rand_drop_scale: usize,

    /// Probability that each random-drop paraphrase is kept.
    pub rand_drop_p: f64,
}

impl Default for ParaphraseSettings {
    fn default() -> Self {
        Self {
            ppdb: None,
            pp_scale: 0,
            rand_drop_scale: 0,
            rand_drop_p: 0.875,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQLSYNTH_CONFIG`
    /// 2. `./sqlsynth.toml`
    /// 3. `~/.config/sqlsynth/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SQLSYNTH_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sqlsynth.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlsynth").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    pub fn ppdb_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.paraphrase
            .ppdb
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
