//! Corpus files.
//!
//! `<db>_train.nl` / `<db>_train.sql` hold one sample per line, aligned by
//! line number; `train.json` holds the records. With a validation split the
//! shuffled head of both goes to `<db>_val.*` and `dev.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::{GenerationError, GenerationResult, Generator, Sample};

/// Paths written by [`Generator::write_output`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFiles {
    pub train: Vec<PathBuf>,
    pub validation: Vec<PathBuf>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerationError + '_ {
    move |source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Shuffle and split off the first `fraction` of `items`.
fn split_off_head<T, R: Rng>(items: &mut Vec<T>, fraction: f64, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    let split = ((fraction * items.len() as f64) as usize).min(items.len());
    let rest = items.split_off(split);
    std::mem::replace(items, rest)
}

fn write_pairs(dir: &Path, stem: &str, samples: &[Sample]) -> GenerationResult<Vec<PathBuf>> {
    let nl_path = dir.join(format!("{stem}.nl"));
    let sql_path = dir.join(format!("{stem}.sql"));
    let mut nl = fs::File::create(&nl_path).map_err(io_error(&nl_path))?;
    let mut sql = fs::File::create(&sql_path).map_err(io_error(&sql_path))?;
    for sample in samples {
        writeln!(nl, "{}", sample.nl).map_err(io_error(&nl_path))?;
        writeln!(sql, "{}", sample.sql).map_err(io_error(&sql_path))?;
    }
    Ok(vec![nl_path, sql_path])
}

fn write_json<T: Serialize>(path: PathBuf, items: &[T]) -> GenerationResult<PathBuf> {
    let json = serde_json::to_string_pretty(items).map_err(|e| GenerationError::Io {
        path: path.clone(),
        source: e.into(),
    })?;
    fs::write(&path, json).map_err(io_error(&path))?;
    Ok(path)
}

impl Generator {
    /// Write the corpus into `dir`, creating it if needed.
    pub fn write_output(&mut self, dir: &Path) -> GenerationResult<OutputFiles> {
        if self.samples.is_empty() {
            return Err(GenerationError::Empty);
        }
        fs::create_dir_all(dir).map_err(io_error(dir))?;
        tracing::info!(dir = %dir.display(), "writing corpus");

        let db = self.settings.db.clone();
        let split = self.settings.validation_split;
        let mut files = OutputFiles::default();

        let mut samples = self.samples.clone();
        let mut records = self.records.clone();
        if split > 0.0 {
            let val_samples = split_off_head(&mut samples, split, &mut self.rng);
            let val_records = split_off_head(&mut records, split, &mut self.rng);
            files.validation = write_pairs(dir, &format!("{db}_val"), &val_samples)?;
            files
                .validation
                .push(write_json(dir.join("dev.json"), &val_records)?);
        }

        files.train = write_pairs(dir, &format!("{db}_train"), &samples)?;
        files.train.push(write_json(dir.join("train.json"), &records)?);

        tracing::info!("finished output");
        Ok(files)
    }
}
