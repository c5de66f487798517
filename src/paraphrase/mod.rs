//! NL paraphrasing of finished queries.

mod ppdb;

pub use ppdb::PpdbParaphraser;

use rand::rngs::StdRng;

#[derive(Debug, thiserror::Error)]
pub enum ParaphraseError {
    #[error("Failed to read paraphrase dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse paraphrase dictionary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces alternate phrasings of an NL token sequence.
///
/// The first returned string is always the unmodified input.
pub trait Paraphraser {
    fn paraphrases(&mut self, tokens: &[String], rng: &mut StdRng) -> Vec<String>;
}

/// Returns the input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParaphrase;

impl Paraphraser for NoParaphrase {
    fn paraphrases(&mut self, tokens: &[String], _rng: &mut StdRng) -> Vec<String> {
        vec![tokens.join(" ")]
    }
}
