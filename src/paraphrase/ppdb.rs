//! Paraphrasing by dictionary substitution and random token drops.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::{ParaphraseError, Paraphraser};
use crate::config::ParaphraseSettings;

/// Paraphraser over a token → alternatives dictionary (PPDB format).
#[derive(Debug, Clone, Default)]
pub struct PpdbParaphraser {
    dictionary: BTreeMap<String, Vec<String>>,
    /// Next alternative per token; a token's list is shuffled on first use.
    position: HashMap<String, usize>,
    scale: usize,
    drop_scale: usize,
    drop_p: f64,
}

impl PpdbParaphraser {
    pub fn new(dictionary: BTreeMap<String, Vec<String>>, settings: &ParaphraseSettings) -> Self {
        Self {
            dictionary,
            position: HashMap::new(),
            scale: settings.pp_scale,
            drop_scale: settings.rand_drop_scale,
            drop_p: settings.rand_drop_p,
        }
    }

    /// Load the dictionary from JSON. With `pp_scale = 0` the file is not read.
    pub fn from_file<P: AsRef<Path>>(path: P, settings: &ParaphraseSettings) -> Result<Self, ParaphraseError> {
        if settings.pp_scale == 0 {
            tracing::info!("paraphrasing disabled");
            return Ok(Self::new(BTreeMap::new(), settings));
        }
        let dictionary = serde_json::from_str(&fs::read_to_string(path)?)?;
        tracing::info!("paraphrase dictionary loaded");
        Ok(Self::new(dictionary, settings))
    }

    /// Replace one random paraphrasable token, cycling through each token's
    /// alternatives before reusing any.
    fn substitute(&mut self, tokens: &[String], rng: &mut StdRng) -> Option<Vec<String>> {
        let candidates: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| self.dictionary.get(*t).is_some_and(|alts| !alts.is_empty()))
            .map(|(i, _)| i)
            .collect();
        let &index = candidates.choose(rng)?;
        let token = &tokens[index];

        let alternatives = self.dictionary.get_mut(token)?;
        if !self.position.contains_key(token) {
            alternatives.shuffle(rng);
        }
        let position = self.position.entry(token.clone()).or_insert(0);
        let replacement = alternatives[*position].clone();
        *position = (*position + 1) % alternatives.len();

        let mut paraphrase = tokens.to_vec();
        paraphrase[index] = replacement;
        Some(paraphrase)
    }
}

impl Paraphraser for PpdbParaphraser {
    fn paraphrases(&mut self, tokens: &[String], rng: &mut StdRng) -> Vec<String> {
        let mut variants = vec![tokens.to_vec()];
        for _ in 0..self.scale {
            if let Some(paraphrase) = self.substitute(tokens, rng) {
                variants.push(paraphrase);
            }
        }

        let mut out = Vec::new();
        for variant in variants {
            out.push(variant.join(" "));
            let drops = self.drop_scale.min(variant.len());
            let indices: Vec<usize> = (0..variant.len()).collect();
            for &drop in indices.choose_multiple(rng, drops) {
                if rng.random::<f64>() > self.drop_p {
                    continue;
                }
                let mut dropped = variant.clone();
                dropped.remove(drop);
                out.push(dropped.join(" "));
            }
        }
        out
    }
}
