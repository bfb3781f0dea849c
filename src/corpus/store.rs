//! Corpus store
//!
//! Loads paired source/target sentence lists once, with optional sampling,
//! sentence-count caps and length filtering. A source/target mismatch is a
//! fatal configuration error, never silently truncated.

use super::{Sentence, SentenceReader};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use std::path::Path;

/// Options controlling which sentences survive corpus loading
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Randomly sample this many sentence pairs (without replacement)
    pub sample_train_sents: Option<usize>,

    /// Keep only the first N sentence pairs
    pub max_num_train_sents: Option<usize>,

    /// Drop pairs whose source side exceeds this many tokens
    pub max_src_len: Option<usize>,

    /// Drop pairs whose target side exceeds this many tokens
    pub max_trg_len: Option<usize>,
}

impl LoadOptions {
    /// Create options that keep every sentence pair
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample N pairs without replacement
    pub fn with_sample(mut self, n: usize) -> Self {
        self.sample_train_sents = Some(n);
        self
    }

    /// Cap the corpus at the first N pairs
    pub fn with_max_sents(mut self, n: usize) -> Self {
        self.max_num_train_sents = Some(n);
        self
    }

    /// Cap source sentence length
    pub fn with_max_src_len(mut self, n: usize) -> Self {
        self.max_src_len = Some(n);
        self
    }

    /// Cap target sentence length
    pub fn with_max_trg_len(mut self, n: usize) -> Self {
        self.max_trg_len = Some(n);
        self
    }
}

/// Paired source/target sentence lists of equal length.
#[derive(Debug, Clone, Default)]
pub struct ParallelCorpus {
    src: Vec<Sentence>,
    trg: Vec<Sentence>,
}

impl ParallelCorpus {
    /// Build a corpus from already-read sentence lists.
    ///
    /// Fails if the two sides have different lengths.
    pub fn from_sents(src: Vec<Sentence>, trg: Vec<Sentence>) -> Result<Self> {
        if src.len() != trg.len() {
            return Err(Error::CorpusMismatch(format!(
                "training src sentences don't match trg sentences: {} != {}",
                src.len(),
                trg.len()
            )));
        }
        Ok(Self { src, trg })
    }

    /// Load a parallel corpus from disk through the reader collaborators.
    ///
    /// Sampling and count caps require the declared sentence counts of both
    /// files to agree; a mismatch discovered there, or mid-stream during
    /// paired iteration, is fatal.
    pub fn load(
        src_reader: &mut dyn SentenceReader,
        trg_reader: &mut dyn SentenceReader,
        src_file: &Path,
        trg_file: &Path,
        opts: &LoadOptions,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let filter_ids: Option<Vec<usize>> = if let Some(n) = opts.sample_train_sents {
            let src_len = src_reader.count_sents(src_file)?;
            let trg_len = trg_reader.count_sents(trg_file)?;
            if src_len != trg_len {
                return Err(Error::CorpusMismatch(format!(
                    "training src sentences don't match trg sentences: {} != {}",
                    src_len, trg_len
                )));
            }
            Some(rand::seq::index::sample(rng, src_len, n.min(src_len)).into_vec())
        } else if let Some(n) = opts.max_num_train_sents {
            let src_len = src_reader.count_sents(src_file)?;
            let trg_len = trg_reader.count_sents(trg_file)?;
            if src_len != trg_len {
                return Err(Error::CorpusMismatch(format!(
                    "training src sentences don't match trg sentences: {} != {}",
                    src_len, trg_len
                )));
            }
            Some((0..n.min(trg_len)).collect())
        } else {
            None
        };

        let src_sents = src_reader.read_sents(src_file, filter_ids.as_deref())?;
        let trg_sents = trg_reader.read_sents(trg_file, filter_ids.as_deref())?;

        let mut src = Vec::new();
        let mut trg = Vec::new();
        let mut src_it = src_sents.into_iter();
        let mut trg_it = trg_sents.into_iter();
        loop {
            match (src_it.next(), trg_it.next()) {
                (Some(s), Some(t)) => {
                    let src_len_ok = opts.max_src_len.is_none_or(|max| s.len() <= max);
                    let trg_len_ok = opts.max_trg_len.is_none_or(|max| t.len() <= max);
                    if src_len_ok && trg_len_ok {
                        src.push(s);
                        trg.push(t);
                    }
                }
                (None, None) => break,
                _ => {
                    return Err(Error::CorpusMismatch(
                        "one side of the training corpus ended before the other".to_string(),
                    ))
                }
            }
        }

        Ok(Self { src, trg })
    }

    /// Number of parallel sentence pairs
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// True if the corpus holds no pairs
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Source sentences
    pub fn src(&self) -> &[Sentence] {
        &self.src
    }

    /// Target sentences
    pub fn trg(&self) -> &[Sentence] {
        &self.trg
    }
}
