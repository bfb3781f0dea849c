//! Parallel training corpus
//!
//! This module provides everything the training task needs to get sentences
//! off disk and into memory:
//! - `Sentence`: an opaque tokenized unit (token ids, measurable length)
//! - `SentenceReader`: the narrow interface to format-specific readers
//! - `PlainTextReader`: bundled whitespace-token reader with a freezable
//!   vocabulary
//! - `ParallelCorpus`: paired source/target sentence lists with load-time
//!   filtering, sampling and length caps

mod reader;
mod store;

pub use reader::{PlainTextReader, SentenceReader, UNK_ID};
pub use store::{LoadOptions, ParallelCorpus};

/// A tokenized sentence.
///
/// Tokens are opaque vocabulary ids; the training loop only ever measures
/// length, it never interprets content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    tokens: Vec<u32>,
}

impl Sentence {
    /// Create a sentence from token ids
    pub fn new(tokens: Vec<u32>) -> Self {
        Self { tokens }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the sentence has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token ids
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }
}

impl From<Vec<u32>> for Sentence {
    fn from(tokens: Vec<u32>) -> Self {
        Self::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_length() {
        let sent = Sentence::new(vec![3, 1, 4, 1, 5]);
        assert_eq!(sent.len(), 5);
        assert!(!sent.is_empty());
    }

    #[test]
    fn test_sentence_from_vec() {
        let sent: Sentence = vec![1, 2].into();
        assert_eq!(sent.tokens(), &[1, 2]);
    }
}
