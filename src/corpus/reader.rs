//! Sentence readers
//!
//! Format-specific corpus parsing lives behind the `SentenceReader` trait;
//! the training task only counts, reads and freezes. `PlainTextReader` is the
//! bundled implementation: one sentence per line, whitespace tokens, ids
//! assigned on first sight.

use super::Sentence;
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Vocabulary id reserved for unknown tokens after `freeze()`
pub const UNK_ID: u32 = 0;

/// Narrow interface to format-specific corpus readers.
///
/// Readers are stateful: reading may grow a vocabulary, and `freeze()` locks
/// it once the training corpus has been read so later re-reads (e.g. after
/// data regeneration) map unseen words to `UNK_ID` instead of growing ids.
pub trait SentenceReader: Send {
    /// Count sentences in a file without materializing them
    fn count_sents(&self, path: &Path) -> Result<usize>;

    /// Read sentences, optionally keeping only the given line indices
    fn read_sents(&mut self, path: &Path, filter_ids: Option<&[usize]>) -> Result<Vec<Sentence>>;

    /// Lock the vocabulary after the training corpus has been read
    fn freeze(&mut self);
}

/// Whitespace-tokenized plain-text reader with a growable vocabulary.
///
/// # Example
///
/// ```no_run
/// use traducir::corpus::{PlainTextReader, SentenceReader};
/// use std::path::Path;
///
/// let mut reader = PlainTextReader::new();
/// let sents = reader.read_sents(Path::new("train.en"), None)?;
/// reader.freeze();
/// # Ok::<(), traducir::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct PlainTextReader {
    vocab: HashMap<String, u32>,
    frozen: bool,
}

impl PlainTextReader {
    /// Create a reader with an empty, growable vocabulary
    pub fn new() -> Self {
        Self {
            vocab: HashMap::new(),
            frozen: false,
        }
    }

    /// Current vocabulary size, including the reserved `<unk>` slot
    pub fn vocab_size(&self) -> usize {
        self.vocab.len() + 1
    }

    /// Whether the vocabulary is locked
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn token_id(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }
        if self.frozen {
            return UNK_ID;
        }
        // id 0 is reserved for <unk>
        let id = self.vocab.len() as u32 + 1;
        self.vocab.insert(token.to_string(), id);
        id
    }
}

impl SentenceReader for PlainTextReader {
    fn count_sents(&self, path: &Path) -> Result<usize> {
        let file = File::open(path)?;
        Ok(BufReader::new(file).lines().count())
    }

    fn read_sents(&mut self, path: &Path, filter_ids: Option<&[usize]>) -> Result<Vec<Sentence>> {
        let keep: Option<HashSet<usize>> = filter_ids.map(|ids| ids.iter().copied().collect());
        let file = File::open(path)?;
        let mut sents = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if let Some(keep) = &keep {
                if !keep.contains(&idx) {
                    continue;
                }
            }
            let tokens = line
                .split_whitespace()
                .map(|tok| self.token_id(tok))
                .collect();
            sents.push(Sentence::new(tokens));
        }
        Ok(sents)
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_count_sents() {
        let file = fixture("a b c\nd e\nf\n");
        let reader = PlainTextReader::new();
        assert_eq!(reader.count_sents(file.path()).unwrap(), 3);
    }

    #[test]
    fn test_read_sents_tokenizes() {
        let file = fixture("the cat\nthe dog\n");
        let mut reader = PlainTextReader::new();
        let sents = reader.read_sents(file.path(), None).unwrap();

        assert_eq!(sents.len(), 2);
        assert_eq!(sents[0].len(), 2);
        // "the" gets the same id in both sentences
        assert_eq!(sents[0].tokens()[0], sents[1].tokens()[0]);
        // "cat" and "dog" get distinct ids
        assert_ne!(sents[0].tokens()[1], sents[1].tokens()[1]);
    }

    #[test]
    fn test_filter_ids() {
        let file = fixture("a\nb\nc\nd\n");
        let mut reader = PlainTextReader::new();
        let sents = reader.read_sents(file.path(), Some(&[1, 3])).unwrap();
        assert_eq!(sents.len(), 2);
    }

    #[test]
    fn test_freeze_maps_unknown_to_unk() {
        let train = fixture("hello world\n");
        let regen = fixture("hello mars\n");

        let mut reader = PlainTextReader::new();
        reader.read_sents(train.path(), None).unwrap();
        reader.freeze();

        let sents = reader.read_sents(regen.path(), None).unwrap();
        assert_ne!(sents[0].tokens()[0], UNK_ID);
        assert_eq!(sents[0].tokens()[1], UNK_ID);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = PlainTextReader::new();
        let err = reader.count_sents(Path::new("/nonexistent/corpus.txt"));
        assert!(err.is_err());
    }
}
