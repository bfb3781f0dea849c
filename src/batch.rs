//! Minibatches and batch packing
//!
//! The packing/padding strategy is an external collaborator consumed through
//! the `Batcher` trait; the training task only requires that the two returned
//! batch lists are index-aligned. `SrcBatcher` is the bundled default:
//! source-length-sorted fixed-size groups, which keeps padding waste low.

use crate::corpus::Sentence;
use rand::rngs::StdRng;

/// A group of sentences processed in one optimizer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    sentences: Vec<Sentence>,
}

impl Batch {
    /// Create a batch from sentences
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Number of sentences in the batch
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// True if the batch holds no sentences
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Sentences in the batch
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Total number of tokens across all sentences
    pub fn num_tokens(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

/// Groups parallel sentences into index-aligned minibatch lists.
///
/// Invoked once per epoch; implementations may be stochastic, in which case
/// they must draw from the supplied RNG so that a logged epoch seed replays
/// the exact same batches.
pub trait Batcher: Send {
    /// Pack parallel sentence lists into paired batch lists.
    ///
    /// `src_batches[i]` pairs with `trg_batches[i]` for every `i`.
    fn pack(
        &self,
        src: &[Sentence],
        trg: &[Sentence],
        rng: &mut StdRng,
    ) -> (Vec<Batch>, Vec<Batch>);
}

/// Default batcher: sorts pairs by source length, then chunks into
/// fixed-size groups.
#[derive(Debug, Clone)]
pub struct SrcBatcher {
    batch_size: usize,
}

impl SrcBatcher {
    /// Create a batcher producing groups of up to `batch_size` sentences
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Configured group size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for SrcBatcher {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Batcher for SrcBatcher {
    fn pack(
        &self,
        src: &[Sentence],
        trg: &[Sentence],
        _rng: &mut StdRng,
    ) -> (Vec<Batch>, Vec<Batch>) {
        let mut order: Vec<usize> = (0..src.len()).collect();
        order.sort_by_key(|&i| src[i].len());

        let mut src_batches = Vec::new();
        let mut trg_batches = Vec::new();
        for chunk in order.chunks(self.batch_size) {
            src_batches.push(Batch::new(chunk.iter().map(|&i| src[i].clone()).collect()));
            trg_batches.push(Batch::new(chunk.iter().map(|&i| trg[i].clone()).collect()));
        }
        (src_batches, trg_batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn sent(len: usize) -> Sentence {
        Sentence::new(vec![1; len])
    }

    #[test]
    fn test_pack_chunks_by_batch_size() {
        let src: Vec<Sentence> = (0..7).map(|_| sent(3)).collect();
        let trg: Vec<Sentence> = (0..7).map(|_| sent(4)).collect();
        let mut rng = StdRng::seed_from_u64(0);

        let (src_batches, trg_batches) = SrcBatcher::new(3).pack(&src, &trg, &mut rng);

        assert_eq!(src_batches.len(), 3);
        assert_eq!(trg_batches.len(), 3);
        assert_eq!(src_batches[0].len(), 3);
        assert_eq!(src_batches[2].len(), 1);
    }

    #[test]
    fn test_pack_sorts_by_src_length() {
        let src = vec![sent(5), sent(1), sent(3)];
        let trg = vec![sent(2), sent(2), sent(2)];
        let mut rng = StdRng::seed_from_u64(0);

        let (src_batches, _) = SrcBatcher::new(2).pack(&src, &trg, &mut rng);

        assert_eq!(src_batches[0].sentences()[0].len(), 1);
        assert_eq!(src_batches[0].sentences()[1].len(), 3);
        assert_eq!(src_batches[1].sentences()[0].len(), 5);
    }

    #[test]
    fn test_pack_keeps_pairs_aligned() {
        // give each pair a recognizable token so alignment is checkable
        let src: Vec<Sentence> = (0..5).map(|i| Sentence::new(vec![i; i as usize + 1])).collect();
        let trg: Vec<Sentence> = (0..5).map(|i| Sentence::new(vec![i])).collect();
        let mut rng = StdRng::seed_from_u64(0);

        let (src_batches, trg_batches) = SrcBatcher::new(2).pack(&src, &trg, &mut rng);

        for (sb, tb) in src_batches.iter().zip(trg_batches.iter()) {
            assert_eq!(sb.len(), tb.len());
            for (s, t) in sb.sentences().iter().zip(tb.sentences().iter()) {
                assert_eq!(s.tokens()[0], t.tokens()[0]);
            }
        }
    }

    #[test]
    fn test_batch_num_tokens() {
        let batch = Batch::new(vec![sent(2), sent(3)]);
        assert_eq!(batch.num_tokens(), 5);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_empty_corpus_packs_to_no_batches() {
        let mut rng = StdRng::seed_from_u64(0);
        let (src_batches, trg_batches) = SrcBatcher::default().pack(&[], &[], &mut rng);
        assert!(src_batches.is_empty());
        assert!(trg_batches.is_empty());
    }
}
