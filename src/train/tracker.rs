//! Training progress tracking
//!
//! `ProgressTracker` aggregates per-epoch loss, prints periodic progress
//! lines, gates dev checkpoints on sentences processed, and owns the
//! best-dev-score-so-far comparison.

use super::events::EpochInfo;
use super::loss::LossRecord;
use crate::batch::Batch;
use crate::eval::Score;
use std::time::Instant;

/// Default number of sentences between train progress lines
const DEFAULT_REPORT_EVERY: usize = 1000;

/// Tracks loss, progress reporting and dev-checkpoint gating.
pub struct ProgressTracker {
    name: Option<String>,
    /// Dev checkpoint every n sentences; 0 means once per corpus sweep
    dev_every: usize,
    report_every: usize,

    epoch_num: u32,
    epoch_size: usize,
    epoch_sents: usize,
    epoch_words: usize,
    epoch_loss: LossRecord,

    sents_since_dev: usize,
    sents_since_report: usize,

    best_score: Option<Score>,
    pending_dev_score: Option<Score>,

    start: Instant,
}

impl ProgressTracker {
    /// Create a tracker.
    ///
    /// `dev_every` is in sentences; 0 gates dev checkpoints to one per full
    /// corpus sweep.
    pub fn new(dev_every: usize, name: Option<String>) -> Self {
        Self {
            name,
            dev_every,
            report_every: DEFAULT_REPORT_EVERY,
            epoch_num: 0,
            epoch_size: 0,
            epoch_sents: 0,
            epoch_words: 0,
            epoch_loss: LossRecord::new(),
            sents_since_dev: 0,
            sents_since_report: 0,
            best_score: None,
            pending_dev_score: None,
            start: Instant::now(),
        }
    }

    /// Override the progress-line interval (sentences); 0 disables lines
    pub fn with_report_every(mut self, sents: usize) -> Self {
        self.report_every = sents;
        self
    }

    fn log(&self, msg: &str) {
        match &self.name {
            Some(name) => println!("[{name}] {msg}"),
            None => println!("{msg}"),
        }
    }

    /// Reset per-epoch accumulators for a starting epoch
    pub fn new_epoch(&mut self, info: &EpochInfo) {
        self.epoch_num = info.epoch_num;
        self.epoch_size = info.num_sents;
        self.epoch_sents = 0;
        self.epoch_words = 0;
        self.epoch_loss = LossRecord::new();
    }

    /// Fold one training step's loss into the epoch aggregate
    pub fn update_epoch_loss(&mut self, src: &Batch, trg: &Batch, record: &LossRecord) {
        self.epoch_sents += src.len();
        self.sents_since_dev += src.len();
        self.sents_since_report += src.len();
        self.epoch_words += trg.num_tokens();
        self.epoch_loss.accumulate(record);
    }

    /// Print a progress line if enough sentences went by since the last one
    pub fn report_train_process(&mut self) {
        if self.report_every == 0 || self.sents_since_report < self.report_every {
            return;
        }
        self.sents_since_report = 0;

        let fraction = if self.epoch_size > 0 {
            self.epoch_sents as f64 / self.epoch_size as f64
        } else {
            0.0
        };
        let epoch_pos = self.epoch_num.saturating_sub(1) as f64 + fraction.min(1.0);
        let per_word = if self.epoch_words > 0 {
            self.epoch_loss.total() as f64 / self.epoch_words as f64
        } else {
            0.0
        };
        let breakdown: Vec<String> = self
            .epoch_loss
            .components()
            .iter()
            .map(|(n, v)| format!("{n}={v:.4}"))
            .collect();
        self.log(&format!(
            "Epoch {:.4}: loss/word={:.4} ({}) [{:.0}s]",
            epoch_pos,
            per_word,
            breakdown.join(" "),
            self.start.elapsed().as_secs_f64()
        ));
    }

    /// True when enough sentences have been processed since the last dev
    /// checkpoint
    pub fn should_report_dev(&self) -> bool {
        let threshold = if self.dev_every == 0 {
            self.epoch_size
        } else {
            self.dev_every
        };
        threshold > 0 && self.sents_since_dev >= threshold
    }

    /// Open a dev checkpoint window: resets the gate and any pending score
    pub fn new_dev(&mut self) {
        self.sents_since_dev = 0;
        self.pending_dev_score = None;
    }

    /// Record the primary dev score of the current checkpoint
    pub fn set_dev_score(&mut self, score: Score) {
        self.log(&format!("  dev {score}"));
        self.pending_dev_score = Some(score);
    }

    /// Log an auxiliary dev score; never feeds schedule decisions
    pub fn report_auxiliary_score(&self, score: &Score) {
        self.log(&format!("  dev (aux) {score}"));
    }

    /// Compare the pending dev score against the best so far, updating it on
    /// improvement.
    ///
    /// With no pending score there is nothing to compare and the checkpoint
    /// counts as improved.
    pub fn check_and_update_best(&mut self) -> bool {
        let Some(score) = self.pending_dev_score.take() else {
            return true;
        };
        let improved = match &self.best_score {
            None => true,
            Some(best) => score.better_than(best),
        };
        if improved {
            self.log(&format!("  best dev score so far: {score}"));
            self.best_score = Some(score);
        }
        improved
    }

    /// Best primary dev score recorded so far
    pub fn best_score(&self) -> Option<&Score> {
        self.best_score.as_ref()
    }

    /// Sentences processed in the current epoch
    pub fn epoch_sents(&self) -> usize {
        self.epoch_sents
    }

    /// Aggregate loss for the current epoch
    pub fn epoch_loss(&self) -> &LossRecord {
        &self.epoch_loss
    }
}
