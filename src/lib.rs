//! # Traducir: Training-Loop Control for Neural Machine Translation
//!
//! Traducir manages epochs, minibatch ordering, learning-rate decay, early
//! stopping, checkpointing and optional background corpus regeneration for a
//! sequence-to-sequence model trained by gradient descent. The model itself,
//! the batching strategy, the corpus file formats and the evaluation metrics
//! are external collaborators consumed through narrow trait interfaces.
//!
//! ## Architecture
//!
//! - **corpus**: parallel sentence store and reader interface
//! - **batch**: minibatches and the batch-packer interface
//! - **model**: the model interface and tagged loss values
//! - **eval**: dev-set evaluation interface and score ordering
//! - **optim**: the optimizer interface the schedule controls
//! - **persist**: model parameter persistence interface
//! - **augment**: background data regeneration with non-blocking polling
//! - **train**: the training task state machine, schedule and driver
//! - **config**: declarative YAML configuration

pub mod augment;
pub mod batch;
pub mod config;
pub mod corpus;
pub mod eval;
pub mod model;
pub mod optim;
pub mod persist;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use batch::{Batch, Batcher, SrcBatcher};
pub use config::TrainingConfig;
pub use corpus::{ParallelCorpus, PlainTextReader, Sentence, SentenceReader};
pub use error::{Error, Result};
pub use eval::{DevTask, Score};
pub use model::{Detached, LossCalculator, LossValue, MleLoss, TranslationModel};
pub use optim::Optimizer;
pub use train::{
    LossRecord, SimpleTrainingRegimen, SimpleTrainingTask, TrainingState, TrainingTask,
};
