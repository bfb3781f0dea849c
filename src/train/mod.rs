//! The training-loop control core
//!
//! This module is the heart of the crate:
//! - `TrainingState`: the resumable counters and epoch seed
//! - `SimpleTrainingTask`: epoch scheduling, minibatch cursor, loss
//!   aggregation and checkpointing over one parallel corpus
//! - `LearningSchedule`: patience-gated decay and early stopping
//! - `ProgressTracker`: loss aggregation, progress lines, dev gating
//! - `ListenerRegistry`: epoch-start notifications
//! - `SimpleTrainingRegimen`: the outer loop driving a task to completion
//!
//! # Example
//!
//! ```no_run
//! use traducir::config::TrainingConfig;
//! use traducir::corpus::PlainTextReader;
//! use traducir::train::{SimpleTrainingTask, SimpleTrainingRegimen};
//! # use traducir::model::{LossValue, TranslationModel, LossCalculator};
//! # use traducir::optim::Optimizer;
//! # use traducir::batch::Batch;
//! # struct MyModel;
//! # impl TranslationModel for MyModel {
//! #     fn calc_loss(&mut self, _: &Batch, _: &Batch, _: &dyn LossCalculator)
//! #         -> traducir::Result<LossValue> { Ok(LossValue::Scalar(0.0)) }
//! # }
//! # struct MyOpt;
//! # impl Optimizer for MyOpt {
//! #     fn lr(&self) -> f32 { 0.1 }
//! #     fn set_lr(&mut self, _: f32) {}
//! #     fn restart(&mut self) {}
//! # }
//!
//! let config = TrainingConfig::new("train.ja", "train.en", 20);
//! let task = SimpleTrainingTask::builder(config)
//!     .model(MyModel)
//!     .optimizer(MyOpt)
//!     .readers(PlainTextReader::new(), PlainTextReader::new())
//!     .build()?;
//!
//! let summary = SimpleTrainingRegimen::new(task).run()?;
//! println!("trained {} steps", summary.steps);
//! # Ok::<(), traducir::Error>(())
//! ```

mod events;
mod loss;
mod regimen;
mod schedule;
mod state;
mod task;
mod tracker;

pub use events::{EpochInfo, EpochListener, ListenerRegistry, LogListener};
pub use loss::{LossRecord, ADDITIONAL_LOSS_NAME, PRIMARY_LOSS_NAME};
pub use regimen::{RunSummary, SimpleTrainingRegimen};
pub use schedule::{LearningSchedule, ScheduleAction};
pub use state::{TrainingState, MAX_EPOCH_SEED};
pub use task::{SimpleTrainingTask, TaskBuilder, TrainingTask};
pub use tracker::ProgressTracker;
