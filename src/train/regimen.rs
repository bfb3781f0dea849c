//! The outer training loop
//!
//! Pulls minibatches, performs training steps, and triggers dev checkpoints
//! until the task signals it is done. Stopping is polled, never preemptive:
//! the current minibatch always completes.

use super::task::TrainingTask;
use crate::error::Result;

/// What a finished training run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Total minibatches processed
    pub steps: usize,
    /// Epoch the run ended in
    pub final_epoch: u32,
    /// True if the decay budget ran out before the epoch budget
    pub early_stopped: bool,
}

/// Drives a single training task to completion.
pub struct SimpleTrainingRegimen<T: TrainingTask> {
    task: T,
}

impl<T: TrainingTask> SimpleTrainingRegimen<T> {
    /// Wrap a task in a regimen
    pub fn new(task: T) -> Self {
        Self { task }
    }

    /// The wrapped task
    pub fn task(&self) -> &T {
        &self.task
    }

    /// The wrapped task, mutably
    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    /// Unwrap the task
    pub fn into_task(self) -> T {
        self.task
    }

    /// Run training until the task stops, checkpointing whenever due and
    /// persisting the model whenever a checkpoint asks for it.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut steps = 0;
        while !self.task.should_stop_training() {
            let (src, trg) = self.task.next_minibatch()?;
            self.task.training_step(&src, &trg)?;
            steps += 1;

            if self.task.checkpoint_needed() && self.task.checkpoint(true)? {
                self.task.persist_model()?;
            }
        }

        Ok(RunSummary {
            steps,
            final_epoch: self.task.state().epoch_num,
            early_stopped: self.task.early_stopping_reached(),
        })
    }
}
