//! Background corpus regeneration
//!
//! When a reload command is configured, an external process rewrites the
//! training data once per epoch. The process runs in the background; the
//! epoch scheduler polls it without blocking and falls back to the previous
//! epoch's data when regeneration is still in flight. Only two points ever
//! block: the initial epoch-0 generation, and the relaunch after a gap with
//! no outstanding job.

use crate::error::{Error, Result};
use std::process::{Child, Command, ExitStatus};

/// Non-blocking view of a background job's lifecycle.
#[derive(Debug)]
pub enum JobStatus {
    /// Still running
    Pending,
    /// Exited with the given status
    Completed(ExitStatus),
}

/// A regeneration subprocess with a pollable completion state.
#[derive(Debug)]
pub struct BackgroundJob {
    child: Child,
}

impl BackgroundJob {
    /// Launch `<command> --epoch <N>` through the shell.
    ///
    /// `"true"` is a valid no-op placeholder command.
    pub fn spawn(command: &str, epoch_num: u32) -> Result<Self> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(format!("{command} --epoch {epoch_num}"))
            .spawn()
            .map_err(|e| Error::Augmentation(format!("{command}: {e}")))?;
        Ok(Self { child })
    }

    /// Check for completion without blocking
    pub fn poll(&mut self) -> Result<JobStatus> {
        match self.child.try_wait()? {
            Some(status) => Ok(JobStatus::Completed(status)),
            None => Ok(JobStatus::Pending),
        }
    }

    /// Block until the job exits
    pub fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait()?)
    }
}

/// What an epoch-boundary refresh decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The previous regeneration finished: reload the corpus from disk, the
    /// next regeneration is already running in the background
    Reloaded,
    /// Regeneration still in flight: keep training on the previous epoch's
    /// data
    StaleData,
}

/// Drives the per-epoch regeneration command.
pub struct AugmentationPipeline {
    command: String,
    job: Option<BackgroundJob>,
}

impl AugmentationPipeline {
    /// Create a pipeline for the given regeneration command
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            job: None,
        }
    }

    /// The configured regeneration command
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Generate epoch-0 data synchronously, before the corpus is first read.
    pub fn run_initial(&mut self) -> Result<()> {
        if self.job.is_none() {
            println!("initial augmentation");
            let mut job = BackgroundJob::spawn(&self.command, 0)?;
            job.wait()?;
            self.job = Some(job);
        }
        Ok(())
    }

    /// Called at each epoch advance with the pre-increment epoch number.
    ///
    /// With no outstanding job (first advance after a reload-triggered gap)
    /// this blocks until fresh data exists, mirroring construction. Otherwise
    /// it polls: a finished job means reload-and-relaunch, a running one
    /// means stale data. The exit status value is not inspected, only
    /// completion.
    pub fn refresh(&mut self, epoch_num: u32) -> Result<RefreshOutcome> {
        let mut job = match self.job.take() {
            Some(job) => job,
            None => {
                let mut job = BackgroundJob::spawn(&self.command, epoch_num)?;
                job.wait()?;
                job
            }
        };

        match job.poll()? {
            JobStatus::Completed(_) => {
                self.job = Some(BackgroundJob::spawn(&self.command, epoch_num)?);
                Ok(RefreshOutcome::Reloaded)
            }
            JobStatus::Pending => {
                self.job = Some(job);
                Ok(RefreshOutcome::StaleData)
            }
        }
    }
}
