//! Training loop state
//!
//! Everything needed to resume a crashed training run: the epoch counters,
//! the patience/decay counters and, crucially, the epoch seed — logging the
//! seed is enough to replay an epoch's exact minibatch order.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest valid epoch seed (31-bit, matching the `[1, 2^31 - 1]` draw)
pub const MAX_EPOCH_SEED: u32 = 2_147_483_647;

/// Mutable record owned exclusively by the training task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Completed-or-current epoch number; 0 before the first epoch starts
    pub epoch_num: u32,

    /// Minibatches consumed within the current epoch; doubles as the cursor
    /// position into the shuffled minibatch order
    pub steps_into_epoch: usize,

    /// Seed used to pack and shuffle this epoch's minibatches; persisting it
    /// is what makes crashed trainings resumable
    pub epoch_seed: u32,

    /// Consecutive dev checkpoints without improvement
    pub cur_attempt: u32,

    /// Number of learning-rate decays applied so far
    pub num_times_lr_decayed: u32,
}

impl TrainingState {
    /// Fresh state with the given initial epoch seed
    pub fn new(epoch_seed: u32) -> Self {
        Self {
            epoch_num: 0,
            steps_into_epoch: 0,
            epoch_seed,
            cur_attempt: 0,
            num_times_lr_decayed: 0,
        }
    }

    /// Write the state as JSON, typically next to the model file
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("state serialization failed: {e}")))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Read a previously saved state
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Serialization(format!("state deserialization failed: {e}")))
    }
}
