//! Declarative YAML training configuration
//!
//! A training run is described by a `TrainingConfig` loaded from YAML:
//!
//! ```yaml
//! src_file: train.ja
//! trg_file: train.en
//! run_for_epochs: 20
//! dev_every: 0
//! batch_size: 32
//! lr_decay: 0.5
//! lr_decay_times: 3
//! patience: 1
//! ```
//!
//! Parsing is `serde_yaml`; a separate validation pass reports every
//! violation at once instead of stopping at the first.

mod cli;
mod validate;

pub use cli::{Cli, Command, ConfigArgs};
pub use validate::validate_config;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_batch_size() -> usize {
    32
}

fn default_lr_decay() -> f32 {
    1.0
}

fn default_lr_decay_times() -> u32 {
    3
}

fn default_patience() -> u32 {
    1
}

/// Complete description of one training task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Source-side training file
    pub src_file: PathBuf,

    /// Target-side training file
    pub trg_file: PathBuf,

    /// Number of corpus sweeps to train for
    pub run_for_epochs: u32,

    /// Dev checkpoint every n sentences (0: only at epoch end)
    #[serde(default)]
    pub dev_every: usize,

    /// Sentences per minibatch for the default batcher
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Learning-rate multiplier per decay; 1.0 disables decay
    #[serde(default = "default_lr_decay")]
    pub lr_decay: f32,

    /// Early stopping after decaying this many times
    #[serde(default = "default_lr_decay_times")]
    pub lr_decay_times: u32,

    /// Non-improving dev checkpoints tolerated before a decay
    #[serde(default = "default_patience")]
    pub patience: u32,

    /// If given, patience used before the first decay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_patience: Option<u32>,

    /// Restart the optimizer and revert weights to the best checkpoint when
    /// decaying (useful for Adam)
    #[serde(default)]
    pub restart_trainer: bool,

    /// Command regenerating the training data each epoch; `--epoch N` is
    /// appended. `"true"` reloads the data without regenerating it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_command: Option<String>,

    /// Path the best model checkpoint is kept under; absent means the task
    /// never asks for the model to be saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_file: Option<PathBuf>,

    /// Parameters to load before training starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretrained_model_file: Option<PathBuf>,

    /// Prepended to log output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Fixed RNG seed; absent draws from OS entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Randomly sample this many training pairs; takes precedence over
    /// `max_num_train_sents` when both are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_train_sents: Option<usize>,

    /// Keep only the first N training pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num_train_sents: Option<usize>,

    /// Drop pairs with source side longer than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_src_len: Option<usize>,

    /// Drop pairs with target side longer than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trg_len: Option<usize>,
}

impl TrainingConfig {
    /// Minimal config with defaults for everything optional
    pub fn new(
        src_file: impl Into<PathBuf>,
        trg_file: impl Into<PathBuf>,
        run_for_epochs: u32,
    ) -> Self {
        Self {
            src_file: src_file.into(),
            trg_file: trg_file.into(),
            run_for_epochs,
            dev_every: 0,
            batch_size: default_batch_size(),
            lr_decay: default_lr_decay(),
            lr_decay_times: default_lr_decay_times(),
            patience: default_patience(),
            initial_patience: None,
            restart_trainer: false,
            reload_command: None,
            model_file: None,
            pretrained_model_file: None,
            name: None,
            seed: None,
            sample_train_sents: None,
            max_num_train_sents: None,
            max_src_len: None,
            max_trg_len: None,
        }
    }

    /// Set the minibatch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the dev checkpoint interval in sentences
    pub fn with_dev_every(mut self, dev_every: usize) -> Self {
        self.dev_every = dev_every;
        self
    }

    /// Configure the decay schedule
    pub fn with_lr_decay(mut self, lr_decay: f32, lr_decay_times: u32) -> Self {
        self.lr_decay = lr_decay;
        self.lr_decay_times = lr_decay_times;
        self
    }

    /// Configure patience (and optionally a distinct initial patience)
    pub fn with_patience(mut self, patience: u32, initial_patience: Option<u32>) -> Self {
        self.patience = patience;
        self.initial_patience = initial_patience;
        self
    }

    /// Fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the data regeneration command
    pub fn with_reload_command(mut self, command: impl Into<String>) -> Self {
        self.reload_command = Some(command.into());
        self
    }

    /// Set the model checkpoint path
    pub fn with_model_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_file = Some(path.into());
        self
    }
}

/// Load a training configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::Config(format!(
            "failed to read config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    let config: TrainingConfig = serde_yaml::from_str(&contents)
        .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_yaml() {
        let yaml = r#"
src_file: train.ja
trg_file: train.en
run_for_epochs: 20
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.run_for_epochs, 20);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.lr_decay, 1.0);
        assert_eq!(config.patience, 1);
        assert!(config.reload_command.is_none());
    }

    #[test]
    fn test_load_full_yaml() {
        let yaml = r#"
src_file: train.ja
trg_file: train.en
run_for_epochs: 5
dev_every: 1000
batch_size: 64
lr_decay: 0.5
lr_decay_times: 2
patience: 3
initial_patience: 1
restart_trainer: true
reload_command: "true"
model_file: model.bin
name: demo
seed: 42
max_src_len: 80
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dev_every, 1000);
        assert_eq!(config.initial_patience, Some(1));
        assert!(config.restart_trainer);
        assert_eq!(config.reload_command.as_deref(), Some("true"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_src_len, Some(80));
    }

    #[test]
    fn test_load_rejects_bad_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"src_file: [unclosed").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = TrainingConfig::new("a", "b", 3)
            .with_batch_size(8)
            .with_lr_decay(0.5, 2)
            .with_patience(2, Some(1))
            .with_seed(7);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.lr_decay_times, 2);
        assert_eq!(config.initial_patience, Some(1));
        assert_eq!(config.seed, Some(7));
    }
}
