//! Configuration validation
//!
//! Collects every violation before failing, so a bad config surfaces all its
//! problems in one run.

use super::TrainingConfig;
use crate::error::{Error, Result};

/// Validate a training configuration.
///
/// Fatal at construction time; there is no retry for configuration errors.
pub fn validate_config(config: &TrainingConfig) -> Result<()> {
    let mut problems = Vec::new();

    if config.lr_decay > 1.0 || config.lr_decay <= 0.0 {
        problems.push("illegal lr_decay, must satisfy: 0.0 < lr_decay <= 1.0".to_string());
    }
    if config.run_for_epochs == 0 {
        problems.push("run_for_epochs must be at least 1".to_string());
    }
    if config.batch_size == 0 {
        problems.push("batch_size must be at least 1".to_string());
    }
    if config.patience == 0 {
        problems.push("patience must be at least 1".to_string());
    }
    if config.initial_patience == Some(0) {
        problems.push("initial_patience must be at least 1 when given".to_string());
    }
    if config.sample_train_sents == Some(0) {
        problems.push("sample_train_sents must be at least 1 when given".to_string());
    }
    if config.max_num_train_sents == Some(0) {
        problems.push("max_num_train_sents must be at least 1 when given".to_string());
    }
    if config.src_file.as_os_str().is_empty() {
        problems.push("src_file must not be empty".to_string());
    }
    if config.trg_file.as_os_str().is_empty() {
        problems.push("trg_file must not be empty".to_string());
    }
    if let Some(command) = &config.reload_command {
        if command.trim().is_empty() {
            problems.push("reload_command must not be blank when given".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TrainingConfig {
        TrainingConfig::new("train.ja", "train.en", 10)
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&base()).is_ok());
    }

    #[test]
    fn test_rejects_bad_lr_decay() {
        let mut config = base();
        config.lr_decay = 0.0;
        assert!(validate_config(&config).is_err());
        config.lr_decay = 1.5;
        assert!(validate_config(&config).is_err());
        config.lr_decay = -0.1;
        assert!(validate_config(&config).is_err());
        config.lr_decay = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_epochs() {
        let mut config = base();
        config.run_for_epochs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_reports_all_problems_at_once() {
        let mut config = base();
        config.lr_decay = 2.0;
        config.batch_size = 0;
        config.patience = 0;
        let err = validate_config(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("lr_decay"));
        assert!(msg.contains("batch_size"));
        assert!(msg.contains("patience"));
    }

    #[test]
    fn test_rejects_blank_reload_command() {
        let mut config = base();
        config.reload_command = Some("   ".to_string());
        assert!(validate_config(&config).is_err());
        config.reload_command = Some("true".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
