//! Error types for Traducir

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus mismatch: {0}")]
    CorpusMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Evaluation error: {0}")]
    Eval(String),

    #[error("Augmentation command failed to launch: {0}")]
    Augmentation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
