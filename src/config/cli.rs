//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Traducir: training-loop orchestration for translation models
#[derive(Debug, Parser)]
#[command(name = "traducir", version, about)]
pub struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a training configuration for problems
    Validate(ConfigArgs),
    /// Print a summary of a training configuration
    Info(ConfigArgs),
}

/// Arguments naming a YAML training configuration
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Path to the YAML configuration file
    pub config: PathBuf,
}
