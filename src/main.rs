//! Traducir CLI
//!
//! Configuration tooling for the training library.
//!
//! # Usage
//!
//! ```bash
//! # Check a config for problems
//! traducir validate config.yaml
//!
//! # Summarize a config
//! traducir info config.yaml
//! ```

use clap::Parser;
use std::process::ExitCode;
use traducir::config::{load_config, validate_config, Cli, Command, ConfigArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args, cli.quiet),
        Command::Info(args) => run_info(args, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_validate(args: ConfigArgs, quiet: bool) -> traducir::Result<()> {
    let config = load_config(&args.config)?;
    validate_config(&config)?;
    if !quiet {
        println!("✓ {} is valid", args.config.display());
    }
    Ok(())
}

fn run_info(args: ConfigArgs, quiet: bool) -> traducir::Result<()> {
    let config = load_config(&args.config)?;
    validate_config(&config)?;
    if quiet {
        return Ok(());
    }

    println!("Training task ({})", args.config.display());
    if let Some(name) = &config.name {
        println!("  name: {name}");
    }
    println!("  corpus: {} || {}", config.src_file.display(), config.trg_file.display());
    println!("  epochs: {}", config.run_for_epochs);
    println!("  batch size: {}", config.batch_size);
    match config.dev_every {
        0 => println!("  dev checkpoints: at epoch end"),
        n => println!("  dev checkpoints: every {n} sentences"),
    }
    if config.lr_decay < 1.0 {
        println!(
            "  lr decay: x{} (patience {}, up to {} times{})",
            config.lr_decay,
            config.patience,
            config.lr_decay_times,
            match config.initial_patience {
                Some(ip) => format!(", initial patience {ip}"),
                None => String::new(),
            }
        );
    } else {
        println!("  lr decay: disabled");
    }
    if let Some(command) = &config.reload_command {
        println!("  data regeneration: {command}");
    }
    if let Some(path) = &config.model_file {
        println!("  model file: {}", path.display());
    }
    Ok(())
}
