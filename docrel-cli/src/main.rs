//! docrel - relation extraction example builder
//!
//! Turns DocRED-style annotation files into fixed-shape training examples.
//!
//! # Usage
//!
//! ```bash
//! # Build training examples with a BERT vocabulary
//! docrel build -i train_annotated.json -s train --vocab vocab.txt -r rel2id.json -o train.jsonl
//!
//! # Use first-stage relevance scores for pair selection
//! docrel build -i dev.json -s valid --tokenizer tokenizer.json -r rel2id.json --scores scores/
//!
//! # Relation statistics
//! docrel stats -i train_annotated.json -r rel2id.json
//!
//! # Report every corrupt document
//! docrel validate -i dev.json -r rel2id.json
//! ```

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod output;
mod parser;

use parser::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Validate(args) => commands::validate::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", output::color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}

/// `-q` shows errors only, each `-v` raises the level; `RUST_LOG` wins.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
