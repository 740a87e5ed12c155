//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand};

use crate::commands;

/// Relation extraction example builder
#[derive(Parser)]
#[command(name = "docrel")]
#[command(
    author,
    version,
    about = "Build fixed-shape document-level relation extraction examples",
    long_about = r#"
docrel - document-level relation extraction example builder

Each document becomes one example: entity-marked sub-word tokens padded or
truncated to a fixed length, mention offsets per entity, and a fixed number
of (head, tail) pair slots with multi-hot relation labels.

PAIR SELECTION:
  scores given   : top 2n pairs by first-stage relevance score
  train split    : all positives + sampled negatives
  valid/test     : every ordered pair

EXAMPLES:
  docrel build -i train_annotated.json -s train --vocab vocab.txt -r rel2id.json -o train.jsonl
  docrel stats -i train_annotated.json -r rel2id.json
  docrel validate -i dev.json -r rel2id.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build examples and write them as JSON lines
    #[command(visible_alias = "b")]
    Build(commands::build::BuildArgs),

    /// Relation label statistics
    Stats(commands::stats::StatsArgs),

    /// Check annotation files for corrupt documents
    #[command(visible_alias = "v")]
    Validate(commands::validate::ValidateArgs),
}
