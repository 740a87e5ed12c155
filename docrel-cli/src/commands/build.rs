//! Build command - turn an annotation file into JSON-lines examples

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use docrel::scores::{ScoreBook, ScoreSources};
use docrel::{
    Dataset, DatasetOptions, ExampleBuilder, ExampleConfig, HfTokenizer, Split, SubwordTokenizer,
};

use super::super::output::{color, open_output};
use super::{load_input, load_relations};

/// Build examples and write them as JSON lines
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Annotation file (JSON array of documents)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Split the file belongs to (train, valid, test)
    #[arg(short, long, default_value = "train")]
    pub split: Split,

    /// Example configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serialized tokenizer (tokenizer.json)
    #[arg(long, value_name = "FILE", conflicts_with = "vocab", required_unless_present = "vocab")]
    pub tokenizer: Option<PathBuf>,

    /// WordPiece vocabulary (vocab.txt)
    #[arg(long, value_name = "FILE")]
    pub vocab: Option<PathBuf>,

    /// Lowercase input before WordPiece (uncased vocabularies)
    #[arg(long, requires = "vocab")]
    pub lowercase: bool,

    /// Relation vocabulary (rel2id.json)
    #[arg(short, long, value_name = "FILE")]
    pub relations: PathBuf,

    /// Directory with {split}_scores.json and {split}_titles.json
    #[arg(long, value_name = "DIR")]
    pub scores: Option<PathBuf>,

    /// Override the token sequence length
    #[arg(long, value_name = "N")]
    pub max_length: Option<usize>,

    /// Emit (head_type, tail_type) per pair
    #[arg(long)]
    pub entity_types: bool,

    /// Seed for shuffling and negative sampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

pub fn run(args: BuildArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => ExampleConfig::load(path).map_err(|e| e.to_string())?,
        None => ExampleConfig::default(),
    };
    if let Some(length) = args.max_length {
        config = config.with_token_capacity(length);
    }
    if args.entity_types {
        config = config.with_entity_types(true);
    }
    config.validate().map_err(|e| e.to_string())?;

    let tokenizer: Arc<dyn SubwordTokenizer> = match (&args.tokenizer, &args.vocab) {
        (Some(path), _) => Arc::new(
            HfTokenizer::from_file(path, config.tokens.clone()).map_err(|e| e.to_string())?,
        ),
        (None, Some(path)) => Arc::new(
            HfTokenizer::from_vocab(path, args.lowercase, config.tokens.clone())
                .map_err(|e| e.to_string())?,
        ),
        (None, None) => return Err("Either --tokenizer or --vocab must be specified".to_string()),
    };
    let vocab = load_relations(&args.relations)?;

    let mut builder =
        ExampleBuilder::new(config, tokenizer, vocab).map_err(|e| e.to_string())?;
    if let Some(dir) = &args.scores {
        let sources = ScoreSources::from_dir(dir);
        if let Some(book) = ScoreBook::load(&sources).map_err(|e| e.to_string())? {
            builder = builder.with_scores(Arc::new(book));
        } else {
            eprintln!(
                "{} incomplete score files in {}, using {} pair sampling",
                color("33", "warn:"),
                dir.display(),
                args.split
            );
        }
    }

    let dataset = Dataset::from_documents(
        args.split,
        load_input(&args.input)?,
        DatasetOptions::for_split(args.split, args.seed),
    );

    let pb = if args.progress {
        let pb = ProgressBar::new(dataset.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?;
        pb.set_style(style.progress_chars("#>-"));
        Some(pb)
    } else {
        None
    };

    let examples = docrel::process_documents_with(
        &builder,
        dataset.documents(),
        args.split,
        args.seed,
        |_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        },
    )
    .map_err(|e| format!("Failed to build examples: {}", e))?;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let mut out = open_output(args.output.as_deref())?;
    for example in &examples {
        let line = serde_json::to_string(example)
            .map_err(|e| format!("Failed to serialize '{}': {}", example.title, e))?;
        writeln!(out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))?;
    }
    out.flush()
        .map_err(|e| format!("Failed to write output: {}", e))?;

    let pairs: usize = examples.iter().map(|e| e.pair_count()).sum();
    log::info!(
        "{}: wrote {} examples with {} pairs",
        args.split,
        examples.len(),
        pairs
    );
    if let Some(path) = &args.output {
        eprintln!(
            "{} {} examples ({} pairs) -> {}",
            color("32", "ok:"),
            examples.len(),
            pairs,
            path.display()
        );
    }
    Ok(())
}
