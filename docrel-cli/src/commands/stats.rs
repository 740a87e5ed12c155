//! Stats command - relation label statistics

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use docrel::RelationStats;

use super::super::output::open_output;
use super::{load_input, load_relations};

/// Relation label statistics
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Annotation file (JSON array of documents)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Relation vocabulary (rel2id.json)
    #[arg(short, long, value_name = "FILE")]
    pub relations: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: StatsArgs) -> Result<(), String> {
    let vocab = load_relations(&args.relations)?;
    let documents = load_input(&args.input)?;
    let stats = RelationStats::collect(&documents, &vocab).map_err(|e| e.to_string())?;

    let mut out = open_output(args.output.as_deref())?;
    let write_err = |e: std::io::Error| format!("Failed to write output: {}", e);

    if args.json {
        let json = serde_json::to_string_pretty(&stats)
            .map_err(|e| format!("Failed to serialize stats: {}", e))?;
        writeln!(out, "{}", json).map_err(write_err)?;
    } else {
        writeln!(
            out,
            "{} documents, {} entities, {} facts",
            stats.documents,
            stats.entities,
            stats.fact_count()
        )
        .map_err(write_err)?;
        writeln!(
            out,
            "{} positive pairs, {} NA pairs",
            stats.positive_pairs, stats.na_pairs
        )
        .map_err(write_err)?;
        writeln!(out).map_err(write_err)?;
        writeln!(out, "{:>5}  {:<12} {:>8}", "id", "relation", "count").map_err(write_err)?;
        let mut rows: Vec<_> = stats.relations.iter().collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.index.cmp(&b.index)));
        for r in rows {
            writeln!(out, "{:>5}  {:<12} {:>8}", r.index, r.name, r.count).map_err(write_err)?;
        }
    }
    out.flush().map_err(write_err)
}
