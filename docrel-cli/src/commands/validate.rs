//! Validate command - report corrupt documents in annotation files

use std::path::PathBuf;

use clap::Parser;

use docrel::LabelMatrix;

use super::super::output::color;
use super::{load_input, load_relations};

/// Check annotation files for corrupt documents
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Annotation files (JSON arrays of documents)
    #[arg(short, long = "input", value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Relation vocabulary (rel2id.json)
    #[arg(short, long, value_name = "FILE")]
    pub relations: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<(), String> {
    let vocab = load_relations(&args.relations)?;
    let mut total_errors = 0;
    let mut total_documents = 0;

    for path in &args.inputs {
        let documents = load_input(path)?;
        for (i, doc) in documents.iter().enumerate() {
            total_documents += 1;
            let checked = doc
                .validate()
                .map_err(docrel::Error::from)
                .and_then(|()| LabelMatrix::build(doc, &vocab).map(|_| ()));
            if let Err(e) = checked {
                eprintln!(
                    "{} {}[{}] '{}': {}",
                    color("31", "error"),
                    path.display(),
                    i,
                    doc.title,
                    e
                );
                total_errors += 1;
            }
        }
    }

    println!(
        "Validated {} documents in {} file(s)",
        total_documents,
        args.inputs.len()
    );
    if total_errors > 0 {
        println!("{} {} corrupt documents", color("31", "x"), total_errors);
        return Err(format!("{} corrupt documents", total_errors));
    }
    println!("{} All valid", color("32", "ok:"));
    Ok(())
}
