//! Command implementations for the docrel CLI
//!
//! Each command has its own module with an `Args` struct and a `run`.

pub mod build;
pub mod stats;
pub mod validate;

use std::path::Path;

use docrel::{Document, RelationVocab};

/// Load a `rel2id.json` relation vocabulary.
pub(crate) fn load_relations(path: &Path) -> Result<RelationVocab, String> {
    RelationVocab::load(path)
        .map_err(|e| format!("Failed to load relations from {}: {}", path.display(), e))
}

/// Load an annotation file in file order.
pub(crate) fn load_input(path: &Path) -> Result<Vec<Document>, String> {
    docrel::load_documents(path).map_err(|e| e.to_string())
}
