//! Annotation file loading.
//!
//! Files are JSON arrays of DocRED documents:
//!
//! ```json
//! [{"title": "...", "sents": [["w", ...]], "vertexSet": [[{"sent_id": 0, "pos": [0, 2], "type": "ORG"}]],
//!   "labels": [{"h": 0, "t": 1, "r": "P17", "evidence": [0]}]}]
//! ```

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use docrel_core::Document;

use crate::error::{Error, Result};
use crate::split::Split;

/// Parse a JSON array of documents.
pub fn parse_documents(content: &str) -> Result<Vec<Document>> {
    serde_json::from_str(content).map_err(|e| Error::parse(format!("annotation JSON: {}", e)))
}

/// Read a JSON array of documents from disk.
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::dataset(format!("failed to read {}: {}", path.display(), e)))?;
    parse_documents(&content)
        .map_err(|e| Error::dataset(format!("{}: {}", path.display(), e)))
}

/// How a split's documents are prepared after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetOptions {
    /// Remove documents without gold labels.
    pub drop_unlabeled: bool,
    /// Shuffle document order with this seed.
    pub shuffle_seed: Option<u64>,
}

impl DatasetOptions {
    /// Keep everything in file order.
    #[must_use]
    pub const fn keep_all() -> Self {
        Self {
            drop_unlabeled: false,
            shuffle_seed: None,
        }
    }

    /// Training drops unlabeled documents and shuffles; other splits keep
    /// every document in file order.
    #[must_use]
    pub const fn for_split(split: Split, seed: u64) -> Self {
        match split {
            Split::Train => Self {
                drop_unlabeled: true,
                shuffle_seed: Some(seed),
            },
            Split::Valid | Split::Test => Self::keep_all(),
        }
    }
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self::keep_all()
    }
}

/// The documents of one split.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    split: Option<Split>,
    documents: Vec<Document>,
}

impl Dataset {
    /// Prepare already parsed documents.
    #[must_use]
    pub fn from_documents(split: Split, mut documents: Vec<Document>, options: DatasetOptions) -> Self {
        if options.drop_unlabeled {
            let before = documents.len();
            documents.retain(Document::has_labels);
            let dropped = before - documents.len();
            if dropped > 0 {
                log::info!("{}: dropped {} unlabeled documents", split, dropped);
            }
        }
        if let Some(seed) = options.shuffle_seed {
            documents.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        Self {
            split: Some(split),
            documents,
        }
    }

    /// Load and prepare a split from disk.
    pub fn load(path: impl AsRef<Path>, split: Split, options: DatasetOptions) -> Result<Self> {
        let path = path.as_ref();
        let documents = load_documents(path)?;
        log::info!(
            "Loaded {} {} documents from {}",
            documents.len(),
            split,
            path.display()
        );
        Ok(Self::from_documents(split, documents, options))
    }

    /// The split, if known.
    #[must_use]
    pub fn split(&self) -> Option<Split> {
        self.split
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when there are no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at an index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Iterate over documents.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// All documents.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Take the documents.
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
