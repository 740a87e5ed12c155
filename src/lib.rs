//! # docrel
//!
//! Fixed-shape training examples for document-level relation extraction.
//!
//! A DocRED-style document (sentences, entities with mentions, gold relation
//! facts) becomes one [`Example`]: a marked, sub-word tokenized token sequence
//! of length `L`, up to `M` mention offsets per entity, and a fixed number of
//! `(head, tail)` pair slots with multi-hot relation labels.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Pair selection | [`sampler`] | ordered pairs + entities to mark |
//! | Marking and tokenization | [`builder`] | `L` token ids, attention mask |
//! | Mention indexing | [`indexer`] | `M` offsets per entity |
//! | Labels | [`labels`] | `n × n × R` multi-hot matrix |
//! | Assembly | [`assembler`] | padded [`Example`] |
//!
//! Pairs are chosen per split: precomputed relevance scores keep the top
//! `2n` pairs; without scores, training keeps every positive plus sampled
//! negatives and evaluation keeps every ordered pair.
//!
//! ## Quick Start
//!
//! ```rust
//! use docrel::{Document, Entity, ExampleBuilder, ExampleConfig, Mention};
//! use docrel::{MockTokenizer, RelationVocab, Split};
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let builder = ExampleBuilder::new(
//!     ExampleConfig::default().with_token_capacity(32),
//!     Arc::new(MockTokenizer::new()),
//!     RelationVocab::from_names(["P17", "P131"]).unwrap(),
//! )
//! .unwrap();
//! let doc = Document::new(
//!     "Athens",
//!     vec![vec!["Athens".into(), "is".into(), "in".into(), "Greece".into()]],
//!     vec![
//!         Entity::new(vec![Mention::new(0, 0, 1, "LOC")]),
//!         Entity::new(vec![Mention::new(0, 3, 4, "LOC")]),
//!     ],
//! );
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let example = builder.process(doc, Split::Test, &mut rng).unwrap();
//! assert_eq!(example.label_mask.iter().filter(|&&m| m == 1).count(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): process batches on a rayon pool

#![warn(missing_docs)]

pub mod assembler;
pub mod batch;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod indexer;
pub mod labels;
pub mod processor;
pub mod sampler;
pub mod scores;
pub mod split;
pub mod stats;
pub mod tokenizer;
pub mod vocab;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use docrel::prelude::*;
    //!
    //! let vocab = RelationVocab::from_names(["P17"]).unwrap();
    //! assert_eq!(vocab.index_of("NA"), Some(0));
    //! ```
    pub use crate::assembler::Example;
    pub use crate::config::ExampleConfig;
    pub use crate::error::{Error, Result};
    pub use crate::processor::ExampleBuilder;
    pub use crate::split::Split;
    pub use crate::tokenizer::{HfTokenizer, MockTokenizer, SubwordTokenizer};
    pub use crate::vocab::RelationVocab;
    pub use docrel_core::{Document, Entity, GoldLabel, Mention, PairId};
}

// Re-exports
pub use docrel_core::{Document, Entity, EntityId, GoldLabel, Mention, PairId, Sentence};

pub use assembler::{assemble, Example, TypePair};
pub use batch::{process_documents, process_documents_with, ExampleBatch};
pub use builder::{DocumentBuilder, EncodedDocument, MarkerPlan};
pub use config::{ExampleConfig, SampleCapacity};
pub use dataset::{load_documents, parse_documents, Dataset, DatasetOptions};
pub use error::{Error, Result};
pub use indexer::{index_entities, MentionPositions, WordOffsets};
pub use labels::LabelMatrix;
pub use processor::ExampleBuilder;
pub use sampler::{PairSelection, PolicyKind, SamplingPolicy};
pub use scores::{ScoreBook, ScoreSources, SplitScores};
pub use split::Split;
pub use stats::{RelationCount, RelationStats};
pub use tokenizer::{HfTokenizer, MockTokenizer, SpecialTokens, SubwordTokenizer};
pub use vocab::{RelationVocab, NA};
