//! Per-document orchestration.
//!
//! ```text
//!            ┌──────────────┐
//! scores? ──▶│ PairSampler  │── pairs ──────────────────────┐
//!            └──────┬───────┘                               │
//!                   │ marker plan                           ▼
//!            ┌──────▼───────┐   ┌──────────────┐    ┌──────────────┐
//! document ─▶│ DocumentBuild│──▶│ MentionIndex │───▶│  Assembler   │──▶ Example
//!            └──────────────┘   └──────────────┘    └──────▲───────┘
//!            ┌──────────────┐                              │
//! labels ───▶│ LabelMatrix  │───────── rows ───────────────┘
//!            └──────────────┘
//! ```

use std::sync::Arc;

use rand::Rng;

use docrel_core::Document;

use crate::assembler::{assemble, Example};
use crate::builder::DocumentBuilder;
use crate::config::ExampleConfig;
use crate::error::{Error, Result};
use crate::indexer::index_entities;
use crate::labels::LabelMatrix;
use crate::sampler::SamplingPolicy;
use crate::scores::ScoreBook;
use crate::split::Split;
use crate::tokenizer::SubwordTokenizer;
use crate::vocab::RelationVocab;

/// Builds [`Example`]s from annotated documents.
///
/// Holds only read-only state, so one builder can serve many worker threads.
///
/// # Example
///
/// ```rust
/// use docrel::{Document, Entity, ExampleBuilder, ExampleConfig, GoldLabel, Mention};
/// use docrel::{MockTokenizer, RelationVocab, Split};
/// use rand::SeedableRng;
/// use std::sync::Arc;
///
/// let builder = ExampleBuilder::new(
///     ExampleConfig::default().with_token_capacity(16),
///     Arc::new(MockTokenizer::new()),
///     RelationVocab::from_names(["P17"]).unwrap(),
/// )
/// .unwrap();
/// let doc = Document::new(
///     "Skai TV",
///     vec![vec!["Skai".into(), "TV".into(), "is".into(), "Greek".into()]],
///     vec![
///         Entity::new(vec![Mention::new(0, 0, 2, "ORG")]),
///         Entity::new(vec![Mention::new(0, 3, 4, "LOC")]),
///     ],
/// )
/// .with_labels(vec![GoldLabel::new(0, 1, "P17")]);
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let example = builder.process(doc, Split::Valid, &mut rng).unwrap();
/// assert_eq!(example.token_count(), 16);
/// assert_eq!(example.pair_count(), 2);
/// ```
#[derive(Clone)]
pub struct ExampleBuilder {
    config: ExampleConfig,
    tokenizer: Arc<dyn SubwordTokenizer>,
    vocab: RelationVocab,
    scores: Option<Arc<ScoreBook>>,
}

impl std::fmt::Debug for ExampleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExampleBuilder")
            .field("config", &self.config)
            .field("relations", &self.vocab.len())
            .field("scores", &self.scores.is_some())
            .finish()
    }
}

impl ExampleBuilder {
    /// Create a builder without relevance scores.
    ///
    /// Fails when the configuration is invalid or its reserved tokens differ
    /// from the ones the tokenizer was built with.
    pub fn new(
        config: ExampleConfig,
        tokenizer: Arc<dyn SubwordTokenizer>,
        vocab: RelationVocab,
    ) -> Result<Self> {
        config.validate()?;
        if config.tokens != *tokenizer.special_tokens() {
            return Err(Error::config(format!(
                "configured special tokens {:?} do not match the tokenizer's {:?}",
                config.tokens,
                tokenizer.special_tokens()
            )));
        }
        Ok(Self {
            config,
            tokenizer,
            vocab,
            scores: None,
        })
    }

    /// Attach a relevance-score table; every split then uses score-guided
    /// selection.
    #[must_use]
    pub fn with_scores(mut self, scores: Arc<ScoreBook>) -> Self {
        self.scores = Some(scores);
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ExampleConfig {
        &self.config
    }

    /// The relation vocabulary.
    #[must_use]
    pub fn vocab(&self) -> &RelationVocab {
        &self.vocab
    }

    /// True when a score table is attached.
    #[must_use]
    pub fn has_scores(&self) -> bool {
        self.scores.is_some()
    }

    /// Turn one document into an example.
    ///
    /// Test documents lose their gold labels first. `rng` drives negative
    /// sampling on the training split and is untouched otherwise.
    pub fn process<R: Rng + ?Sized>(
        &self,
        mut doc: Document,
        split: Split,
        rng: &mut R,
    ) -> Result<Example> {
        if split == Split::Test && doc.strip_labels().is_some() {
            log::debug!("document '{}': dropped gold labels on test split", doc.title);
        }
        doc.validate()?;

        let scores = match &self.scores {
            Some(book) => Some(book.row(split, &doc.title)?),
            None => None,
        };
        let policy = SamplingPolicy::select(scores, split);

        let matrix = LabelMatrix::build(&doc, &self.vocab)?;
        let selection = policy.sample(
            doc.entity_count(),
            matrix.positive_pairs(),
            &self.config,
            rng,
        )?;

        let encoded = DocumentBuilder::new(self.tokenizer.as_ref(), self.config.token_capacity)
            .build(&doc, &selection.markers)?;
        let positions = index_entities(
            &doc.entities,
            &encoded.offsets,
            self.config.token_capacity,
            self.config.mention_capacity,
        );

        assemble(&doc, encoded, &positions, &selection, &matrix, &self.config)
    }
}
