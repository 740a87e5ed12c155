//! Documents, entities, mentions and gold relation labels.
//!
//! # Layout
//!
//! ```text
//! Document
//! ├── sents:     [[word, ...], ...]          sentence → word
//! ├── vertexSet: [[mention, ...], ...]       entity   → mention
//! └── labels:    [{h, t, r, evidence}, ...]  optional gold facts
//! ```
//!
//! A mention addresses words by `(sent_id, [start, end))`; the end index is
//! exclusive. Entity ids are positions in `vertexSet` and are stable for the
//! lifetime of the document.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Index of an entity in its document's entity list.
pub type EntityId = usize;

/// A sentence is an ordered sequence of words.
pub type Sentence = Vec<String>;

/// An ordered (head, tail) entity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairId {
    /// Head entity.
    pub head: EntityId,
    /// Tail entity.
    pub tail: EntityId,
}

impl PairId {
    /// Create a pair.
    #[must_use]
    pub const fn new(head: EntityId, tail: EntityId) -> Self {
        Self { head, tail }
    }

    /// True for `(i, i)`.
    #[must_use]
    pub const fn is_self_pair(&self) -> bool {
        self.head == self.tail
    }
}

impl From<(EntityId, EntityId)> for PairId {
    fn from((head, tail): (EntityId, EntityId)) -> Self {
        Self::new(head, tail)
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.head, self.tail)
    }
}

/// One textual occurrence of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Surface form, informational only.
    #[serde(default)]
    pub name: String,
    /// Sentence the mention lives in.
    pub sent_id: usize,
    /// Word span `[start, end)` inside the sentence.
    #[serde(rename = "pos")]
    pub span: (usize, usize),
    /// Entity type label (e.g. `PER`, `ORG`).
    #[serde(rename = "type", default)]
    pub entity_type: String,
}

impl Mention {
    /// Create a mention.
    #[must_use]
    pub fn new(sent_id: usize, start: usize, end: usize, entity_type: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            sent_id,
            span: (start, end),
            entity_type: entity_type.into(),
        }
    }

    /// Set the surface form.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// First word of the mention.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.0
    }

    /// Last word of the mention (inclusive). Only meaningful for non-empty spans.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.span.1.saturating_sub(1)
    }
}

/// A coreference cluster: every mention refers to the same real-world entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    /// Mentions in annotation order.
    pub mentions: Vec<Mention>,
}

impl Entity {
    /// Create an entity from its mentions.
    #[must_use]
    pub fn new(mentions: Vec<Mention>) -> Self {
        Self { mentions }
    }

    /// Type of the first mention, or `""` for an entity without mentions.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        self.mentions
            .first()
            .map(|m| m.entity_type.as_str())
            .unwrap_or("")
    }
}

/// A gold `(head, tail, relation)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldLabel {
    /// Head entity.
    #[serde(rename = "h")]
    pub head: EntityId,
    /// Tail entity.
    #[serde(rename = "t")]
    pub tail: EntityId,
    /// Relation name; must exist in the relation vocabulary.
    #[serde(rename = "r")]
    pub relation: String,
    /// Supporting sentence ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<usize>,
}

impl GoldLabel {
    /// Create a label without evidence.
    #[must_use]
    pub fn new(head: EntityId, tail: EntityId, relation: impl Into<String>) -> Self {
        Self {
            head,
            tail,
            relation: relation.into(),
            evidence: Vec::new(),
        }
    }

    /// The labelled pair.
    #[must_use]
    pub const fn pair(&self) -> PairId {
        PairId::new(self.head, self.tail)
    }
}

/// One annotated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document title, used to look up external per-document tables.
    #[serde(default)]
    pub title: String,
    /// Sentences of words.
    pub sents: Vec<Sentence>,
    /// Entities; the index is the entity id.
    #[serde(rename = "vertexSet")]
    pub entities: Vec<Entity>,
    /// Gold labels. `None` for unlabeled documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<GoldLabel>>,
}

impl Document {
    /// Create an unlabeled document.
    #[must_use]
    pub fn new(title: impl Into<String>, sents: Vec<Sentence>, entities: Vec<Entity>) -> Self {
        Self {
            title: title.into(),
            sents,
            entities,
            labels: None,
        }
    }

    /// Attach gold labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<GoldLabel>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Gold labels, empty when the document is unlabeled.
    #[must_use]
    pub fn gold(&self) -> &[GoldLabel] {
        self.labels.as_deref().unwrap_or(&[])
    }

    /// True when the document carries at least one gold label.
    #[must_use]
    pub fn has_labels(&self) -> bool {
        !self.gold().is_empty()
    }

    /// Drop gold labels. Returns the removed labels.
    pub fn strip_labels(&mut self) -> Option<Vec<GoldLabel>> {
        self.labels.take()
    }

    /// Total number of words over all sentences.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.sents.iter().map(Vec::len).sum()
    }

    /// Check that every mention addresses existing words and every label
    /// addresses existing entities.
    pub fn validate(&self) -> Result<()> {
        for (e, entity) in self.entities.iter().enumerate() {
            for (m, mention) in entity.mentions.iter().enumerate() {
                self.validate_mention(e, m, mention)?;
            }
        }

        let entity_count = self.entity_count();
        for label in self.gold() {
            for entity in [label.head, label.tail] {
                if entity >= entity_count {
                    return Err(Error::UnknownEntity {
                        title: self.title.clone(),
                        entity,
                        entity_count,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_mention(&self, entity: usize, index: usize, mention: &Mention) -> Result<()> {
        let invalid = |reason: String| Error::InvalidMention {
            title: self.title.clone(),
            entity,
            mention: index,
            reason,
        };

        let sentence = self.sents.get(mention.sent_id).ok_or_else(|| {
            invalid(format!(
                "sentence {} out of range ({} sentences)",
                mention.sent_id,
                self.sents.len()
            ))
        })?;

        let (start, end) = mention.span;
        if start >= end {
            return Err(invalid(format!("empty word span [{}, {})", start, end)));
        }
        if end > sentence.len() {
            return Err(invalid(format!(
                "word span [{}, {}) exceeds sentence length {}",
                start,
                end,
                sentence.len()
            )));
        }
        Ok(())
    }
}
