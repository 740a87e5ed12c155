//! Marker injection, flattening and fixed-length fitting.
//!
//! # Pipeline
//!
//! ```text
//! sents ──tokenize──▶ [[["Skai"], ["TV"]], ...]              sentence → word → sub-tokens
//!       ──markers───▶ [[["[unused1]", "Skai"], ["TV", "[unused2]"]], ...]
//!       ──flatten───▶ ["[CLS]", "[unused1]", "Skai", "TV", "[unused2]", ...]
//!       ──fit───────▶ exactly L tokens + attention mask
//! ```
//!
//! Markers are attached to the sub-token lists of individual words, so the
//! word structure is unchanged by injection. Word offsets are computed in a
//! single pass over the marked structure while flattening; an offset points
//! at the first token of the word, i.e. at an opening marker when one is
//! present.

use std::collections::BTreeMap;

use docrel_core::{Document, Entity, EntityId};

use crate::error::{Error, Result};
use crate::indexer::WordOffsets;
use crate::tokenizer::{SpecialTokens, SubwordTokenizer};

/// Dense ranking of the entities that receive boundary markers.
///
/// The entity of rank `r` uses marker `2r + 1` before each mention and
/// `2r + 2` after it, so marker ids never collide across entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerPlan {
    ranks: BTreeMap<EntityId, usize>,
}

impl MarkerPlan {
    /// Mark every entity of an `entity_count`-entity document; rank = id.
    #[must_use]
    pub fn all(entity_count: usize) -> Self {
        Self {
            ranks: (0..entity_count).map(|id| (id, id)).collect(),
        }
    }

    /// Mark the given entities. Ranks follow ascending entity id; duplicates
    /// are ignored.
    #[must_use]
    pub fn from_entities<I: IntoIterator<Item = EntityId>>(entities: I) -> Self {
        let mut ranks: BTreeMap<EntityId, usize> =
            entities.into_iter().map(|id| (id, 0)).collect();
        for (rank, slot) in ranks.values_mut().enumerate() {
            *slot = rank;
        }
        Self { ranks }
    }

    /// Rank of an entity, `None` if it is not marked.
    #[must_use]
    pub fn rank(&self, entity: EntityId) -> Option<usize> {
        self.ranks.get(&entity).copied()
    }

    /// `(open, close)` marker indices of an entity.
    #[must_use]
    pub fn markers(&self, entity: EntityId) -> Option<(usize, usize)> {
        self.rank(entity).map(|r| (2 * r + 1, 2 * r + 2))
    }

    /// Highest marker index in use (0 when nothing is marked).
    #[must_use]
    pub fn highest_marker(&self) -> usize {
        2 * self.ranks.len()
    }

    /// Number of marked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// True when no entity is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// `(entity, rank)` in ascending entity order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, usize)> + '_ {
        self.ranks.iter().map(|(&e, &r)| (e, r))
    }
}

/// A document split into sentence → word → sub-tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedDocument {
    /// Sub-tokens per word per sentence.
    pub sentences: Vec<Vec<Vec<String>>>,
}

impl TokenizedDocument {
    /// Tokenize every word of a document independently.
    pub fn tokenize(doc: &Document, tokenizer: &dyn SubwordTokenizer) -> Result<Self> {
        let sentences = doc
            .sents
            .iter()
            .map(|sent| {
                sent.iter()
                    .map(|word| tokenizer.tokenize(word))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sentences })
    }

    /// Total number of sub-tokens, markers included.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.iter().flatten().map(Vec::len).sum()
    }

    fn word_mut(&mut self, sentence: usize, word: usize) -> Result<&mut Vec<String>> {
        self.sentences
            .get_mut(sentence)
            .and_then(|s| s.get_mut(word))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "mention addresses missing word {} of sentence {}",
                    word, sentence
                ))
            })
    }

    /// Surround every mention of every marked entity with its markers.
    ///
    /// The opening marker is prefixed to the mention's first word and the
    /// closing marker appended to its last word. Entities are processed in
    /// rank order and mentions in annotation order.
    pub fn inject_markers(
        &mut self,
        entities: &[Entity],
        plan: &MarkerPlan,
        tokenizer: &dyn SubwordTokenizer,
    ) -> Result<()> {
        if let Some(capacity) = tokenizer.marker_capacity() {
            if plan.highest_marker() > capacity {
                return Err(Error::tokenizer(format!(
                    "{} marked entities need {} marker tokens, tokenizer provides {}",
                    plan.len(),
                    plan.highest_marker(),
                    capacity
                )));
            }
        }

        for (entity_id, rank) in plan.iter() {
            let entity = entities.get(entity_id).ok_or_else(|| {
                Error::invalid_input(format!(
                    "marker plan references entity {} of {}",
                    entity_id,
                    entities.len()
                ))
            })?;
            let open = tokenizer.marker_token(2 * rank + 1);
            let close = tokenizer.marker_token(2 * rank + 2);
            for mention in &entity.mentions {
                self.word_mut(mention.sent_id, mention.start())?
                    .insert(0, open.clone());
                self.word_mut(mention.sent_id, mention.last())?
                    .push(close.clone());
            }
        }
        Ok(())
    }

    /// Concatenate all sentences behind the start token, recording the
    /// absolute offset of every word.
    #[must_use]
    pub fn flatten(self, start: &str) -> (Vec<String>, WordOffsets) {
        let mut tokens = Vec::with_capacity(self.token_count() + 1);
        tokens.push(start.to_string());
        let mut offsets = Vec::with_capacity(self.sentences.len());
        for sentence in self.sentences {
            let mut starts = Vec::with_capacity(sentence.len());
            for word in sentence {
                starts.push(tokens.len());
                tokens.extend(word);
            }
            offsets.push(starts);
        }
        let end = tokens.len();
        (tokens, WordOffsets::new(offsets, end))
    }
}

/// Pad or truncate a token stream to exactly `capacity` tokens.
///
/// Below capacity the end token is appended and the rest is padding (mask 0
/// on padding only). At or above capacity the stream is cut to
/// `capacity - 1` tokens and terminated by the end token (mask all 1).
/// Returns the fitted tokens, the attention mask and whether content was cut.
#[must_use]
pub fn fit_to_capacity(
    mut tokens: Vec<String>,
    capacity: usize,
    special: &SpecialTokens,
) -> (Vec<String>, Vec<f32>, bool) {
    if tokens.len() < capacity {
        tokens.push(special.end.clone());
        let filled = tokens.len();
        tokens.resize(capacity, special.pad.clone());
        let mut mask = vec![1.0; filled];
        mask.resize(capacity, 0.0);
        (tokens, mask, false)
    } else {
        tokens.truncate(capacity.saturating_sub(1));
        tokens.push(special.end.clone());
        (tokens, vec![1.0; capacity], true)
    }
}

/// A document ready for the model: fixed-length ids plus word offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDocument {
    /// Exactly `L` token strings.
    pub tokens: Vec<String>,
    /// Exactly `L` token ids.
    pub token_ids: Vec<u32>,
    /// 1.0 for content, 0.0 for padding.
    pub attention_mask: Vec<f32>,
    /// Word offsets in the marked, flattened stream.
    pub offsets: WordOffsets,
    /// True when trailing content was dropped.
    pub truncated: bool,
}

/// Turns a document plus marker plan into an [`EncodedDocument`].
pub struct DocumentBuilder<'a> {
    tokenizer: &'a dyn SubwordTokenizer,
    token_capacity: usize,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder producing `token_capacity` tokens per document.
    #[must_use]
    pub fn new(tokenizer: &'a dyn SubwordTokenizer, token_capacity: usize) -> Self {
        Self {
            tokenizer,
            token_capacity,
        }
    }

    /// Tokenize, mark, flatten and fit one document.
    pub fn build(&self, doc: &Document, plan: &MarkerPlan) -> Result<EncodedDocument> {
        let special = self.tokenizer.special_tokens();
        let mut tokenized = TokenizedDocument::tokenize(doc, self.tokenizer)?;
        tokenized.inject_markers(&doc.entities, plan, self.tokenizer)?;
        let (tokens, offsets) = tokenized.flatten(&special.start);
        let (tokens, attention_mask, truncated) =
            fit_to_capacity(tokens, self.token_capacity, special);
        if truncated {
            log::debug!(
                "document '{}': {} tokens truncated to {}",
                doc.title,
                offsets.end(),
                self.token_capacity
            );
        }
        let token_ids = self.tokenizer.convert_to_ids(&tokens)?;
        Ok(EncodedDocument {
            tokens,
            token_ids,
            attention_mask,
            offsets,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::MockTokenizer;
    use docrel_core::Mention;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn doc() -> Document {
        Document::new(
            "t",
            vec![words("Skai TV is Greek"), words("It is in Piraeus")],
            vec![
                Entity::new(vec![Mention::new(0, 0, 2, "ORG"), Mention::new(1, 0, 1, "ORG")]),
                Entity::new(vec![Mention::new(0, 3, 4, "LOC")]),
                Entity::new(vec![Mention::new(1, 3, 4, "LOC")]),
            ],
        )
    }

    #[test]
    fn test_marker_plan_dense_ranks() {
        let plan = MarkerPlan::from_entities([7, 2, 7, 4]);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.rank(2), Some(0));
        assert_eq!(plan.rank(4), Some(1));
        assert_eq!(plan.rank(7), Some(2));
        assert_eq!(plan.rank(3), None);
        assert_eq!(plan.markers(7), Some((5, 6)));
        assert_eq!(plan.highest_marker(), 6);
    }

    #[test]
    fn test_marker_plan_all() {
        let plan = MarkerPlan::all(3);
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 1), (2, 2)]);
        assert!(MarkerPlan::all(0).is_empty());
    }

    #[test]
    fn test_inject_and_flatten() {
        let tok = MockTokenizer::new();
        let d = doc();
        let mut t = TokenizedDocument::tokenize(&d, &tok).unwrap();
        t.inject_markers(&d.entities, &MarkerPlan::all(3), &tok).unwrap();
        let (tokens, offsets) = t.flatten("[CLS]");
        assert_eq!(
            tokens,
            words(
                "[CLS] [unused1] Skai TV [unused2] is [unused3] Greek [unused4] \
                 [unused1] It [unused2] is in [unused5] Piraeus [unused6]"
            )
        );
        assert_eq!(offsets.get(0, 0), Some(1));
        assert_eq!(offsets.get(0, 1), Some(3));
        assert_eq!(offsets.get(0, 3), Some(6));
        assert_eq!(offsets.get(1, 0), Some(9));
        assert_eq!(offsets.get(1, 3), Some(14));
        assert_eq!(offsets.end(), tokens.len());
    }

    #[test]
    fn test_inject_subset_uses_ranks() {
        let tok = MockTokenizer::new();
        let d = doc();
        let mut t = TokenizedDocument::tokenize(&d, &tok).unwrap();
        t.inject_markers(&d.entities, &MarkerPlan::from_entities([2]), &tok)
            .unwrap();
        let (tokens, _) = t.flatten("[CLS]");
        assert_eq!(
            tokens,
            words("[CLS] Skai TV is Greek It is in [unused1] Piraeus [unused2]")
        );
    }

    #[test]
    fn test_markers_stack_on_shared_word() {
        let tok = MockTokenizer::new();
        let d = Document::new(
            "t",
            vec![words("Greece")],
            vec![
                Entity::new(vec![Mention::new(0, 0, 1, "LOC")]),
                Entity::new(vec![Mention::new(0, 0, 1, "LOC")]),
            ],
        );
        let mut t = TokenizedDocument::tokenize(&d, &tok).unwrap();
        t.inject_markers(&d.entities, &MarkerPlan::all(2), &tok).unwrap();
        assert_eq!(
            t.sentences[0][0],
            words("[unused3] [unused1] Greece [unused2] [unused4]")
        );
    }

    #[test]
    fn test_marker_capacity_exceeded() {
        let tok = MockTokenizer::new().with_marker_capacity(4);
        let d = doc();
        let mut t = TokenizedDocument::tokenize(&d, &tok).unwrap();
        let err = t
            .inject_markers(&d.entities, &MarkerPlan::all(3), &tok)
            .unwrap_err();
        assert!(matches!(err, Error::Tokenizer(_)));
    }

    #[test]
    fn test_fit_pads_with_end_token() {
        let special = SpecialTokens::default();
        let (tokens, mask, truncated) = fit_to_capacity(words("[CLS] a b"), 6, &special);
        assert_eq!(tokens, words("[CLS] a b [SEP] [PAD] [PAD]"));
        assert_eq!(mask, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        assert!(!truncated);
    }

    #[test]
    fn test_fit_exactly_one_below_capacity() {
        let special = SpecialTokens::default();
        let (tokens, mask, truncated) = fit_to_capacity(words("[CLS] a b"), 4, &special);
        assert_eq!(tokens, words("[CLS] a b [SEP]"));
        assert_eq!(mask, vec![1.0; 4]);
        assert!(!truncated);
    }

    #[test]
    fn test_fit_truncates() {
        let special = SpecialTokens::default();
        let (tokens, mask, truncated) = fit_to_capacity(words("[CLS] a b c"), 4, &special);
        assert_eq!(tokens, words("[CLS] a b [SEP]"));
        assert_eq!(mask, vec![1.0; 4]);
        assert!(truncated);
    }

    #[test]
    fn test_build_converts_ids() {
        let tok = MockTokenizer::new().with_vocab(["Skai", "TV"]);
        let d = doc();
        let encoded = DocumentBuilder::new(&tok, 24)
            .build(&d, &MarkerPlan::from_entities([0]))
            .unwrap();
        assert_eq!(encoded.token_ids.len(), 24);
        assert_eq!(&encoded.token_ids[..5], &[101, 1, 1000, 1001, 2]);
        assert_eq!(encoded.attention_mask.iter().filter(|&&m| m == 1.0).count(), 14);
        assert!(!encoded.truncated);
    }
}
