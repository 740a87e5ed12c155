//! Absolute token offsets of entity mentions.
//!
//! After marker injection and flattening, every word starts at some absolute
//! offset in the token stream. A mention is located by the offset of its first
//! word, which is where its opening marker sits.
//!
//! Each entity is reduced to exactly `M` offsets:
//!
//! ```text
//! in-bounds offsets   result (M = 3)
//! [17, 140, 388, 402] [17, 140, 388]   truncated
//! [17]                [17, 17, 17]     padded with the first offset
//! []                  [0, 0, 0]        sentinel
//! ```

use docrel_core::Entity;

/// Start offset of every word in the flattened token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordOffsets {
    sentences: Vec<Vec<usize>>,
    end: usize,
}

impl WordOffsets {
    /// Create offsets from per-sentence word starts and the stream length.
    #[must_use]
    pub fn new(sentences: Vec<Vec<usize>>, end: usize) -> Self {
        Self { sentences, end }
    }

    /// Offset of `word` in `sentence`.
    #[must_use]
    pub fn get(&self, sentence: usize, word: usize) -> Option<usize> {
        self.sentences.get(sentence)?.get(word).copied()
    }

    /// Length of the flattened stream before padding or truncation.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of sentences.
    #[must_use]
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

/// Exactly `M` mention offsets of one entity.
pub type MentionPositions = Vec<u32>;

/// Offsets for every entity, in entity-id order.
///
/// Mentions whose offset is not below `token_capacity` are dropped. Mentions
/// addressing words that do not exist are dropped as well; documents are
/// validated before indexing, so this only happens for hand-built offsets.
#[must_use]
pub fn index_entities(
    entities: &[Entity],
    offsets: &WordOffsets,
    token_capacity: usize,
    mention_capacity: usize,
) -> Vec<MentionPositions> {
    entities
        .iter()
        .map(|entity| index_entity(entity, offsets, token_capacity, mention_capacity))
        .collect()
}

fn index_entity(
    entity: &Entity,
    offsets: &WordOffsets,
    token_capacity: usize,
    mention_capacity: usize,
) -> MentionPositions {
    let mut positions: MentionPositions = entity
        .mentions
        .iter()
        .filter_map(|m| offsets.get(m.sent_id, m.start()))
        .filter(|&offset| offset < token_capacity)
        .take(mention_capacity)
        .map(|offset| offset as u32)
        .collect();

    match positions.first().copied() {
        None => vec![0; mention_capacity],
        Some(first) => {
            positions.resize(mention_capacity, first);
            positions
        }
    }
}
