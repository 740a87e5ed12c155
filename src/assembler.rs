//! Fixed-capacity example assembly.
//!
//! Selected pairs fill the first slots in selection order; the remaining
//! slots are padding:
//!
//! | Field            | Selected slot            | Padding slot |
//! |------------------|--------------------------|--------------|
//! | `label_mask`     | 1                        | 0            |
//! | `head_positions` | head entity's M offsets  | M zeros      |
//! | `tail_positions` | tail entity's M offsets  | M zeros      |
//! | `labels`         | matrix row (multi-hot)   | all zeros    |
//! | `entity_types`   | first-mention types      | `("", "")`   |
//!
//! A padding slot is told apart from a genuine `NA` pair by `label_mask`,
//! never by its label content.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use docrel_core::{Document, PairId};

use crate::builder::EncodedDocument;
use crate::config::ExampleConfig;
use crate::error::{Error, Result};
use crate::indexer::MentionPositions;
use crate::labels::LabelMatrix;
use crate::sampler::{PairSelection, PolicyKind};

/// `(head_type, tail_type)` of a pair.
pub type TypePair = (String, String);

/// One fixed-shape model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Source document title.
    pub title: String,
    /// Policy that selected the pairs.
    pub policy: PolicyKind,
    /// `L` token ids.
    pub token_ids: Vec<u32>,
    /// `L` mask values, 1.0 for content and 0.0 for padding.
    pub attention_mask: Vec<f32>,
    /// `cap × M` head mention offsets.
    pub head_positions: Array2<u32>,
    /// `cap × M` tail mention offsets.
    pub tail_positions: Array2<u32>,
    /// `cap × R` multi-hot labels.
    pub labels: Array2<u8>,
    /// `cap` validity flags.
    pub label_mask: Vec<u8>,
    /// Selected pairs, unpadded.
    pub pair_ids: Vec<PairId>,
    /// `cap` type pairs when entity-type augmentation is enabled.
    pub entity_types: Option<Vec<TypePair>>,
}

impl Example {
    /// Number of pair slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.label_mask.len()
    }

    /// Number of selected (non-padding) pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pair_ids.len()
    }

    /// Token sequence length.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.token_ids.len()
    }

    /// Label vector of a slot.
    #[must_use]
    pub fn label_row(&self, slot: usize) -> ArrayView1<'_, u8> {
        self.labels.row(slot)
    }
}

/// Join positions, selection and labels into an [`Example`].
pub fn assemble(
    doc: &Document,
    encoded: EncodedDocument,
    positions: &[MentionPositions],
    selection: &PairSelection,
    matrix: &LabelMatrix,
    config: &ExampleConfig,
) -> Result<Example> {
    let capacity = selection.capacity;
    let mentions = config.mention_capacity;
    if selection.pairs.len() > capacity {
        return Err(Error::invalid_input(format!(
            "{} selected pairs exceed capacity {}",
            selection.pairs.len(),
            capacity
        )));
    }

    let mut head_positions = Array2::<u32>::zeros((capacity, mentions));
    let mut tail_positions = Array2::<u32>::zeros((capacity, mentions));
    let mut labels = Array2::<u8>::zeros((capacity, matrix.relation_count()));
    let mut label_mask = vec![0u8; capacity];
    let mut entity_types = config
        .use_entity_type
        .then(|| Vec::with_capacity(capacity));

    let lookup = |entity: usize| {
        positions.get(entity).ok_or_else(|| {
            Error::invalid_input(format!(
                "pair references entity {} but only {} are indexed",
                entity,
                positions.len()
            ))
        })
    };

    for (slot, pair) in selection.pairs.iter().enumerate() {
        let head = lookup(pair.head)?;
        let tail = lookup(pair.tail)?;
        head_positions
            .row_mut(slot)
            .assign(&ArrayView1::from(head.as_slice()));
        tail_positions
            .row_mut(slot)
            .assign(&ArrayView1::from(tail.as_slice()));
        labels.row_mut(slot).assign(&matrix.row(pair.head, pair.tail));
        label_mask[slot] = 1;
        if let Some(types) = entity_types.as_mut() {
            types.push((
                doc.entities[pair.head].entity_type().to_string(),
                doc.entities[pair.tail].entity_type().to_string(),
            ));
        }
    }
    if let Some(types) = entity_types.as_mut() {
        types.resize(capacity, (String::new(), String::new()));
    }

    log::debug!(
        "document '{}': {} pairs selected by {} into {} slots",
        doc.title,
        selection.pairs.len(),
        selection.kind,
        capacity
    );

    Ok(Example {
        title: doc.title.clone(),
        policy: selection.kind,
        token_ids: encoded.token_ids,
        attention_mask: encoded.attention_mask,
        head_positions,
        tail_positions,
        labels,
        label_mask,
        pair_ids: selection.pairs.clone(),
        entity_types,
    })
}
