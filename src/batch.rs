//! Batch processing and stacking.
//!
//! Documents are independent, so a corpus can be processed on a rayon pool
//! (feature `parallel`, on by default). Each document gets its own RNG seeded
//! from the batch seed and its index, so the output does not depend on the
//! number of threads or on scheduling order.

use ndarray::{Array2, Array3, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use docrel_core::{Document, PairId};

use crate::assembler::{Example, TypePair};
use crate::error::{Error, Result};
use crate::processor::ExampleBuilder;
use crate::split::Split;

/// RNG for the document at `index` of a batch.
#[must_use]
pub fn document_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index as u64))
}

/// Process documents in order. Stops at the first failing document.
pub fn process_documents(
    builder: &ExampleBuilder,
    documents: &[Document],
    split: Split,
    seed: u64,
) -> Result<Vec<Example>> {
    process_documents_with(builder, documents, split, seed, |_| {})
}

/// Like [`process_documents`], calling `on_done` after each document.
///
/// `on_done` may run on worker threads and in any order.
pub fn process_documents_with<F>(
    builder: &ExampleBuilder,
    documents: &[Document],
    split: Split,
    seed: u64,
    on_done: F,
) -> Result<Vec<Example>>
where
    F: Fn(&Example) + Sync,
{
    let run = |(index, doc): (usize, &Document)| -> Result<Example> {
        let example = builder
            .process(doc.clone(), split, &mut document_rng(seed, index))
            .map_err(|e| {
                log::warn!("document '{}' ({}): {}", doc.title, index, e);
                e
            })?;
        on_done(&example);
        Ok(example)
    };

    #[cfg(feature = "parallel")]
    let examples = {
        use rayon::prelude::*;
        documents.par_iter().enumerate().map(run).collect::<Result<Vec<_>>>()
    };

    #[cfg(not(feature = "parallel"))]
    let examples = documents.iter().enumerate().map(run).collect::<Result<Vec<_>>>();

    let examples = examples?;
    log::debug!("{}: built {} examples", split, examples.len());
    Ok(examples)
}

/// Examples of one split stacked along a leading batch axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleBatch {
    /// Document titles.
    pub titles: Vec<String>,
    /// `B × L` token ids.
    pub token_ids: Array2<u32>,
    /// `B × L` attention mask.
    pub attention_mask: Array2<f32>,
    /// `B × cap × M` head offsets.
    pub head_positions: Array3<u32>,
    /// `B × cap × M` tail offsets.
    pub tail_positions: Array3<u32>,
    /// `B × cap × R` labels.
    pub labels: Array3<u8>,
    /// `B × cap` slot validity.
    pub label_mask: Array2<u8>,
    /// Selected pairs per example.
    pub pair_ids: Vec<Vec<PairId>>,
    /// Type pairs per example, when every example carries them.
    pub entity_types: Option<Vec<Vec<TypePair>>>,
}

impl ExampleBatch {
    /// Stack examples. All examples must share `L`, capacity, `M` and `R`.
    pub fn stack(examples: &[Example]) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::invalid_input("cannot stack an empty batch"));
        }
        let shape_err = |what: &str, e: ndarray::ShapeError| {
            Error::invalid_input(format!("examples disagree on {} shape: {}", what, e))
        };

        let ids: Vec<ArrayView1<'_, u32>> = examples
            .iter()
            .map(|e| ArrayView1::from(e.token_ids.as_slice()))
            .collect();
        let masks: Vec<ArrayView1<'_, f32>> = examples
            .iter()
            .map(|e| ArrayView1::from(e.attention_mask.as_slice()))
            .collect();
        let slots: Vec<ArrayView1<'_, u8>> = examples
            .iter()
            .map(|e| ArrayView1::from(e.label_mask.as_slice()))
            .collect();
        let heads: Vec<_> = examples.iter().map(|e| e.head_positions.view()).collect();
        let tails: Vec<_> = examples.iter().map(|e| e.tail_positions.view()).collect();
        let labels: Vec<_> = examples.iter().map(|e| e.labels.view()).collect();

        let entity_types = match examples.iter().filter(|e| e.entity_types.is_some()).count() {
            0 => None,
            n if n == examples.len() => Some(
                examples
                    .iter()
                    .filter_map(|e| e.entity_types.clone())
                    .collect(),
            ),
            _ => {
                return Err(Error::invalid_input(
                    "entity types present on some examples but not others",
                ))
            }
        };

        Ok(Self {
            titles: examples.iter().map(|e| e.title.clone()).collect(),
            token_ids: ndarray::stack(Axis(0), &ids).map_err(|e| shape_err("token", e))?,
            attention_mask: ndarray::stack(Axis(0), &masks)
                .map_err(|e| shape_err("attention mask", e))?,
            head_positions: ndarray::stack(Axis(0), &heads)
                .map_err(|e| shape_err("head position", e))?,
            tail_positions: ndarray::stack(Axis(0), &tails)
                .map_err(|e| shape_err("tail position", e))?,
            labels: ndarray::stack(Axis(0), &labels).map_err(|e| shape_err("label", e))?,
            label_mask: ndarray::stack(Axis(0), &slots).map_err(|e| shape_err("label mask", e))?,
            pair_ids: examples.iter().map(|e| e.pair_ids.clone()).collect(),
            entity_types,
        })
    }

    /// Batch size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// True for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
