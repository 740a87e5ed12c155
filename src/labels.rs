//! Multi-hot relation targets for every ordered entity pair.
//!
//! The matrix has shape `n × n × R` and is built fresh for each document.
//! Every pair starts as `NA`; a gold fact `(h, t, r)` sets class `r` and
//! clears `NA` for `(h, t)`. Pair selection later decides which rows are
//! surfaced, the matrix itself covers all pairs.

use std::collections::BTreeSet;

use ndarray::{s, Array3, ArrayView1};

use docrel_core::{Document, PairId};

use crate::error::{Error, Result};
use crate::vocab::{RelationVocab, NA};

/// `n × n × R` indicator tensor plus the list of labelled pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatrix {
    data: Array3<u8>,
    positives: Vec<PairId>,
    na: usize,
}

impl LabelMatrix {
    /// Build the matrix for a document.
    ///
    /// Fails on a label naming a missing entity or an unknown relation.
    /// Labels with relation `NA` and self-pair labels carry no selectable
    /// fact and are skipped.
    pub fn build(doc: &Document, vocab: &RelationVocab) -> Result<Self> {
        let n = doc.entity_count();
        let na = vocab.na_index();
        let mut data = Array3::<u8>::zeros((n, n, vocab.len()));
        data.slice_mut(s![.., .., na]).fill(1);

        let mut positives = BTreeSet::new();
        for label in doc.gold() {
            for entity in [label.head, label.tail] {
                if entity >= n {
                    return Err(docrel_core::Error::UnknownEntity {
                        title: doc.title.clone(),
                        entity,
                        entity_count: n,
                    }
                    .into());
                }
            }
            let class = vocab
                .index_of(&label.relation)
                .ok_or_else(|| Error::UnknownRelation {
                    title: doc.title.clone(),
                    relation: label.relation.clone(),
                })?;
            if label.relation == NA {
                continue;
            }
            if label.head == label.tail {
                log::warn!(
                    "document '{}': ignoring self-pair fact ({}, {}, {})",
                    doc.title,
                    label.head,
                    label.tail,
                    label.relation
                );
                continue;
            }
            data[[label.head, label.tail, class]] = 1;
            data[[label.head, label.tail, na]] = 0;
            positives.insert(label.pair());
        }

        Ok(Self {
            data,
            positives: positives.into_iter().collect(),
            na,
        })
    }

    /// Number of entities `n`.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.data.shape()[0]
    }

    /// Number of relation classes `R`.
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.data.shape()[2]
    }

    /// Label vector of `(head, tail)`. Panics when either id is out of range.
    #[must_use]
    pub fn row(&self, head: usize, tail: usize) -> ArrayView1<'_, u8> {
        self.data.slice(s![head, tail, ..])
    }

    /// True when `(head, tail)` carries no gold fact.
    #[must_use]
    pub fn is_na(&self, head: usize, tail: usize) -> bool {
        self.data[[head, tail, self.na]] == 1
    }

    /// Labelled pairs, ascending and deduplicated.
    #[must_use]
    pub fn positive_pairs(&self) -> &[PairId] {
        &self.positives
    }

    /// The full tensor.
    #[must_use]
    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }
}
