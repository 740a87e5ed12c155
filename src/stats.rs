//! Relation label statistics.
//!
//! Counts how often each relation class occurs and how many ordered pairs
//! stay `NA`. An external weighting step (e.g. inverse-frequency class
//! weights) consumes these numbers; no weighting is decided here.

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use docrel_core::Document;

use crate::error::Result;
use crate::labels::LabelMatrix;
use crate::sampler::pair_count;
use crate::vocab::RelationVocab;

/// Occurrences of one relation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCount {
    /// Relation name.
    pub name: String,
    /// Class index.
    pub index: usize,
    /// Number of distinct `(head, tail)` pairs carrying the relation.
    pub count: usize,
}

/// Label statistics over a set of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationStats {
    /// Documents seen.
    pub documents: usize,
    /// Entities seen.
    pub entities: usize,
    /// Ordered non-self pairs with at least one gold relation.
    pub positive_pairs: usize,
    /// Ordered non-self pairs without any gold relation.
    pub na_pairs: usize,
    /// Per-class counts in class-index order, `NA` excluded.
    pub relations: Vec<RelationCount>,
}

impl RelationStats {
    /// Gather statistics. Fails on the first corrupt document.
    pub fn collect<'a, I>(documents: I, vocab: &RelationVocab) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let na = vocab.na_index();
        let mut counts = vec![0usize; vocab.len()];
        let mut stats = Self::default();

        for doc in documents {
            let matrix = LabelMatrix::build(doc, vocab)?;
            let n = doc.entity_count();
            let positives = matrix.positive_pairs().len();
            stats.documents += 1;
            stats.entities += n;
            stats.positive_pairs += positives;
            stats.na_pairs += pair_count(n) - positives;
            for (class, plane) in matrix.as_array().axis_iter(Axis(2)).enumerate() {
                if class != na {
                    counts[class] += plane.iter().map(|&v| usize::from(v)).sum::<usize>();
                }
            }
        }

        stats.relations = counts
            .into_iter()
            .enumerate()
            .filter(|&(class, _)| class != na)
            .map(|(index, count)| RelationCount {
                name: vocab.name_of(index).unwrap_or_default().to_string(),
                index,
                count,
            })
            .collect();
        Ok(stats)
    }

    /// Total gold facts over all classes.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.relations.iter().map(|r| r.count).sum()
    }

    /// Count of a relation by name.
    #[must_use]
    pub fn count_of(&self, name: &str) -> Option<usize> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrel_core::{Entity, GoldLabel, Mention};

    fn doc(n: usize, labels: Vec<GoldLabel>) -> Document {
        let entities = (0..n)
            .map(|_| Entity::new(vec![Mention::new(0, 0, 1, "MISC")]))
            .collect();
        Document::new("d", vec![vec!["w".into()]], entities).with_labels(labels)
    }

    #[test]
    fn test_counts() {
        let vocab = RelationVocab::from_names(["P17", "P131"]).unwrap();
        let docs = vec![
            doc(
                3,
                vec![
                    GoldLabel::new(0, 1, "P17"),
                    GoldLabel::new(0, 1, "P131"),
                    GoldLabel::new(1, 2, "P17"),
                    // duplicate fact counts once
                    GoldLabel::new(1, 2, "P17"),
                ],
            ),
            doc(2, vec![]),
        ];
        let stats = RelationStats::collect(&docs, &vocab).unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.entities, 5);
        assert_eq!(stats.positive_pairs, 2);
        assert_eq!(stats.na_pairs, 4 + 2);
        assert_eq!(stats.count_of("P17"), Some(2));
        assert_eq!(stats.count_of("P131"), Some(1));
        assert_eq!(stats.count_of("NA"), None);
        assert_eq!(stats.fact_count(), 3);
    }

    #[test]
    fn test_unknown_relation_propagates() {
        let vocab = RelationVocab::from_names(["P17"]).unwrap();
        let docs = vec![doc(2, vec![GoldLabel::new(0, 1, "P6")])];
        assert!(RelationStats::collect(&docs, &vocab).is_err());
    }
}
