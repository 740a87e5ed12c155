//! Entity-pair selection.
//!
//! A document with `n` entities has `n·(n−1)` ordered non-self pairs, far
//! more than an example can hold. One of three policies picks the pairs that
//! go into the example:
//!
//! | Policy            | Chosen when                | Pairs                                   | Marked entities     |
//! |-------------------|----------------------------|-----------------------------------------|---------------------|
//! | `ScoreGuided`     | relevance scores available | top `min(2n, cap)` by score             | entities in kept pairs |
//! | `TrainingSampled` | no scores, training split  | positives + `min(ratio·P, cap−P, N)` random negatives | all |
//! | `ExhaustiveEval`  | no scores, other splits    | positives + every negative              | all                 |
//!
//! Pair enumeration is fixed: `i` outer, `j` inner, ascending, `i ≠ j`.
//! External score vectors are laid out in that order.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use docrel_core::PairId;

use crate::builder::MarkerPlan;
use crate::config::ExampleConfig;
use crate::error::{Error, Result};
use crate::split::Split;

/// The policy variant without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Top pairs by external relevance score.
    ScoreGuided,
    /// Positives plus randomly sampled negatives.
    TrainingSampled,
    /// Every ordered pair.
    ExhaustiveEval,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::ScoreGuided => "score_guided",
            PolicyKind::TrainingSampled => "training_sampled",
            PolicyKind::ExhaustiveEval => "exhaustive_eval",
        })
    }
}

/// Pair selection policy, decided once per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingPolicy<'a> {
    /// One score per ordered non-self pair, in enumeration order.
    ScoreGuided {
        /// The document's score row.
        scores: &'a [f32],
    },
    /// Training without scores.
    TrainingSampled,
    /// Evaluation without scores.
    ExhaustiveEval,
}

impl<'a> SamplingPolicy<'a> {
    /// Scores win; otherwise the split decides.
    #[must_use]
    pub fn select(scores: Option<&'a [f32]>, split: Split) -> Self {
        match scores {
            Some(scores) => SamplingPolicy::ScoreGuided { scores },
            None if split.is_train() => SamplingPolicy::TrainingSampled,
            None => SamplingPolicy::ExhaustiveEval,
        }
    }

    /// Payload-free variant.
    #[must_use]
    pub const fn kind(&self) -> PolicyKind {
        match self {
            SamplingPolicy::ScoreGuided { .. } => PolicyKind::ScoreGuided,
            SamplingPolicy::TrainingSampled => PolicyKind::TrainingSampled,
            SamplingPolicy::ExhaustiveEval => PolicyKind::ExhaustiveEval,
        }
    }

    /// Choose pairs for a document with `entity_count` entities.
    ///
    /// `positives` are the labelled pairs in ascending order. `rng` is only
    /// consulted by `TrainingSampled`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        entity_count: usize,
        positives: &[PairId],
        config: &ExampleConfig,
        rng: &mut R,
    ) -> Result<PairSelection> {
        let kind = self.kind();
        let capacity = config.capacity_for(kind);
        let selection = match *self {
            SamplingPolicy::ScoreGuided { scores } => {
                let keep = (2 * entity_count).min(capacity);
                let pairs: Vec<PairId> = rank_by_score(entity_count, scores)?
                    .into_iter()
                    .take(keep)
                    .map(|scored| scored.pair)
                    .collect();
                let markers =
                    MarkerPlan::from_entities(pairs.iter().flat_map(|p| [p.head, p.tail]));
                PairSelection {
                    kind,
                    pairs,
                    capacity,
                    markers,
                }
            }
            SamplingPolicy::TrainingSampled => {
                let positives = clamp_positives(positives, capacity);
                let pool = negative_pool(entity_count, positives);
                let count = negative_count(
                    positives.len(),
                    pool.len(),
                    capacity,
                    config.negative_ratio,
                );
                let mut pairs = positives.to_vec();
                pairs.extend(
                    rand::seq::index::sample(rng, pool.len(), count)
                        .into_iter()
                        .map(|i| pool[i]),
                );
                PairSelection {
                    kind,
                    pairs,
                    capacity,
                    markers: MarkerPlan::all(entity_count),
                }
            }
            SamplingPolicy::ExhaustiveEval => {
                let mut pairs = positives.to_vec();
                pairs.extend(negative_pool(entity_count, positives));
                if pairs.len() > capacity {
                    log::warn!(
                        "{} candidate pairs exceed eval capacity {}; keeping the first {}",
                        pairs.len(),
                        capacity,
                        capacity
                    );
                    pairs.truncate(capacity);
                }
                PairSelection {
                    kind,
                    pairs,
                    capacity,
                    markers: MarkerPlan::all(entity_count),
                }
            }
        };
        Ok(selection)
    }
}

/// Pairs chosen for one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSelection {
    /// Policy that produced the selection.
    pub kind: PolicyKind,
    /// Selected pairs in output order; never longer than `capacity`.
    pub pairs: Vec<PairId>,
    /// Number of pair slots in the example.
    pub capacity: usize,
    /// Entities that receive boundary markers.
    pub markers: MarkerPlan,
}

/// A pair with its external relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    /// The pair.
    pub pair: PairId,
    /// Its score.
    pub score: f32,
}

/// All ordered non-self pairs, `i` outer and `j` inner.
#[must_use]
pub fn enumerate_pairs(entity_count: usize) -> Vec<PairId> {
    (0..entity_count)
        .flat_map(|i| {
            (0..entity_count)
                .filter(move |&j| j != i)
                .map(move |j| PairId::new(i, j))
        })
        .collect()
}

/// Number of ordered non-self pairs.
#[must_use]
pub const fn pair_count(entity_count: usize) -> usize {
    entity_count * entity_count.saturating_sub(1)
}

/// Pairs sorted by descending score; equal scores keep enumeration order.
/// NaN scores rank last and `-0.0` ties with `0.0`.
pub fn rank_by_score(entity_count: usize, scores: &[f32]) -> Result<Vec<ScoredPair>> {
    let expected = pair_count(entity_count);
    if scores.len() != expected {
        return Err(Error::invalid_input(format!(
            "score row has {} entries, {} entities need {}",
            scores.len(),
            entity_count,
            expected
        )));
    }
    let mut ranked: Vec<ScoredPair> = enumerate_pairs(entity_count)
        .into_iter()
        .zip(scores.iter().copied())
        .map(|(pair, score)| ScoredPair { pair, score })
        .collect();
    let key = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s + 0.0 };
    ranked.sort_by(|a, b| key(b.score).total_cmp(&key(a.score)));
    Ok(ranked)
}

/// Number of negatives drawn in training mode: `min(ratio·P, cap−P, N)`.
#[must_use]
pub fn negative_count(positives: usize, pool: usize, capacity: usize, ratio: usize) -> usize {
    (ratio.saturating_mul(positives))
        .min(capacity.saturating_sub(positives))
        .min(pool)
}

fn clamp_positives(positives: &[PairId], capacity: usize) -> &[PairId] {
    if positives.len() > capacity {
        log::warn!(
            "{} positive pairs exceed train capacity {}; keeping the first {}",
            positives.len(),
            capacity,
            capacity
        );
        &positives[..capacity]
    } else {
        positives
    }
}

/// Non-self pairs without a gold label, in enumeration order. `positives`
/// must be sorted.
fn negative_pool(entity_count: usize, positives: &[PairId]) -> Vec<PairId> {
    enumerate_pairs(entity_count)
        .into_iter()
        .filter(|p| positives.binary_search(p).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleCapacity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(train: usize, eval: usize, score: usize) -> ExampleConfig {
        ExampleConfig::default().with_capacity(SampleCapacity { train, eval, score })
    }

    #[test]
    fn test_enumeration_order() {
        let pairs: Vec<(usize, usize)> = enumerate_pairs(3)
            .into_iter()
            .map(|p| (p.head, p.tail))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]);
        assert_eq!(pair_count(3), 6);
        assert!(enumerate_pairs(1).is_empty());
        assert_eq!(pair_count(0), 0);
    }

    #[test]
    fn test_policy_selection() {
        let scores = [0.5_f32; 2];
        assert_eq!(
            SamplingPolicy::select(Some(&scores), Split::Test).kind(),
            PolicyKind::ScoreGuided
        );
        assert_eq!(
            SamplingPolicy::select(None, Split::Train).kind(),
            PolicyKind::TrainingSampled
        );
        assert_eq!(
            SamplingPolicy::select(None, Split::Valid).kind(),
            PolicyKind::ExhaustiveEval
        );
    }

    #[test]
    fn test_signed_zeros_tie() {
        let ranked = rank_by_score(2, &[-0.0, 0.0]).unwrap();
        let order: Vec<PairId> = ranked.iter().map(|s| s.pair).collect();
        assert_eq!(order, vec![PairId::new(0, 1), PairId::new(1, 0)]);

        let ranked = rank_by_score(3, &[0.0, -0.0, 0.5, 0.0, -0.0, -1.0]).unwrap();
        let order: Vec<PairId> = ranked.iter().map(|s| s.pair).collect();
        assert_eq!(
            order,
            vec![
                PairId::new(1, 0),
                PairId::new(0, 1),
                PairId::new(0, 2),
                PairId::new(1, 2),
                PairId::new(2, 0),
                PairId::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_rank_is_stable() {
        let ranked = rank_by_score(3, &[0.1, 0.9, 0.9, 0.3, f32::NAN, 0.9]).unwrap();
        let order: Vec<PairId> = ranked.iter().map(|s| s.pair).collect();
        assert_eq!(
            order,
            vec![
                PairId::new(0, 2),
                PairId::new(1, 0),
                PairId::new(2, 1),
                PairId::new(1, 2),
                PairId::new(0, 1),
                PairId::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_rank_length_mismatch() {
        assert!(rank_by_score(3, &[0.1; 5]).is_err());
    }

    #[test]
    fn test_score_guided_keeps_two_n() {
        let scores: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let policy = SamplingPolicy::ScoreGuided { scores: &scores };
        let mut rng = StdRng::seed_from_u64(0);
        let sel = policy
            .sample(4, &[], &config(90, 1800, 100), &mut rng)
            .unwrap();
        assert_eq!(sel.pairs.len(), 8);
        // highest score is the last enumerated pair (3, 2)
        assert_eq!(sel.pairs[0], PairId::new(3, 2));
        assert_eq!(sel.capacity, 100);

        let sel = policy.sample(4, &[], &config(90, 1800, 5), &mut rng).unwrap();
        assert_eq!(sel.pairs.len(), 5);
    }

    #[test]
    fn test_score_guided_marks_only_kept_entities() {
        // 4 entities; only pairs (2,3) and (3,2) score high, keep = min(8, 2)
        let mut scores = vec![0.0_f32; 12];
        scores[8] = 1.0; // (2, 3)
        scores[11] = 2.0; // (3, 2)
        let policy = SamplingPolicy::ScoreGuided { scores: &scores };
        let sel = policy
            .sample(4, &[], &config(90, 1800, 2), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(sel.pairs, vec![PairId::new(3, 2), PairId::new(2, 3)]);
        assert_eq!(sel.markers.iter().collect::<Vec<_>>(), vec![(2, 0), (3, 1)]);
    }

    #[test]
    fn test_training_counts() {
        let positives = [PairId::new(0, 1), PairId::new(2, 3)];
        let mut rng = StdRng::seed_from_u64(7);
        let sel = SamplingPolicy::TrainingSampled
            .sample(5, &positives, &config(90, 1800, 1800), &mut rng)
            .unwrap();
        // P = 2, N = 18, cap = 90 → 6 negatives
        assert_eq!(sel.pairs.len(), 8);
        assert_eq!(&sel.pairs[..2], &positives);
        for p in &sel.pairs[2..] {
            assert!(!p.is_self_pair());
            assert!(!positives.contains(p));
        }
        assert_eq!(sel.markers.len(), 5);
    }

    #[test]
    fn test_training_negatives_unique() {
        let positives = [PairId::new(0, 1)];
        let sel = SamplingPolicy::TrainingSampled
            .sample(3, &positives, &config(90, 1800, 1800), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let mut seen = sel.pairs.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), sel.pairs.len());
        assert_eq!(sel.pairs.len(), 4);
    }

    #[test]
    fn test_training_same_seed_same_pairs() {
        let positives = [PairId::new(1, 0)];
        let run = |seed| {
            SamplingPolicy::TrainingSampled
                .sample(
                    10,
                    &positives,
                    &config(90, 1800, 1800),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap()
                .pairs
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_positives_clamped_to_capacity() {
        let positives: Vec<PairId> = enumerate_pairs(4);
        let sel = SamplingPolicy::TrainingSampled
            .sample(4, &positives, &config(5, 1800, 1800), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(sel.pairs, positives[..5].to_vec());
    }

    #[test]
    fn test_negative_count_formula() {
        assert_eq!(negative_count(2, 100, 90, 3), 6);
        assert_eq!(negative_count(40, 100, 90, 3), 50);
        assert_eq!(negative_count(2, 4, 90, 3), 4);
        assert_eq!(negative_count(0, 50, 90, 3), 0);
        assert_eq!(negative_count(90, 50, 90, 3), 0);
    }

    #[test]
    fn test_exhaustive_positives_first() {
        let positives = [PairId::new(1, 2)];
        let sel = SamplingPolicy::ExhaustiveEval
            .sample(3, &positives, &config(90, 1800, 1800), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(
            sel.pairs,
            vec![
                PairId::new(1, 2),
                PairId::new(0, 1),
                PairId::new(0, 2),
                PairId::new(1, 0),
                PairId::new(2, 0),
                PairId::new(2, 1),
            ]
        );
        assert_eq!(sel.kind, PolicyKind::ExhaustiveEval);
    }

    #[test]
    fn test_exhaustive_cut_to_capacity() {
        let sel = SamplingPolicy::ExhaustiveEval
            .sample(10, &[], &config(90, 20, 1800), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(sel.pairs.len(), 20);
        assert_eq!(sel.capacity, 20);
    }
}
