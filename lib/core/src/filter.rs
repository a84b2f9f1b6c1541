//! Adaptive prefix filter
//!
//! Every record of the left collection probes the right collection's inverted
//! index with its signature. Overlap evidence for a (left, right) pair is
//! only counted between segments that stay disjoint: a segment is never reused
//! by just one side, and never combined with a segment it conflicts with.
//!
//! Left records are independent, so each is processed on its own rayon task
//! with private bookkeeping.

use crate::index::InvertedIndex;
use crate::pebble::Pebble;
use crate::record::Record;
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A left/right record pair, by position in their collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidatePair {
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Sorted by (left, right)
    pub candidates: Vec<CandidatePair>,
    /// Pairs for which overlap bookkeeping was started
    pub examined: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsedSegment {
    Left(usize),
    Right(usize),
}

#[derive(Debug, Default)]
struct PairState {
    used: SmallVec<[UsedSegment; 8]>,
    overlap: usize,
}

impl PairState {
    #[inline]
    fn uses(&self, segment: UsedSegment) -> bool {
        self.used.contains(&segment)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrefixFilter {
    pub threshold: f64,
    pub overlap: usize,
}

impl PrefixFilter {
    #[inline]
    #[must_use]
    pub fn new(threshold: f64, overlap: usize) -> Self {
        Self {
            threshold,
            overlap: overlap.max(1),
        }
    }

    /// Whether two partition sizes are close enough for the pair to reach the threshold
    #[inline]
    pub fn passes_length_filter(&self, left: usize, right: usize) -> bool {
        left.min(right) as f64 >= self.threshold * left.max(right) as f64
    }

    /// Candidate pairs between two collections
    ///
    /// `signatures_left[i]` is the signature of `left[i]`; `index_right` was built
    /// from the signatures of `right`.
    pub fn candidates(
        &self,
        left: &[Record],
        signatures_left: &[Vec<Pebble>],
        right: &[Record],
        index_right: &InvertedIndex,
    ) -> FilterOutcome {
        let per_record: Vec<(Vec<CandidatePair>, usize)> = left
            .par_iter()
            .zip(signatures_left.par_iter())
            .enumerate()
            .map(|(position, (record, signature))| {
                self.probe(position as u32, record, signature, right, index_right)
            })
            .collect();

        let mut outcome = FilterOutcome::default();
        for (pairs, examined) in per_record {
            outcome.candidates.extend(pairs);
            outcome.examined += examined;
        }
        outcome.candidates.sort_unstable();
        outcome.candidates.dedup();
        outcome
    }

    fn probe(
        &self,
        position: u32,
        record: &Record,
        signature: &[Pebble],
        right: &[Record],
        index_right: &InvertedIndex,
    ) -> (Vec<CandidatePair>, usize) {
        let mut states: AHashMap<u32, PairState> = AHashMap::new();
        let mut confirmed: AHashSet<u32> = AHashSet::new();
        let mut candidates = Vec::new();
        let mut examined = 0usize;

        for pebble in signature {
            let Some(list) = index_right.get(&pebble.key) else {
                continue;
            };
            let left_segment = record.segment(pebble.segment);

            for entry in list {
                if confirmed.contains(&entry.record) {
                    continue;
                }
                let Some(other) = right.get(entry.record as usize) else {
                    continue;
                };
                if !self.passes_length_filter(record.min_partition_size(), other.min_partition_size()) {
                    continue;
                }

                let state = states.entry(entry.record).or_insert_with(|| {
                    examined += 1;
                    PairState::default()
                });

                let ours = UsedSegment::Left(pebble.segment);
                let theirs = UsedSegment::Right(entry.segment as usize);
                if state.uses(ours) != state.uses(theirs) {
                    continue;
                }
                let right_segment = other.segment(entry.segment as usize);
                let conflicting = left_segment
                    .conflicts()
                    .iter()
                    .any(|&c| state.uses(UsedSegment::Left(c)))
                    || right_segment
                        .conflicts()
                        .iter()
                        .any(|&c| state.uses(UsedSegment::Right(c)));
                if conflicting {
                    continue;
                }

                if !state.uses(ours) {
                    state.used.push(ours);
                    state.used.push(theirs);
                }
                state.overlap += 1;

                if state.overlap >= self.overlap {
                    states.remove(&entry.record);
                    confirmed.insert(entry.record);
                    candidates.push(CandidatePair {
                        left: position,
                        right: entry.record,
                    });
                }
            }
        }

        (candidates, examined)
    }
}
