//! Similarity verification for candidate pairs
//!
//! For two records the verifier finds all relations, builds the conflict
//! graph, solves it approximately and turns the selected matches into an
//! interval:
//!
//! ```text
//! unused    = max(uncovered words of left, uncovered words of right)
//! partition = |selected| + unused
//! low       = selected weight / partition
//! high      = min(1, low / approximation ratio)
//! ```

use crate::graph::ConflictGraph;
use crate::mis::{self, MisSolution, VerifierKind};
use crate::relation::RelationFinder;
use aujoin_core::{EvidenceSources, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proven similarity bounds, `0 <= low <= high <= 1`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityInterval {
    pub low: f64,
    pub high: f64,
}

impl SimilarityInterval {
    pub const ZERO: SimilarityInterval = SimilarityInterval { low: 0.0, high: 0.0 };

    /// Interval from a lower bound and the approximation ratio that produced it
    pub fn from_ratio(low: f64, approximation_ratio: f64) -> Self {
        let low = low.clamp(0.0, 1.0);
        let high = if approximation_ratio > 0.0 {
            (low / approximation_ratio).min(1.0)
        } else {
            1.0
        };
        Self { low, high: high.max(low) }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl fmt::Display for SimilarityInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.low, self.high)
    }
}

/// A verified pair, by record id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinResult {
    pub left_id: u64,
    pub right_id: u64,
    #[serde(flatten)]
    pub interval: SimilarityInterval,
}

/// Detailed outcome of one verification, for diagnostics
#[derive(Debug, Clone)]
pub struct Verification {
    pub interval: SimilarityInterval,
    pub graph: ConflictGraph,
    pub solution: MisSolution,
    pub partition_size: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SimilarityVerifier<'a> {
    finder: RelationFinder<'a>,
    kind: VerifierKind,
}

impl<'a> SimilarityVerifier<'a> {
    #[inline]
    #[must_use]
    pub fn new(sources: &'a EvidenceSources, kind: VerifierKind) -> Self {
        Self {
            finder: RelationFinder::new(sources),
            kind,
        }
    }

    #[inline]
    pub fn kind(&self) -> VerifierKind {
        self.kind
    }

    /// Similarity interval of two records
    pub fn similarity(&self, left: &Record, right: &Record) -> SimilarityInterval {
        self.verify(left, right).interval
    }

    pub fn verify(&self, left: &Record, right: &Record) -> Verification {
        let relations = self.finder.find(left, right);
        let graph = ConflictGraph::build(relations, left, right);
        let solution = mis::solve(&graph, self.kind);

        let unused = left
            .uncovered_tokens(solution.selected.iter().map(|&v| graph.relations[v].left_segment))
            .max(right.uncovered_tokens(solution.selected.iter().map(|&v| graph.relations[v].right_segment)));
        let partition_size = solution.selected.len() + unused;

        let interval = if partition_size == 0 || solution.selected.is_empty() {
            SimilarityInterval::ZERO
        } else {
            SimilarityInterval::from_ratio(
                solution.weight(&graph) / partition_size as f64,
                solution.approximation_ratio,
            )
        };

        Verification {
            interval,
            graph,
            solution,
            partition_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aujoin_core::{Dewey, SynonymTable, Taxonomy};

    fn sources() -> EvidenceSources {
        let taxonomy: Taxonomy = [
            ("cardiology", "1.2".parse::<Dewey>().unwrap()),
            ("arrhythmia", "1.2.5".parse::<Dewey>().unwrap()),
        ]
        .into_iter()
        .collect();
        let mut synonyms = SynonymTable::new();
        synonyms.insert_group("heart attack", ["myocardial infarction"]);

        EvidenceSources {
            taxonomy: Some(taxonomy),
            synonyms: Some(synonyms),
            gram_size: Some(2),
        }
    }

    #[test]
    fn test_identical_records() {
        let sources = sources();
        let a = Record::from_indexed(0, 1, &["0:heart 1:attack", "0:heart", "1:attack"]).unwrap();
        let b = Record::from_indexed(1, 2, &["0:myocardial 1:infarction"]).unwrap();

        for kind in [VerifierKind::Greedy, VerifierKind::Claw] {
            let sim = SimilarityVerifier::new(&sources, kind).similarity(&a, &b);
            assert_eq!(sim.low, 1.0);
            assert_eq!(sim.high, 1.0);
        }
    }

    #[test]
    fn test_unused_tokens_enlarge_partition() {
        let sources = sources();
        let a = Record::from_indexed(0, 1, &["0:arrhythmia", "1:today"]).unwrap();
        let b = Record::from_indexed(1, 2, &["0:cardiology"]).unwrap();

        let verification = SimilarityVerifier::new(&sources, VerifierKind::Greedy).verify(&a, &b);
        // taxonomy 2/3 plus one unmatched left word
        assert_eq!(verification.partition_size, 2);
        assert!((verification.interval.low - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(verification.interval.low, verification.interval.high);
    }

    #[test]
    fn test_single_vertex_interval() {
        let sources = sources();
        let a = Record::from_indexed(0, 1, &["0:arrhythmia"]).unwrap();
        let b = Record::from_indexed(1, 2, &["0:cardiology"]).unwrap();

        for kind in [VerifierKind::Greedy, VerifierKind::Claw] {
            let sim = SimilarityVerifier::new(&sources, kind).similarity(&a, &b);
            assert!((sim.low - 2.0 / 3.0).abs() < 1e-12);
            assert_eq!(sim.low, sim.high);
        }
    }

    #[test]
    fn test_no_relations_is_zero() {
        let sources = sources();
        let a = Record::from_indexed(0, 1, &["0:alpha"]).unwrap();
        let b = Record::from_indexed(1, 2, &["0:omega"]).unwrap();
        let sim = SimilarityVerifier::new(&sources, VerifierKind::Claw).similarity(&a, &b);
        assert_eq!(sim, SimilarityInterval::ZERO);
    }

    #[test]
    fn test_interval_from_ratio() {
        let sim = SimilarityInterval::from_ratio(0.4, 0.5);
        assert_eq!(sim.high, 0.8);
        assert!(sim.contains(0.6));
        assert_eq!(SimilarityInterval::from_ratio(0.9, 0.5).high, 1.0);

        // a looser ratio never lowers the upper bound
        let tight = SimilarityInterval::from_ratio(0.3, 0.9);
        let loose = SimilarityInterval::from_ratio(0.3, 0.6);
        assert!(loose.high >= tight.high);
    }

    #[test]
    fn test_interval_serializes() {
        let json = serde_json::to_string(&SimilarityInterval { low: 0.5, high: 0.75 }).unwrap();
        assert_eq!(json, r#"{"low":0.5,"high":0.75}"#);

        let result = JoinResult {
            left_id: 3,
            right_id: 9,
            interval: SimilarityInterval { low: 0.5, high: 0.75 },
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"left_id":3,"right_id":9,"low":0.5,"high":0.75}"#);
    }
}
