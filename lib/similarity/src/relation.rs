//! Relations between the segments of two records
//!
//! A relation is a weighted potential match between one left segment and one
//! right segment, produced by a single evidence kind:
//!
//! - taxonomy: longest common Dewey prefix over the longer path, when positive
//! - synonym: 1.0 when both labels share a canonical form
//! - n-gram: multiset Jaccard of the gram bags, for single-word segments the
//!   knowledge bases know nothing about, when positive

use aujoin_core::gram;
use aujoin_core::{EvidenceKind, EvidenceSources, Record, Segment};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relation {
    pub left_segment: usize,
    pub right_segment: usize,
    pub kind: EvidenceKind,
    /// In (0, 1]
    pub weight: f64,
}

/// Finds every relation between two records under the enabled evidence sources
#[derive(Debug, Clone, Copy)]
pub struct RelationFinder<'a> {
    sources: &'a EvidenceSources,
}

impl<'a> RelationFinder<'a> {
    #[inline]
    #[must_use]
    pub fn new(sources: &'a EvidenceSources) -> Self {
        Self { sources }
    }

    /// All relations: taxonomy, then synonym, then n-gram
    pub fn find(&self, left: &Record, right: &Record) -> Vec<Relation> {
        let mut relations = Vec::new();
        for kind in EvidenceKind::ALL {
            self.find_into(left, right, kind, &mut relations);
        }
        relations
    }

    pub fn find_kind(&self, left: &Record, right: &Record, kind: EvidenceKind) -> Vec<Relation> {
        let mut relations = Vec::new();
        self.find_into(left, right, kind, &mut relations);
        relations
    }

    fn find_into(&self, left: &Record, right: &Record, kind: EvidenceKind, out: &mut Vec<Relation>) {
        for a in left.segments() {
            for b in right.segments() {
                if let Some(weight) = self.weight(a, b, kind) {
                    out.push(Relation {
                        left_segment: a.position(),
                        right_segment: b.position(),
                        kind,
                        weight,
                    });
                }
            }
        }
    }

    fn weight(&self, a: &Segment, b: &Segment, kind: EvidenceKind) -> Option<f64> {
        match kind {
            EvidenceKind::Taxonomy => {
                let da = self.sources.dewey(&a.label)?;
                let db = self.sources.dewey(&b.label)?;
                Some(da.similarity(db)).filter(|&w| w > 0.0)
            }
            EvidenceKind::Synonym => {
                let ca = self.sources.canonical(&a.label)?;
                let cb = self.sources.canonical(&b.label)?;
                (ca == cb).then_some(1.0)
            }
            EvidenceKind::NGram => {
                let gram_size = self.sources.gram_size?;
                if !self.takes_grams(a) || !self.takes_grams(b) {
                    return None;
                }
                Some(gram::jaccard(&a.label, &b.label, gram_size)).filter(|&w| w > 0.0)
            }
        }
    }

    #[inline]
    fn takes_grams(&self, segment: &Segment) -> bool {
        segment.num_words() == 1 && !self.sources.is_trusted(&segment.label)
    }
}
