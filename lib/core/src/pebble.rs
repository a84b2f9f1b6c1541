//! Evidence pebbles
//!
//! A pebble is one weighted piece of evidence that a record contains, derived
//! from a single segment. Pebbles are compared and hashed by their
//! [`PebbleKey`] only; weight and originating segment ride along for scoring.

use crate::gram;
use crate::knowledge::EvidenceSources;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Source of a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Taxonomy = 0,
    Synonym = 1,
    NGram = 2,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 3] = [EvidenceKind::Taxonomy, EvidenceKind::Synonym, EvidenceKind::NGram];
    pub const COUNT: usize = 3;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvidenceKind::Taxonomy => "taxonomy",
            EvidenceKind::Synonym => "synonym",
            EvidenceKind::NGram => "ngram",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PebbleKey {
    pub label: String,
    pub kind: EvidenceKind,
}

impl PebbleKey {
    #[inline]
    pub fn new(label: impl Into<String>, kind: EvidenceKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

impl fmt::Display for PebbleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.label)
    }
}

#[derive(Debug, Clone)]
pub struct Pebble {
    pub key: PebbleKey,
    /// In (0, 1]
    pub weight: f64,
    /// Position of the originating segment within its record
    pub segment: usize,
}

impl Pebble {
    #[inline]
    pub fn new(label: impl Into<String>, kind: EvidenceKind, weight: f64, segment: usize) -> Self {
        Self {
            key: PebbleKey::new(label, kind),
            weight,
            segment,
        }
    }

    #[inline]
    pub fn kind(&self) -> EvidenceKind {
        self.key.kind
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.key.label
    }
}

impl PartialEq for Pebble {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Pebble {}

impl Hash for Pebble {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Turns records into pebbles using the enabled evidence sources
pub struct PebbleGenerator<'a> {
    sources: &'a EvidenceSources,
}

impl<'a> PebbleGenerator<'a> {
    #[inline]
    #[must_use]
    pub fn new(sources: &'a EvidenceSources) -> Self {
        Self { sources }
    }

    /// All pebbles of a record: taxonomy, then synonym, then n-gram
    pub fn generate(&self, record: &Record) -> Vec<Pebble> {
        let mut pebbles = Vec::new();
        for kind in EvidenceKind::ALL {
            self.generate_into(record, kind, &mut pebbles);
        }
        pebbles
    }

    /// Pebbles of a single evidence kind
    pub fn generate_kind(&self, record: &Record, kind: EvidenceKind) -> Vec<Pebble> {
        let mut pebbles = Vec::new();
        self.generate_into(record, kind, &mut pebbles);
        pebbles
    }

    fn generate_into(&self, record: &Record, kind: EvidenceKind, out: &mut Vec<Pebble>) {
        match kind {
            EvidenceKind::Taxonomy => self.taxonomy(record, out),
            EvidenceKind::Synonym => self.synonym(record, out),
            EvidenceKind::NGram => self.ngram(record, out),
        }
    }

    fn taxonomy(&self, record: &Record, out: &mut Vec<Pebble>) {
        for segment in record.segments() {
            let Some(dewey) = self.sources.dewey(&segment.label) else {
                continue;
            };
            // every ancestor shares the weight of the matched node
            let weight = 1.0 / dewey.depth() as f64;
            for node in dewey.lineage() {
                out.push(Pebble::new(node.to_string(), EvidenceKind::Taxonomy, weight, segment.position()));
            }
        }
    }

    fn synonym(&self, record: &Record, out: &mut Vec<Pebble>) {
        for segment in record.segments() {
            if let Some(canonical) = self.sources.canonical(&segment.label) {
                out.push(Pebble::new(canonical, EvidenceKind::Synonym, 1.0, segment.position()));
            }
        }
    }

    fn ngram(&self, record: &Record, out: &mut Vec<Pebble>) {
        let Some(gram_size) = self.sources.gram_size else {
            return;
        };

        for segment in record.segments() {
            if segment.num_words() > 1 || self.sources.is_trusted(&segment.label) {
                continue;
            }

            let grams = gram::shingles(&segment.label, gram_size);
            if grams.is_empty() {
                continue;
            }
            let weight = 1.0 / grams.len() as f64;
            for g in grams {
                out.push(Pebble::new(g, EvidenceKind::NGram, weight, segment.position()));
            }
        }
    }
}
