//! Global evidence order
//!
//! Ordering is a two-phase protocol. A [`GlobalOrderBuilder`] accumulates
//! key frequencies from both collections (batches may arrive in any order and
//! partial builders may be merged), then [`GlobalOrderBuilder::freeze`] turns it
//! into an immutable [`GlobalOrder`] that can be shared across threads.
//!
//! Keys are ranked ascending by frequency, so rank 0 is the rarest and most
//! distinctive evidence. Ties are broken by label, then by evidence kind.

use crate::pebble::{Pebble, PebbleKey};
use ahash::AHashMap;
use std::cmp::Ordering;

#[derive(Debug, Clone, Default)]
pub struct GlobalOrderBuilder {
    counts: AHashMap<PebbleKey, u64>,
}

impl GlobalOrderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every pebble, one occurrence each
    pub fn add_all<'p>(&mut self, pebbles: impl IntoIterator<Item = &'p Pebble>) {
        for pebble in pebbles {
            self.add_key(&pebble.key);
        }
    }

    pub fn add_key(&mut self, key: &PebbleKey) {
        if let Some(count) = self.counts.get_mut(key) {
            *count += 1;
        } else {
            self.counts.insert(key.clone(), 1);
        }
    }

    /// Fold the counts of another builder into this one
    pub fn merge(mut self, other: GlobalOrderBuilder) -> Self {
        if self.counts.len() < other.counts.len() {
            return other.merge(self);
        }
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn freeze(self) -> GlobalOrder {
        let mut keys: Vec<(PebbleKey, u64)> = self.counts.into_iter().collect();
        keys.sort_unstable_by(|(ka, ca), (kb, cb)| {
            ca.cmp(cb)
                .then_with(|| ka.label.cmp(&kb.label))
                .then_with(|| ka.kind.cmp(&kb.kind))
        });

        let entries = keys
            .into_iter()
            .enumerate()
            .map(|(rank, (key, count))| (key, OrderEntry { rank, count }))
            .collect();

        GlobalOrder { entries }
    }
}

#[derive(Debug, Clone, Copy)]
struct OrderEntry {
    rank: usize,
    count: u64,
}

/// Frozen key ranking, read-only
#[derive(Debug, Clone, Default)]
pub struct GlobalOrder {
    entries: AHashMap<PebbleKey, OrderEntry>,
}

impl GlobalOrder {
    #[inline]
    pub fn rank(&self, key: &PebbleKey) -> Option<usize> {
        self.entries.get(key).map(|e| e.rank)
    }

    /// Number of occurrences counted for a key, 0 when never seen
    #[inline]
    pub fn frequency(&self, key: &PebbleKey) -> u64 {
        self.entries.get(key).map_or(0, |e| e.count)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total order over keys; keys that were never counted come first
    pub fn compare(&self, a: &PebbleKey, b: &PebbleKey) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => a.label.cmp(&b.label).then_with(|| a.kind.cmp(&b.kind)),
        }
    }

    /// Sort pebbles rarest first
    pub fn sort(&self, pebbles: &mut [Pebble]) {
        pebbles.sort_by(|a, b| self.compare(&a.key, &b.key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pebble::EvidenceKind;

    fn pebble(label: &str, kind: EvidenceKind) -> Pebble {
        Pebble::new(label, kind, 1.0, 0)
    }

    fn sample() -> Vec<Pebble> {
        vec![
            pebble("a", EvidenceKind::Synonym),
            pebble("b", EvidenceKind::Synonym),
            pebble("a", EvidenceKind::Synonym),
            pebble("c", EvidenceKind::NGram),
            pebble("a", EvidenceKind::Taxonomy),
            pebble("b", EvidenceKind::Synonym),
            pebble("a", EvidenceKind::Synonym),
        ]
    }

    #[test]
    fn test_rank_ascending_by_frequency() {
        let mut builder = GlobalOrderBuilder::new();
        builder.add_all(&sample());
        let order = builder.freeze();

        let rank = |label: &str, kind| order.rank(&PebbleKey::new(label, kind)).unwrap();
        // count 1: a/taxonomy, c/ngram (label tie-break), count 2: b, count 3: a/synonym
        assert_eq!(rank("a", EvidenceKind::Taxonomy), 0);
        assert_eq!(rank("c", EvidenceKind::NGram), 1);
        assert_eq!(rank("b", EvidenceKind::Synonym), 2);
        assert_eq!(rank("a", EvidenceKind::Synonym), 3);
        assert_eq!(order.frequency(&PebbleKey::new("a", EvidenceKind::Synonym)), 3);
        assert_eq!(order.frequency(&PebbleKey::new("zz", EvidenceKind::Synonym)), 0);
    }

    #[test]
    fn test_batch_split_idempotence() {
        let pebbles = sample();

        let mut whole = GlobalOrderBuilder::new();
        whole.add_all(&pebbles);
        let whole = whole.freeze();

        let mut first = GlobalOrderBuilder::new();
        first.add_all(pebbles[4..].iter().rev());
        first.add_all(&pebbles[..2]);
        let mut second = GlobalOrderBuilder::new();
        second.add_all(&pebbles[2..4]);
        let split = second.merge(first).freeze();

        for p in &pebbles {
            assert_eq!(whole.rank(&p.key), split.rank(&p.key));
            assert_eq!(whole.frequency(&p.key), split.frequency(&p.key));
        }
    }

    #[test]
    fn test_unknown_keys_sort_first() {
        let mut builder = GlobalOrderBuilder::new();
        builder.add_all(&sample());
        let order = builder.freeze();

        let mut pebbles = vec![
            pebble("a", EvidenceKind::Synonym),
            pebble("new", EvidenceKind::NGram),
            pebble("a", EvidenceKind::Taxonomy),
        ];
        order.sort(&mut pebbles);
        let labels: Vec<&str> = pebbles.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["new", "a", "a"]);
        assert_eq!(pebbles[1].kind(), EvidenceKind::Taxonomy);
    }
}
