// Inverted index from pebble key to the segments of signatures carrying it
use crate::pebble::{Pebble, PebbleKey};
use crate::record::SegmentRef;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    // key -> segments whose record signature holds the key, in record order
    lists: AHashMap<PebbleKey, Vec<SegmentRef>>,
    postings: usize,
}

impl InvertedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from signatures, `signatures[i]` belonging to record `i` of the collection
    pub fn build(signatures: &[Vec<Pebble>]) -> Self {
        let mut index = Self::new();
        for (record, signature) in signatures.iter().enumerate() {
            index.insert(record as u32, signature);
        }
        index
    }

    /// Append every pebble's segment to its key's list; duplicates are kept
    pub fn insert(&mut self, record: u32, signature: &[Pebble]) {
        for pebble in signature {
            let entry = SegmentRef {
                record,
                segment: pebble.segment as u32,
            };
            match self.lists.get_mut(&pebble.key) {
                Some(list) => list.push(entry),
                None => {
                    self.lists.insert(pebble.key.clone(), vec![entry]);
                }
            }
            self.postings += 1;
        }
    }

    #[inline]
    pub fn get(&self, key: &PebbleKey) -> Option<&[SegmentRef]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of segment entries across all lists
    #[inline]
    pub fn num_postings(&self) -> usize {
        self.postings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pebble::EvidenceKind;

    #[test]
    fn test_build_keeps_record_order_and_duplicates() {
        let signatures = vec![
            vec![
                Pebble::new("1.2", EvidenceKind::Taxonomy, 0.5, 0),
                Pebble::new("1.2", EvidenceKind::Taxonomy, 0.5, 2),
            ],
            vec![],
            vec![Pebble::new("1.2", EvidenceKind::Taxonomy, 1.0, 1)],
        ];
        let index = InvertedIndex::build(&signatures);

        let list = index.get(&PebbleKey::new("1.2", EvidenceKind::Taxonomy)).unwrap();
        assert_eq!(
            list,
            &[
                SegmentRef { record: 0, segment: 0 },
                SegmentRef { record: 0, segment: 2 },
                SegmentRef { record: 2, segment: 1 },
            ]
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.num_postings(), 3);
    }

    #[test]
    fn test_kind_is_part_of_the_key() {
        let index = InvertedIndex::build(&[vec![Pebble::new("car", EvidenceKind::Synonym, 1.0, 0)]]);
        assert!(index.get(&PebbleKey::new("car", EvidenceKind::Synonym)).is_some());
        assert!(index.get(&PebbleKey::new("car", EvidenceKind::NGram)).is_none());
    }
}
