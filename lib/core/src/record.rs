//! Segmented records
//!
//! A record is a composite text string decomposed into overlapping segments.
//! Every segment covers a set of word positions; two segments of the same
//! record conflict when they cover a common position.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Position of a word inside its record
pub type WordId = u32;

/// A contiguous token span of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    word_ids: SmallVec<[WordId; 4]>,
    conflicts: SmallVec<[usize; 4]>,
    position: usize,
}

impl Segment {
    /// Create a segment from its label and the word positions it covers
    pub fn new(label: impl Into<String>, word_ids: impl IntoIterator<Item = WordId>) -> Self {
        let mut word_ids: SmallVec<[WordId; 4]> = word_ids.into_iter().collect();
        word_ids.sort_unstable();
        word_ids.dedup();
        Self {
            label: label.into(),
            word_ids,
            conflicts: SmallVec::new(),
            position: 0,
        }
    }

    /// Parse the `index:word` notation, e.g. `"3:heart 4:attack"`
    pub fn parse_indexed(raw: &str) -> Result<Self> {
        let mut words = Vec::new();
        let mut ids = Vec::new();

        for token in raw.split_whitespace() {
            let (index, word) = token
                .split_once(':')
                .ok_or_else(|| Error::parse(format!("segment token '{}' has no word index", token)))?;
            let index: WordId = index
                .parse()
                .map_err(|_| Error::parse(format!("invalid word index in '{}'", token)))?;
            ids.push(index);
            words.push(word);
        }

        if words.is_empty() {
            return Err(Error::parse("empty segment"));
        }

        Ok(Self::new(words.join(" "), ids))
    }

    #[inline]
    pub fn word_ids(&self) -> &[WordId] {
        &self.word_ids
    }

    #[inline]
    pub fn num_words(&self) -> usize {
        self.word_ids.len()
    }

    /// Positions (within the owning record) of the segments sharing a word with this one
    #[inline]
    pub fn conflicts(&self) -> &[usize] {
        &self.conflicts
    }

    /// Position of this segment within its record
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    fn overlaps(&self, other: &Segment) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.word_ids.len() && j < other.word_ids.len() {
            match self.word_ids[i].cmp(&other.word_ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

/// Handle to a segment inside a record arena: `record` indexes the dataset,
/// `segment` indexes the record's segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentRef {
    pub record: u32,
    pub segment: u32,
}

/// A segmented string. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Record {
    pub dataset: u32,
    pub id: u64,
    segments: Vec<Segment>,
    num_tokens: usize,
    min_partition_size: usize,
}

impl Record {
    pub fn new(dataset: u32, id: u64, segments: Vec<Segment>) -> Self {
        let mut segments = segments;
        for (position, segment) in segments.iter_mut().enumerate() {
            segment.position = position;
            segment.conflicts.clear();
        }

        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if segments[i].overlaps(&segments[j]) {
                    segments[i].conflicts.push(j);
                    segments[j].conflicts.push(i);
                }
            }
        }
        for segment in &mut segments {
            segment.conflicts.sort_unstable();
        }

        let mut tokens: Vec<WordId> = segments.iter().flat_map(|s| s.word_ids.iter().copied()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        let num_tokens = tokens.len();

        let min_partition_size = min_partition_size(&segments, &tokens);

        Self {
            dataset,
            id,
            segments,
            num_tokens,
            min_partition_size,
        }
    }

    /// Build a record from segments in `index:word` notation
    pub fn from_indexed(dataset: u32, id: u64, raw_segments: &[&str]) -> Result<Self> {
        let segments = raw_segments
            .iter()
            .map(|raw| Segment::parse_indexed(raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(dataset, id, segments))
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, position: usize) -> &Segment {
        &self.segments[position]
    }

    /// Number of distinct word positions
    #[inline]
    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    /// Lower bound on the number of disjoint segments needed to cover every word
    #[inline]
    pub fn min_partition_size(&self) -> usize {
        self.min_partition_size
    }

    /// Whether two segments of this record share a word position (a segment conflicts with itself)
    pub fn segments_conflict(&self, a: usize, b: usize) -> bool {
        a == b || self.segments[a].conflicts.binary_search(&b).is_ok()
    }

    /// Word positions of this record covered by none of the given segments
    pub fn uncovered_tokens(&self, used_segments: impl IntoIterator<Item = usize>) -> usize {
        let mut covered: Vec<WordId> = used_segments
            .into_iter()
            .flat_map(|s| self.segments[s].word_ids.iter().copied())
            .collect();
        covered.sort_unstable();
        covered.dedup();
        self.num_tokens.saturating_sub(covered.len())
    }
}

/// Greedy set cover over word positions, corrected by the `ln(n) + 1`
/// approximation factor so the result never exceeds the optimum.
fn min_partition_size(segments: &[Segment], tokens: &[WordId]) -> usize {
    if segments.is_empty() || tokens.is_empty() {
        return 0;
    }

    let longest = segments.iter().map(Segment::num_words).max().unwrap_or(1).max(1);
    let mut used: ahash::AHashSet<WordId> = ahash::AHashSet::with_capacity(tokens.len());
    let mut parts = 0usize;

    while used.len() < tokens.len() {
        let best = segments
            .iter()
            .max_by_key(|s| s.word_ids.iter().filter(|w| !used.contains(*w)).count());
        match best {
            Some(segment) => {
                used.extend(segment.word_ids.iter().copied());
                parts += 1;
            }
            None => break,
        }
    }

    (parts as f64 / ((longest as f64).ln() + 1.0)).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indexed_segment() {
        let segment = Segment::parse_indexed("4:attack 3:heart").unwrap();
        assert_eq!(segment.label, "attack heart");
        assert_eq!(segment.word_ids(), &[3, 4]);
        assert_eq!(segment.num_words(), 2);
    }

    #[test]
    fn test_parse_indexed_rejects_missing_index() {
        assert!(Segment::parse_indexed("heart").is_err());
        assert!(Segment::parse_indexed("x:heart").is_err());
        assert!(Segment::parse_indexed("   ").is_err());
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let record = Record::from_indexed(0, 1, &["0:heart", "1:attack", "0:heart 1:attack", "2:today"]).unwrap();

        assert_eq!(record.segment(0).conflicts(), &[2]);
        assert_eq!(record.segment(1).conflicts(), &[2]);
        assert_eq!(record.segment(2).conflicts(), &[0, 1]);
        assert!(record.segment(3).conflicts().is_empty());
        assert!(record.segments_conflict(0, 2));
        assert!(record.segments_conflict(1, 1));
        assert!(!record.segments_conflict(0, 3));
    }

    #[test]
    fn test_single_word_partition_size() {
        let record = Record::from_indexed(0, 1, &["0:a", "1:b", "2:c"]).unwrap();
        assert_eq!(record.num_tokens(), 3);
        // ln(1) + 1 == 1, so the greedy cover is returned as is
        assert_eq!(record.min_partition_size(), 3);
    }

    #[test]
    fn test_partition_size_uses_log_correction() {
        let record = Record::from_indexed(0, 1, &["0:a", "1:b", "2:c", "0:a 1:b 2:c"]).unwrap();
        // greedy picks the three-word segment once; ceil(1 / (ln 3 + 1)) == 1
        assert_eq!(record.min_partition_size(), 1);

        let record = Record::from_indexed(0, 2, &["0:a", "1:b", "2:c", "3:d", "0:a 1:b"]).unwrap();
        // parts = 3, ceil(3 / (ln 2 + 1)) == 2
        assert_eq!(record.min_partition_size(), 2);
    }

    #[test]
    fn test_empty_record() {
        let record = Record::new(0, 9, Vec::new());
        assert_eq!(record.num_tokens(), 0);
        assert_eq!(record.min_partition_size(), 0);
        assert_eq!(record.uncovered_tokens(std::iter::empty()), 0);
    }

    #[test]
    fn test_uncovered_tokens() {
        let record = Record::from_indexed(0, 1, &["0:a", "1:b", "2:c", "1:b 2:c"]).unwrap();
        assert_eq!(record.uncovered_tokens([3]), 1);
        assert_eq!(record.uncovered_tokens([0, 3]), 0);
        assert_eq!(record.uncovered_tokens(std::iter::empty()), 3);
    }
}
