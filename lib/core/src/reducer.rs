//! Signature reduction
//!
//! A reducer shrinks the pebble list of a record to the shortest prefix (in
//! global order, rarest first) that still guarantees: any record whose weighted
//! similarity to this one reaches `threshold` shares at least `overlap`
//! pebbles with the prefix.
//!
//! Both algorithms walk candidate cut points from the most common pebble
//! backwards. Removed pebbles are accounted per segment as the maximum, over
//! evidence kinds, of the removed weight of that kind:
//!
//! ```text
//!   sorted:   [ p0 p1 ... p(i-1) | p(i) ... p(n-1) ]
//!               prefix (kept)       suffix (removed)
//!
//!   removed = sum over segments s of max_k suffix[s][k]
//! ```
//!
//! The cut stops at the first `i` where `removed + gain >= threshold * mps`,
//! `gain` being the most weight that `overlap - 1` matching prefix pebbles
//! could still add. The heuristic bounds `gain` by the heaviest `overlap - 1`
//! prefix weights; the dynamic program distributes the budget over segments
//! exactly, so its gain is never larger and its signatures never longer.

use crate::order::GlobalOrder;
use crate::pebble::{EvidenceKind, Pebble};
use crate::record::Record;
use crate::{Error, Result};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReducerKind {
    /// Greedy accounting of the heaviest remaining weights
    #[default]
    Heuristic,
    /// Per-segment budget allocation by dynamic programming
    DynamicProgramming,
}

impl FromStr for ReducerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" | "heuristic" => Ok(ReducerKind::Heuristic),
            "dp" => Ok(ReducerKind::DynamicProgramming),
            _ => Err(Error::UnknownReducer(s.to_string())),
        }
    }
}

impl fmt::Display for ReducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducerKind::Heuristic => f.write_str("fast"),
            ReducerKind::DynamicProgramming => f.write_str("dp"),
        }
    }
}

/// Multiset of weights supporting "sum of the c heaviest"
#[derive(Debug, Clone, Default)]
struct WeightBag {
    weights: BTreeMap<OrderedFloat<f64>, u32>,
}

impl WeightBag {
    fn insert(&mut self, weight: f64) {
        *self.weights.entry(OrderedFloat(weight)).or_insert(0) += 1;
    }

    fn remove(&mut self, weight: f64) {
        let key = OrderedFloat(weight);
        if let Some(count) = self.weights.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.weights.remove(&key);
            }
        }
    }

    fn top_sum(&self, c: usize) -> f64 {
        let mut left = c;
        let mut sum = 0.0;
        for (weight, &count) in self.weights.iter().rev() {
            if left == 0 {
                break;
            }
            let take = left.min(count as usize);
            sum += weight.0 * take as f64;
            left -= take;
        }
        sum
    }
}

/// Removed weight per evidence kind plus the bag of still-kept weights, for one segment
#[derive(Debug, Clone, Default)]
struct SegmentLedger {
    removed: [f64; EvidenceKind::COUNT],
    kept: [WeightBag; EvidenceKind::COUNT],
}

impl SegmentLedger {
    #[inline]
    fn removed_max(&self) -> f64 {
        self.removed.iter().copied().fold(0.0, f64::max)
    }

    /// Extra matched weight obtainable by spending `c` kept pebbles on this segment
    fn gain(&self, c: usize) -> f64 {
        if c == 0 {
            return 0.0;
        }
        let with_kept = EvidenceKind::ALL
            .iter()
            .map(|k| self.removed[k.index()] + self.kept[k.index()].top_sum(c))
            .fold(0.0, f64::max);
        with_kept - self.removed_max()
    }
}

/// Tracks `removed = sum_s max_k removed[s][k]` while pebbles move from prefix to suffix
struct Ledger {
    segments: Vec<SegmentLedger>,
    kept: WeightBag,
    removed: f64,
}

impl Ledger {
    fn new(num_segments: usize, pebbles: &[Pebble]) -> Self {
        let mut segments = vec![SegmentLedger::default(); num_segments];
        let mut kept = WeightBag::default();
        for p in pebbles {
            if p.segment >= segments.len() {
                segments.resize_with(p.segment + 1, SegmentLedger::default);
            }
            segments[p.segment].kept[p.kind().index()].insert(p.weight);
            kept.insert(p.weight);
        }
        Self {
            segments,
            kept,
            removed: 0.0,
        }
    }

    fn remove(&mut self, pebble: &Pebble) {
        let segment = &mut self.segments[pebble.segment];
        self.removed -= segment.removed_max();
        segment.removed[pebble.kind().index()] += pebble.weight;
        segment.kept[pebble.kind().index()].remove(pebble.weight);
        self.removed += segment.removed_max();
        self.kept.remove(pebble.weight);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SignatureReducer {
    pub kind: ReducerKind,
    pub threshold: f64,
    pub overlap: usize,
}

impl SignatureReducer {
    #[inline]
    #[must_use]
    pub fn new(kind: ReducerKind, threshold: f64, overlap: usize) -> Self {
        Self {
            kind,
            threshold,
            overlap: overlap.max(1),
        }
    }

    /// Reduce a record's pebbles to its signature, returned rarest first
    pub fn reduce(&self, record: &Record, mut pebbles: Vec<Pebble>, order: &GlobalOrder) -> Vec<Pebble> {
        if pebbles.is_empty() {
            return pebbles;
        }

        order.sort(&mut pebbles);
        let bound = self.threshold * record.min_partition_size() as f64;
        let cut = match self.kind {
            ReducerKind::Heuristic => self.heuristic_cut(record, &pebbles, bound),
            ReducerKind::DynamicProgramming => self.dp_cut(record, &pebbles, bound),
        };
        pebbles.truncate(cut);
        pebbles
    }

    fn heuristic_cut(&self, record: &Record, sorted: &[Pebble], bound: f64) -> usize {
        let mut ledger = Ledger::new(record.segments().len(), sorted);

        for i in (1..sorted.len()).rev() {
            ledger.remove(&sorted[i]);
            let future = ledger.kept.top_sum(self.overlap - 1);
            if ledger.removed + future >= bound {
                return i + 1;
            }
        }
        1
    }

    fn dp_cut(&self, record: &Record, sorted: &[Pebble], bound: f64) -> usize {
        let budget = self.overlap - 1;
        let mut ledger = Ledger::new(record.segments().len(), sorted);

        let mut acc = vec![0.0; budget + 1];
        let mut prev = vec![0.0; budget + 1];
        let mut next = vec![0.0; budget + 1];

        for i in (1..sorted.len()).rev() {
            ledger.remove(&sorted[i]);
            if ledger.removed >= bound {
                return i + 1;
            }
            if budget == 0 {
                continue;
            }

            prev.iter_mut().for_each(|v| *v = 0.0);
            for segment in &ledger.segments {
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot = segment.gain(c);
                }
                for d in 0..=budget {
                    next[d] = (0..=d).map(|c| prev[d - c] + acc[c]).fold(0.0, f64::max);
                    if ledger.removed + next[d] >= bound {
                        return i + 1;
                    }
                }
                std::mem::swap(&mut prev, &mut next);
            }
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::GlobalOrderBuilder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn order_of(pebbles: &[Pebble]) -> GlobalOrder {
        let mut builder = GlobalOrderBuilder::new();
        builder.add_all(pebbles);
        builder.freeze()
    }

    fn random_case(rng: &mut StdRng) -> (Record, Vec<Pebble>) {
        let words = rng.random_range(1..6u32);
        let raw: Vec<String> = (0..words).map(|w| format!("{}:w{}", w, w)).collect();
        let raw: Vec<&str> = raw.iter().map(String::as_str).collect();
        let record = Record::from_indexed(0, 0, &raw).unwrap();

        let count = rng.random_range(1..12);
        let pebbles = (0..count)
            .map(|_| {
                let kind = EvidenceKind::ALL[rng.random_range(0..EvidenceKind::COUNT)];
                let label = format!("l{}", rng.random_range(0..8));
                let weight = [1.0, 0.5, 0.25, 0.125][rng.random_range(0..4)];
                let segment = rng.random_range(0..words as usize);
                Pebble::new(label, kind, weight, segment)
            })
            .collect();
        (record, pebbles)
    }

    #[test]
    fn test_reducer_kind_from_str() {
        assert_eq!("fast".parse::<ReducerKind>().unwrap(), ReducerKind::Heuristic);
        assert_eq!("DP".parse::<ReducerKind>().unwrap(), ReducerKind::DynamicProgramming);
        let err = "magic".parse::<ReducerKind>().unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_weight_bag_top_sum() {
        let mut bag = WeightBag::default();
        for w in [0.5, 1.0, 0.5, 0.25] {
            bag.insert(w);
        }
        assert_eq!(bag.top_sum(0), 0.0);
        assert_eq!(bag.top_sum(2), 1.5);
        assert_eq!(bag.top_sum(3), 2.0);
        assert_eq!(bag.top_sum(10), 2.25);
        bag.remove(0.5);
        assert_eq!(bag.top_sum(3), 1.75);
    }

    #[test]
    fn test_empty_pebbles() {
        let record = Record::from_indexed(0, 0, &["0:a"]).unwrap();
        let reducer = SignatureReducer::new(ReducerKind::Heuristic, 0.8, 1);
        assert!(reducer.reduce(&record, Vec::new(), &GlobalOrder::default()).is_empty());
    }

    #[test]
    fn test_signature_is_rarest_prefix() {
        // four single-word segments, one pebble each
        let record = Record::from_indexed(0, 0, &["0:a", "1:b", "2:c", "3:d"]).unwrap();
        let pebbles = vec![
            Pebble::new("a", EvidenceKind::Synonym, 1.0, 0),
            Pebble::new("b", EvidenceKind::Synonym, 1.0, 1),
            Pebble::new("c", EvidenceKind::Synonym, 1.0, 2),
            Pebble::new("d", EvidenceKind::Synonym, 1.0, 3),
        ];
        let mut global = pebbles.clone();
        global.extend(std::iter::repeat(Pebble::new("d", EvidenceKind::Synonym, 1.0, 0)).take(3));
        global.extend(std::iter::repeat(Pebble::new("c", EvidenceKind::Synonym, 1.0, 0)).take(2));
        global.push(Pebble::new("b", EvidenceKind::Synonym, 1.0, 0));
        let order = order_of(&global);

        // bound = 0.5 * 4 = 2: removing d then c reaches it, so c is restored
        let reducer = SignatureReducer::new(ReducerKind::Heuristic, 0.5, 1);
        let signature = reducer.reduce(&record, pebbles.clone(), &order);
        let labels: Vec<&str> = signature.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        let dp = SignatureReducer::new(ReducerKind::DynamicProgramming, 0.5, 1);
        assert_eq!(dp.reduce(&record, pebbles.clone(), &order).len(), 3);

        // overlap 2 adds the heaviest kept weight: removing d alone already reaches 2
        let reducer = SignatureReducer::new(ReducerKind::Heuristic, 0.5, 2);
        assert_eq!(reducer.reduce(&record, pebbles, &order).len(), 4);
    }

    #[test]
    fn test_same_segment_kinds_are_not_double_counted() {
        let record = Record::from_indexed(0, 0, &["0:a", "1:b"]).unwrap();
        let pebbles = vec![
            Pebble::new("0", EvidenceKind::Synonym, 1.0, 1),
            Pebble::new("1.1", EvidenceKind::Taxonomy, 0.5, 0),
            Pebble::new("1", EvidenceKind::Taxonomy, 0.5, 0),
            Pebble::new("a", EvidenceKind::Synonym, 1.0, 0),
        ];
        let order = order_of(&pebbles);
        // bound = 1 * 2; segment 0 never contributes more than max(1.0, 0.5 + 0.5)
        let reducer = SignatureReducer::new(ReducerKind::Heuristic, 1.0, 1);
        let signature = reducer.reduce(&record, pebbles, &order);
        assert_eq!(signature.len(), 1);
        assert_eq!(signature[0].label(), "0");
    }

    #[test]
    fn test_monotonic_in_overlap_and_threshold() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let (record, pebbles) = random_case(&mut rng);
            let order = order_of(&pebbles);

            for kind in [ReducerKind::Heuristic, ReducerKind::DynamicProgramming] {
                let mut last = 0;
                for overlap in 1..4 {
                    let size = SignatureReducer::new(kind, 0.6, overlap)
                        .reduce(&record, pebbles.clone(), &order)
                        .len();
                    assert!(size >= last, "{:?} overlap {} shrank the signature", kind, overlap);
                    last = size;
                }

                let mut last = usize::MAX;
                for threshold in [0.2, 0.4, 0.6, 0.8, 1.0] {
                    let size = SignatureReducer::new(kind, threshold, 2)
                        .reduce(&record, pebbles.clone(), &order)
                        .len();
                    assert!(size <= last, "{:?} threshold {} grew the signature", kind, threshold);
                    last = size;
                }
            }
        }
    }

    #[test]
    fn test_dp_never_longer_than_heuristic() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let (record, pebbles) = random_case(&mut rng);
            let order = order_of(&pebbles);
            for overlap in 1..4 {
                for threshold in [0.3, 0.7, 0.9] {
                    let heuristic = SignatureReducer::new(ReducerKind::Heuristic, threshold, overlap)
                        .reduce(&record, pebbles.clone(), &order);
                    let dp = SignatureReducer::new(ReducerKind::DynamicProgramming, threshold, overlap)
                        .reduce(&record, pebbles.clone(), &order);
                    assert!(!dp.is_empty());
                    assert!(dp.len() <= heuristic.len());
                    if overlap == 1 {
                        assert_eq!(dp.len(), heuristic.len());
                    }
                }
            }
        }
    }
}
