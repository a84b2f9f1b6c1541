//! Conflict graph over relations
//!
//! Vertices are relations; two relations are adjacent when their segments
//! share a word position in the left record or in the right record. An
//! independent set is therefore a set of segment matches that can all hold at
//! the same time.

use crate::relation::Relation;
use aujoin_core::Record;
use smallvec::SmallVec;

pub type Neighbours = SmallVec<[usize; 8]>;

#[derive(Debug, Clone)]
pub struct ConflictGraph {
    pub relations: Vec<Relation>,
    /// Sorted adjacency lists, indexed by vertex
    pub neighbours: Vec<Neighbours>,
    /// `max(1, largest degree) + 1`; claw search reports ratio `2 / claw_free`
    pub claw_free: usize,
}

impl ConflictGraph {
    pub fn build(relations: Vec<Relation>, left: &Record, right: &Record) -> Self {
        let n = relations.len();
        let mut neighbours = vec![Neighbours::new(); n];

        for u in 0..n {
            for v in (u + 1)..n {
                let (ru, rv) = (&relations[u], &relations[v]);
                if left.segments_conflict(ru.left_segment, rv.left_segment)
                    || right.segments_conflict(ru.right_segment, rv.right_segment)
                {
                    neighbours[u].push(v);
                    neighbours[v].push(u);
                }
            }
        }

        // a lone centre counts as a 1-claw
        let max_degree = neighbours.iter().map(|n| n.len()).max().unwrap_or(0).max(1);

        Self {
            relations,
            neighbours,
            claw_free: max_degree + 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    #[inline]
    pub fn weight(&self, vertex: usize) -> f64 {
        self.relations[vertex].weight
    }

    #[inline]
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        self.neighbours[u].binary_search(&v).is_ok()
    }
}
