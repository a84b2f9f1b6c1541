//! Staged join pipeline
//!
//! Every stage is a fork-join over records (or candidate pairs) on the
//! pipeline's own rayon pool; a stage returns only once all of its work is
//! done, and the next stage reads its output immutably.
//!
//! ```text
//! generate_pebbles ─► build_order ─► build_signatures ─► build_index
//!                                                            │
//!                          verify ◄── filter_candidates ◄────┘
//! ```

use aujoin_core::{
    EvidenceSources, FilterOutcome, GlobalOrder, GlobalOrderBuilder, InvertedIndex, Pebble, PebbleGenerator,
    PrefixFilter, Record, ReducerKind, SignatureReducer,
};
use aujoin_core::{Error, Result};
use aujoin_similarity::{JoinResult, SimilarityVerifier, VerifierKind};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Threads kept free for the rest of the system when sizing the pool automatically
const RESERVED_CORES: usize = 2;

/// Join parameters
#[derive(Debug, Clone, PartialEq)]
pub struct JoinConfig {
    /// Similarity threshold in (0, 1]
    pub threshold: f64,
    /// Number of common signature pebbles required for a candidate
    pub overlap: usize,
    pub reducer: ReducerKind,
    pub verifier: VerifierKind,
    /// Worker threads; `None` sizes the pool from the available cores
    pub threads: Option<usize>,
    /// Run every stage on a single thread
    pub single_thread: bool,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            overlap: 1,
            reducer: ReducerKind::Heuristic,
            verifier: VerifierKind::Greedy,
            threads: None,
            single_thread: false,
        }
    }
}

impl JoinConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "similarity threshold must be within (0, 1], got {}",
                self.threshold
            )));
        }
        if self.overlap < 1 {
            return Err(Error::InvalidConfig("number of common signatures must be at least 1".to_string()));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("thread count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Size of the worker pool
    pub fn worker_threads(&self) -> usize {
        if self.single_thread {
            return 1;
        }
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .saturating_sub(RESERVED_CORES)
                .max(1)
        })
    }
}

/// Counters and timings collected by [`JoinPipeline::run`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinStats {
    pub records: (usize, usize),
    pub pebbles: (usize, usize),
    pub signature_pebbles: (usize, usize),
    pub index_keys: usize,
    pub examined_pairs: usize,
    pub candidates: usize,
    pub results: usize,
    pub pebble_time: Duration,
    pub signature_time: Duration,
    pub filter_time: Duration,
    pub verify_time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct JoinReport {
    /// Sorted by (left id, right id)
    pub results: Vec<JoinResult>,
    pub stats: JoinStats,
}

pub struct JoinPipeline {
    config: JoinConfig,
    sources: EvidenceSources,
    pool: ThreadPool,
}

impl JoinPipeline {
    /// Validate the configuration and spin up the worker pool
    pub fn new(config: JoinConfig, sources: EvidenceSources) -> Result<Self> {
        config.validate()?;
        sources.validate()?;

        let threads = config.worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("aujoin-worker-{}", i))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to create thread pool: {}", e)))?;
        debug!(threads, "worker pool ready");

        Ok(Self { config, sources, pool })
    }

    #[inline]
    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    #[inline]
    pub fn sources(&self) -> &EvidenceSources {
        &self.sources
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Pebbles of every record, in record order
    pub fn generate_pebbles(&self, records: &[Record]) -> Vec<Vec<Pebble>> {
        let generator = PebbleGenerator::new(&self.sources);
        self.pool
            .install(|| records.par_iter().map(|r| generator.generate(r)).collect())
    }

    /// Count every pebble of both collections, then freeze the ranking
    pub fn build_order(&self, left: &[Vec<Pebble>], right: &[Vec<Pebble>]) -> GlobalOrder {
        let builder = self.pool.install(|| {
            left.par_iter()
                .chain(right.par_iter())
                .fold(GlobalOrderBuilder::new, |mut builder, pebbles| {
                    builder.add_all(pebbles);
                    builder
                })
                .reduce(GlobalOrderBuilder::new, GlobalOrderBuilder::merge)
        });
        debug!(keys = builder.len(), "global order frozen");
        builder.freeze()
    }

    /// Reduce every record's pebbles to its signature
    pub fn build_signatures(&self, records: &[Record], pebbles: Vec<Vec<Pebble>>, order: &GlobalOrder) -> Vec<Vec<Pebble>> {
        let reducer = SignatureReducer::new(self.config.reducer, self.config.threshold, self.config.overlap);
        self.pool.install(|| {
            records
                .par_iter()
                .zip(pebbles.into_par_iter())
                .map(|(record, pebbles)| reducer.reduce(record, pebbles, order))
                .collect()
        })
    }

    pub fn build_index(&self, signatures: &[Vec<Pebble>]) -> InvertedIndex {
        InvertedIndex::build(signatures)
    }

    pub fn filter_candidates(
        &self,
        left: &[Record],
        signatures_left: &[Vec<Pebble>],
        right: &[Record],
        index_right: &InvertedIndex,
    ) -> FilterOutcome {
        let filter = PrefixFilter::new(self.config.threshold, self.config.overlap);
        self.pool
            .install(|| filter.candidates(left, signatures_left, right, index_right))
    }

    /// Verify candidates, keeping pairs whose upper bound reaches the threshold
    pub fn verify(&self, left: &[Record], right: &[Record], candidates: &FilterOutcome) -> Vec<JoinResult> {
        let verifier = SimilarityVerifier::new(&self.sources, self.config.verifier);
        let threshold = self.config.threshold;

        let mut results: Vec<JoinResult> = self.pool.install(|| {
            candidates
                .candidates
                .par_iter()
                .filter_map(|pair| {
                    let a = left.get(pair.left as usize)?;
                    let b = right.get(pair.right as usize)?;
                    let interval = verifier.similarity(a, b);
                    (interval.high >= threshold).then_some(JoinResult {
                        left_id: a.id,
                        right_id: b.id,
                        interval,
                    })
                })
                .collect()
        });

        results.sort_by(|x, y| (x.left_id, x.right_id).cmp(&(y.left_id, y.right_id)));
        results
    }

    /// Join two collections end to end
    pub fn run(&self, left: &[Record], right: &[Record]) -> JoinReport {
        let mut stats = JoinStats {
            records: (left.len(), right.len()),
            ..Default::default()
        };

        let started = Instant::now();
        let pebbles_left = self.generate_pebbles(left);
        let pebbles_right = self.generate_pebbles(right);
        stats.pebbles = (count(&pebbles_left), count(&pebbles_right));
        let order = self.build_order(&pebbles_left, &pebbles_right);
        stats.pebble_time = started.elapsed();
        info!(
            left = stats.pebbles.0,
            right = stats.pebbles.1,
            keys = order.len(),
            "generated pebbles"
        );

        let started = Instant::now();
        let signatures_left = self.build_signatures(left, pebbles_left, &order);
        let signatures_right = self.build_signatures(right, pebbles_right, &order);
        stats.signature_time = started.elapsed();
        stats.signature_pebbles = (count(&signatures_left), count(&signatures_right));
        info!(
            left = stats.signature_pebbles.0,
            right = stats.signature_pebbles.1,
            reducer = %self.config.reducer,
            elapsed_ms = stats.signature_time.as_millis() as u64,
            "selected signatures"
        );

        let started = Instant::now();
        let index = self.build_index(&signatures_right);
        stats.index_keys = index.len();
        let outcome = self.filter_candidates(left, &signatures_left, right, &index);
        stats.filter_time = started.elapsed();
        stats.examined_pairs = outcome.examined;
        stats.candidates = outcome.candidates.len();
        info!(
            candidates = stats.candidates,
            examined = stats.examined_pairs,
            index_keys = stats.index_keys,
            elapsed_ms = stats.filter_time.as_millis() as u64,
            "filtered candidates"
        );

        let started = Instant::now();
        let results = self.verify(left, right, &outcome);
        stats.verify_time = started.elapsed();
        stats.results = results.len();
        info!(
            results = stats.results,
            verifier = %self.config.verifier,
            elapsed_ms = stats.verify_time.as_millis() as u64,
            "verified candidates"
        );

        JoinReport { results, stats }
    }
}

fn count(lists: &[Vec<Pebble>]) -> usize {
    lists.iter().map(Vec::len).sum()
}
