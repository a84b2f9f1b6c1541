//! # AU-Join
//!
//! Threshold similarity join over segmented strings, with taxonomy, synonym
//! and n-gram evidence.
//!
//! Each record is a composite string cut into overlapping segments. AU-Join
//! finds every pair of records, one from each collection, whose weighted
//! partial-matching similarity reaches a threshold, without comparing all
//! pairs:
//!
//! 1. segments are turned into weighted evidence *pebbles*
//! 2. pebbles are ranked globally, rarest first
//! 3. each record keeps the shortest prefix of its pebbles that still cannot
//!    miss a match (its *signature*)
//! 4. signatures of one side are indexed and probed by the other side
//! 5. surviving pairs are verified by an approximate maximum-weight
//!    independent set over their segment matches
//!
//! ## Quick Start
//!
//! ### As a Command
//!
//! ```bash
//! aujoin --taxonomy tax.txt --synonym syn.txt --jaccard 3 -c 3 -o result.csv 0.9 list1.txt list2.txt
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use aujoin::prelude::*;
//!
//! let mut synonyms = SynonymTable::new();
//! synonyms.insert_group("car", ["auto"]);
//! let sources = EvidenceSources { synonyms: Some(synonyms), ..Default::default() };
//!
//! let left = vec![Record::from_indexed(0, 1, &["0:car"]).unwrap()];
//! let right = vec![Record::from_indexed(1, 7, &["0:auto"]).unwrap()];
//!
//! let pipeline = JoinPipeline::new(JoinConfig::default(), sources).unwrap();
//! let report = pipeline.run(&left, &right);
//! assert_eq!(report.results[0].right_id, 7);
//! ```
//!
//! ## Crate Structure
//!
//! - `aujoin-core` - records, knowledge bases, pebbles, global order, reducers, index and prefix filter
//! - `aujoin-similarity` - relations, conflict graph, greedy and claw verifiers
//! - `aujoin-io` - record and knowledge loaders, result writers

pub mod pipeline;

// Re-export core types
pub use aujoin_core::{
    CandidatePair, Dewey, Error, EvidenceKind, EvidenceSources, FilterOutcome, GlobalOrder, GlobalOrderBuilder,
    InvertedIndex, Pebble, PebbleGenerator, PebbleKey, PrefixFilter, Record, ReducerKind, Result, Segment,
    SegmentRef, SignatureReducer, SynonymTable, Taxonomy,
};

// Re-export verification
pub use aujoin_similarity::{JoinResult, SimilarityInterval, SimilarityVerifier, VerifierKind};

// Re-export IO
pub use aujoin_io::{load_records, load_synonyms, load_taxonomy, write_results, OutputTarget};

pub use pipeline::{JoinConfig, JoinPipeline, JoinReport, JoinStats};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EvidenceKind, EvidenceSources, JoinConfig, JoinPipeline, JoinReport, JoinResult, Record, ReducerKind,
        Segment, SimilarityInterval, SynonymTable, Taxonomy, VerifierKind,
        Error, Result,
    };
}
