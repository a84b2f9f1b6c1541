//! # AU-Join Similarity
//!
//! Verification half of the AU-Join filter-and-verify join.
//!
//! Given two segmented records, the verifier enumerates weighted segment
//! matches (relations), links matches that cannot hold together, and picks an
//! approximately maximum-weight independent set of them. The result is a
//! similarity interval whose width reflects the solver's approximation ratio.
//!
//! ## Example
//!
//! ```rust
//! use aujoin_core::{EvidenceSources, Record, SynonymTable};
//! use aujoin_similarity::{SimilarityVerifier, VerifierKind};
//!
//! let mut synonyms = SynonymTable::new();
//! synonyms.insert_group("car", ["auto"]);
//! let sources = EvidenceSources { synonyms: Some(synonyms), ..Default::default() };
//!
//! let a = Record::from_indexed(0, 1, &["0:red", "1:car"]).unwrap();
//! let b = Record::from_indexed(1, 2, &["0:auto"]).unwrap();
//!
//! let sim = SimilarityVerifier::new(&sources, VerifierKind::Claw).similarity(&a, &b);
//! assert_eq!(sim.low, 0.5);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Relations  │────>│  Conflict   │────>│  MIS solver │
//! │ (seg pairs) │     │    graph    │     │ greedy/claw │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │  Interval   │
//!                                         │ [low, high] │
//!                                         └─────────────┘
//! ```

pub mod graph;
pub mod mis;
pub mod relation;
pub mod verifier;

pub use graph::ConflictGraph;
pub use mis::{Claw, MisSolution, VerifierKind};
pub use relation::{Relation, RelationFinder};
pub use verifier::{JoinResult, SimilarityInterval, SimilarityVerifier, Verification};
