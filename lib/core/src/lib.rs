//! # AU-Join Core
//!
//! Core library of the AU-Join threshold similarity join.
//!
//! This crate provides the filtering half of the filter-and-verify join:
//!
//! - [`Record`] / [`Segment`] - segmented strings and their conflict structure
//! - [`Taxonomy`] / [`SynonymTable`] - read-only knowledge bases
//! - [`PebbleGenerator`] - weighted evidence extraction (taxonomy, synonym, n-gram)
//! - [`GlobalOrder`] - frozen evidence ranking, rarest first
//! - [`SignatureReducer`] - heuristic and dynamic-programming signature reduction
//! - [`InvertedIndex`] / [`PrefixFilter`] - candidate pair generation
//!
//! ## Data flow
//!
//! ```text
//! records ──► pebbles ──► global order ──► signatures ──► inverted index
//!                                              │                │
//!                                              └──► prefix filter ◄┘ ──► candidates
//! ```
//!
//! ## Example
//!
//! ```rust
//! use aujoin_core::{
//!     EvidenceSources, GlobalOrderBuilder, InvertedIndex, PebbleGenerator, PrefixFilter,
//!     Record, ReducerKind, SignatureReducer, SynonymTable,
//! };
//!
//! let mut synonyms = SynonymTable::new();
//! synonyms.insert_group("heart attack", ["myocardial infarction"]);
//! let sources = EvidenceSources { synonyms: Some(synonyms), ..Default::default() };
//!
//! let left = vec![Record::from_indexed(0, 1, &["0:heart 1:attack"]).unwrap()];
//! let right = vec![Record::from_indexed(1, 2, &["0:myocardial 1:infarction"]).unwrap()];
//!
//! let generator = PebbleGenerator::new(&sources);
//! let pebbles_left: Vec<_> = left.iter().map(|r| generator.generate(r)).collect();
//! let pebbles_right: Vec<_> = right.iter().map(|r| generator.generate(r)).collect();
//!
//! let mut builder = GlobalOrderBuilder::new();
//! pebbles_left.iter().chain(&pebbles_right).for_each(|p| builder.add_all(p));
//! let order = builder.freeze();
//!
//! let reducer = SignatureReducer::new(ReducerKind::Heuristic, 0.8, 1);
//! let sig_left: Vec<_> = left.iter().zip(pebbles_left).map(|(r, p)| reducer.reduce(r, p, &order)).collect();
//! let sig_right: Vec<_> = right.iter().zip(pebbles_right).map(|(r, p)| reducer.reduce(r, p, &order)).collect();
//!
//! let index = InvertedIndex::build(&sig_right);
//! let outcome = PrefixFilter::new(0.8, 1).candidates(&left, &sig_left, &right, &index);
//! assert_eq!(outcome.candidates.len(), 1);
//! ```

pub mod error;
pub mod filter;
pub mod gram;
pub mod index;
pub mod knowledge;
pub mod order;
pub mod pebble;
pub mod record;
pub mod reducer;

pub use error::{Error, Result};
pub use filter::{CandidatePair, FilterOutcome, PrefixFilter};
pub use index::InvertedIndex;
pub use knowledge::{Dewey, EvidenceSources, SynonymTable, Taxonomy};
pub use order::{GlobalOrder, GlobalOrderBuilder};
pub use pebble::{EvidenceKind, Pebble, PebbleGenerator, PebbleKey};
pub use record::{Record, Segment, SegmentRef, WordId};
pub use reducer::{ReducerKind, SignatureReducer};
