//! # AU-Join IO
//!
//! File layer around the join engine: reading segmented record lists and
//! knowledge files (plain or gzip compressed) and writing join results as CSV,
//! JSON lines or a readable listing.

pub mod loader;
pub mod output;
pub mod reader;

pub use loader::{load_records, load_synonyms, load_taxonomy, parse_record};
pub use output::{write_results, OutputTarget, CSV_HEADER};
pub use reader::{read_lines, InputLine};
