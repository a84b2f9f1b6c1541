//! Loaders for record lists and knowledge files
//!
//! File formats (tab separated, one entry per line):
//!
//! ```text
//! records:   ID<TAB>seg;seg;...        seg = "3:heart 4:attack"
//! taxonomy:  DEWEY<TAB>LABEL           e.g. "1.4.2\tarrhythmia"
//! synonyms:  CANONICAL<TAB>syn;syn;... e.g. "car\tauto;automobile"
//! ```

use crate::reader::{read_lines, InputLine};
use aujoin_core::{Dewey, Error, Record, Result, Segment, SynonymTable, Taxonomy};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

/// Parse one record line
pub fn parse_record(line: &str, dataset: u32) -> Result<Record> {
    let (id, segments) = line
        .split_once('\t')
        .ok_or_else(|| Error::parse("expected ID<TAB>SEGMENTS"))?;
    let id: u64 = id
        .trim()
        .parse()
        .map_err(|_| Error::parse(format!("invalid record id '{}'", id)))?;

    let segments = segments
        .split(';')
        .filter(|raw| !raw.trim().is_empty())
        .map(Segment::parse_indexed)
        .collect::<Result<Vec<_>>>()?;

    Ok(Record::new(dataset, id, segments))
}

/// Load a segmented record list; lines are parsed in parallel, order is kept
pub fn load_records<P: AsRef<Path>>(path: P, dataset: u32) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let records = lines
        .par_iter()
        .map(|InputLine { number, text }| parse_record(text, dataset).map_err(|e| e.at_line(*number)))
        .collect::<Result<Vec<_>>>()?;

    info!(path = %path.display(), dataset, records = records.len(), "loaded records");
    Ok(records)
}

pub fn load_taxonomy<P: AsRef<Path>>(path: P) -> Result<Taxonomy> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let entries = lines
        .par_iter()
        .map(|InputLine { number, text }| -> Result<(String, Dewey)> {
            let (dewey, label) = text
                .split_once('\t')
                .ok_or_else(|| Error::parse("expected DEWEY<TAB>LABEL").at_line(*number))?;
            let dewey: Dewey = dewey.parse().map_err(|e: Error| e.at_line(*number))?;
            Ok((label.to_string(), dewey))
        })
        .collect::<Result<Vec<_>>>()?;

    let taxonomy: Taxonomy = entries.into_iter().collect();
    info!(path = %path.display(), nodes = taxonomy.len(), "loaded taxonomy");
    Ok(taxonomy)
}

pub fn load_synonyms<P: AsRef<Path>>(path: P) -> Result<SynonymTable> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let mut table = SynonymTable::new();
    for InputLine { text, .. } in &lines {
        let (canonical, synonyms) = text.split_once('\t').unwrap_or((text.as_str(), ""));
        table.insert_group(canonical, synonyms.split(';'));
    }

    info!(path = %path.display(), rules = table.len(), "loaded synonyms");
    Ok(table)
}
