use aujoin_core::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// A non-empty input line with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub number: usize,
    pub text: String,
}

/// Read all meaningful lines of a text file, gunzipping `.gz` files on the fly
///
/// Blank lines and lines reading `null` are skipped.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<InputLine>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let source: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(file)
    };

    let mut lines = Vec::new();
    let mut skipped = 0usize;
    for (i, line) in BufReader::new(source).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed == "null" {
            skipped += 1;
            continue;
        }
        lines.push(InputLine {
            number: i + 1,
            text: trimmed.to_string(),
        });
    }

    debug!(path = %path.display(), lines = lines.len(), skipped, "read input file");
    Ok(lines)
}
