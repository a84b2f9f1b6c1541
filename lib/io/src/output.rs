// Join result writers
use aujoin_core::Result;
use aujoin_similarity::JoinResult;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub const CSV_HEADER: &str = "string_1,string_2,sim_min,sim_max";

/// Where join results go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Discard results
    #[default]
    Null,
    /// Human readable listing on standard output
    Stdout,
    Csv(PathBuf),
    JsonLines(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "null" => OutputTarget::Null,
            "stdout" => OutputTarget::Stdout,
            path if path.ends_with(".json") || path.ends_with(".jsonl") => OutputTarget::JsonLines(path.into()),
            path => OutputTarget::Csv(path.into()),
        })
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Null => f.write_str("null"),
            OutputTarget::Stdout => f.write_str("stdout"),
            OutputTarget::Csv(path) | OutputTarget::JsonLines(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Write results to the target, in the order given
pub fn write_results(target: &OutputTarget, results: &[JoinResult]) -> Result<()> {
    match target {
        OutputTarget::Null => Ok(()),
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            write_listing(&mut stdout.lock(), results)
        }
        OutputTarget::Csv(path) => {
            let mut writer = create(path)?;
            write_csv(&mut writer, results)?;
            writer.flush()?;
            info!(path = %path.display(), results = results.len(), "wrote csv results");
            Ok(())
        }
        OutputTarget::JsonLines(path) => {
            let mut writer = create(path)?;
            write_json_lines(&mut writer, results)?;
            writer.flush()?;
            info!(path = %path.display(), results = results.len(), "wrote json results");
            Ok(())
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

pub fn write_csv<W: Write>(writer: &mut W, results: &[JoinResult]) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for r in results {
        writeln!(writer, "{},{},{},{}", r.left_id, r.right_id, r.interval.low, r.interval.high)?;
    }
    Ok(())
}

pub fn write_json_lines<W: Write>(writer: &mut W, results: &[JoinResult]) -> Result<()> {
    for r in results {
        serde_json::to_writer(&mut *writer, r).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_listing<W: Write>(writer: &mut W, results: &[JoinResult]) -> Result<()> {
    for (i, r) in results.iter().enumerate() {
        writeln!(
            writer,
            "  {}: ({}, {}) has similarity [{:.3}, {:.3}]",
            i, r.left_id, r.right_id, r.interval.low, r.interval.high
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aujoin_similarity::SimilarityInterval;
    use tempfile::TempDir;

    fn results() -> Vec<JoinResult> {
        vec![
            JoinResult {
                left_id: 1,
                right_id: 4,
                interval: SimilarityInterval { low: 0.75, high: 1.0 },
            },
            JoinResult {
                left_id: 2,
                right_id: 3,
                interval: SimilarityInterval { low: 0.5, high: 0.5 },
            },
        ]
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("null".parse::<OutputTarget>().unwrap(), OutputTarget::Null);
        assert_eq!("stdout".parse::<OutputTarget>().unwrap(), OutputTarget::Stdout);
        assert_eq!(
            "out.jsonl".parse::<OutputTarget>().unwrap(),
            OutputTarget::JsonLines(PathBuf::from("out.jsonl"))
        );
        assert_eq!(
            "result.csv".parse::<OutputTarget>().unwrap(),
            OutputTarget::Csv(PathBuf::from("result.csv"))
        );
    }

    #[test]
    fn test_csv_format() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &results()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "string_1,string_2,sim_min,sim_max\n1,4,0.75,1\n2,3,0.5,0.5\n");
    }

    #[test]
    fn test_listing_format() {
        let mut buf = Vec::new();
        write_listing(&mut buf, &results()[..1]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "  0: (1, 4) has similarity [0.750, 1.000]\n");
    }

    #[test]
    fn test_write_json_lines_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        write_results(&OutputTarget::JsonLines(path.clone()), &results()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["left_id"], 1);
        assert_eq!(first["high"], 1.0);
    }
}
