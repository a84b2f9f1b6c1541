use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid filtering method: {0} (expected one of: fast, dp)")]
    UnknownReducer(String),

    #[error("Invalid verification method: {0} (expected one of: greedy, claw)")]
    UnknownVerifier(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Parse error not tied to a particular input line
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse { line: 0, reason: reason.into() }
    }

    /// Attach a 1-based line number to a parse error
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::Parse { reason, .. } => Error::Parse { line, reason },
            other => other,
        }
    }
}
