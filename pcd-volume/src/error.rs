use std::{path::PathBuf, process::ExitStatus, time::Duration};

use pcd_parser::ParseError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a rectangular numeric table, or its shape was rejected.
    #[error("invalid point cloud: {0}")]
    Parse(ParseError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {}: {source}", executable.display())]
    Launch {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external process failed ({status}): {}", summarize(stderr))]
    ProcessFailed { status: ExitStatus, stderr: String },

    #[error("external process did not finish within {timeout:?}: {}", summarize(stderr))]
    Timeout { timeout: Duration, stderr: String },

    /// Reading from or writing to the process pipes failed.
    #[error("pipe error: {0}")]
    Pipe(#[source] std::io::Error),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io { path, source } => Error::Io { path, source },
            other => Error::Parse(other),
        }
    }
}

fn summarize(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "no diagnostic output"
    } else {
        trimmed
    }
}
