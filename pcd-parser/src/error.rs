use std::path::PathBuf;

use pcd_core::ShapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no point found in input")]
    Empty,
    #[error("line {line}, field {column}: '{token}' is not a number")]
    InvalidNumber {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("line {line}: not valid UTF-8 text")]
    InvalidText { line: usize },
    #[error("line {line}: expected {expected} fields, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
