use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("point cloud has no rows")]
    Empty,
    #[error("point cloud rows have no fields")]
    ZeroColumns,
    #[error("row {row}: expected {expected} fields, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("point cloud has {found} columns, at most {limit} are allowed")]
    TooManyColumns { found: usize, limit: usize },
}
