use crate::error::ShapeError;

/// A rectangular table of numbers as read from a point cloud sample file.
///
/// Values are stored row-major. Every row has exactly `columns` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    values: Vec<f64>,
    columns: usize,
}

impl Table {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let columns = rows.first().map(Vec::len).ok_or(ShapeError::Empty)?;
        if columns == 0 {
            return Err(ShapeError::ZeroColumns);
        }

        let mut values = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                return Err(ShapeError::Ragged {
                    row: index + 1,
                    expected: columns,
                    found: row.len(),
                });
            }
            values.extend(row);
        }

        Ok(Self { values, columns })
    }

    /// Builds a table from row-major values.
    pub fn from_flat(values: Vec<f64>, columns: usize) -> Result<Self, ShapeError> {
        if columns == 0 {
            return Err(ShapeError::ZeroColumns);
        }
        if values.is_empty() {
            return Err(ShapeError::Empty);
        }
        let remainder = values.len() % columns;
        if remainder != 0 {
            return Err(ShapeError::Ragged {
                row: values.len() / columns + 1,
                expected: columns,
                found: remainder,
            });
        }

        Ok(Self { values, columns })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.columns)
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.columns)?;
        self.values.get(start..start + self.columns)
    }
}
