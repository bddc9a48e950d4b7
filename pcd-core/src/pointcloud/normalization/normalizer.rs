use serde::Serialize;

use crate::error::ShapeError;
use crate::pointcloud::point::{PointCloud, WeightedPoint, WEIGHTED_POINT_FIELDS};
use crate::pointcloud::table::Table;

pub trait ColumnNormalizer {
    fn normalize(&self, table: &Table) -> Result<PointCloud, ShapeError>;
}

/// What to do with columns beyond the fourth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OverflowPolicy {
    /// Keep the first four fields of every row.
    #[default]
    Truncate,
    Reject,
}

/// Coerces every row of a table to a weighted point record.
///
/// Rows shorter than four fields are padded with `fill`, so an unweighted
/// `x y z` cloud becomes a uniformly weighted one. Longer rows are handled
/// according to `overflow`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationPolicy {
    pub fill: f64,
    pub overflow: OverflowPolicy,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            fill: 0.0,
            overflow: OverflowPolicy::Truncate,
        }
    }
}

impl NormalizationPolicy {
    pub fn new(fill: f64, overflow: OverflowPolicy) -> Self {
        Self { fill, overflow }
    }

    fn to_weighted_point(&self, row: &[f64]) -> WeightedPoint {
        let mut fields = [self.fill; WEIGHTED_POINT_FIELDS];
        let n = row.len().min(WEIGHTED_POINT_FIELDS);
        fields[..n].copy_from_slice(&row[..n]);
        WeightedPoint::from(fields)
    }
}

impl ColumnNormalizer for NormalizationPolicy {
    fn normalize(&self, table: &Table) -> Result<PointCloud, ShapeError> {
        let columns = table.columns();
        if columns > WEIGHTED_POINT_FIELDS && self.overflow == OverflowPolicy::Reject {
            return Err(ShapeError::TooManyColumns {
                found: columns,
                limit: WEIGHTED_POINT_FIELDS,
            });
        }

        let points = table
            .rows()
            .map(|row| self.to_weighted_point(row))
            .collect();

        Ok(PointCloud::new(points, columns))
    }
}
