use std::path::Path;

use pcd_core::pointcloud::{
    normalization::{ColumnNormalizer as _, NormalizationPolicy, OverflowPolicy},
    point::{PointCloud, WEIGHTED_POINT_FIELDS},
};
use pcd_exporter::text::{to_buffer, SerializedBuffer, TextFormat};
use pcd_parser::{
    parsers::{text::TextParserProvider, ParserProvider as _},
    ParseError,
};

use crate::error::Result;

/// Reads a point cloud sample file and turns it into weighted point records.
#[derive(Debug, Clone, Default)]
pub struct CloudLoader {
    policy: NormalizationPolicy,
    format: TextFormat,
}

impl CloudLoader {
    pub fn new(policy: NormalizationPolicy) -> Self {
        Self {
            policy,
            format: TextFormat::default(),
        }
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn load(&self, path: &Path) -> Result<PointCloud> {
        let provider = TextParserProvider {
            filename: path.to_path_buf(),
        };
        let table = provider.get_parser().parse()?;

        if table.columns() > WEIGHTED_POINT_FIELDS
            && self.policy.overflow == OverflowPolicy::Truncate
        {
            log::warn!(
                "{:?} has {} columns, only the first {} are used",
                path,
                table.columns(),
                WEIGHTED_POINT_FIELDS
            );
        }

        let cloud = self.policy.normalize(&table).map_err(ParseError::from)?;
        log::info!(
            "loaded {} points ({} columns) from {:?}",
            cloud.len(),
            cloud.metadata.source_columns,
            path
        );

        Ok(cloud)
    }

    /// Loads the file and serializes the normalized cloud in memory.
    pub fn load_serialized(&self, path: &Path) -> Result<SerializedBuffer> {
        let cloud = self.load(path)?;
        Ok(self.serialize(&cloud))
    }

    pub fn serialize(&self, cloud: &PointCloud) -> SerializedBuffer {
        to_buffer(cloud, &self.format)
    }
}
