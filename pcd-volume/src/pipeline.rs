use std::path::PathBuf;

use pcd_core::pointcloud::point::BoundingVolume;
use serde::Serialize;

use crate::{
    config::RunnerConfig,
    error::Result,
    loader::CloudLoader,
    runner::{PipeRunner, Runner as _},
};

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub point_count: usize,
    pub source_columns: usize,
    pub bounding_volume: BoundingVolume,
    pub total_weight: f64,
    pub input_bytes: usize,
    pub result_bytes: usize,
    pub stderr: String,
    pub elapsed_ms: u128,
}

/// Loads the input cloud, pipes it through the external program and writes
/// the program's output to `config.output_path`.
pub fn compute_volume(config: &RunnerConfig) -> Result<RunReport> {
    let start = std::time::Instant::now();

    let loader = CloudLoader::new(config.policy);
    let cloud = loader.load(&config.input_path)?;
    let buffer = loader.serialize(&cloud);
    log::info!(
        "serialized {} points into {} bytes",
        buffer.point_count(),
        buffer.len()
    );

    let mut runner = PipeRunner::new(config);
    let result = runner.execute(&buffer)?;

    Ok(RunReport {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        point_count: cloud.metadata.point_count,
        source_columns: cloud.metadata.source_columns,
        bounding_volume: cloud.metadata.bounding_volume.clone(),
        total_weight: cloud.metadata.total_weight,
        input_bytes: buffer.len(),
        result_bytes: result.len(),
        stderr: result.stderr().to_string(),
        elapsed_ms: start.elapsed().as_millis(),
    })
}
