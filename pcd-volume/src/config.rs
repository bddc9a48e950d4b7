use std::{path::PathBuf, time::Duration};

use pcd_core::pointcloud::normalization::NormalizationPolicy;

use crate::builder::RunnerConfigBuilder;

pub const DEFAULT_INPUT: &str = "test.cloud";
pub const DEFAULT_OUTPUT: &str = "test.p";
pub const DEFAULT_EXECUTABLE: &str = "./pctoffset";

/// Everything a run needs, passed in explicitly instead of relying on the
/// current working directory.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// The volume computation program, launched without arguments.
    pub executable_path: PathBuf,
    /// Kill the program if it runs longer than this. `None` waits forever.
    pub timeout: Option<Duration>,
    pub policy: NormalizationPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            executable_path: PathBuf::from(DEFAULT_EXECUTABLE),
            timeout: None,
            policy: NormalizationPolicy::default(),
        }
    }
}

impl RunnerConfig {
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::new()
    }
}
