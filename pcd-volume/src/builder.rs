use std::{path::PathBuf, time::Duration};

use pcd_core::pointcloud::normalization::{NormalizationPolicy, OverflowPolicy};

use crate::config::RunnerConfig;

#[derive(Debug, Clone, Default)]
pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_path = path.into();
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.executable_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn policy(mut self, policy: NormalizationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn fill(mut self, fill: f64) -> Self {
        self.config.policy.fill = fill;
        self
    }

    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.config.policy.overflow = overflow;
        self
    }

    pub fn build(self) -> RunnerConfig {
        self.config
    }
}
