pub mod builder;
pub mod config;
pub mod error;
pub mod loader;
mod pipe;
pub mod pipeline;
pub mod runner;

pub use builder::RunnerConfigBuilder;
pub use config::RunnerConfig;
pub use error::{Error, Result};
pub use loader::CloudLoader;
pub use pipeline::{compute_volume, RunReport};
pub use runner::{PipeRunner, ResultBuffer, RunState, Runner};
