/// Centralized error handling for assetflow
pub mod build;
pub mod config;
pub mod pipeline;
pub mod transform;

pub use build::{BuildError, Result};
pub use config::ConfigError;
pub use pipeline::{PipelineResult, ProcessingError};
pub use transform::{TransformError, TransformResult};
