/// Pipeline wiring error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Missing required input '{required}' for node '{node}'")]
    MissingInput { node: String, required: String },
    #[error("Missing required output '{required}' for node '{node}'")]
    MissingOutput { node: String, required: String },
    #[error("Pipeline configuration error: {message}")]
    ConfigError { message: String },
}

impl ProcessingError {
    /// Create a new ConfigError
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError {
            message: msg.into(),
        }
    }

    /// Create a new MissingInput error
    pub fn missing_input(node: impl Into<String>, required: impl Into<String>) -> Self {
        Self::MissingInput {
            node: node.into(),
            required: required.into(),
        }
    }

    /// Create a new MissingOutput error
    pub fn missing_output(node: impl Into<String>, required: impl Into<String>) -> Self {
        Self::MissingOutput {
            node: node.into(),
            required: required.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, ProcessingError>;
