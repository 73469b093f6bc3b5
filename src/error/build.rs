use std::path::PathBuf;
/// Unified error type for assetflow runs
use thiserror::Error;

use super::{ConfigError, ProcessingError, TransformError};

#[derive(Error, Debug)]
pub enum BuildError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] ProcessingError),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    // Transform errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Failed to compile {}: {message}", .path.display())]
    Compile { path: PathBuf, message: String },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Glob traversal error: {0}")]
    Glob(#[from] glob::GlobError),

    // Runtime errors
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Preview server error: {0}")]
    Server(String),
}

/// Result type alias using BuildError
pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    /// Create an I/O error tagged with the path it happened on
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Create a compile error
    pub fn compile(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Compile {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a missing input error
    pub fn missing_input(name: impl Into<String>) -> Self {
        Self::MissingInput(name.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a server error
    pub fn server(msg: impl std::fmt::Display) -> Self {
        Self::Server(msg.to_string())
    }

    /// Whether this error only aborts the current transform's output
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }
}
