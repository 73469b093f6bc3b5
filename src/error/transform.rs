use std::path::PathBuf;
/// Errors reported by wrapped transform libraries
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{transform} failed on {}: {message}", .path.display())]
    Failed {
        transform: String,
        path: PathBuf,
        message: String,
    },
    #[error("{transform} cannot process {}", .path.display())]
    Unsupported { transform: String, path: PathBuf },
    #[error("{transform} is unavailable: {message}")]
    Unavailable { transform: String, message: String },
}

impl TransformError {
    /// Create a new Failed error
    pub fn failed(
        transform: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Failed {
            transform: transform.into(),
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a new Unsupported error
    pub fn unsupported(transform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Unsupported {
            transform: transform.into(),
            path: path.into(),
        }
    }

    /// Create a new Unavailable error
    pub fn unavailable(transform: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            transform: transform.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
