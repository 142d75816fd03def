//! Loader error types
//!
//! Errors raised while injecting resources or driving module hooks. None of
//! these escape an orchestrator run; they are logged where they occur.

use std::time::Duration;
use thiserror::Error;

use crate::cancel::CancelledError;

/// Errors that can occur while loading a resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// File extension is neither a script nor a stylesheet
    #[error("Unsupported resource type: {0}")]
    UnsupportedExtension(String),

    /// Resource does not exist in the document root
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Injection reported a failure
    #[error("Failed to load {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Injection did not complete within the per-load timeout
    #[error("Timed out after {timeout:?} loading {path}")]
    Timeout { path: String, timeout: Duration },

    /// The run was cancelled
    #[error("Load cancelled")]
    Cancelled,
}

impl From<CancelledError> for LoaderError {
    fn from(_: CancelledError) -> Self {
        LoaderError::Cancelled
    }
}

/// Result type alias for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
