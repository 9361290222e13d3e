//! Error types for script parsing and manifest output.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that can occur while reading or describing scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
