//! Error types for subtitle generation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubsError {
    #[error("Failed to write subtitle file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubsError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type SubsResult<T> = Result<T, SubsError>;
