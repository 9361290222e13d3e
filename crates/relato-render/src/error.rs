//! Error types for the rendering pipeline.

use std::path::PathBuf;
use thiserror::Error;

use relato_media::MediaError;
use relato_script::ScriptError;
use relato_subs::SubsError;

/// Result type for pipeline operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Pipeline errors, each naming the failing stage and entity.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Parse failed: {0}")]
    Parse(#[from] ScriptError),

    #[error("Script produced no narration turns: {0}")]
    NoTurns(PathBuf),

    #[error("No audio parts found in {0}")]
    NoAudio(PathBuf),

    #[error("Assemble failed for turn {turn}: {source}")]
    Assemble {
        turn: usize,
        #[source]
        source: MediaError,
    },

    #[error("Compose failed: {0}")]
    Compose(#[from] MediaError),

    #[error("Subtitle output failed: {0}")]
    Subtitles(#[from] SubsError),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn assemble(turn: usize, source: MediaError) -> Self {
        Self::Assemble { turn, source }
    }

    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }
}
