//! Script turns and TTS audio parts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentinel speaker marking the closing-bumper insertion point.
///
/// Turns with this speaker carry no text and never produce audio.
pub const CLOSE_SPEAKER: &str = "__CLOSE__";

/// One narration block: speaker, text, and the sticky visual active
/// when the block was flushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Turn {
    /// Zero-based position in the parsed script.
    pub index: usize,
    /// Normalized speaker tag (uppercase, first dash segment).
    pub speaker: String,
    /// Narration text (may span multiple source lines).
    pub text: String,
    /// Active sticky visual file name, if any.
    pub image: Option<String>,
}

impl Turn {
    /// Whether this is the closing-bumper sentinel.
    pub fn is_close(&self) -> bool {
        self.speaker == CLOSE_SPEAKER
    }

    /// Create the closing sentinel at the given index.
    pub fn close_sentinel(index: usize) -> Self {
        Self {
            index,
            speaker: CLOSE_SPEAKER.to_string(),
            text: String::new(),
            image: None,
        }
    }
}

/// One produced TTS audio clip for a (possibly chunked) turn.
///
/// Durations are measured externally (ffprobe) before the engine runs;
/// the file content is otherwise opaque to this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPart {
    /// Path to the audio file on disk.
    pub path: PathBuf,
    /// Exact text spoken in this part.
    pub text: String,
    /// Speaker of the owning turn.
    pub speaker: String,
    /// Measured duration in seconds.
    pub duration: f64,
}

impl AudioPart {
    /// Filename prefix convention binding a part to its turn:
    /// `{turn_position:03}_` where the position is 1-based.
    pub fn prefix_for(turn_position: usize) -> String {
        format!("{:03}_", turn_position)
    }
}
