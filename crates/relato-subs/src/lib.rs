//! Word-timed subtitle generation.
//!
//! This crate provides:
//! - Per-word duration allocation over measured narration audio
//! - Chunked flat entries for SRT
//! - Karaoke/typing events with `\kf` markup for ASS

pub mod ass;
pub mod error;
pub mod srt;
pub mod timing;

pub use ass::{render_ass, write_ass};
pub use error::{SubsError, SubsResult};
pub use srt::{render_srt, write_srt};
pub use timing::{allocate, KaraokeEvent, SubtitleEntry, SubtitleTracks};
