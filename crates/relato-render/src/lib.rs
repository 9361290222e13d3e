//! Narration-to-video rendering pipeline.
//!
//! This crate provides:
//! - Frame assembly from parsed turns and TTS audio parts
//! - Sticky grouping of frames sharing a visual
//! - Subtitle allocation over the grouped timeline
//! - The end-to-end render entry point and its CLI

pub mod assemble;
pub mod cli;
pub mod error;
pub mod group;
pub mod pipeline;

pub use cli::Cli;
pub use error::{RenderError, RenderResult};
pub use group::group_frames;
pub use pipeline::{run, RenderOutput, RenderPaths};
