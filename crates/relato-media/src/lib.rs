#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for timeline rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Media probing via ffprobe
//! - Duration reconciliation for video visuals (loop, freeze, slow, black)
//! - Ken Burns animation as zoompan filter chains
//! - Group rendering, concat and music mixing

pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod kenburns;
pub mod probe;
pub mod reconcile;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegInput, FfmpegRunner};
pub use compose::{render_group, render_timeline};
pub use error::{MediaError, MediaResult};
pub use kenburns::{ken_burns_chain, pan_path, stable_seed, PanPath};
pub use probe::{get_duration, probe_media, MediaInfo};
pub use reconcile::{reconcile, ReconcilePlan, DURATION_TOLERANCE};
