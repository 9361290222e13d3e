//! Shared data models for the relato rendering engine.
//!
//! This crate provides Serde-serializable types for:
//! - Script turns and per-turn audio parts
//! - Render frames and sticky frame groups
//! - Canvas, colors, fit and fill policies
//! - Ken Burns and subtitle configuration

pub mod canvas;
pub mod config;
pub mod frame;
pub mod turn;

// Re-export common types
pub use canvas::{Canvas, Rgb, CanvasParseError, ColorParseError};
pub use config::{
    AssStyle, EncodingConfig, FillPolicy, FitMode, KenBurnsConfig, KenBurnsMode, PanDirection,
    RenderConfig, SubtitleConfig, WordTiming,
};
pub use frame::{Frame, FrameGroup, VisualSource};
pub use turn::{AudioPart, Turn, CLOSE_SPEAKER};
