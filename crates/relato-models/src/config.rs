//! Render configuration surface.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::canvas::{Canvas, Rgb};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Audio sample rate for intermediate clips (uniform for concat)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default visual pad appended after each frame's narration (ms).
pub const DEFAULT_PAD_MS: u32 = 200;
/// Default total Ken Burns zoom fraction (0.10 = 10%).
pub const DEFAULT_KB_ZOOM: f64 = 0.10;
/// Default minimum per-word subtitle segment (ms).
pub const DEFAULT_SUBS_MIN_SEG_MS: u32 = 60;
/// Default words per subtitle chunk.
pub const DEFAULT_SUBS_CHUNK_SIZE: usize = 3;
/// Default volume for native media audio under narration.
pub const DEFAULT_MEDIA_AUDIO_VOL: f64 = 0.20;
/// Default volume for looped background music.
pub const DEFAULT_MUSIC_VOL: f64 = 0.20;

/// How a visual is fitted onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Letterbox inside the canvas over the background color.
    #[default]
    Contain,
    /// Scale to cover the canvas and crop the overflow.
    Cover,
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMode::Contain => write!(f, "contain"),
            FitMode::Cover => write!(f, "cover"),
        }
    }
}

impl FromStr for FitMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contain" => Ok(FitMode::Contain),
            "cover" => Ok(FitMode::Cover),
            _ => Err(OptionParseError::new("fit", s)),
        }
    }
}

/// How a video shorter than its target duration is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Repeat the source until the target is covered, then trim.
    #[default]
    Loop,
    /// Play once, then hold the final frame.
    Freeze,
    /// Retime the source so its content spans the target exactly.
    Slow,
    /// Play once, then append solid-color filler.
    Black,
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FillPolicy::Loop => "loop",
            FillPolicy::Freeze => "freeze",
            FillPolicy::Slow => "slow",
            FillPolicy::Black => "black",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FillPolicy {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loop" => Ok(FillPolicy::Loop),
            "freeze" => Ok(FillPolicy::Freeze),
            "slow" => Ok(FillPolicy::Slow),
            "black" => Ok(FillPolicy::Black),
            _ => Err(OptionParseError::new("fill policy", s)),
        }
    }
}

/// Ken Burns zoom direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KenBurnsMode {
    /// No time-varying transform.
    #[default]
    None,
    /// Zoom from 1 to 1 + zoom fraction.
    In,
    /// Zoom from 1 + zoom fraction down to 1.
    Out,
}

impl fmt::Display for KenBurnsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KenBurnsMode::None => "none",
            KenBurnsMode::In => "in",
            KenBurnsMode::Out => "out",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for KenBurnsMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(KenBurnsMode::None),
            "in" => Ok(KenBurnsMode::In),
            "out" => Ok(KenBurnsMode::Out),
            _ => Err(OptionParseError::new("kenburns", s)),
        }
    }
}

/// Named pan direction for the Ken Burns camera path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    /// Static center position.
    #[default]
    Center,
    /// Top-left to bottom-right.
    TlBr,
    /// Top-right to bottom-left.
    TrBl,
    /// Bottom-left to top-right.
    BlTr,
    /// Bottom-right to top-left.
    BrTl,
    /// Deterministic per-asset random path.
    Random,
}

impl fmt::Display for PanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PanDirection::Center => "center",
            PanDirection::TlBr => "tl2br",
            PanDirection::TrBl => "tr2bl",
            PanDirection::BlTr => "bl2tr",
            PanDirection::BrTl => "br2tl",
            PanDirection::Random => "random",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PanDirection {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "center" => Ok(PanDirection::Center),
            "tl2br" => Ok(PanDirection::TlBr),
            "tr2bl" => Ok(PanDirection::TrBl),
            "bl2tr" => Ok(PanDirection::BlTr),
            "br2tl" => Ok(PanDirection::BrTl),
            "random" => Ok(PanDirection::Random),
            _ => Err(OptionParseError::new("pan direction", s)),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown {option} value: {value}")]
pub struct OptionParseError {
    option: &'static str,
    value: String,
}

impl OptionParseError {
    fn new(option: &'static str, value: &str) -> Self {
        Self {
            option,
            value: value.to_string(),
        }
    }
}

/// Ken Burns animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KenBurnsConfig {
    /// Zoom direction; `None` disables the animation.
    #[serde(default)]
    pub mode: KenBurnsMode,
    /// Total relative zoom across the clip (0.10 = 10%).
    #[serde(default = "default_kb_zoom")]
    pub zoom: f64,
    /// Pan path direction.
    #[serde(default)]
    pub pan: PanDirection,
    /// Explicit seed for random pans; `None` derives one from the
    /// visual key so the same asset always pans the same way.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_kb_zoom() -> f64 {
    DEFAULT_KB_ZOOM
}

impl Default for KenBurnsConfig {
    fn default() -> Self {
        Self {
            mode: KenBurnsMode::None,
            zoom: DEFAULT_KB_ZOOM,
            pan: PanDirection::Center,
            seed: None,
        }
    }
}

/// Word-timing distribution for subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WordTiming {
    /// Weight words by visible character count.
    #[default]
    Length,
    /// All words weigh the same.
    Uniform,
}

impl FromStr for WordTiming {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "length" => Ok(WordTiming::Length),
            "uniform" => Ok(WordTiming::Uniform),
            _ => Err(OptionParseError::new("word timing", s)),
        }
    }
}

/// Subtitle timing and presentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleConfig {
    /// Word-timing distribution mode.
    #[serde(default)]
    pub word_timing: WordTiming,
    /// Minimum per-word segment in milliseconds.
    #[serde(default = "default_min_seg_ms")]
    pub min_seg_ms: u32,
    /// Words per subtitle chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Hold duration re-displaying a fully revealed chunk (ms, 0 = off).
    #[serde(default)]
    pub chunk_hold_ms: u32,
    /// Prefix entries with the speaker name.
    #[serde(default)]
    pub with_speaker: bool,
    /// Show the speaker prefix on every chunk, not just the first.
    #[serde(default)]
    pub prefix_all: bool,
    /// Uppercase subtitle text.
    #[serde(default)]
    pub uppercase: bool,
}

fn default_min_seg_ms() -> u32 {
    DEFAULT_SUBS_MIN_SEG_MS
}
fn default_chunk_size() -> usize {
    DEFAULT_SUBS_CHUNK_SIZE
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            word_timing: WordTiming::Length,
            min_seg_ms: DEFAULT_SUBS_MIN_SEG_MS,
            chunk_size: DEFAULT_SUBS_CHUNK_SIZE,
            chunk_hold_ms: 0,
            with_speaker: false,
            prefix_all: false,
            uppercase: false,
        }
    }
}

impl SubtitleConfig {
    pub fn min_seg_seconds(&self) -> f64 {
        self.min_seg_ms as f64 / 1000.0
    }

    pub fn chunk_hold_seconds(&self) -> f64 {
        self.chunk_hold_ms as f64 / 1000.0
    }
}

/// ASS style surface for the karaoke/typing track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssStyle {
    #[serde(default = "default_style_name")]
    pub style_name: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Bottom margin in pixels.
    #[serde(default = "default_margin_v")]
    pub margin_v: u32,
    /// Outline thickness.
    #[serde(default = "default_outline")]
    pub outline: u32,
    /// Shadow depth.
    #[serde(default = "default_shadow")]
    pub shadow: u32,
    /// ASS alignment (2 = bottom center).
    #[serde(default = "default_alignment")]
    pub alignment: u32,
}

fn default_style_name() -> String {
    "Typing".to_string()
}
fn default_font() -> String {
    "Arial".to_string()
}
fn default_font_size() -> u32 {
    48
}
fn default_margin_v() -> u32 {
    80
}
fn default_outline() -> u32 {
    2
}
fn default_shadow() -> u32 {
    1
}
fn default_alignment() -> u32 {
    2
}

impl Default for AssStyle {
    fn default() -> Self {
        Self {
            style_name: default_style_name(),
            font: default_font(),
            font_size: default_font_size(),
            margin_v: default_margin_v(),
            outline: default_outline(),
            shadow: default_shadow(),
            alignment: default_alignment(),
        }
    }
}

/// Video encoding configuration for intermediate and final clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,
    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,
    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
    /// Audio sample rate; intermediates must agree for stream-copy concat
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Full render configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderConfig {
    #[serde(default)]
    pub canvas: Canvas,
    #[serde(default)]
    pub fit: FitMode,
    #[serde(default)]
    pub bg_color: Rgb,
    /// Visual pad appended after each frame's narration (ms).
    #[serde(default = "default_pad_ms")]
    pub pad_ms: u32,
    /// Fill policy for videos shorter than their target duration.
    #[serde(default)]
    pub fill: FillPolicy,
    #[serde(default)]
    pub ken_burns: KenBurnsConfig,
    /// Merge consecutive frames sharing a visual into one group.
    #[serde(default = "default_true")]
    pub sticky: bool,
    #[serde(default)]
    pub subtitles: SubtitleConfig,
    #[serde(default)]
    pub ass: AssStyle,
    /// Keep native audio of video visuals, mixed under narration.
    #[serde(default)]
    pub media_keep_audio: bool,
    /// Volume of native media audio (0.0-1.0).
    #[serde(default = "default_media_audio_vol")]
    pub media_audio_vol: f64,
    /// Volume of looped background music (0.0-1.0).
    #[serde(default = "default_music_vol")]
    pub music_vol: f64,
    #[serde(default)]
    pub encoding: EncodingConfig,
}

fn default_pad_ms() -> u32 {
    DEFAULT_PAD_MS
}
fn default_true() -> bool {
    true
}
fn default_media_audio_vol() -> f64 {
    DEFAULT_MEDIA_AUDIO_VOL
}
fn default_music_vol() -> f64 {
    DEFAULT_MUSIC_VOL
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fit: FitMode::default(),
            bg_color: Rgb::default(),
            pad_ms: DEFAULT_PAD_MS,
            fill: FillPolicy::default(),
            ken_burns: KenBurnsConfig::default(),
            sticky: true,
            subtitles: SubtitleConfig::default(),
            ass: AssStyle::default(),
            media_keep_audio: false,
            media_audio_vol: DEFAULT_MEDIA_AUDIO_VOL,
            music_vol: DEFAULT_MUSIC_VOL,
            encoding: EncodingConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Visual pad in seconds.
    pub fn pad_seconds(&self) -> f64 {
        self.pad_ms as f64 / 1000.0
    }
}
