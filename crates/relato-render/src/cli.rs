//! Command line surface.

use std::path::PathBuf;

use clap::Parser;

use relato_models::{
    Canvas, FillPolicy, FitMode, KenBurnsConfig, KenBurnsMode, PanDirection, RenderConfig, Rgb,
    SubtitleConfig, WordTiming,
};

use crate::error::{RenderError, RenderResult};
use crate::pipeline::RenderPaths;

/// Render a narrated script plus TTS audio into a subtitled video.
#[derive(Debug, Parser)]
#[command(name = "relato-render", version, about)]
pub struct Cli {
    /// Script file with speaker and image markup
    pub script: PathBuf,

    /// Directory holding the produced TTS audio parts
    #[arg(long, default_value = "./out")]
    pub audio_dir: PathBuf,

    /// Directory holding images, videos, cierre.mp4 and musica.mp3
    #[arg(long, default_value = "./images")]
    pub media_dir: PathBuf,

    /// Output video path
    #[arg(long, default_value = "relato.mp4")]
    pub output: PathBuf,

    /// Write the parsed turns as a JSON manifest
    #[arg(long)]
    pub manifest_out: Option<PathBuf>,

    /// Write flat subtitles (SRT)
    #[arg(long)]
    pub subs_out: Option<PathBuf>,

    /// Write karaoke/typing subtitles (ASS)
    #[arg(long)]
    pub ass_out: Option<PathBuf>,

    /// Video resolution as WxH
    #[arg(long, default_value = "1080x1920")]
    pub resolution: String,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// How visuals fill the canvas
    #[arg(long, default_value = "contain")]
    pub fit: FitMode,

    /// Background color for missing visuals (hex or name)
    #[arg(long, default_value = "#000000")]
    pub bg_color: String,

    /// Visual pad after each narration part (ms)
    #[arg(long, default_value_t = 200)]
    pub pad_ms: u32,

    /// Fill policy for videos shorter than their slot
    #[arg(long, default_value = "loop")]
    pub fill: FillPolicy,

    /// Ken Burns mode
    #[arg(long, default_value = "none")]
    pub kenburns: KenBurnsMode,

    /// Total relative zoom over a group (0.10 = 10%)
    #[arg(long, default_value_t = 0.10)]
    pub kb_zoom: f64,

    /// Pan direction
    #[arg(long, default_value = "random")]
    pub kb_pan: PanDirection,

    /// Explicit pan seed; omit to derive one per visual
    #[arg(long)]
    pub kb_seed: Option<u64>,

    /// Restart camera motion at every narration block
    #[arg(long)]
    pub no_sticky: bool,

    /// Word-timing mode for subtitles
    #[arg(long, default_value = "length")]
    pub subs_word_timing: WordTiming,

    /// Minimum per-word subtitle segment (ms)
    #[arg(long, default_value_t = 60)]
    pub subs_min_seg_ms: u32,

    /// Words per subtitle chunk
    #[arg(long, default_value_t = 3)]
    pub subs_chunk_size: usize,

    /// Hold re-displaying a revealed chunk (ms, 0 = off)
    #[arg(long, default_value_t = 0)]
    pub subs_chunk_hold_ms: u32,

    /// Prefix subtitles with the speaker name
    #[arg(long)]
    pub subs_with_speaker: bool,

    /// Repeat the speaker prefix on every chunk
    #[arg(long)]
    pub subs_prefix_all: bool,

    /// Uppercase subtitle text
    #[arg(long)]
    pub subs_uppercase: bool,

    /// Keep native audio of video visuals, mixed under narration
    #[arg(long)]
    pub media_keep_audio: bool,

    /// Native media audio volume (0.0-1.0)
    #[arg(long, default_value_t = 0.20)]
    pub media_audio_vol: f64,

    /// Mix looped background music from the media directory
    #[arg(long)]
    pub music: bool,

    /// Background music file (default: <media-dir>/musica.mp3)
    #[arg(long)]
    pub music_file: Option<PathBuf>,

    /// Closing bumper file (default: <media-dir>/cierre.mp4)
    #[arg(long)]
    pub bumper: Option<PathBuf>,

    /// Background music volume (0.0-1.0)
    #[arg(long, default_value_t = 0.20)]
    pub music_vol: f64,
}

impl Cli {
    /// Build the render configuration from the parsed flags.
    pub fn to_config(&self) -> RenderResult<RenderConfig> {
        let canvas = Canvas::parse(&self.resolution, self.fps)
            .map_err(|e| RenderError::invalid_option(e.to_string()))?;
        let bg_color: Rgb = self
            .bg_color
            .parse()
            .map_err(|e: relato_models::ColorParseError| {
                RenderError::invalid_option(e.to_string())
            })?;

        Ok(RenderConfig {
            canvas,
            fit: self.fit,
            bg_color,
            pad_ms: self.pad_ms,
            fill: self.fill,
            ken_burns: KenBurnsConfig {
                mode: self.kenburns,
                zoom: self.kb_zoom,
                pan: self.kb_pan,
                seed: self.kb_seed,
            },
            sticky: !self.no_sticky,
            subtitles: SubtitleConfig {
                word_timing: self.subs_word_timing,
                min_seg_ms: self.subs_min_seg_ms,
                chunk_size: self.subs_chunk_size,
                chunk_hold_ms: self.subs_chunk_hold_ms,
                with_speaker: self.subs_with_speaker,
                prefix_all: self.subs_prefix_all,
                uppercase: self.subs_uppercase,
            },
            media_keep_audio: self.media_keep_audio,
            media_audio_vol: self.media_audio_vol,
            music_vol: self.music_vol,
            ..RenderConfig::default()
        })
    }

    /// Collect input and output locations.
    pub fn to_paths(&self) -> RenderPaths {
        RenderPaths {
            script: self.script.clone(),
            audio_dir: self.audio_dir.clone(),
            media_dir: self.media_dir.clone(),
            output: self.output.clone(),
            manifest_out: self.manifest_out.clone(),
            subs_out: self.subs_out.clone(),
            ass_out: self.ass_out.clone(),
            bumper: Some(
                self.bumper
                    .clone()
                    .unwrap_or_else(|| self.media_dir.join("cierre.mp4")),
            ),
            music: self.music.then(|| {
                self.music_file
                    .clone()
                    .unwrap_or_else(|| self.media_dir.join("musica.mp3"))
            }),
        }
    }
}
