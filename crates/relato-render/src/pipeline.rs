//! End-to-end render pipeline.
//!
//! Parse -> assemble -> group -> allocate subtitles -> compose. One
//! deterministic pass; the only external-process work is ffprobe and
//! the ffmpeg encode steps inside composition.

use std::path::PathBuf;
use tracing::info;

use relato_media::render_timeline;
use relato_models::{FrameGroup, RenderConfig};
use relato_script::{parse_script_file, write_manifest};
use relato_subs::timing::SubtitleTracks;
use relato_subs::{allocate, write_ass, write_srt};

use crate::assemble::assemble_frames;
use crate::error::{RenderError, RenderResult};
use crate::group::group_frames;

/// Input and output locations for one render.
#[derive(Debug, Clone)]
pub struct RenderPaths {
    pub script: PathBuf,
    pub audio_dir: PathBuf,
    pub media_dir: PathBuf,
    pub output: PathBuf,
    pub manifest_out: Option<PathBuf>,
    pub subs_out: Option<PathBuf>,
    pub ass_out: Option<PathBuf>,
    pub bumper: Option<PathBuf>,
    pub music: Option<PathBuf>,
}

/// What a successful render produced.
#[derive(Debug)]
pub struct RenderOutput {
    pub video: PathBuf,
    pub duration: f64,
    pub turns: usize,
    pub groups: usize,
    pub subtitle_entries: usize,
}

/// Allocate both subtitle tracks over the grouped timeline.
///
/// The cursor advances by each frame's padded duration; allocation
/// itself covers only the narration span, so subtitles never bleed
/// into the pad of a later frame.
pub fn allocate_subtitles(groups: &[FrameGroup], cfg: &RenderConfig) -> SubtitleTracks {
    let mut tracks = SubtitleTracks::default();
    let mut cursor = 0.0f64;
    for group in groups {
        for frame in &group.frames {
            tracks.extend(allocate(
                frame.text(),
                frame.speaker(),
                cursor,
                frame.narration_duration(),
                &cfg.subtitles,
            ));
            cursor += frame.duration;
        }
    }
    tracks
}

/// Run one full render.
pub async fn run(paths: &RenderPaths, cfg: &RenderConfig) -> RenderResult<RenderOutput> {
    let turns = parse_script_file(&paths.script)?;
    let narration = turns.iter().filter(|t| !t.is_close()).count();
    if narration == 0 {
        return Err(RenderError::NoTurns(paths.script.clone()));
    }
    info!(turns = narration, script = %paths.script.display(), "Parsed script");

    if let Some(manifest) = &paths.manifest_out {
        write_manifest(&turns, manifest)?;
        info!(path = %manifest.display(), "Wrote manifest");
    }

    let frames = assemble_frames(&turns, &paths.audio_dir, &paths.media_dir, cfg).await?;
    let groups = group_frames(frames, cfg.sticky);
    info!(groups = groups.len(), "Grouped frames");

    let tracks = allocate_subtitles(&groups, cfg);

    let duration = render_timeline(
        &groups,
        cfg,
        paths.bumper.as_deref(),
        paths.music.as_deref(),
        &paths.output,
    )
    .await?;

    if let Some(srt) = &paths.subs_out {
        write_srt(&tracks.flat, srt)?;
        info!(path = %srt.display(), entries = tracks.flat.len(), "Wrote SRT");
    }
    if let Some(ass) = &paths.ass_out {
        write_ass(&tracks.karaoke, &cfg.canvas, &cfg.ass, ass)?;
        info!(path = %ass.display(), events = tracks.karaoke.len(), "Wrote ASS");
    }

    Ok(RenderOutput {
        video: paths.output.clone(),
        duration,
        turns: narration,
        groups: groups.len(),
        subtitle_entries: tracks.flat.len(),
    })
}
