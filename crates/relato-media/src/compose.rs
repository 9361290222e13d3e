//! Timeline composition and export.
//!
//! Each frame group becomes one normalized intermediate clip (canvas
//! size, output fps, uniform codecs and sample rate), rendered by a
//! single FFmpeg invocation that reconciles the visual duration,
//! applies Ken Burns, and places every narration part at its cumulative
//! offset. Intermediates are then concatenated with a stream copy and
//! optionally passed through a final background-music mix.
//!
//! All intermediates live in a [`tempfile::TempDir`] owned by
//! [`render_timeline`], so they are released on every exit path,
//! including failures.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use relato_models::{FrameGroup, RenderConfig, VisualSource};

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegInput, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{
    adelay_filter, amix_filter, apad_to, atempo_chain, atrim_to, fit_filter, fps_filter,
    output_format_filter, volume_filter,
};
use crate::kenburns::ken_burns_chain;
use crate::probe::{probe_media, MediaInfo};
use crate::reconcile::reconcile;

/// Build the FFmpeg command rendering one group to `output`.
///
/// `video_info` must be the probe result when the group's visual is a
/// video; still images and color fills need no probing.
pub fn build_group_command(
    group: &FrameGroup,
    video_info: Option<&MediaInfo>,
    cfg: &RenderConfig,
    output: &Path,
) -> MediaResult<FfmpegCommand> {
    let total = group.total_duration();
    let canvas = &cfg.canvas;
    let enc = &cfg.encoding;

    let mut cmd = FfmpegCommand::new(output);
    let mut graph: Vec<String> = Vec::new();
    let mut vchain: Vec<String> = Vec::new();
    let mut native_has_audio = false;
    let mut native_tempo: Option<f64> = None;

    match group.visual() {
        VisualSource::Color(c) => {
            cmd = cmd.input(FfmpegInput::lavfi(format!(
                "color=c={}:size={}x{}:rate={}:d={:.3}",
                c.to_ffmpeg(),
                canvas.width,
                canvas.height,
                canvas.fps,
                total
            )));
        }
        VisualSource::Still(path) => {
            cmd = cmd.input(
                FfmpegInput::file(path)
                    .args(["-loop", "1", "-framerate"])
                    .arg(canvas.fps.to_string())
                    .arg("-t")
                    .arg(format!("{:.3}", total)),
            );
            match ken_burns_chain(&cfg.ken_burns, group.visual_key(), canvas, total) {
                Some(kb) => vchain.push(kb),
                None => vchain.push(fit_filter(cfg.fit, canvas, cfg.bg_color)),
            }
        }
        VisualSource::Video(path) => {
            let info = video_info.ok_or_else(|| {
                MediaError::invalid_media(format!(
                    "video visual not probed: {}",
                    path.display()
                ))
            })?;
            let plan = reconcile(cfg.fill, info.duration, total, cfg.bg_color)?;
            cmd = cmd.input(FfmpegInput::file(path).args(plan.input_args.clone()));
            vchain.push(fps_filter(canvas.fps));
            vchain.extend(plan.filters.clone());
            match ken_burns_chain(&cfg.ken_burns, group.visual_key(), canvas, total) {
                Some(kb) => vchain.push(kb),
                None => vchain.push(fit_filter(cfg.fit, canvas, cfg.bg_color)),
            }
            native_has_audio = info.has_audio;
            native_tempo = plan.audio_tempo;
        }
    }

    vchain.push(output_format_filter().to_string());
    graph.push(format!("[0:v]{}[vout]", vchain.join(",")));

    // Narration parts at cumulative offsets within the group.
    let mut mix_labels: Vec<String> = Vec::new();
    let mut offset = 0.0f64;
    for (i, frame) in group.frames.iter().enumerate() {
        cmd = cmd.input(FfmpegInput::file(&frame.audio.path));
        let label = format!("n{}", i);
        let offset_ms = (offset * 1000.0).round() as u64;
        graph.push(format!(
            "[{}:a]{}[{}]",
            i + 1,
            adelay_filter(offset_ms),
            label
        ));
        mix_labels.push(label);
        offset += frame.duration;
    }

    // Native media audio, attenuated under the narration.
    if cfg.media_keep_audio && native_has_audio {
        let mut achain: Vec<String> = Vec::new();
        if let Some(tempo) = native_tempo {
            achain.extend(atempo_chain(tempo));
        }
        achain.push(volume_filter(cfg.media_audio_vol));
        achain.push(atrim_to(total));
        graph.push(format!("[0:a]{}[med]", achain.join(",")));
        mix_labels.push("med".to_string());
    }

    let mix = if mix_labels.len() == 1 {
        format!("[{}]{}[aout]", mix_labels[0], apad_to(total))
    } else {
        let refs: String = mix_labels.iter().map(|l| format!("[{}]", l)).collect();
        format!(
            "{}{},{}[aout]",
            refs,
            amix_filter(mix_labels.len()),
            apad_to(total)
        )
    };
    graph.push(mix);

    Ok(cmd
        .filter_complex(graph.join(";"))
        .map("[vout]")
        .map("[aout]")
        .duration(total)
        .fps(canvas.fps)
        .video_codec(&enc.codec)
        .preset(&enc.preset)
        .crf(enc.crf)
        .audio_codec(&enc.audio_codec)
        .audio_bitrate(&enc.audio_bitrate)
        .sample_rate(enc.sample_rate)
        .channels(2))
}

/// Render one group to an intermediate clip in `out_dir`.
pub async fn render_group(
    index: usize,
    group: &FrameGroup,
    cfg: &RenderConfig,
    out_dir: &Path,
) -> MediaResult<PathBuf> {
    let output = out_dir.join(format!("group_{:03}.mp4", index));

    let video_info = match group.visual() {
        VisualSource::Video(path) => Some(probe_media(path).await?),
        _ => None,
    };

    info!(
        group = index,
        visual = %group.visual_key(),
        frames = group.frames.len(),
        duration = format!("{:.3}", group.total_duration()),
        "Rendering group"
    );

    let cmd = build_group_command(group, video_info.as_ref(), cfg, &output)?;
    FfmpegRunner::new().run(&cmd).await?;
    Ok(output)
}

/// Build the command normalizing the closing bumper to the canvas.
///
/// The bumper keeps its native duration and audio; no Ken Burns, no
/// narration. Silent bumpers get a generated silent track so the
/// concat stream layout stays uniform.
pub fn build_bumper_command(
    path: &Path,
    info: &MediaInfo,
    cfg: &RenderConfig,
    output: &Path,
) -> FfmpegCommand {
    let canvas = &cfg.canvas;
    let enc = &cfg.encoding;
    let vf = format!(
        "{},{},{}",
        fps_filter(canvas.fps),
        fit_filter(cfg.fit, canvas, cfg.bg_color),
        output_format_filter()
    );

    let mut cmd = FfmpegCommand::new(output).input(FfmpegInput::file(path));
    if info.has_audio {
        cmd = cmd.video_filter(vf).map("0:v").map("0:a");
    } else {
        cmd = cmd
            .input(FfmpegInput::lavfi(format!(
                "anullsrc=r={}:cl=stereo",
                enc.sample_rate
            )))
            .video_filter(vf)
            .map("0:v")
            .map("1:a")
            .output_arg("-shortest");
    }

    cmd.fps(canvas.fps)
        .video_codec(&enc.codec)
        .preset(&enc.preset)
        .crf(enc.crf)
        .audio_codec(&enc.audio_codec)
        .audio_bitrate(&enc.audio_bitrate)
        .sample_rate(enc.sample_rate)
        .channels(2)
}

/// Render the closing bumper; returns the clip and its native duration.
async fn render_bumper(
    path: &Path,
    cfg: &RenderConfig,
    out_dir: &Path,
) -> MediaResult<(PathBuf, f64)> {
    let info = probe_media(path).await?;
    if !info.has_video {
        return Err(MediaError::invalid_media(format!(
            "closing bumper has no video stream: {}",
            path.display()
        )));
    }
    let output = out_dir.join("bumper.mp4");
    info!(path = %path.display(), duration = format!("{:.3}", info.duration), "Rendering closing bumper");
    let cmd = build_bumper_command(path, &info, cfg, &output);
    FfmpegRunner::new().run(&cmd).await?;
    Ok((output, info.duration))
}

/// Concat demuxer list contents for a set of clips.
pub fn concat_list_contents(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// Build the stream-copy concat over a demuxer list file.
pub fn build_concat_command(list: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(FfmpegInput::file(list).args(["-f", "concat", "-safe", "0"]))
        .output_args(["-c", "copy"])
}

/// Build the final pass mixing looped background music under the
/// program audio; video is stream-copied.
pub fn build_music_command(
    video: &Path,
    music: &Path,
    cfg: &RenderConfig,
    output: &Path,
) -> FfmpegCommand {
    let enc = &cfg.encoding;
    FfmpegCommand::new(output)
        .input(FfmpegInput::file(video))
        .input(FfmpegInput::file(music).args(["-stream_loop", "-1"]))
        .filter_complex(format!(
            "[1:a]{}[bgm];[0:a][bgm]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]",
            volume_filter(cfg.music_vol)
        ))
        .map("0:v")
        .map("[aout]")
        .output_args(["-c:v", "copy"])
        .audio_codec(&enc.audio_codec)
        .audio_bitrate(&enc.audio_bitrate)
        .sample_rate(enc.sample_rate)
        .channels(2)
}

/// Render all groups plus the optional bumper and music into `output`.
///
/// Returns the program duration (groups plus bumper). Intermediates
/// are dropped with the internal temp directory on all exit paths.
pub async fn render_timeline(
    groups: &[FrameGroup],
    cfg: &RenderConfig,
    bumper: Option<&Path>,
    music: Option<&Path>,
    output: &Path,
) -> MediaResult<f64> {
    if groups.is_empty() {
        return Err(MediaError::invalid_media("no groups to render"));
    }
    check_ffmpeg()?;

    let temp = tempfile::tempdir()?;
    let mut clips: Vec<PathBuf> = Vec::new();
    let mut total = 0.0f64;

    for (i, group) in groups.iter().enumerate() {
        let clip = render_group(i, group, cfg, temp.path())
            .await
            .map_err(|e| MediaError::in_group(i, e))?;
        total += group.total_duration();
        clips.push(clip);
    }

    if let Some(bumper_path) = bumper {
        if bumper_path.exists() {
            let (clip, duration) = render_bumper(bumper_path, cfg, temp.path()).await?;
            total += duration;
            clips.push(clip);
        } else {
            warn!(path = %bumper_path.display(), "Closing bumper not found, skipping");
        }
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let list = temp.path().join("concat.txt");
    std::fs::write(&list, concat_list_contents(&clips))?;

    let music = music.filter(|m| {
        let found = m.exists();
        if !found {
            warn!(path = %m.display(), "Background music not found, skipping");
        }
        found
    });

    match music {
        Some(music_path) => {
            let merged = temp.path().join("timeline.mp4");
            FfmpegRunner::new()
                .run(&build_concat_command(&list, &merged))
                .await?;
            FfmpegRunner::new()
                .run(&build_music_command(&merged, music_path, cfg, output))
                .await?;
        }
        None => {
            FfmpegRunner::new()
                .run(&build_concat_command(&list, output))
                .await?;
        }
    }

    info!(
        output = %output.display(),
        duration = format!("{:.3}", total),
        clips = clips.len(),
        "Timeline exported"
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relato_models::{
        AudioPart, Canvas, FillPolicy, FitMode, Frame, KenBurnsConfig, KenBurnsMode,
        PanDirection, Rgb,
    };

    fn part(name: &str, duration: f64) -> AudioPart {
        AudioPart {
            path: PathBuf::from(name),
            text: "hola".to_string(),
            speaker: "NARRADOR".to_string(),
            duration,
        }
    }

    fn still_group(durations: &[f64]) -> FrameGroup {
        let visual = VisualSource::Still(PathBuf::from("media/1.png"));
        let mut frames = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Frame::new(visual.clone(), part(&format!("{:03}_n.mp3", i + 1), *d), 0.2));
        let mut group = FrameGroup::new(frames.next().unwrap());
        for f in frames {
            group.push(f);
        }
        group
    }

    fn config() -> RenderConfig {
        RenderConfig {
            canvas: Canvas::new(1080, 1920, 30),
            ..RenderConfig::default()
        }
    }

    fn find_filter_complex(args: &[String]) -> String {
        let pos = args.iter().position(|a| a == "-filter_complex").unwrap();
        args[pos + 1].clone()
    }

    #[test]
    fn test_group_command_offsets_and_duration() {
        let group = still_group(&[2.0, 1.5]);
        let cmd = build_group_command(&group, None, &config(), Path::new("g.mp4")).unwrap();
        let args = cmd.build_args();
        let graph = find_filter_complex(&args);

        // First part at 0, second at 2.2s into the group.
        assert!(graph.contains("[1:a]adelay=0:all=1[n0]"));
        assert!(graph.contains("[2:a]adelay=2200:all=1[n1]"));
        assert!(graph.contains("amix=inputs=2"));
        assert!(graph.contains("apad=whole_dur=3.900"));

        // Total 2.2 + 1.7 = 3.9s.
        let t_pos = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t_pos + 1], "3.900");
    }

    #[test]
    fn test_group_command_single_part_skips_amix() {
        let group = still_group(&[2.0]);
        let cmd = build_group_command(&group, None, &config(), Path::new("g.mp4")).unwrap();
        let graph = find_filter_complex(&cmd.build_args());
        assert!(!graph.contains("amix"));
        assert!(graph.contains("[n0]apad=whole_dur=2.200[aout]"));
    }

    #[test]
    fn test_group_command_still_fit_without_kenburns() {
        let group = still_group(&[2.0]);
        let cfg = RenderConfig {
            fit: FitMode::Cover,
            ..config()
        };
        let graph = find_filter_complex(
            &build_group_command(&group, None, &cfg, Path::new("g.mp4"))
                .unwrap()
                .build_args(),
        );
        assert!(graph.contains("crop=1080:1920"));
        assert!(!graph.contains("zoompan"));
        assert!(graph.contains("format=yuv420p"));
    }

    #[test]
    fn test_group_command_kenburns_on_still() {
        let group = still_group(&[2.0]);
        let cfg = RenderConfig {
            ken_burns: KenBurnsConfig {
                mode: KenBurnsMode::In,
                zoom: 0.1,
                pan: PanDirection::TlBr,
                seed: None,
            },
            ..config()
        };
        let graph = find_filter_complex(
            &build_group_command(&group, None, &cfg, Path::new("g.mp4"))
                .unwrap()
                .build_args(),
        );
        assert!(graph.contains("zoompan"));
    }

    #[test]
    fn test_group_command_color_visual() {
        let visual = VisualSource::Color(Rgb::BLACK);
        let group = FrameGroup::new(Frame::new(visual, part("001_n.mp3", 1.0), 0.2));
        let args = build_group_command(&group, None, &config(), Path::new("g.mp4"))
            .unwrap()
            .build_args();
        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], "lavfi");
        assert!(args[f_pos + 3].contains("color=c=0x000000"));
        assert!(args[f_pos + 3].contains("size=1080x1920"));
    }

    #[test]
    fn test_group_command_video_requires_probe() {
        let visual = VisualSource::Video(PathBuf::from("media/3.mp4"));
        let group = FrameGroup::new(Frame::new(visual, part("001_n.mp3", 2.8), 0.2));
        assert!(build_group_command(&group, None, &config(), Path::new("g.mp4")).is_err());
    }

    #[test]
    fn test_group_command_video_with_loop_and_native_audio() {
        let visual = VisualSource::Video(PathBuf::from("media/3.mp4"));
        let group = FrameGroup::new(Frame::new(visual, part("001_n.mp3", 2.8), 0.2));
        let info = MediaInfo {
            duration: 1.0,
            width: 1920,
            height: 1080,
            fps: 25.0,
            has_video: true,
            has_audio: true,
        };
        let cfg = RenderConfig {
            fill: FillPolicy::Loop,
            media_keep_audio: true,
            ..config()
        };
        let cmd = build_group_command(&group, Some(&info), &cfg, Path::new("g.mp4")).unwrap();
        let args = cmd.build_args();
        assert!(args.contains(&"-stream_loop".to_string()));

        let graph = find_filter_complex(&args);
        assert!(graph.contains("fps=30"));
        assert!(graph.contains("trim=duration=3.000"));
        assert!(graph.contains("[0:a]volume=0.200"));
        assert!(graph.contains("amix=inputs=2"));
    }

    #[test]
    fn test_group_command_slow_retimes_native_audio() {
        let visual = VisualSource::Video(PathBuf::from("media/3.mp4"));
        let group = FrameGroup::new(Frame::new(visual, part("001_n.mp3", 1.8), 0.2));
        let info = MediaInfo {
            duration: 1.0,
            width: 1920,
            height: 1080,
            fps: 25.0,
            has_video: true,
            has_audio: true,
        };
        let cfg = RenderConfig {
            fill: FillPolicy::Slow,
            media_keep_audio: true,
            ..config()
        };
        let graph = find_filter_complex(
            &build_group_command(&group, Some(&info), &cfg, Path::new("g.mp4"))
                .unwrap()
                .build_args(),
        );
        assert!(graph.contains("setpts=PTS*2.000000"));
        assert!(graph.contains("atempo=0.500000"));
    }

    #[test]
    fn test_concat_list_escaping() {
        let clips = vec![PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/it's.mp4")];
        let list = concat_list_contents(&clips);
        assert!(list.contains("file '/tmp/a.mp4'\n"));
        assert!(list.contains(r"file '/tmp/it'\''s.mp4'"));
    }

    #[test]
    fn test_concat_command() {
        let args = build_concat_command(Path::new("list.txt"), Path::new("out.mp4")).build_args();
        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], "concat");
        assert!(args.contains(&"-safe".to_string()));
        assert!(args.contains(&"copy".to_string()));
    }

    #[test]
    fn test_music_command_loops_and_attenuates() {
        let args = build_music_command(
            Path::new("timeline.mp4"),
            Path::new("musica.mp3"),
            &config(),
            Path::new("out.mp4"),
        )
        .build_args();
        assert!(args.contains(&"-stream_loop".to_string()));
        let graph = find_filter_complex(&args);
        assert!(graph.contains("volume=0.200"));
        assert!(graph.contains("duration=first"));
        // Video is copied, not re-encoded.
        let cv = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[cv + 1], "copy");
    }

    #[test]
    fn test_bumper_command_silent_source_gets_null_audio() {
        let info = MediaInfo {
            duration: 2.0,
            width: 1080,
            height: 1920,
            fps: 30.0,
            has_video: true,
            has_audio: false,
        };
        let args = build_bumper_command(
            Path::new("cierre.mp4"),
            &info,
            &config(),
            Path::new("bumper.mp4"),
        )
        .build_args();
        assert!(args.iter().any(|a| a.starts_with("anullsrc=")));
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_render_timeline_rejects_empty() {
        let err = tokio_test::block_on(render_timeline(
            &[],
            &config(),
            None,
            None,
            Path::new("out.mp4"),
        ))
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidMedia(_)));
    }
}
