//! Frame assembly: pair each turn's audio parts with its resolved visual.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use relato_media::get_duration;
use relato_models::{AudioPart, Frame, RenderConfig, Rgb, Turn, VisualSource};

use crate::error::{RenderError, RenderResult};

/// Audio extensions picked up when scanning the TTS output directory.
pub const AUDIO_EXTS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac"];

/// Fallback extensions tried when a sticky image name has no match.
pub const VISUAL_FALLBACK_EXTS: &[&str] =
    &["png", "jpg", "jpeg", "webp", "mp4", "mov", "m4v", "webm"];

/// List audio files in the TTS output directory, sorted by file name.
/// The name prefix encodes the owning turn, so sort order is part order.
pub fn list_audio_files(audio_dir: &Path) -> RenderResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(audio_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| AUDIO_EXTS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Audio files belonging to the turn at `position` (1-based), matched
/// by the `{position:03}_` name prefix.
pub fn parts_for_turn(files: &[PathBuf], position: usize) -> Vec<PathBuf> {
    let prefix = AudioPart::prefix_for(position);
    files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&prefix))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Resolve a sticky image name against the media directory.
///
/// Tries the name as given, then each fallback extension against the
/// stem. An unresolved name degrades to a solid-color frame.
pub fn resolve_visual(image: Option<&str>, media_dir: &Path, bg: Rgb) -> VisualSource {
    let Some(name) = image else {
        return VisualSource::Color(bg);
    };

    let direct = media_dir.join(name);
    if direct.is_file() {
        return VisualSource::from_file(direct);
    }

    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    for ext in VISUAL_FALLBACK_EXTS {
        let candidate = media_dir.join(format!("{}.{}", stem, ext));
        if candidate.is_file() {
            return VisualSource::from_file(candidate);
        }
    }

    warn!(image = name, "Visual not found, falling back to background color");
    VisualSource::Color(bg)
}

/// Split a turn's text across its audio parts, each part taking a
/// contiguous word run proportional to its share of the turn's audio.
pub fn split_text_by_duration(text: &str, durations: &[f64]) -> Vec<String> {
    let n_parts = durations.len();
    if n_parts <= 1 {
        return vec![text.trim().to_string()];
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let total: f64 = durations.iter().sum();
    let mut out = Vec::with_capacity(n_parts);
    let mut taken = 0usize;
    let mut cum = 0.0;
    for (i, duration) in durations.iter().enumerate() {
        cum += duration;
        let boundary = if i == n_parts - 1 {
            words.len()
        } else if total > 0.0 {
            (((cum / total) * words.len() as f64).round() as usize).clamp(taken, words.len())
        } else {
            (words.len() * (i + 1) / n_parts).clamp(taken, words.len())
        };
        out.push(words[taken..boundary].join(" "));
        taken = boundary;
    }
    out
}

/// Assemble one frame per audio part, in narration order.
///
/// Turns with no produced audio are skipped with a warning; a missing
/// visual never aborts assembly.
pub async fn assemble_frames(
    turns: &[Turn],
    audio_dir: &Path,
    media_dir: &Path,
    cfg: &RenderConfig,
) -> RenderResult<Vec<Frame>> {
    let files = list_audio_files(audio_dir)?;
    if files.is_empty() {
        return Err(RenderError::NoAudio(audio_dir.to_path_buf()));
    }

    let mut frames = Vec::new();
    for turn in turns {
        if turn.is_close() {
            continue;
        }

        let part_files = parts_for_turn(&files, turn.index + 1);
        if part_files.is_empty() {
            warn!(
                turn = turn.index,
                speaker = %turn.speaker,
                "No audio parts for turn, skipping"
            );
            continue;
        }

        let mut durations = Vec::with_capacity(part_files.len());
        for path in &part_files {
            let duration = get_duration(path)
                .await
                .map_err(|e| RenderError::assemble(turn.index, e))?;
            durations.push(duration);
        }
        let texts = split_text_by_duration(&turn.text, &durations);

        let visual = resolve_visual(turn.image.as_deref(), media_dir, cfg.bg_color);
        debug!(
            turn = turn.index,
            parts = part_files.len(),
            visual = %visual.key(),
            "Assembled turn"
        );

        for ((path, duration), text) in part_files.iter().zip(&durations).zip(texts) {
            let part = AudioPart {
                path: path.clone(),
                text,
                speaker: turn.speaker.clone(),
                duration: *duration,
            };
            frames.push(Frame::new(visual.clone(), part, cfg.pad_seconds()));
        }
    }

    if frames.is_empty() {
        return Err(RenderError::NoAudio(audio_dir.to_path_buf()));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_matched_by_prefix_in_order() {
        let files = vec![
            PathBuf::from("out/001_NARRADOR_habia.mp3"),
            PathBuf::from("out/002_NARRADOR_un-extrano-1.mp3"),
            PathBuf::from("out/002_NARRADOR_un-extrano-2.mp3"),
            PathBuf::from("out/003_ANA_todo.mp3"),
        ];
        assert_eq!(parts_for_turn(&files, 1).len(), 1);
        let second = parts_for_turn(&files, 2);
        assert_eq!(second.len(), 2);
        assert!(second[0].to_string_lossy().ends_with("-1.mp3"));
        assert!(parts_for_turn(&files, 4).is_empty());
    }

    #[test]
    fn test_resolve_missing_visual_falls_back_to_color() {
        let dir = tempfile::tempdir().unwrap();
        let visual = resolve_visual(Some("9.png"), dir.path(), Rgb::BLACK);
        assert_eq!(visual, VisualSource::Color(Rgb::BLACK));
    }

    #[test]
    fn test_resolve_direct_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.png"), b"x").unwrap();
        let visual = resolve_visual(Some("1.png"), dir.path(), Rgb::BLACK);
        assert!(matches!(visual, VisualSource::Still(_)));
    }

    #[test]
    fn test_resolve_extension_fallback_finds_video() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("3.mp4"), b"x").unwrap();
        // The sticky tag said png, only the mp4 exists.
        let visual = resolve_visual(Some("3.png"), dir.path(), Rgb::BLACK);
        assert!(visual.is_video());
    }

    #[test]
    fn test_no_image_is_color_frame() {
        let dir = tempfile::tempdir().unwrap();
        let visual = resolve_visual(None, dir.path(), Rgb(16, 16, 16));
        assert_eq!(visual.key(), "COLOR:#101010");
    }

    #[test]
    fn test_split_text_single_part() {
        assert_eq!(
            split_text_by_duration(" hola mundo ", &[2.0]),
            vec!["hola mundo".to_string()]
        );
    }

    #[test]
    fn test_split_text_proportional_to_duration() {
        let texts = split_text_by_duration("uno dos tres cuatro", &[1.0, 3.0]);
        assert_eq!(texts, vec!["uno".to_string(), "dos tres cuatro".to_string()]);
    }

    #[test]
    fn test_split_text_covers_all_words() {
        let texts = split_text_by_duration("a b c d e", &[1.0, 1.0, 1.0]);
        let joined = texts.join(" ");
        assert_eq!(joined.split_whitespace().count(), 5);
    }
}
