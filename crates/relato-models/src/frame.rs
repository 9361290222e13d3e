//! Render frames and sticky frame groups.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::canvas::Rgb;
use crate::turn::AudioPart;

/// File extensions treated as video assets.
pub const VIDEO_EXTS: &[&str] = &["mp4", "mov", "m4v", "webm", "avi"];

/// Resolved visual backing a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisualSource {
    /// Solid background color (missing or cleared visual).
    Color(Rgb),
    /// Static image, held for the target duration.
    Still(PathBuf),
    /// Video clip with an intrinsic duration.
    Video(PathBuf),
}

impl VisualSource {
    /// Classify a resolved media file by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTS.contains(&ext.as_str()) {
            Self::Video(path.to_path_buf())
        } else {
            Self::Still(path.to_path_buf())
        }
    }

    /// Stable identity used for sticky grouping: the resolved path, or a
    /// synthetic `COLOR:` key for background frames.
    pub fn key(&self) -> String {
        match self {
            Self::Color(c) => format!("COLOR:{}", c.to_hex()),
            Self::Still(p) | Self::Video(p) => p.to_string_lossy().to_string(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }
}

/// One audio-bearing render unit: a turn's audio part paired with its
/// resolved visual and padded duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Grouping identity (see [`VisualSource::key`]).
    pub visual_key: String,
    /// Resolved visual backing this frame.
    pub visual: VisualSource,
    /// On-screen duration: narration duration plus pad.
    pub duration: f64,
    /// Narration audio part.
    pub audio: AudioPart,
}

impl Frame {
    pub fn new(visual: VisualSource, audio: AudioPart, pad_seconds: f64) -> Self {
        Self {
            visual_key: visual.key(),
            duration: audio.duration + pad_seconds,
            visual,
            audio,
        }
    }

    /// Narration duration without the visual pad.
    pub fn narration_duration(&self) -> f64 {
        self.audio.duration
    }

    pub fn text(&self) -> &str {
        &self.audio.text
    }

    pub fn speaker(&self) -> &str {
        &self.audio.speaker
    }
}

/// A maximal run of consecutive frames sharing one visual, rendered as a
/// single continuous clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameGroup {
    pub frames: Vec<Frame>,
}

impl FrameGroup {
    /// Start a group from its first frame.
    pub fn new(first: Frame) -> Self {
        Self {
            frames: vec![first],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        debug_assert_eq!(frame.visual_key, self.visual_key());
        self.frames.push(frame);
    }

    /// Grouping key shared by every frame in the group.
    pub fn visual_key(&self) -> &str {
        &self.frames[0].visual_key
    }

    /// Visual rendered once for the whole group.
    pub fn visual(&self) -> &VisualSource {
        &self.frames[0].visual
    }

    /// Sum of frame durations (pads included).
    pub fn total_duration(&self) -> f64 {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(duration: f64) -> AudioPart {
        AudioPart {
            path: PathBuf::from("001_NARRADOR_test.mp3"),
            text: "test".to_string(),
            speaker: "NARRADOR".to_string(),
            duration,
        }
    }

    #[test]
    fn test_visual_classification() {
        assert!(VisualSource::from_file("media/3.mp4").is_video());
        assert!(VisualSource::from_file("media/clip.WEBM").is_video());
        assert!(!VisualSource::from_file("media/1.png").is_video());
        assert!(!VisualSource::from_file("media/photo.jpeg").is_video());
    }

    #[test]
    fn test_color_key() {
        let v = VisualSource::Color(Rgb::BLACK);
        assert_eq!(v.key(), "COLOR:#000000");
    }

    #[test]
    fn test_frame_duration_includes_pad() {
        let f = Frame::new(VisualSource::Color(Rgb::BLACK), part(2.0), 0.2);
        assert!((f.duration - 2.2).abs() < 1e-9);
        assert!((f.narration_duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_total_duration() {
        let v = VisualSource::Still(PathBuf::from("1.png"));
        let mut g = FrameGroup::new(Frame::new(v.clone(), part(2.0), 0.2));
        g.push(Frame::new(v, part(1.5), 0.2));
        assert!((g.total_duration() - 3.9).abs() < 1e-9);
        assert_eq!(g.visual_key(), "1.png");
    }
}
