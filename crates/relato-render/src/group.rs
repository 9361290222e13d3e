//! Sticky grouping of consecutive frames sharing a visual.
//!
//! Without grouping, camera motion would restart at every narration
//! block even when consecutive blocks narrate over the same image.

use relato_models::{Frame, FrameGroup};

/// Merge maximal runs of consecutive frames with identical visual keys
/// into groups. With `sticky` off, every frame becomes its own group.
pub fn group_frames(frames: Vec<Frame>, sticky: bool) -> Vec<FrameGroup> {
    let mut groups: Vec<FrameGroup> = Vec::new();
    for frame in frames {
        if sticky {
            if let Some(last) = groups.last_mut() {
                if last.visual_key() == frame.visual_key {
                    last.push(frame);
                    continue;
                }
            }
        }
        groups.push(FrameGroup::new(frame));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use relato_models::{AudioPart, Rgb, VisualSource};
    use std::path::PathBuf;

    fn frame(image: Option<&str>, duration: f64) -> Frame {
        let visual = match image {
            Some(name) => VisualSource::from_file(format!("media/{}", name)),
            None => VisualSource::Color(Rgb::BLACK),
        };
        let audio = AudioPart {
            path: PathBuf::from("001_n.mp3"),
            text: "texto".to_string(),
            speaker: "NARRADOR".to_string(),
            duration,
        };
        Frame::new(visual, audio, 0.2)
    }

    #[test]
    fn test_consecutive_same_visual_merges() {
        let groups = group_frames(
            vec![frame(Some("1.png"), 2.0), frame(Some("1.png"), 1.5)],
            true,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].frames.len(), 2);
    }

    #[test]
    fn test_distinct_visuals_are_noop() {
        // All keys distinct: grouping changes nothing.
        let frames = vec![
            frame(Some("1.png"), 1.0),
            frame(Some("2.png"), 1.0),
            frame(None, 1.0),
        ];
        let groups = group_frames(frames.clone(), true);
        assert_eq!(groups.len(), frames.len());
        assert!(groups.iter().all(|g| g.frames.len() == 1));
    }

    #[test]
    fn test_non_consecutive_same_visual_stays_split() {
        let groups = group_frames(
            vec![
                frame(Some("1.png"), 1.0),
                frame(Some("2.png"), 1.0),
                frame(Some("1.png"), 1.0),
            ],
            true,
        );
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_sticky_off_groups_per_frame() {
        let groups = group_frames(
            vec![frame(Some("1.png"), 2.0), frame(Some("1.png"), 1.5)],
            false,
        );
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_story_scenario_durations() {
        // Three narration blocks over two images with audio durations
        // 2.0s, 1.5s, 3.0s and a 0.2s pad.
        let frames = vec![
            frame(Some("1.png"), 2.0),
            frame(Some("1.png"), 1.5),
            frame(Some("2.png"), 3.0),
        ];
        let groups = group_frames(frames, true);
        assert_eq!(groups.len(), 2);
        assert!((groups[0].total_duration() - 3.9).abs() < 1e-9);
        assert!((groups[1].total_duration() - 3.2).abs() < 1e-9);
        let total: f64 = groups.iter().map(|g| g.total_duration()).sum();
        assert!((total - 7.1).abs() < 1e-9);
    }
}
