//! Word-timed subtitle allocation.
//!
//! Splits each narration text over its measured audio duration, word
//! by word, and groups words into fixed-size chunks. The flat track
//! drives the SRT writer; the karaoke track drives the ASS writer with
//! a progressive-fill instruction per word.

use relato_models::{SubtitleConfig, WordTiming};

/// One flat subtitle entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// One karaoke event carrying ASS override markup.
#[derive(Debug, Clone, PartialEq)]
pub struct KaraokeEvent {
    pub start: f64,
    pub end: f64,
    pub markup: String,
}

/// Both subtitle tracks produced for one frame.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTracks {
    pub flat: Vec<SubtitleEntry>,
    pub karaoke: Vec<KaraokeEvent>,
}

impl SubtitleTracks {
    pub fn extend(&mut self, other: SubtitleTracks) {
        self.flat.extend(other.flat);
        self.karaoke.extend(other.karaoke);
    }
}

/// Weight each word for the time split. Length mode counts visible
/// characters (punctuation dropped, minimum 1); uniform mode weighs
/// every word the same.
pub fn word_weights(words: &[&str], mode: WordTiming) -> Vec<f64> {
    match mode {
        WordTiming::Uniform => vec![1.0; words.len()],
        WordTiming::Length => words
            .iter()
            .map(|w| {
                let visible = w.chars().filter(|c| c.is_alphanumeric()).count();
                visible.max(1) as f64
            })
            .collect(),
    }
}

/// Split `duration` across words proportionally to `weights`.
///
/// Each word gets at least `min_seg` when the duration allows it,
/// capped so the words after it can still each receive `min_seg`. The
/// last word takes exactly the remainder, so the segments always sum
/// to `duration`. When the duration cannot fund the reserve at all
/// (very short audio, many words) the cap wins over the minimum:
/// leading segments collapse toward zero and the remainder stays
/// non-negative.
pub fn allocate_segments(duration: f64, weights: &[f64], min_seg: f64) -> Vec<f64> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = weights.iter().sum();
    let total = if total > 0.0 { total } else { 1.0 };

    let mut segs = Vec::with_capacity(n);
    let mut rem = duration;
    for (i, weight) in weights.iter().enumerate() {
        let seg = if i < n - 1 {
            let seg = (duration * weight / total).max(min_seg);
            let reserve = min_seg * (n - 1 - i) as f64;
            seg.min((rem - reserve).max(0.0))
        } else {
            rem.max(0.0)
        };
        segs.push(seg);
        rem -= seg;
    }
    segs
}

/// Allocate both subtitle tracks for one narration span.
///
/// `start` is the frame's offset in the overall timeline and
/// `duration` its narration length (without the visual pad). Holds
/// re-display the fully revealed chunk after its reveal window and
/// push subsequent chunks later; they never shorten a reveal.
pub fn allocate(
    text: &str,
    speaker: &str,
    start: f64,
    duration: f64,
    cfg: &SubtitleConfig,
) -> SubtitleTracks {
    let mut base = text.trim().to_string();
    let mut prefix = if cfg.with_speaker {
        format!("{}: ", title_case(speaker))
    } else {
        String::new()
    };
    if cfg.uppercase {
        base = base.to_uppercase();
        prefix = prefix.to_uppercase();
    }

    let words: Vec<&str> = base.split_whitespace().collect();
    if words.is_empty() {
        let text = format!("{}{}", prefix, base).trim().to_string();
        return SubtitleTracks {
            flat: vec![SubtitleEntry {
                start,
                end: start + duration,
                text: text.clone(),
            }],
            karaoke: vec![KaraokeEvent {
                start,
                end: start + duration,
                markup: text,
            }],
        };
    }

    let weights = word_weights(&words, cfg.word_timing);
    let segs = allocate_segments(duration, &weights, cfg.min_seg_seconds());
    let chunk_size = cfg.chunk_size.max(1);
    let hold = cfg.chunk_hold_seconds();

    let mut tracks = SubtitleTracks::default();
    let mut t = start;
    let mut i = 0;
    while i < words.len() {
        let end_idx = (i + chunk_size).min(words.len());
        let chunk_words = &words[i..end_idx];
        let chunk_segs = &segs[i..end_idx];
        let chunk_dur: f64 = chunk_segs.iter().sum();
        let prefixed = !prefix.is_empty() && (cfg.prefix_all || i == 0);

        let mut flat_text = String::new();
        if prefixed {
            flat_text.push_str(&prefix);
        }
        flat_text.push_str(&chunk_words.join(" "));
        tracks.flat.push(SubtitleEntry {
            start: t,
            end: t + chunk_dur,
            text: flat_text.trim().to_string(),
        });

        let mut kf_parts = Vec::new();
        if prefixed {
            kf_parts.push(format!("{{\\kf1}}{}", prefix.trim()));
        }
        for (word, seg) in chunk_words.iter().zip(chunk_segs) {
            let cs = ((seg * 100.0).round() as i64).max(1);
            kf_parts.push(format!("{{\\kf{}}}{}", cs, word));
        }
        tracks.karaoke.push(KaraokeEvent {
            start: t,
            end: t + chunk_dur,
            markup: kf_parts.join(" "),
        });

        if hold > 0.0 {
            let hold_end = t + chunk_dur + hold;
            let mut full = String::new();
            if prefixed {
                full.push_str(prefix.trim());
                full.push(' ');
            }
            full.push_str(&chunk_words.join(" "));
            tracks.flat.push(SubtitleEntry {
                start: t + chunk_dur,
                end: hold_end,
                text: full.clone(),
            });
            tracks.karaoke.push(KaraokeEvent {
                start: t + chunk_dur,
                end: hold_end,
                markup: format!("{{\\1a&H00&\\c&HFFFFFF&}}{}", full),
            });
            t = hold_end;
        } else {
            t += chunk_dur;
        }
        i = end_idx;
    }
    tracks
}

/// "NARRADOR" -> "Narrador".
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
