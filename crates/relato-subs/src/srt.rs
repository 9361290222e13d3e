//! SRT writer for the flat subtitle track.

use std::path::Path;

use crate::error::{SubsError, SubsResult};
use crate::timing::SubtitleEntry;

/// SRT timestamp: `HH:MM:SS,mmm`.
pub fn fmt_srt_ts(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hh = total_ms / 3_600_000;
    let mm = (total_ms % 3_600_000) / 60_000;
    let ss = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hh, mm, ss, ms)
}

/// Render numbered SRT blocks.
pub fn render_srt(entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            idx + 1,
            fmt_srt_ts(entry.start),
            fmt_srt_ts(entry.end),
            entry.text
        ));
    }
    out
}

pub fn write_srt(entries: &[SubtitleEntry], path: &Path) -> SubsResult<()> {
    std::fs::write(path, render_srt(entries)).map_err(|e| SubsError::write(path, e))
}
