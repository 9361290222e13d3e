//! ASS writer for the karaoke/typing track.
//!
//! Each event's markup carries one `\kf` fill instruction per word, so
//! the player reveals the chunk progressively in sync with narration.

use std::path::Path;

use relato_models::{AssStyle, Canvas};

use crate::error::{SubsError, SubsResult};
use crate::timing::KaraokeEvent;

// &HAABBGGRR, AA = alpha (00 opaque, FF transparent).
const PRIMARY: &str = "&H00FFFFFF&"; // revealed fill: opaque white
const SECONDARY: &str = "&HFFFFFFFF&"; // unrevealed: transparent
const OUTLINE: &str = "&H00000000&";
const BACK: &str = "&H00000000&";

/// ASS timestamp: `H:MM:SS.cc`.
pub fn fmt_ass_ts(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let h = total_cs / 360_000;
    let m = (total_cs % 360_000) / 6_000;
    let s = (total_cs % 6_000) / 100;
    let cs = total_cs % 100;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Script header with the typing style definition.
pub fn ass_header(canvas: &Canvas, style: &AssStyle) -> String {
    format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {w}\n\
         PlayResY: {h}\n\
         ScaledBorderAndShadow: yes\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
         Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
         Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: {name},{font},{size},{primary},{secondary},{outline_c},{back},\
         0,0,0,0,100,100,0,0,1,{outline},{shadow},{align},30,30,{margin_v},0\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        w = canvas.width,
        h = canvas.height,
        name = style.style_name,
        font = style.font,
        size = style.font_size,
        primary = PRIMARY,
        secondary = SECONDARY,
        outline_c = OUTLINE,
        back = BACK,
        outline = style.outline,
        shadow = style.shadow,
        align = style.alignment,
        margin_v = style.margin_v,
    )
}

/// Render the full ASS document.
pub fn render_ass(events: &[KaraokeEvent], canvas: &Canvas, style: &AssStyle) -> String {
    let mut out = ass_header(canvas, style);
    for event in events {
        out.push_str(&format!(
            "Dialogue: 0,{},{},{},,0,0,{},,{}\n",
            fmt_ass_ts(event.start),
            fmt_ass_ts(event.end),
            style.style_name,
            style.margin_v,
            event.markup
        ));
    }
    out
}

pub fn write_ass(
    events: &[KaraokeEvent],
    canvas: &Canvas,
    style: &AssStyle,
    path: &Path,
) -> SubsResult<()> {
    std::fs::write(path, render_ass(events, canvas, style)).map_err(|e| SubsError::write(path, e))
}
