//! FFmpeg filter-string builders.
//!
//! Every visual stream is normalized to the canvas size, square pixels
//! and yuv420p before encoding so intermediate group clips can be
//! concatenated with a stream copy.

use relato_models::{Canvas, FitMode, Rgb};

/// atempo only accepts factors in [0.5, 2.0] per instance.
const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;

/// Fit a stream onto the canvas.
///
/// `Contain` letterboxes over the background color; `Cover` scales to
/// fill and crops the overflow.
pub fn fit_filter(fit: FitMode, canvas: &Canvas, bg: Rgb) -> String {
    let (w, h) = (canvas.width, canvas.height);
    match fit {
        FitMode::Contain => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color={color}",
            w = w,
            h = h,
            color = bg.to_ffmpeg()
        ),
        FitMode::Cover => format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = w,
            h = h
        ),
    }
}

/// Cover-scale to `factor`x the canvas, the zoompan working surface.
/// Oversampling keeps sub-pixel pan steps from shimmering.
pub fn cover_prescale(canvas: &Canvas, factor: u32) -> String {
    let w = canvas.width * factor;
    let h = canvas.height * factor;
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
        w = w,
        h = h
    )
}

/// Normalize a stream to the output frame rate.
pub fn fps_filter(fps: u32) -> String {
    format!("fps={}", fps)
}

/// Final normalization before encoding.
pub fn output_format_filter() -> &'static str {
    "setsar=1,format=yuv420p"
}

/// Trim a video stream to an exact duration and rebase timestamps.
pub fn trim_to(duration: f64) -> String {
    format!("trim=duration={:.3},setpts=PTS-STARTPTS", duration)
}

/// Delay an audio stream by a start offset.
pub fn adelay_filter(offset_ms: u64) -> String {
    format!("adelay={}:all=1", offset_ms)
}

/// Scale an audio stream's volume, clamped to [0, 1].
pub fn volume_filter(vol: f64) -> String {
    format!("volume={:.3}", vol.clamp(0.0, 1.0))
}

/// Mix `inputs` audio streams without renormalizing levels.
pub fn amix_filter(inputs: usize) -> String {
    format!(
        "amix=inputs={}:duration=longest:dropout_transition=0:normalize=0",
        inputs
    )
}

/// Pad an audio stream with silence up to a whole duration.
pub fn apad_to(duration: f64) -> String {
    format!("apad=whole_dur={:.3}", duration)
}

/// Trim an audio stream to an exact duration.
pub fn atrim_to(duration: f64) -> String {
    format!("atrim=duration={:.3}", duration)
}

/// Build an `atempo` chain for an arbitrary speed factor.
///
/// A single atempo instance only covers [0.5, 2.0], so larger retimes
/// are factored into a chain of in-range steps.
pub fn atempo_chain(factor: f64) -> Vec<String> {
    let mut chain = Vec::new();
    if factor <= 0.0 || (factor - 1.0).abs() < 1e-9 {
        return chain;
    }
    let mut remaining = factor;
    while remaining < ATEMPO_MIN {
        chain.push(format!("atempo={:.6}", ATEMPO_MIN));
        remaining /= ATEMPO_MIN;
    }
    while remaining > ATEMPO_MAX {
        chain.push(format!("atempo={:.6}", ATEMPO_MAX));
        remaining /= ATEMPO_MAX;
    }
    chain.push(format!("atempo={:.6}", remaining));
    chain
}
