//! Duration reconciliation for video visuals.
//!
//! A group's video visual must span exactly the group's total duration.
//! Sources that already cover the target are trimmed; shorter sources
//! are extended by the configured fill policy. Static images have no
//! intrinsic duration and never pass through here.

use tracing::debug;

use relato_models::{FillPolicy, Rgb};

use crate::error::{MediaError, MediaResult};
use crate::filters::trim_to;

/// Tolerance below which durations are considered equal (1ms).
pub const DURATION_TOLERANCE: f64 = 1e-3;

/// Compiled reconciliation: per-input arguments plus the filter steps
/// that make the stream span the target duration exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Arguments placed before the visual's `-i`.
    pub input_args: Vec<String>,
    /// Video filter steps, applied before fitting.
    pub filters: Vec<String>,
    /// Speed factor to apply to native audio (`Slow` only).
    pub audio_tempo: Option<f64>,
}

/// Plan how a video of `source` seconds fills `target` seconds.
pub fn reconcile(
    policy: FillPolicy,
    source: f64,
    target: f64,
    bg: Rgb,
) -> MediaResult<ReconcilePlan> {
    if target <= 0.0 {
        return Err(MediaError::InvalidTarget(target));
    }
    if source <= DURATION_TOLERANCE {
        return Err(MediaError::invalid_media(format!(
            "video source has no usable duration ({:.3}s)",
            source
        )));
    }

    // Source already covers the target: trim, never fill.
    if source >= target - DURATION_TOLERANCE {
        return Ok(ReconcilePlan {
            filters: vec![trim_to(target)],
            ..Default::default()
        });
    }

    let pad = target - source;
    debug!(policy = %policy, source, target, pad, "Reconciling video duration");

    let plan = match policy {
        FillPolicy::Loop => ReconcilePlan {
            input_args: vec!["-stream_loop".to_string(), "-1".to_string()],
            filters: vec![trim_to(target)],
            ..Default::default()
        },
        FillPolicy::Freeze => ReconcilePlan {
            filters: vec![
                format!("tpad=stop_mode=clone:stop_duration={:.3}", pad),
                trim_to(target),
            ],
            ..Default::default()
        },
        FillPolicy::Slow => ReconcilePlan {
            // Retime so existing content spans the target exactly.
            filters: vec![format!("setpts=PTS*{:.6}", target / source), trim_to(target)],
            audio_tempo: Some(source / target),
            ..Default::default()
        },
        FillPolicy::Black => ReconcilePlan {
            filters: vec![
                format!(
                    "tpad=stop_mode=add:stop_duration={:.3}:color={}",
                    pad,
                    bg.to_ffmpeg()
                ),
                trim_to(target),
            ],
            ..Default::default()
        },
    };

    Ok(plan)
}
