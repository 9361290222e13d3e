//! Ken Burns camera math and its zoompan filter realization.
//!
//! The pan path and zoom function are pure and deterministic: a random
//! pan is seeded from the explicit config seed or from a stable hash of
//! the group's visual key, so the same asset pans the same way across
//! renders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use relato_models::{Canvas, KenBurnsConfig, KenBurnsMode, PanDirection};

use crate::filters::cover_prescale;

/// Oversampling factor for the zoompan working surface.
const PRESCALE_FACTOR: u32 = 2;

/// Relative start/end positions of the camera window, in [0,1]².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanPath {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Stable 64-bit seed derived from a visual key.
pub fn stable_seed(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    u64::from_be_bytes(digest[..8].try_into().expect("digest >= 8 bytes"))
}

/// Resolve the pan path for a group's visual.
pub fn pan_path(config: &KenBurnsConfig, visual_key: &str) -> PanPath {
    match config.pan {
        PanDirection::Center => PanPath {
            start: (0.5, 0.5),
            end: (0.5, 0.5),
        },
        PanDirection::TlBr => PanPath {
            start: (0.0, 0.0),
            end: (1.0, 1.0),
        },
        PanDirection::TrBl => PanPath {
            start: (1.0, 0.0),
            end: (0.0, 1.0),
        },
        PanDirection::BlTr => PanPath {
            start: (0.0, 1.0),
            end: (1.0, 0.0),
        },
        PanDirection::BrTl => PanPath {
            start: (1.0, 1.0),
            end: (0.0, 0.0),
        },
        PanDirection::Random => {
            let seed = config.seed.unwrap_or_else(|| stable_seed(visual_key));
            let mut rng = StdRng::seed_from_u64(seed);
            PanPath {
                start: (rng.random_range(0.0..=1.0), rng.random_range(0.0..=1.0)),
                end: (rng.random_range(0.0..=1.0), rng.random_range(0.0..=1.0)),
            }
        }
    }
}

/// Zoom factor at time `t` over a clip of `duration` seconds.
pub fn zoom_at(mode: KenBurnsMode, zoom: f64, t: f64, duration: f64) -> f64 {
    let p = if duration > 0.0 {
        (t / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    match mode {
        KenBurnsMode::None => 1.0,
        KenBurnsMode::In => 1.0 + zoom * p,
        KenBurnsMode::Out => (1.0 + zoom) - zoom * p,
    }
}

/// Relative camera position at time `t`, linearly interpolated.
pub fn rel_at(path: &PanPath, t: f64, duration: f64) -> (f64, f64) {
    let p = if duration > 0.0 {
        (t / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (
        path.start.0 * (1.0 - p) + path.end.0 * p,
        path.start.1 * (1.0 - p) + path.end.1 * p,
    )
}

/// Build the zoompan expression chain for one group.
///
/// Returns `None` when the mode is `None`: the caller falls back to a
/// static fit with no time-varying transform. The input stream must
/// already run at the canvas frame rate.
pub fn ken_burns_chain(
    config: &KenBurnsConfig,
    visual_key: &str,
    canvas: &Canvas,
    duration: f64,
) -> Option<String> {
    if config.mode == KenBurnsMode::None {
        return None;
    }

    let path = pan_path(config, visual_key);
    let frames = ((duration * canvas.fps as f64).round() as u64).max(1);
    // Progress runs over output frame index `on` in [0, frames-1].
    let last = (frames - 1).max(1);

    // Endpoint constants come from the pure time functions; the
    // expressions interpolate between them over the frame index.
    let zoom = config.zoom;
    let z0 = zoom_at(config.mode, zoom, 0.0, duration);
    let z1 = zoom_at(config.mode, zoom, duration, duration);
    let z_expr = match config.mode {
        KenBurnsMode::In => format!("min({:.6}+{:.6}*on/{},{:.6})", z0, zoom, last, z1),
        KenBurnsMode::Out => format!("max({:.6}-{:.6}*on/{},{:.6})", z0, zoom, last, z1),
        KenBurnsMode::None => unreachable!(),
    };

    let (sx, sy) = rel_at(&path, 0.0, duration);
    let (ex, ey) = rel_at(&path, duration, duration);
    let (dx, dy) = (ex - sx, ey - sy);
    let x_expr = format!("(iw-iw/zoom)*({:.6}+{:.6}*min(on/{},1))", sx, dx, last);
    let y_expr = format!("(ih-ih/zoom)*({:.6}+{:.6}*min(on/{},1))", sy, dy, last);

    Some(format!(
        "{prescale},zoompan=z='{z}':x='{x}':y='{y}':d=1:s={w}x{h}:fps={fps}",
        prescale = cover_prescale(canvas, PRESCALE_FACTOR),
        z = z_expr,
        x = x_expr,
        y = y_expr,
        w = canvas.width,
        h = canvas.height,
        fps = canvas.fps
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: KenBurnsMode, pan: PanDirection, seed: Option<u64>) -> KenBurnsConfig {
        KenBurnsConfig {
            mode,
            zoom: 0.10,
            pan,
            seed,
        }
    }

    #[test]
    fn test_zoom_endpoints() {
        let d = 4.0;
        assert!((zoom_at(KenBurnsMode::In, 0.1, 0.0, d) - 1.0).abs() < 1e-9);
        assert!((zoom_at(KenBurnsMode::In, 0.1, d, d) - 1.1).abs() < 1e-9);
        assert!((zoom_at(KenBurnsMode::Out, 0.1, 0.0, d) - 1.1).abs() < 1e-9);
        assert!((zoom_at(KenBurnsMode::Out, 0.1, d, d) - 1.0).abs() < 1e-9);
        assert!((zoom_at(KenBurnsMode::None, 0.1, 2.0, d) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamps_past_duration() {
        assert!((zoom_at(KenBurnsMode::In, 0.1, 99.0, 4.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_named_pan_paths() {
        let cfg = config(KenBurnsMode::In, PanDirection::TlBr, None);
        let path = pan_path(&cfg, "1.png");
        assert_eq!(path.start, (0.0, 0.0));
        assert_eq!(path.end, (1.0, 1.0));

        let cfg = config(KenBurnsMode::In, PanDirection::Center, None);
        let path = pan_path(&cfg, "1.png");
        assert_eq!(rel_at(&path, 2.0, 4.0), (0.5, 0.5));
    }

    #[test]
    fn test_rel_interpolation() {
        let path = PanPath {
            start: (0.0, 1.0),
            end: (1.0, 0.0),
        };
        let (x, y) = rel_at(&path, 2.0, 4.0);
        assert!((x - 0.5).abs() < 1e-9);
        assert!((y - 0.5).abs() < 1e-9);
        assert_eq!(rel_at(&path, 0.0, 4.0), (0.0, 1.0));
        assert_eq!(rel_at(&path, 4.0, 4.0), (1.0, 0.0));
    }

    #[test]
    fn test_random_pan_deterministic_per_key() {
        let cfg = config(KenBurnsMode::In, PanDirection::Random, None);
        let a = pan_path(&cfg, "media/1.png");
        let b = pan_path(&cfg, "media/1.png");
        assert_eq!(a, b);

        let other = pan_path(&cfg, "media/2.png");
        assert_ne!(a, other);
    }

    #[test]
    fn test_random_pan_explicit_seed_overrides_key() {
        let cfg = config(KenBurnsMode::In, PanDirection::Random, Some(7));
        let a = pan_path(&cfg, "media/1.png");
        let b = pan_path(&cfg, "media/2.png");
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_pan_in_unit_square() {
        let cfg = config(KenBurnsMode::In, PanDirection::Random, None);
        let path = pan_path(&cfg, "anything");
        for v in [path.start.0, path.start.1, path.end.0, path.end.1] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_chain_none_mode() {
        let cfg = config(KenBurnsMode::None, PanDirection::Center, None);
        assert!(ken_burns_chain(&cfg, "1.png", &Canvas::default(), 4.0).is_none());
    }

    #[test]
    fn test_chain_shape() {
        let cfg = config(KenBurnsMode::In, PanDirection::TlBr, None);
        let canvas = Canvas::new(1080, 1920, 30);
        let chain = ken_burns_chain(&cfg, "1.png", &canvas, 3.9).unwrap();
        assert!(chain.contains("zoompan="));
        assert!(chain.contains("s=1080x1920"));
        assert!(chain.contains("fps=30"));
        // 3.9s at 30fps = 117 frames, progress over index 116
        assert!(chain.contains("on/116"));
        assert!(chain.starts_with("scale=2160:3840"));
        // Zoom runs 1.0 -> 1.1, pan runs (0,0) -> (1,1).
        assert!(chain.contains("min(1.000000+0.100000*on/116,1.100000)"));
        assert!(chain.contains("(iw-iw/zoom)*(0.000000+1.000000*min(on/116,1))"));
    }

    #[test]
    fn test_chain_out_mode_endpoints() {
        let cfg = config(KenBurnsMode::Out, PanDirection::Center, None);
        let canvas = Canvas::new(1080, 1920, 30);
        let chain = ken_burns_chain(&cfg, "1.png", &canvas, 2.0).unwrap();
        assert!(chain.contains("max(1.100000-0.100000*on/59,1.000000)"));
    }
}
