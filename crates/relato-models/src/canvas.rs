//! Canvas dimensions and background colors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output canvas: resolution and frame rate, fixed for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }

    /// Parse a `WxH` resolution string into a canvas with the given fps.
    pub fn parse(res: &str, fps: u32) -> Result<Self, CanvasParseError> {
        let (w, h) = res
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| CanvasParseError(res.to_string()))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| CanvasParseError(res.to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| CanvasParseError(res.to_string()))?;
        if width == 0 || height == 0 || fps == 0 {
            return Err(CanvasParseError(res.to_string()));
        }
        Ok(Self { width, height, fps })
    }
}

impl Default for Canvas {
    fn default() -> Self {
        // Vertical short-form default
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.fps)
    }
}

#[derive(Debug, Error)]
#[error("Invalid resolution (expected WxH): {0}")]
pub struct CanvasParseError(String);

/// RGB background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Render as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Render in ffmpeg's `0xRRGGBB` color syntax.
    pub fn to_ffmpeg(self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#rrggbb` or the named colors `black`/`white`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 {
                let r = u8::from_str_radix(&hex[0..2], 16);
                let g = u8::from_str_radix(&hex[2..4], 16);
                let b = u8::from_str_radix(&hex[4..6], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (r, g, b) {
                    return Ok(Rgb(r, g, b));
                }
            }
            return Err(ColorParseError(s.to_string()));
        }
        match s.to_lowercase().as_str() {
            "black" => Ok(Rgb::BLACK),
            "white" => Ok(Rgb::WHITE),
            _ => Err(ColorParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid color (expected #rrggbb, black or white): {0}")]
pub struct ColorParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_parse() {
        let c = Canvas::parse("1920x1080", 30).unwrap();
        assert_eq!((c.width, c.height, c.fps), (1920, 1080, 30));

        let c = Canvas::parse(" 1080X1920 ", 25).unwrap();
        assert_eq!((c.width, c.height), (1080, 1920));

        assert!(Canvas::parse("1920", 30).is_err());
        assert!(Canvas::parse("0x1080", 30).is_err());
        assert!(Canvas::parse("axb", 30).is_err());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb(255, 128, 0));
        assert_eq!("black".parse::<Rgb>().unwrap(), Rgb::BLACK);
        assert_eq!("White".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("chartreuse".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_color_formats() {
        assert_eq!(Rgb(255, 128, 0).to_hex(), "#ff8000");
        assert_eq!(Rgb(255, 128, 0).to_ffmpeg(), "0xFF8000");
    }
}
