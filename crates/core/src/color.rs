//! Stroke colors for contour lines.
//!
//! Hosts hand colors over as CSS strings (`#rgb`, `#rrggbb`, `#rrggbbaa`,
//! `rgb(...)`, `rgba(...)`). [`Rgba`] parses those into straight-alpha
//! components in [0, 1] and writes them back out as `rgba(...)` for canvas
//! stroke styles. Any other CSS color (named colors, `hsl()`, ...) is
//! carried through unparsed as [`LineColor::Css`] so a canvas can still draw
//! it.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Alpha applied to a theme foreground color when it becomes the line color.
pub const THEME_LINE_ALPHA: f64 = 0.5;

/// Straight-alpha color with components in [0, 1].
///
/// Serializes as a CSS `rgba(...)` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Light translucent gray (`#EDEDEDB3`) used when neither an explicit
    /// color nor a theme foreground is available.
    pub const FALLBACK_LINE: Rgba = Rgba {
        r: 237.0 / 255.0,
        g: 237.0 / 255.0,
        b: 237.0 / 255.0,
        a: 179.0 / 255.0,
    };

    /// Opaque black.
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Builds a color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (prefix optional,
    /// case insensitive).
    pub fn from_hex(hex: &str) -> Result<Rgba, EngineError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!("non-ascii hex: {hex}")));
        }
        let digit = |s: &str| {
            u8::from_str_radix(s, 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid hex digits '{s}': {e}")))
        };
        let short = |i: usize| digit(&hex[i..=i]).map(|v| v * 17);
        match hex.len() {
            3 => Ok(Self::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
            4 => Ok(Self::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Ok(Self::from_rgba8(
                digit(&hex[0..2])?,
                digit(&hex[2..4])?,
                digit(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::from_rgba8(
                digit(&hex[0..2])?,
                digit(&hex[2..4])?,
                digit(&hex[4..6])?,
                digit(&hex[6..8])?,
            )),
            n => Err(EngineError::InvalidColor(format!(
                "expected 3, 4, 6 or 8 hex digits, got {n}"
            ))),
        }
    }

    /// Parses a CSS color in hex or `rgb()`/`rgba()` functional notation.
    ///
    /// Functional notation accepts comma- or space-separated channels in
    /// 0..=255 and an optional alpha in [0, 1] or as a percentage.
    pub fn parse_css(input: &str) -> Result<Rgba, EngineError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        let Some(body) = body else {
            return Self::from_hex(trimmed);
        };

        let parts: Vec<&str> = body
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(EngineError::InvalidColor(format!(
                "expected 3 or 4 channels in '{trimmed}'"
            )));
        }
        let channel = |s: &str| -> Result<f64, EngineError> {
            let v: f64 = s
                .parse()
                .map_err(|_| EngineError::InvalidColor(format!("bad channel '{s}'")))?;
            Ok((v / 255.0).clamp(0.0, 1.0))
        };
        let alpha = match parts.get(3) {
            Some(s) => match s.strip_suffix('%') {
                Some(pct) => pct
                    .parse::<f64>()
                    .map(|v| v / 100.0)
                    .map_err(|_| EngineError::InvalidColor(format!("bad alpha '{s}'")))?,
                None => s
                    .parse::<f64>()
                    .map_err(|_| EngineError::InvalidColor(format!("bad alpha '{s}'")))?,
            },
            None => 1.0,
        };
        Ok(Rgba {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: alpha.clamp(0.0, 1.0),
        })
    }

    /// Returns the same color with alpha replaced (clamped to [0, 1]).
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Quantizes to 8-bit channels with rounding.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Formats as `rgba(r, g, b, a)` with 8-bit color channels.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse_css(&s).map_err(serde::de::Error::custom)
    }
}

/// A contour stroke color as the host supplied it.
///
/// Canvas surfaces accept any CSS color string, so a color [`Rgba`] cannot
/// parse is kept verbatim. Raster surfaces need components and use
/// [`LineColor::rgba`].
#[derive(Debug, Clone, PartialEq)]
pub enum LineColor {
    Rgba(Rgba),
    Css(String),
}

impl LineColor {
    /// The CSS text to hand to a canvas `strokeStyle`.
    pub fn to_css(&self) -> String {
        match self {
            LineColor::Rgba(color) => color.to_css(),
            LineColor::Css(text) => text.clone(),
        }
    }

    /// Components, when the color is one [`Rgba::parse_css`] understands.
    pub fn rgba(&self) -> Option<Rgba> {
        match self {
            LineColor::Rgba(color) => Some(*color),
            LineColor::Css(text) => Rgba::parse_css(text).ok(),
        }
    }
}

impl From<Rgba> for LineColor {
    fn from(color: Rgba) -> Self {
        LineColor::Rgba(color)
    }
}

impl PartialEq<Rgba> for LineColor {
    fn eq(&self, other: &Rgba) -> bool {
        matches!(self, LineColor::Rgba(color) if color == other)
    }
}

/// Picks the contour stroke color.
///
/// A non-blank explicit color always wins: parsed when [`Rgba`] understands
/// it, passed through as [`LineColor::Css`] otherwise. Without one, a
/// non-empty theme foreground is reused at [`THEME_LINE_ALPHA`]; an
/// unparseable theme value degrades to light gray at that alpha. With
/// neither, the result is [`Rgba::FALLBACK_LINE`].
pub fn resolve_line_color(explicit: Option<&str>, theme_foreground: Option<&str>) -> LineColor {
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return match Rgba::parse_css(explicit) {
            Ok(color) => LineColor::Rgba(color),
            Err(e) => {
                debug!(color = explicit, error = %e, "passing line color through as CSS");
                LineColor::Css(explicit.to_string())
            }
        };
    }
    let color = match theme_foreground.map(str::trim).filter(|s| !s.is_empty()) {
        Some(theme) => Rgba::parse_css(theme)
            .unwrap_or(Rgba::FALLBACK_LINE)
            .with_alpha(THEME_LINE_ALPHA),
        None => Rgba::FALLBACK_LINE,
    };
    LineColor::Rgba(color)
}
