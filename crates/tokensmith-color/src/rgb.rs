//! sRGB colors as they appear in token exports.

use crate::hsl::Hsl;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Errors raised while parsing a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("empty color literal")]
    Empty,

    #[error("invalid hex color: {0}")]
    InvalidHex(String),

    #[error("invalid rgb() color: {0}")]
    InvalidFunction(String),

    #[error("unsupported color syntax: {0}")]
    Unsupported(String),
}

/// An 8-bit sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn rgb_function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)(%?)\s*)?\)$",
        )
        .expect("rgb function regex must compile")
    })
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(…)` or `rgba(…)`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(trimmed.to_string()));
        }
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("rgb") {
            return parse_function(trimmed)
                .ok_or_else(|| ColorParseError::InvalidFunction(trimmed.to_string()));
        }
        Err(ColorParseError::Unsupported(trimmed.to_string()))
    }

    /// Euclidean distance over the red, green and blue channels.
    ///
    /// Alpha does not contribute to the distance; callers that care about
    /// opacity compare it separately.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Lowercase hex; the alpha byte is only written for translucent colors.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hsl(&self) -> Hsl {
        Hsl::from(*self)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgb::new(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgb::with_alpha(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgb::with_alpha(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_function(input: &str) -> Option<Rgb> {
    let caps = rgb_function_re().captures(input)?;
    let channel = |i: usize| -> Option<u8> { caps.get(i)?.as_str().parse::<u16>().ok()?.try_into().ok() };
    let r = channel(1)?;
    let g = channel(2)?;
    let b = channel(3)?;
    let a = match caps.get(4) {
        None => 255,
        Some(raw) => {
            let mut alpha: f64 = raw.as_str().parse().ok()?;
            if caps.get(5).is_some_and(|m| m.as_str() == "%") {
                alpha /= 100.0;
            }
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            (alpha * 255.0).round() as u8
        }
    };
    Some(Rgb::with_alpha(r, g, b, a))
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
