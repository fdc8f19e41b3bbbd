//! Tag display colors.
//!
//! A tag's color is stored twice: as text in the color field and as the
//! background of that cell. Reads prefer the background.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Used when a tag has neither a background nor a text color.
pub const DEFAULT_TAG_COLOR: &str = "#cccccc";

/// An 8-bit-per-channel color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for HexColor {
    type Err = AdapterError;

    /// Accepts `#rrggbb`, `#rgb`, either case, with or without `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AdapterError::InvalidColor {
            value: s.to_string(),
        };
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The store's color model: channels in `0.0..=1.0`.
///
/// Channels the store omits are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbColor {
    #[serde(default)]
    pub red: f32,
    #[serde(default)]
    pub green: f32,
    #[serde(default)]
    pub blue: f32,
}

impl From<HexColor> for RgbColor {
    fn from(hex: HexColor) -> Self {
        Self {
            red: f32::from(hex.r) / 255.0,
            green: f32::from(hex.g) / 255.0,
            blue: f32::from(hex.b) / 255.0,
        }
    }
}

impl From<RgbColor> for HexColor {
    fn from(rgb: RgbColor) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: channel(rgb.red),
            g: channel(rgb.green),
            b: channel(rgb.blue),
        }
    }
}

/// Pick the color to show for a tag.
///
/// Background wins. Otherwise a non-blank text value is used, normalized
/// to `#rrggbb` when it parses and returned as-is when it does not.
/// Otherwise [`DEFAULT_TAG_COLOR`].
pub fn resolve_display_color(background: Option<&RgbColor>, text: Option<&str>) -> String {
    if let Some(rgb) = background {
        return HexColor::from(*rgb).to_string();
    }
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => text
            .parse::<HexColor>()
            .map(|hex| hex.to_string())
            .unwrap_or_else(|_| text.to_string()),
        None => DEFAULT_TAG_COLOR.to_string(),
    }
}
