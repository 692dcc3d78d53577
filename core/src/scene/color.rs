//! Colors as written in manifests

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::surface::{BLACK, Rgba, WHITE};

/// An opaque color, written as `"#rrggbb"` or a basic name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba);

const NAMED: &[(&str, Rgba)] = &[
    ("white", WHITE),
    ("black", BLACK),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("grey", [128, 128, 128, 255]),
    ("gray", [128, 128, 128, 255]),
];

impl Color {
    pub const WHITE: Self = Self(WHITE);
    pub const BLACK: Self = Self(BLACK);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Gray level, saturating at 255
    pub fn gray(level: u32) -> Self {
        let level = level.min(255) as u8;
        Self::rgb(level, level, level)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let value = u32::from_str_radix(hex, 16).ok()?;
            let [_, r, g, b] = value.to_be_bytes();
            return Some(Self::rgb(r, g, b));
        }
        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, rgba)| Self(*rgba))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text).ok_or_else(|| format!("invalid color '{}'", text))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
