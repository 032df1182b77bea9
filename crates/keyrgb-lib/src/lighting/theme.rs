//! Accent themes: the eight line/volume colour presets the keyboard supports.

use std::fmt;

use serde::Serialize;

use super::color::Rgb;

/// Hardware colour codes for the accent line and the volume knob.
///
/// These are the device's own numbering and do not match [`LightingTheme`]
/// indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeMapping {
    pub line: u8,
    pub volume: u8,
}

/// Accent theme, exposed to users as the "special colour" index 0–7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LightingTheme {
    Off = 0,
    Orange = 1,
    Yellow = 2,
    Green = 3,
    LightBlue = 4,
    #[default]
    Purple = 5,
    Red = 6,
    DarkBlue = 7,
}

impl LightingTheme {
    /// All themes in index order.
    pub const ALL: [LightingTheme; 8] = [
        LightingTheme::Off,
        LightingTheme::Orange,
        LightingTheme::Yellow,
        LightingTheme::Green,
        LightingTheme::LightBlue,
        LightingTheme::Purple,
        LightingTheme::Red,
        LightingTheme::DarkBlue,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            LightingTheme::Off => "off",
            LightingTheme::Orange => "orange",
            LightingTheme::Yellow => "yellow",
            LightingTheme::Green => "green",
            LightingTheme::LightBlue => "light blue",
            LightingTheme::Purple => "purple",
            LightingTheme::Red => "red",
            LightingTheme::DarkBlue => "dark blue",
        }
    }

    /// Line/volume codes written into the packet for this theme.
    pub fn mapping(self) -> ThemeMapping {
        let (line, volume) = match self {
            LightingTheme::Off => (8, 9),
            LightingTheme::Orange => (1, 3),
            LightingTheme::Yellow => (2, 4),
            LightingTheme::Green => (3, 5),
            LightingTheme::LightBlue => (4, 6),
            LightingTheme::Purple => (6, 8),
            LightingTheme::Red => (10, 2),
            LightingTheme::DarkBlue => (5, 7),
        };
        ThemeMapping { line, volume }
    }

    /// Pick the accent theme that best matches a key colour.
    ///
    /// Rules are checked in order and the first match wins, so e.g. a bright
    /// magenta resolves to purple before the red rule is considered.
    pub fn infer_from_color(color: Rgb) -> Self {
        let (r, g, b) = (i16::from(color.r), i16::from(color.g), i16::from(color.b));

        if g > r && g > b && g > 200 {
            LightingTheme::Green
        } else if r > g && b > g && (r - b).abs() < 50 {
            LightingTheme::Purple
        } else if r > g && r > b && r > 200 {
            LightingTheme::Red
        } else if b > r && b > g && b > 200 {
            LightingTheme::DarkBlue
        } else if r > 200 && g > 200 && b < 100 {
            LightingTheme::Yellow
        } else if r > 200 && g > 100 && g < 200 && b < 100 {
            LightingTheme::Orange
        } else {
            LightingTheme::Purple
        }
    }
}

impl fmt::Display for LightingTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.name())
    }
}
