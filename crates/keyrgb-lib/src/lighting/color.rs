//! Key colour parsing and formatting.
//!
//! Colour expressions come from the command line and the config file, so
//! parsing is forgiving: anything unrecognised yields `None` and callers fall
//! back to white.

use std::fmt;

use super::theme::LightingTheme;

/// An 8-bit RGB triple for the key backlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_color(*self))
    }
}

/// Named colours accepted by [`parse_color`].
const NAMED_COLORS: [(&str, Rgb); 12] = [
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("white", Rgb::new(255, 255, 255)),
    ("black", Rgb::new(0, 0, 0)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("pink", Rgb::new(255, 192, 203)),
    ("off", Rgb::new(0, 0, 0)),
];

/// Parse a colour expression.
///
/// Accepts, in this order:
/// - Hex: `"#ff8000"` (exactly `#` plus six hex digits)
/// - Decimal triple: `"255,128,0"` (each field 0–255, whitespace allowed)
/// - Named: `"red"`, `"orange"`, `"off"`, … (case-insensitive)
///
/// A form that fails to parse falls through to the next one. Returns `None`
/// for empty input or when nothing matches.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    if let Some(rgb) = parse_hex(&s) {
        return Some(rgb);
    }

    if s.contains(',')
        && let Some(rgb) = parse_triple(&s)
    {
        return Some(rgb);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|&(_, rgb)| rgb)
}

/// Like [`parse_color`], but unparsable input becomes white.
pub fn parse_color_or_default(input: &str) -> Rgb {
    parse_color(input).unwrap_or(Rgb::WHITE)
}

fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#')?;
    if s.len() != 7 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

fn parse_triple(s: &str) -> Option<Rgb> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    let channel = |p: &str| {
        p.trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| u8::try_from(v).ok())
    };
    Some(Rgb::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
    ))
}

/// Parse an accent theme index (`"0"`–`"7"`).
///
/// Anything else (empty, non-numeric or out of range) resolves to
/// [`LightingTheme::Purple`]. Never fails.
pub fn parse_theme_index(input: &str) -> LightingTheme {
    input
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(LightingTheme::from_index)
        .unwrap_or_default()
}

/// Format a colour as `#RRGGBB`.
pub fn format_color(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}
