//! Lighting model: colour parsing, accent themes and packet encoding.

mod color;
mod packet;
mod theme;

pub use color::{Rgb, format_color, parse_color, parse_color_or_default, parse_theme_index};
pub use packet::{LightingPacket, scale_channel};
pub use theme::{LightingTheme, ThemeMapping};
