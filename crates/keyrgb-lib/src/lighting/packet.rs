use crate::protocol::{
    BASE_PACKET, OFF_KEY_B, OFF_KEY_G, OFF_KEY_R, OFF_LINE_COLOR, OFF_VOLUME_COLOR, PACKET_LEN,
};

use super::color::Rgb;
use super::theme::{LightingTheme, ThemeMapping};

/// Scale an 8-bit channel by a percentage, truncating.
///
/// `percent` is clamped to 0–100 first, so the result never exceeds `channel`.
pub fn scale_channel(channel: u8, percent: i32) -> u8 {
    let pct = percent.clamp(0, 100) as u32;
    (u32::from(channel) * pct / 100) as u8
}

/// A complete lighting report, ready to write to the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingPacket([u8; PACKET_LEN]);

impl LightingPacket {
    /// Build a packet from the base template.
    ///
    /// Only the key colour and the two accent codes are written; every other
    /// byte keeps its template value.
    pub fn encode(color: Rgb, intensity_percent: i32, theme: LightingTheme) -> Self {
        let mut buf = BASE_PACKET;
        let ThemeMapping { line, volume } = theme.mapping();

        buf[OFF_KEY_R] = scale_channel(color.r, intensity_percent);
        buf[OFF_KEY_G] = scale_channel(color.g, intensity_percent);
        buf[OFF_KEY_B] = scale_channel(color.b, intensity_percent);
        buf[OFF_LINE_COLOR] = line;
        buf[OFF_VOLUME_COLOR] = volume;

        LightingPacket(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Scaled key colour as written on the wire.
    pub fn key_color(&self) -> Rgb {
        Rgb::new(self.0[OFF_KEY_R], self.0[OFF_KEY_G], self.0[OFF_KEY_B])
    }

    pub fn theme_codes(&self) -> ThemeMapping {
        ThemeMapping {
            line: self.0[OFF_LINE_COLOR],
            volume: self.0[OFF_VOLUME_COLOR],
        }
    }
}

impl Default for LightingPacket {
    fn default() -> Self {
        LightingPacket(BASE_PACKET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MUTABLE_OFFSETS;

    fn assert_template_elsewhere(packet: &LightingPacket) {
        for (i, (&got, &base)) in packet.as_bytes().iter().zip(BASE_PACKET.iter()).enumerate() {
            if !MUTABLE_OFFSETS.contains(&i) {
                assert_eq!(got, base, "byte {i} differs from template");
            }
        }
    }

    #[test]
    fn encode_half_intensity_green() {
        let p = LightingPacket::encode(Rgb::new(200, 100, 50), 50, LightingTheme::Green);
        assert_eq!(p.as_bytes().len(), PACKET_LEN);
        assert_eq!(&p.as_bytes()[14..17], &[100, 50, 25]);
        assert_eq!(p.as_bytes()[28], 3);
        assert_eq!(p.as_bytes()[30], 5);
        assert_template_elsewhere(&p);
    }

    #[test]
    fn encode_white_75_purple() {
        let p = LightingPacket::encode(Rgb::WHITE, 75, LightingTheme::Purple);
        assert_eq!(p.key_color(), Rgb::new(191, 191, 191));
        assert_eq!(p.theme_codes(), ThemeMapping { line: 6, volume: 8 });
        assert_template_elsewhere(&p);
    }

    #[test]
    fn encode_full_intensity_white_purple_is_template() {
        let p = LightingPacket::encode(Rgb::WHITE, 100, LightingTheme::Purple);
        assert_eq!(p, LightingPacket::default());
    }

    #[test]
    fn encode_clamps_intensity() {
        let c = Rgb::new(10, 20, 30);
        assert_eq!(
            LightingPacket::encode(c, 250, LightingTheme::Off),
            LightingPacket::encode(c, 100, LightingTheme::Off)
        );
        let dark = LightingPacket::encode(c, -5, LightingTheme::Off);
        assert_eq!(dark.key_color(), Rgb::BLACK);
    }

    #[test]
    fn encode_is_deterministic() {
        let a = LightingPacket::encode(Rgb::new(1, 2, 3), 42, LightingTheme::Red);
        let b = LightingPacket::encode(Rgb::new(1, 2, 3), 42, LightingTheme::Red);
        assert_eq!(a, b);
    }

    #[test]
    fn encode_writes_every_theme_mapping() {
        for theme in LightingTheme::ALL {
            let p = LightingPacket::encode(Rgb::WHITE, 100, theme);
            assert_eq!(p.theme_codes(), theme.mapping());
            assert_template_elsewhere(&p);
        }
    }

    #[test]
    fn encode_leaves_template_constant_untouched() {
        let before = BASE_PACKET;
        let _ = LightingPacket::encode(Rgb::BLACK, 0, LightingTheme::Off);
        assert_eq!(before, BASE_PACKET);
    }

    #[test]
    fn scale_channel_truncates() {
        assert_eq!(scale_channel(255, 75), 191);
        assert_eq!(scale_channel(1, 99), 0);
        assert_eq!(scale_channel(255, 100), 255);
        assert_eq!(scale_channel(0, 100), 0);
    }

    #[test]
    fn scale_channel_never_exceeds_input() {
        for c in 0..=255u8 {
            for pct in [-10, 0, 1, 33, 50, 99, 100, 101, 1000] {
                assert!(scale_channel(c, pct) <= c);
            }
        }
    }
}
