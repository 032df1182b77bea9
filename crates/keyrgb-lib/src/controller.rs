//! Public operation surface for driving the keyboard lighting.

use crate::device::{DeviceChannel, DiscoveredDevice, Result};
use crate::lighting::{LightingPacket, LightingTheme, Rgb, parse_color_or_default};
use crate::session::DeviceSession;

/// High-level lighting operations over a [`DeviceSession`].
pub struct KeyboardController<C: DeviceChannel> {
    session: DeviceSession<C>,
}

impl<C: DeviceChannel> KeyboardController<C> {
    pub fn new(channel: C) -> Self {
        Self::from_session(DeviceSession::new(channel))
    }

    pub fn from_session(session: DeviceSession<C>) -> Self {
        KeyboardController { session }
    }

    pub fn connect(&mut self) -> Result<()> {
        self.session.connect()
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn device(&self) -> Option<&DiscoveredDevice> {
        self.session.device()
    }

    pub fn session(&self) -> &DeviceSession<C> {
        &self.session
    }

    /// Send a packet built from an already-parsed colour.
    pub fn apply_theme(&mut self, color: Rgb, intensity: i32, theme: LightingTheme) -> Result<()> {
        let packet = LightingPacket::encode(color, intensity, theme);
        log::debug!(
            "apply key={} scaled={} intensity={intensity} theme={theme}",
            color,
            packet.key_color()
        );
        self.session.send(&packet)
    }

    /// Set key colour, intensity and accent theme.
    ///
    /// An unparsable `color_expr` falls back to white rather than failing.
    pub fn apply_lighting(
        &mut self,
        color_expr: &str,
        intensity: i32,
        theme: LightingTheme,
    ) -> Result<()> {
        self.apply_theme(parse_color_or_default(color_expr), intensity, theme)
    }

    /// Set the key colour and pick the accent theme that matches it.
    ///
    /// Returns the theme that was sent.
    pub fn apply_solid_color(&mut self, color: Rgb, intensity: i32) -> Result<LightingTheme> {
        let theme = LightingTheme::infer_from_color(color);
        self.apply_theme(color, intensity, theme)?;
        Ok(theme)
    }
}
