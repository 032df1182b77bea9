//! Device session: owns at most one open stream to the keyboard.

use crate::device::{DeviceChannel, DeviceError, DiscoveredDevice, HidStream, Result};
use crate::lighting::LightingPacket;
use crate::protocol::{ACK_LEN, ACK_TIMEOUT_MS, KEYBOARD_PID, SONIX_VID};

/// Connection to one keyboard over a [`DeviceChannel`].
///
/// Created disconnected. `connect` always releases the current stream before
/// opening a new one, so at most one stream is ever held.
pub struct DeviceSession<C: DeviceChannel> {
    channel: C,
    stream: Option<C::Stream>,
    device: Option<DiscoveredDevice>,
    preferred_path: Option<String>,
}

impl<C: DeviceChannel> DeviceSession<C> {
    pub fn new(channel: C) -> Self {
        DeviceSession {
            channel,
            stream: None,
            device: None,
            preferred_path: None,
        }
    }

    /// Try `path` before any other candidate on `connect`. Empty means auto.
    pub fn with_preferred_path(mut self, path: &str) -> Self {
        let path = path.trim();
        self.preferred_path = (!path.is_empty()).then(|| path.to_string());
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Open the keyboard.
    ///
    /// Candidates are tried in order: the preferred path, then the vendor
    /// lighting interface, then any other endpoint of the keyboard. The first
    /// one that opens is adopted.
    pub fn connect(&mut self) -> Result<()> {
        self.disconnect();

        let mut candidates = self.channel.enumerate(SONIX_VID, KEYBOARD_PID);
        if candidates.is_empty() {
            log::debug!("no {SONIX_VID:04x}:{KEYBOARD_PID:04x} endpoints found");
            return Err(DeviceError::NotFound);
        }
        let preferred = self.preferred_path.as_deref();
        candidates.sort_by_key(|d| candidate_rank(d, preferred));

        for candidate in candidates {
            match self.channel.open(&candidate) {
                Ok(stream) => {
                    log::info!(
                        "connected to {} ({})",
                        candidate.display_name(),
                        candidate.path
                    );
                    self.stream = Some(stream);
                    self.device = Some(candidate);
                    return Ok(());
                }
                Err(e) => log::debug!("skipping {}: {e}", candidate.path),
            }
        }

        Err(DeviceError::NotFound)
    }

    /// Write one lighting packet and wait for the acknowledgement report.
    ///
    /// A failed send leaves the session connected; the caller decides whether
    /// to reconnect.
    pub fn send(&mut self, packet: &LightingPacket) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(DeviceError::NotConnected)?;

        stream.write(packet.as_bytes())?;

        let mut ack = [0u8; ACK_LEN];
        let n = stream.read_timeout(&mut ack, ACK_TIMEOUT_MS)?;
        if n == 0 {
            return Err(DeviceError::TransportFailed(format!(
                "ack: no response within {ACK_TIMEOUT_MS} ms"
            )));
        }
        log::debug!("ack {n} bytes");
        Ok(())
    }

    /// Release the stream. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some()
            && let Some(dev) = self.device.take()
        {
            log::info!("disconnected from {}", dev.path);
        }
        self.device = None;
    }

    pub fn is_connected(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_writable())
    }

    /// The endpoint currently held, if any.
    pub fn device(&self) -> Option<&DiscoveredDevice> {
        self.device.as_ref()
    }
}

impl<C: DeviceChannel> Drop for DeviceSession<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn candidate_rank(device: &DiscoveredDevice, preferred: Option<&str>) -> u8 {
    if preferred.is_some_and(|p| p == device.path) {
        0
    } else if device.is_lighting_interface() {
        1
    } else {
        2
    }
}
