//! HID transport: channel/stream traits and the hidapi backend.
//!
//! The session layer only sees [`DeviceChannel`] and [`HidStream`], so tests
//! swap in [`mock::MockChannel`] without touching real hardware.

use std::ffi::CString;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::protocol::{LIGHTING_USAGE, LIGHTING_USAGE_PAGE};

// ── Error type ──

/// HID transport errors.
///
/// String payloads follow **"context: details"**, where *context* names the
/// step (`"open"`, `"write"`, `"ack"`) and *details* carries the backend
/// message.
#[derive(Debug)]
pub enum DeviceError {
    /// An operation needed an open stream and none is held.
    NotConnected,
    /// No matching endpoint was found, or none of them could be opened.
    NotFound,
    OpenFailed(String),
    TransportFailed(String),
    /// The HID backend itself could not be initialised.
    BackendUnavailable(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotConnected => write!(f, "Keyboard is not connected"),
            DeviceError::NotFound => write!(f, "SONiX keyboard not found"),
            DeviceError::OpenFailed(e) => write!(f, "Failed to open device: {e}"),
            DeviceError::TransportFailed(e) => write!(f, "Transport failed: {e}"),
            DeviceError::BackendUnavailable(e) => write!(f, "HID backend unavailable: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Discovery ──

/// One HID endpoint matching the keyboard's vendor/product id.
///
/// A composite keyboard exposes several; only the vendor lighting interface
/// accepts lighting reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub usage_page: u16,
    pub usage: u16,
}

impl DiscoveredDevice {
    /// Whether this endpoint is the vendor-defined lighting interface.
    pub fn is_lighting_interface(&self) -> bool {
        self.usage_page == LIGHTING_USAGE_PAGE && self.usage == LIGHTING_USAGE
    }

    /// Human-readable name, e.g. "SONiX USB DEVICE".
    pub fn display_name(&self) -> &str {
        self.product
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("Unknown keyboard")
    }
}

// ── Traits ──

/// An open HID endpoint.
pub trait HidStream {
    /// Write one output report. Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read one input report, waiting at most `timeout_ms`. Returns 0 on timeout.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;

    /// Whether the stream can still accept writes.
    fn is_writable(&self) -> bool {
        true
    }
}

/// Enumerates and opens HID endpoints.
pub trait DeviceChannel {
    type Stream: HidStream;

    /// List endpoints whose vendor and product id match exactly.
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Vec<DiscoveredDevice>;

    fn open(&self, device: &DiscoveredDevice) -> Result<Self::Stream>;
}

// ── hidapi backend ──

/// [`DeviceChannel`] backed by the system HID stack through `hidapi`.
pub struct HidapiChannel {
    api: Mutex<hidapi::HidApi>,
}

impl HidapiChannel {
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new()
            .map_err(|e| DeviceError::BackendUnavailable(format!("hidapi init: {e}")))?;
        Ok(HidapiChannel {
            api: Mutex::new(api),
        })
    }
}

fn to_discovered(info: &hidapi::DeviceInfo) -> DiscoveredDevice {
    DiscoveredDevice {
        path: info.path().to_string_lossy().into_owned(),
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        serial: info.serial_number().map(str::to_string),
        manufacturer: info.manufacturer_string().map(str::to_string),
        product: info.product_string().map(str::to_string),
        usage_page: info.usage_page(),
        usage: info.usage(),
    }
}

impl DeviceChannel for HidapiChannel {
    type Stream = HidapiStream;

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Vec<DiscoveredDevice> {
        let Ok(mut api) = self.api.lock() else {
            return Vec::new();
        };
        if let Err(e) = api.refresh_devices() {
            log::warn!("HID refresh failed: {e}");
        }
        api.device_list()
            .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .map(to_discovered)
            .collect()
    }

    fn open(&self, device: &DiscoveredDevice) -> Result<HidapiStream> {
        let path = CString::new(device.path.as_str())
            .map_err(|e| DeviceError::OpenFailed(format!("path: {e}")))?;
        let api = self
            .api
            .lock()
            .map_err(|_| DeviceError::BackendUnavailable("hidapi lock poisoned".into()))?;
        let dev = api
            .open_path(&path)
            .map_err(|e| DeviceError::OpenFailed(format!("open {}: {e}", device.path)))?;
        Ok(HidapiStream { device: dev })
    }
}

/// An open hidapi endpoint. Closed when dropped.
pub struct HidapiStream {
    device: hidapi::HidDevice,
}

impl HidStream for HidapiStream {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.device
            .write(data)
            .map_err(|e| DeviceError::TransportFailed(format!("write: {e}")))
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| DeviceError::TransportFailed(format!("ack: {e}")))
    }
}

// ── Mock ──

/// Mock channel for testing (available to integration tests and downstream crates).
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, MutexGuard};

    /// State shared between a [`MockChannel`], its clones and every stream it opened.
    #[derive(Debug, Default)]
    pub struct MockState {
        /// Endpoints returned by `enumerate`.
        pub devices: Vec<DiscoveredDevice>,
        /// Paths whose `open` fails.
        pub unopenable: Vec<String>,
        pub enumerate_calls: usize,
        /// Paths passed to `open`, in order.
        pub open_attempts: Vec<String>,
        /// Every packet written, across all streams.
        pub writes: Vec<Vec<u8>>,
        /// If true, `write` returns an error.
        pub fail_write: bool,
        /// Acknowledgement returned by `read_timeout`. Empty simulates a timeout.
        pub ack: Vec<u8>,
        /// Value reported by `is_writable` on open streams.
        pub writable: bool,
        /// Number of streams dropped.
        pub closes: usize,
    }

    /// In-memory [`DeviceChannel`]. Clone it to keep a handle for assertions
    /// after the original moves into a session.
    #[derive(Debug, Clone)]
    pub struct MockChannel {
        state: Arc<Mutex<MockState>>,
    }

    impl Default for MockChannel {
        fn default() -> Self {
            Self::new()
        }
    }

    /// The keyboard's lighting endpoint as the mock reports it.
    pub fn lighting_endpoint(path: &str) -> DiscoveredDevice {
        DiscoveredDevice {
            path: path.into(),
            vendor_id: crate::protocol::SONIX_VID,
            product_id: crate::protocol::KEYBOARD_PID,
            serial: Some("MOCK0001".into()),
            manufacturer: Some("SONiX".into()),
            product: Some("USB DEVICE".into()),
            usage_page: LIGHTING_USAGE_PAGE,
            usage: LIGHTING_USAGE,
        }
    }

    /// A non-lighting endpoint of the same keyboard (e.g. the boot keyboard).
    pub fn keyboard_endpoint(path: &str) -> DiscoveredDevice {
        DiscoveredDevice {
            usage_page: 0x01,
            usage: 0x06,
            ..lighting_endpoint(path)
        }
    }

    impl MockChannel {
        /// A channel with one lighting endpoint that acknowledges every packet.
        pub fn new() -> Self {
            Self::with_devices(vec![lighting_endpoint("mock://sonix/lighting")])
        }

        /// A channel with no keyboard attached.
        pub fn empty() -> Self {
            Self::with_devices(Vec::new())
        }

        pub fn with_devices(devices: Vec<DiscoveredDevice>) -> Self {
            MockChannel {
                state: Arc::new(Mutex::new(MockState {
                    devices,
                    ack: vec![0x04, 0x3b, 0x00, 0x01],
                    writable: true,
                    ..MockState::default()
                })),
            }
        }

        /// Lock the shared state for inspection or fault injection.
        pub fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Replace the attached endpoints (simulates plug/unplug).
        pub fn set_devices(&self, devices: Vec<DiscoveredDevice>) {
            self.state().devices = devices;
        }

        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.state().writes.clone()
        }
    }

    impl DeviceChannel for MockChannel {
        type Stream = MockStream;

        fn enumerate(&self, vendor_id: u16, product_id: u16) -> Vec<DiscoveredDevice> {
            let mut st = self.state();
            st.enumerate_calls += 1;
            st.devices
                .iter()
                .filter(|d| d.vendor_id == vendor_id && d.product_id == product_id)
                .cloned()
                .collect()
        }

        fn open(&self, device: &DiscoveredDevice) -> Result<MockStream> {
            let mut st = self.state();
            st.open_attempts.push(device.path.clone());
            if st.unopenable.contains(&device.path) {
                return Err(DeviceError::OpenFailed(format!(
                    "open {}: mock failure injected",
                    device.path
                )));
            }
            Ok(MockStream {
                state: Arc::clone(&self.state),
            })
        }
    }

    /// Stream handed out by [`MockChannel::open`].
    #[derive(Debug)]
    pub struct MockStream {
        state: Arc<Mutex<MockState>>,
    }

    impl MockStream {
        fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl HidStream for MockStream {
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            let mut st = self.state();
            if st.fail_write {
                return Err(DeviceError::TransportFailed(
                    "write: mock failure injected".into(),
                ));
            }
            st.writes.push(data.to_vec());
            Ok(data.len())
        }

        fn read_timeout(&mut self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize> {
            let st = self.state();
            let n = st.ack.len().min(buf.len());
            buf[..n].copy_from_slice(&st.ack[..n]);
            Ok(n)
        }

        fn is_writable(&self) -> bool {
            self.state().writable
        }
    }

    impl Drop for MockStream {
        fn drop(&mut self) {
            self.state().closes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::protocol::{KEYBOARD_PID, SONIX_VID};

    #[test]
    fn lighting_interface_detection() {
        assert!(lighting_endpoint("a").is_lighting_interface());
        assert!(!keyboard_endpoint("b").is_lighting_interface());
    }

    #[test]
    fn display_name_falls_back_when_product_missing() {
        let mut d = lighting_endpoint("a");
        assert_eq!(d.display_name(), "USB DEVICE");
        d.product = Some("  ".into());
        assert_eq!(d.display_name(), "Unknown keyboard");
        d.product = None;
        assert_eq!(d.display_name(), "Unknown keyboard");
    }

    #[test]
    fn discovered_device_serializes_usage_fields() {
        let json = serde_json::to_value(lighting_endpoint("mock://x")).unwrap();
        assert_eq!(json["path"], "mock://x");
        assert_eq!(json["usage_page"], 0xFF1C);
        assert_eq!(json["usage"], 0x92);
    }

    #[test]
    fn display_messages() {
        assert_eq!(DeviceError::NotFound.to_string(), "SONiX keyboard not found");
        assert_eq!(
            DeviceError::NotConnected.to_string(),
            "Keyboard is not connected"
        );
        assert_eq!(
            DeviceError::TransportFailed("ack: timeout".into()).to_string(),
            "Transport failed: ack: timeout"
        );
    }

    // ── Mock behaviour ──

    #[test]
    fn mock_enumerate_filters_by_ids() {
        let mut other = lighting_endpoint("mock://other");
        other.product_id = 0x1234;
        let ch = MockChannel::with_devices(vec![lighting_endpoint("mock://kb"), other]);
        let found = ch.enumerate(SONIX_VID, KEYBOARD_PID);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "mock://kb");
        assert_eq!(ch.state().enumerate_calls, 1);
    }

    #[test]
    fn mock_stream_records_writes_and_closes() {
        let ch = MockChannel::new();
        let dev = ch.enumerate(SONIX_VID, KEYBOARD_PID).remove(0);
        {
            let mut s = ch.open(&dev).unwrap();
            assert_eq!(s.write(&[1, 2, 3]).unwrap(), 3);
            let mut buf = [0u8; 64];
            assert!(s.read_timeout(&mut buf, 10).unwrap() > 0);
        }
        assert_eq!(ch.writes(), vec![vec![1, 2, 3]]);
        assert_eq!(ch.state().closes, 1);
    }

    #[test]
    fn mock_open_failure_injection() {
        let ch = MockChannel::new();
        let dev = lighting_endpoint("mock://sonix/lighting");
        ch.state().unopenable.push(dev.path.clone());
        assert!(matches!(ch.open(&dev), Err(DeviceError::OpenFailed(_))));
    }
}
