//! Unified error type for the keyrgb-lib crate.
//!
//! [`KeyrgbError`] wraps [`DeviceError`] and I/O failures alongside the
//! string-carrying `Config` and `Color` kinds. `From` impls let `?` cross
//! module boundaries.

use std::fmt;

use crate::device::DeviceError;

/// Unified error type for keyrgb-lib operations.
#[derive(Debug)]
pub enum KeyrgbError {
    /// HID transport error (enumerate, open, write, acknowledgement).
    Device(DeviceError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// Configuration parse or validation error.
    Config(String),
    /// Colour expression that could not be parsed.
    Color(String),
}

impl fmt::Display for KeyrgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyrgbError::Device(e) => write!(f, "{e}"),
            KeyrgbError::Io(e) => write!(f, "I/O error: {e}"),
            KeyrgbError::Config(e) => write!(f, "Config error: {e}"),
            KeyrgbError::Color(e) => write!(f, "Invalid color expression: {e}"),
        }
    }
}

impl std::error::Error for KeyrgbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyrgbError::Device(e) => Some(e),
            KeyrgbError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for KeyrgbError {
    fn from(e: DeviceError) -> Self {
        KeyrgbError::Device(e)
    }
}

impl From<std::io::Error> for KeyrgbError {
    fn from(e: std::io::Error) -> Self {
        KeyrgbError::Io(e)
    }
}

/// Crate-level Result alias using [`KeyrgbError`].
pub type Result<T> = std::result::Result<T, KeyrgbError>;
