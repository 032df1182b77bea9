//! KeyRGB: lighting control for SONiX USB RGB keyboards.

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod focus;
pub mod lighting;
pub mod probe;
pub mod protocol;
pub mod reconnect;
pub mod session;
pub mod watcher;

pub use error::KeyrgbError;
